use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::locale::Locale;
use crate::provider::{
    Error, ErrorKind, FeedSource, Result, CACHE_FILE_ENGLISH, CACHE_FILE_LOCAL,
};

const CONFIG_PATH_ENV_VAR: &str = "HKCAL_CONFIG_FILE";

pub const DEFAULT_FEED_ENGLISH: &str = "https://www.1823.gov.hk/common/ical/en.json";
pub const DEFAULT_FEED_LOCAL: &str = "https://www.1823.gov.hk/common/ical/tc.json";

pub(crate) fn find_configfile_locations() -> io::Result<Vec<PathBuf>> {
    let config_env = env::var(CONFIG_PATH_ENV_VAR).ok().map(PathBuf::from);

    let home = dirs::home_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::Other, "Unable to find home directory")
    })?;

    let home_config = home.join(".hkcal.toml");

    let config_xdg = dirs::config_dir()
        .unwrap_or_else(|| home.join(".config"))
        .join("hkcal")
        .join("config.toml");

    let mut locations = vec![config_xdg, home_config];

    if let Some(path) = config_env {
        locations.insert(0, path);
    }

    Ok(locations)
}

/// Loads the config at `path`, or the first existing default location, or
/// falls back to the built-in defaults.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        if !path.is_file() {
            return Err(Error::new(
                ErrorKind::ConfigMissing,
                &format!("'{}' does not exist", path.display()),
            ));
        }
        return Config::from_path(path);
    }

    let locations = find_configfile_locations().unwrap_or_else(|err| {
        log::warn!("{}", err);
        Vec::new()
    });

    match locations.iter().find(|p| p.is_file()) {
        Some(path) => Config::from_path(path),
        None => {
            log::debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_owned(),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub english: String,
    pub local: String,
    pub cache_dir: Option<PathBuf>,
    pub prefer_cache: bool,
    /// Seconds
    pub timeout: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            english: DEFAULT_FEED_ENGLISH.to_owned(),
            local: DEFAULT_FEED_LOCAL.to_owned(),
            cache_dir: None,
            prefer_cache: true,
            timeout: 10,
        }
    }
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn cache_dir(&self) -> Option<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Some(expand_home(dir)),
            None => dirs::cache_dir().map(|dir| dir.join("hkcal")),
        }
    }

    /// The configured feeds, ignoring any cache.
    pub fn configured_sources(&self) -> Result<(FeedSource, FeedSource)> {
        let english = match self.english.parse::<FeedSource>()? {
            FeedSource::File(path) => FeedSource::File(expand_home(&path)),
            remote => remote,
        };
        let local = match self.local.parse::<FeedSource>()? {
            FeedSource::File(path) => FeedSource::File(expand_home(&path)),
            remote => remote,
        };
        Ok((english, local))
    }

    /// Sources to ingest from: the cached copies if both exist and the cache
    /// is preferred, the configured feeds otherwise.
    pub fn sources(&self) -> Result<(FeedSource, FeedSource)> {
        if self.prefer_cache {
            if let Some(dir) = self.cache_dir() {
                let english = dir.join(CACHE_FILE_ENGLISH);
                let local = dir.join(CACHE_FILE_LOCAL);
                if english.is_file() && local.is_file() {
                    return Ok((FeedSource::File(english), FeedSource::File(local)));
                }
            }
        }

        self.configured_sources()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub today_char: Option<char>,
    pub holiday_char: Option<char>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        ThemeConfig {
            today_char: Some('*'),
            holiday_char: Some('+'),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: Option<Locale>,
    /// Milliseconds
    pub tick_rate: u64,
    pub print_dir: PathBuf,
    pub feeds: FeedConfig,
    pub theme: ThemeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            locale: None,
            tick_rate: 1000,
            print_dir: PathBuf::from("."),
            feeds: FeedConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = content.parse::<Config>().map_err(|err| {
            let msg = format!("{}: {}", path.display(), err);
            err.with_msg(&msg)
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate)
    }

    pub fn locale(&self) -> Locale {
        self.locale.unwrap_or_else(Locale::from_env)
    }

    pub fn print_dir(&self) -> PathBuf {
        expand_home(&self.print_dir)
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let config: Config = "".parse().unwrap();
        assert_eq!(config.locale, None);
        assert_eq!(config.tick_rate(), Duration::from_secs(1));
        assert_eq!(config.feeds.english, DEFAULT_FEED_ENGLISH);
        assert_eq!(config.feeds.local, DEFAULT_FEED_LOCAL);
        assert_eq!(config.feeds.timeout(), Duration::from_secs(10));
        assert_eq!(config.theme.today_char, Some('*'));
    }

    #[test]
    fn parses_all_sections() {
        let config: Config = r##"
            locale = "zh"
            tick_rate = 250
            print_dir = "/tmp/prints"

            [feeds]
            english = "data/holidays-en.json"
            local = "https://example.org/tc.json"
            cache_dir = "/var/cache/hkcal"
            prefer_cache = false
            timeout = 3

            [theme]
            today_char = "#"
        "##
        .parse()
        .unwrap();

        assert_eq!(config.locale(), Locale::Zh);
        assert_eq!(config.tick_rate(), Duration::from_millis(250));
        assert_eq!(config.print_dir(), PathBuf::from("/tmp/prints"));
        assert_eq!(config.theme.today_char, Some('#'));
        assert_eq!(config.theme.holiday_char, Some('+'));
        assert_eq!(config.feeds.cache_dir(), Some(PathBuf::from("/var/cache/hkcal")));

        let (english, local) = config.feeds.sources().unwrap();
        assert_eq!(english, FeedSource::File(PathBuf::from("data/holidays-en.json")));
        assert_eq!(local, FeedSource::Remote("https://example.org/tc.json".to_owned()));
    }

    #[test]
    fn invalid_config_is_an_error() {
        let res = "locale = \"fr\"".parse::<Config>();
        assert!(matches!(
            res,
            Err(Error {
                kind: ErrorKind::ConfigParse,
                ..
            })
        ));
    }

    #[test]
    fn cached_feeds_are_preferred() {
        let dir = std::env::temp_dir().join(format!("hkcal-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CACHE_FILE_ENGLISH), "{}").unwrap();
        fs::write(dir.join(CACHE_FILE_LOCAL), "{}").unwrap();

        let mut feeds = FeedConfig {
            cache_dir: Some(dir.clone()),
            ..FeedConfig::default()
        };
        let (english, local) = feeds.sources().unwrap();
        assert_eq!(english, FeedSource::File(dir.join(CACHE_FILE_ENGLISH)));
        assert_eq!(local, FeedSource::File(dir.join(CACHE_FILE_LOCAL)));

        feeds.prefer_cache = false;
        let (english, _) = feeds.sources().unwrap();
        assert!(english.is_remote());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let res = load_suitable_config(Some(Path::new("/nonexistent/hkcal.toml")));
        assert!(matches!(
            res,
            Err(Error {
                kind: ErrorKind::ConfigMissing,
                ..
            })
        ));
    }
}
