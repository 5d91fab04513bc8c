use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;
use std::time::Duration;

mod error;
pub mod feed;

pub use error::{Error, ErrorKind};
pub use feed::{FeedDocument, FeedEvent};

pub type Result<T> = std::result::Result<T, Error>;

pub const CACHE_FILE_ENGLISH: &str = "holidays-en.json";
pub const CACHE_FILE_LOCAL: &str = "holidays-zh.json";

/// Where a holiday feed is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Remote(String),
    File(PathBuf),
}

impl FeedSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, FeedSource::Remote(_))
    }

    /// Reads the raw feed body. A non-success HTTP status is an error.
    pub fn retrieve(&self, timeout: Duration) -> Result<String> {
        match self {
            FeedSource::Remote(url) => {
                let client = reqwest::blocking::Client::builder()
                    .timeout(timeout)
                    .build()?;
                let response = client.get(url.as_str()).send()?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Error::new(ErrorKind::FeedStatus(status.as_u16()), url));
                }
                Ok(response.text()?)
            }
            FeedSource::File(path) => fs::read_to_string(path).map_err(|err| {
                let msg = format!("{}: {}", path.display(), err);
                Error::from(err).with_msg(&msg)
            }),
        }
    }

    pub fn load(&self, timeout: Duration) -> Result<FeedDocument> {
        let body = self.retrieve(timeout)?;
        let document = body.parse()?;
        log::debug!("Loaded holiday feed from {}", self);
        Ok(document)
    }
}

impl FromStr for FeedSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            Err(Error::new(ErrorKind::ConfigParse, "empty feed source"))
        } else if s.starts_with("http://") || s.starts_with("https://") {
            Ok(FeedSource::Remote(s.to_owned()))
        } else {
            Ok(FeedSource::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Remote(url) => write!(f, "{}", url),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn joined<T>(handle: thread::ScopedJoinHandle<'_, Result<T>>) -> Result<T> {
    handle.join().unwrap_or_else(|_| {
        Err(Error::new(
            ErrorKind::FeedUnavailable,
            "feed worker panicked",
        ))
    })
}

/// Loads the English and the local-language feed side by side and waits for
/// both. Fails if either one fails.
pub fn fetch_feeds(
    english: &FeedSource,
    local: &FeedSource,
    timeout: Duration,
) -> Result<(FeedDocument, FeedDocument)> {
    let (english, local) = thread::scope(|s| {
        let english = s.spawn(|| english.load(timeout));
        let local = s.spawn(|| local.load(timeout));
        (joined(english), joined(local))
    });

    Ok((english?, local?))
}

/// Downloads both feeds and stores them verbatim in `cache_dir`. Nothing is
/// written unless both bodies parse.
pub fn update_cache(
    english: &FeedSource,
    local: &FeedSource,
    cache_dir: &Path,
    timeout: Duration,
) -> Result<()> {
    let (english, local) = thread::scope(|s| {
        let english = s.spawn(|| english.retrieve(timeout));
        let local = s.spawn(|| local.retrieve(timeout));
        (joined(english), joined(local))
    });
    let (english, local) = (english?, local?);

    english.parse::<FeedDocument>()?;
    local.parse::<FeedDocument>()?;

    fs::create_dir_all(cache_dir)?;
    fs::write(cache_dir.join(CACHE_FILE_ENGLISH), english)?;
    fs::write(cache_dir.join(CACHE_FILE_LOCAL), local)?;

    log::info!("Updated holiday feed cache in {}", cache_dir.display());
    Ok(())
}
