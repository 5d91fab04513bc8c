extern crate hkcal as lib;

use chrono::Local;
use flexi_logger::{FileSpec, Logger};
use lib::calendar::{MonthGrid, MonthIndex};
use lib::events::Dispatcher;
use lib::provider::{self, Error, ErrorKind};
use lib::store::HolidayStore;
use lib::ui::{App, Context};
use nix::sys::termios;
use std::io::stdout;
use std::path::PathBuf;
use structopt::StructOpt;
use unsegen::base::Terminal;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "hkcal",
    about = "hkcal - A month calendar with Hong Kong public holidays."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(
        short = "s",
        long = "show",
        help = "only print the month non-interactively"
    )]
    pub show: bool,

    #[structopt(
        short = "m",
        long = "month",
        help = "month to show as YYYY-MM, defaults to the current month"
    )]
    pub month: Option<MonthIndex>,

    #[structopt(
        long = "update-cache",
        help = "download the holiday feeds into the cache directory and exit"
    )]
    pub update_cache: bool,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();
    let interactive = !(args.show || args.update_cache);

    const DEFAULT_LOG_LEVEL: &'static str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = &args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    // Logging to stderr would scramble the terminal UI
    let _logger = if interactive && args.log_file.is_none() {
        None
    } else {
        Some(logger.start()?)
    };

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;

    if args.update_cache {
        let (english, local) = config.feeds.configured_sources()?;
        let cache_dir = config.feeds.cache_dir().ok_or_else(|| {
            Error::new(ErrorKind::ConfigMissing, "no cache directory available")
        })?;
        provider::update_cache(&english, &local, &cache_dir, config.feeds.timeout())?;
        println!("Holiday feeds cached in {}", cache_dir.display());
        return Ok(());
    }

    let sources = config.feeds.sources()?;
    let month = args.month.unwrap_or_default();

    if args.show {
        let mut store = HolidayStore::new();
        // Without holidays the month is still worth printing
        let _ = store.ingest(&sources.0, &sources.1, config.feeds.timeout());

        let grid = MonthGrid::new(month, &store, Local::now().date_naive());
        print!("{}", lib::print::render_month(&grid, config.theme.holiday_char));
        return Ok(());
    }

    const STDIN: std::os::unix::io::RawFd = 0;
    let orig_attr = std::sync::Mutex::new(termios::tcgetattr(STDIN)?);

    std::panic::set_hook(Box::new(move |info| {
        // Switch to main terminal screen
        println!("{}{}", termion::screen::ToMainScreen, termion::cursor::Show);

        if let Ok(attr) = orig_attr.lock() {
            let _ = termios::tcsetattr(STDIN, termios::SetArg::TCSANOW, &attr);
        }

        println!("hkcal ran into a fatal error!");
        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let dispatcher = Dispatcher::from_config(&config);
    // Setup unsegen terminal
    let stdout = stdout();
    let term = Terminal::new(stdout.lock())?;

    let context = Context::new(&config, HolidayStore::new()).with_month(month);

    let mut app = App::new(&config, context, sources);

    app.run(dispatcher, term)
}
