use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use unsegen::input::Input;

use crate::config::Config;
use crate::provider::{FeedSource, Result};
use crate::store::{self, HolidayTable};

pub enum Event {
    Input(Input),
    Update,
    HolidaysLoaded(Result<HolidayTable>),
}

pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    _input_handle: thread::JoinHandle<()>,
    _update_handle: thread::JoinHandle<()>,
}

impl Default for Dispatcher {
    fn default() -> Dispatcher {
        Dispatcher::from_config(&Config::default())
    }
}

impl Dispatcher {
    pub fn from_config(config: &Config) -> Dispatcher {
        let tick_rate = config.tick_rate();
        let (tx, rx) = mpsc::channel();
        let input_handle = {
            let tx = tx.clone();
            thread::spawn(move || {
                let stdin = io::stdin();
                let stdin = stdin.lock();
                for evt in Input::read_all(stdin) {
                    match evt {
                        Ok(key) => {
                            if tx.send(Event::Input(key)).is_err() {
                                return;
                            }
                        }
                        Err(err) => log::debug!("Could not read input: {}", err),
                    }
                }
            })
        };
        let tx_upd = tx.clone();
        let update_handle = {
            thread::spawn(move || {
                while tx_upd.send(Event::Update).is_ok() {
                    thread::sleep(tick_rate);
                }
            })
        };
        Dispatcher {
            rx,
            tx,
            _input_handle: input_handle,
            _update_handle: update_handle,
        }
    }

    pub fn next(&self) -> std::result::Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }

    pub fn spawn_ingest(&self, english: FeedSource, local: FeedSource, timeout: Duration) {
        spawn_ingest(self.tx.clone(), english, local, timeout);
    }
}

/// Loads the holiday table in the background and delivers it to `sink` as
/// `Event::HolidaysLoaded`.
pub fn spawn_ingest(
    sink: mpsc::Sender<Event>,
    english: FeedSource,
    local: FeedSource,
    timeout: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let result = store::load_table(&english, &local, timeout);
        if sink.send(Event::HolidaysLoaded(result)).is_err() {
            log::debug!("Holidays loaded after the event loop ended");
        }
    })
}
