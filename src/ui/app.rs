use std::fmt::Write;

use crate::config::Config;
use crate::events::{Dispatcher, Event};
use crate::print;
use crate::provider::FeedSource;

use super::{Context, HolidayList, MonthPane};

use unsegen::base::{Cursor, Terminal};
use unsegen::input::Key;
use unsegen::widget::*;

/// Button row and the last status message.
struct StatusBar<'a> {
    context: &'a Context,
}

impl Widget for StatusBar<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(1),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, mut window: unsegen::base::Window, _hints: RenderingHints) {
        let texts = self.context.locale().texts();
        let mut cursor =
            Cursor::new(&mut window).style_modifier(self.context.theme().status_style);

        let line = format!(
            "[h] {}  [l] {}  [t] {}  [p] {}  [q] {}",
            texts.prev, texts.next, texts.today, texts.print, texts.quit
        );
        let status = match &self.context.last_status_message {
            Some(msg) => format!("{}  | {}", line, msg),
            None => line,
        };

        if let Err(err) = write!(&mut cursor, "{}", status) {
            log::warn!("Error while drawing status bar: {}", err);
        }
        cursor.fill_and_wrap_line();
    }
}

pub struct App<'a> {
    config: &'a Config,
    context: Context,
    sources: (FeedSource, FeedSource),
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, context: Context, sources: (FeedSource, FeedSource)) -> App<'a> {
        App {
            config,
            context,
            sources,
        }
    }

    fn as_widget<'w>(&'w self) -> impl Widget + 'w
    where
        'a: 'w,
    {
        VLayout::new()
            .widget(MonthPane::new(&self.context))
            .widget(HolidayList::new(&self.context))
            .widget(StatusBar {
                context: &self.context,
            })
    }

    fn refresh(&mut self, dispatcher: &Dispatcher) {
        if self.context.is_loading() {
            return;
        }
        self.context.begin_loading();
        dispatcher.spawn_ingest(
            self.sources.0.clone(),
            self.sources.1.clone(),
            self.config.feeds.timeout(),
        );
    }

    fn print(&mut self) {
        let grid = self.context.grid();
        let holiday_char = self.context.theme().holiday_char;
        let label = self.context.locale().texts().print;

        self.context.last_status_message =
            match print::print_to_dir(&grid, &self.config.print_dir(), holiday_char) {
                Ok(path) => Some(format!("{}: {}", label, path.display())),
                Err(err) => {
                    log::warn!("Could not print {}: {}", grid.month(), err);
                    Some(err.to_string())
                }
            };
    }

    pub fn run(
        &mut self,
        dispatcher: Dispatcher,
        mut term: Terminal,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut run = true;

        // The empty grid goes out before any holiday data is there
        self.refresh(&dispatcher);

        while run {
            // Draw
            let root = term.create_root_window();
            self.as_widget().draw(root, RenderingHints::new());
            term.present();

            // Handle events
            let event = match dispatcher.next() {
                Ok(event) => event,
                Err(_) => break,
            };

            match event {
                Event::Update => self.context.update(),
                Event::HolidaysLoaded(result) => {
                    // Failures are reported in the status line only
                    let _ = self.context.holidays_loaded(result);
                }
                Event::Input(input) => {
                    let mut delta = 0;
                    let mut print = false;
                    let mut refresh = false;
                    let mut today = false;

                    input
                        .chain((Key::Char('q'), || run = false))
                        .chain((Key::Esc, || run = false))
                        .chain((Key::Char('h'), || delta = -1))
                        .chain((Key::Left, || delta = -1))
                        .chain((Key::Char('<'), || delta = -1))
                        .chain((Key::Char('l'), || delta = 1))
                        .chain((Key::Right, || delta = 1))
                        .chain((Key::Char('>'), || delta = 1))
                        .chain((Key::Char('t'), || today = true))
                        .chain((Key::Char('p'), || print = true))
                        .chain((Key::Char('r'), || refresh = true))
                        .finish();

                    if delta != 0 {
                        self.context.change_month(delta);
                    }
                    if today {
                        self.context.select_today();
                    }
                    if print {
                        self.print();
                    }
                    if refresh {
                        self.refresh(&dispatcher);
                    }
                }
            }
        }

        Ok(())
    }
}
