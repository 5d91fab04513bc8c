use chrono::{Local, NaiveDate};

use crate::calendar::{MonthGrid, MonthIndex};
use crate::config::Config;
use crate::locale::Locale;
use crate::provider::Result;
use crate::store::{HolidayStore, HolidayTable};

use unsegen::base::style::*;

#[derive(Clone, Debug)]
pub struct Theme {
    pub day_style: StyleModifier,
    pub rest_day_style: StyleModifier,
    pub holiday_style: StyleModifier,
    pub holiday_char: Option<char>,
    pub today_style: StyleModifier,
    pub today_char: Option<char>,
    pub month_title_style: StyleModifier,
    pub month_header_style: StyleModifier,
    pub status_style: StyleModifier,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            day_style: StyleModifier::default(),
            rest_day_style: StyleModifier::default().fg_color(Color::Red),
            holiday_style: StyleModifier::default()
                .fg_color(Color::LightRed)
                .format(TextFormatModifier::default().bold(true)),
            holiday_char: Some('+'),
            today_style: StyleModifier::default().invert(true),
            today_char: Some('*'),
            month_title_style: StyleModifier::default()
                .format(TextFormatModifier::default().bold(true)),
            month_header_style: StyleModifier::default().fg_color(Color::Yellow),
            status_style: StyleModifier::default().invert(true),
        }
    }
}

impl Theme {
    pub fn from_config(config: &Config) -> Self {
        Theme {
            holiday_char: config.theme.holiday_char,
            today_char: config.theme.today_char,
            ..Theme::default()
        }
    }
}

/// State shared by all widgets: the holiday store, the shown month and the
/// last status message.
pub struct Context {
    store: HolidayStore,
    month: MonthIndex,
    today: NaiveDate,
    locale: Locale,
    theme: Theme,
    loading: bool,
    pub last_status_message: Option<String>,
}

impl Context {
    pub fn new(config: &Config, store: HolidayStore) -> Self {
        let today = Local::now().date_naive();
        Context {
            store,
            month: MonthIndex::from(today),
            today,
            locale: config.locale(),
            theme: Theme::from_config(config),
            loading: false,
            last_status_message: None,
        }
    }

    pub fn with_month(mut self, month: MonthIndex) -> Self {
        self.month = month;
        self
    }

    pub fn store(&self) -> &HolidayStore {
        &self.store
    }

    pub fn month(&self) -> MonthIndex {
        self.month
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn grid(&self) -> MonthGrid {
        MonthGrid::new(self.month, &self.store, self.today)
    }

    pub fn change_month(&mut self, delta: i32) {
        self.month.change_month(delta);
    }

    pub fn select_today(&mut self) {
        self.month = MonthIndex::from(self.today);
    }

    /// Refreshes the wall-clock date.
    pub fn update(&mut self) {
        self.today = Local::now().date_naive();
    }

    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    /// Installs a finished ingest. Failures keep the current table and only
    /// show up in the status line.
    pub fn holidays_loaded(&mut self, result: Result<HolidayTable>) -> Result<usize> {
        self.loading = false;
        let outcome = self.store.install(result);
        self.last_status_message = match &outcome {
            Ok(count) => Some(format!("{} holidays", count)),
            Err(err) => Some(err.to_string()),
        };
        outcome
    }
}
