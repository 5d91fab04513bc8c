mod app;
mod calendar_window;
mod context;

pub use app::App;
pub use calendar_window::{HolidayList, MonthPane};
pub use context::{Context, Theme};
