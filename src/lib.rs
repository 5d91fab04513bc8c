pub mod calendar;
pub mod config;
pub mod events;
pub mod locale;
pub mod print;
pub mod provider;
pub mod store;
pub mod ui;
