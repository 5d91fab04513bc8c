//! Typed view of the 1823 iCal-JSON holiday feeds.
//!
//! A feed looks like
//! `{ "vcalendar": [ { "vevent": [ { "dtstart": ["20250101", {..}], "summary": ".." } ] } ] }`.
//! Every nesting level is optional: a missing or mistyped level reads as an
//! empty event list, a mistyped event is skipped on its own.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

use super::Result;

const DATE_TOKEN_LEN: usize = 8;

/// Deserializes `T` and falls back to `T::default()` when the value has the
/// wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedDocument {
    #[serde(default, alias = "calendarContainer", deserialize_with = "lenient")]
    vcalendar: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedCalendar {
    #[serde(default, alias = "eventList", deserialize_with = "lenient")]
    vevent: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedEvent {
    #[serde(default, alias = "startDate", deserialize_with = "lenient")]
    dtstart: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    summary: Option<String>,
}

impl FeedDocument {
    /// Events of the first calendar in the document. Later calendars are
    /// never looked at, and entries that are not objects are dropped.
    pub fn events(&self) -> impl Iterator<Item = FeedEvent> + '_ {
        let calendar = self
            .vcalendar
            .first()
            .and_then(|raw| FeedCalendar::deserialize(raw).ok())
            .unwrap_or_default();

        calendar
            .vevent
            .into_iter()
            .filter_map(|raw| FeedEvent::deserialize(&raw).ok())
    }
}

impl FromStr for FeedDocument {
    type Err = super::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl FeedEvent {
    pub fn date(&self) -> Option<NaiveDate> {
        self.dtstart.first().and_then(parse_date_token)
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
}

/// Parses a `YYYYMMDD` start date token. Anything but a string of exactly
/// eight ASCII digits naming a real date is rejected.
pub fn parse_date_token(token: &Value) -> Option<NaiveDate> {
    let raw = token.as_str()?;
    if raw.len() != DATE_TOKEN_LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = raw[0..4].parse().ok()?;
    let month = raw[4..6].parse().ok()?;
    let day = raw[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
