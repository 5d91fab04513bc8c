use serde::Deserialize;
use std::env;

use crate::store::HolidayRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Zh,
    En,
}

/// Fixed UI strings of one locale.
#[derive(Debug)]
pub struct TextBundle {
    pub prev: &'static str,
    pub next: &'static str,
    pub print: &'static str,
    pub today: &'static str,
    pub quit: &'static str,
    pub week_headers: [&'static str; 7],
}

const ZH: TextBundle = TextBundle {
    prev: "< 上個月",
    next: "下個月 >",
    print: "列印 / 存檔",
    today: "今天",
    quit: "離開",
    week_headers: ["日(7)", "一(1)", "二(2)", "三(3)", "四(4)", "五(5)", "六(6)"],
};

const EN: TextBundle = TextBundle {
    prev: "< Prev",
    next: "Next >",
    print: "Print / Save",
    today: "Today",
    quit: "Quit",
    week_headers: [
        "Sun(7)", "Mon(1)", "Tue(2)", "Wed(3)", "Thu(4)", "Fri(5)", "Sat(6)",
    ],
};

const LOCALE_ENV_VARS: &[&str] = &["LC_ALL", "LC_MESSAGES", "LANG"];

impl Locale {
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().to_ascii_lowercase().starts_with("zh") {
            Locale::Zh
        } else {
            Locale::En
        }
    }

    /// Picks the locale from the first non-empty of `LC_ALL`, `LC_MESSAGES`
    /// and `LANG`.
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        LOCALE_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.is_empty())
            .map(|value| Locale::from_tag(&value))
            .unwrap_or(Locale::En)
    }

    pub fn texts(&self) -> &'static TextBundle {
        match self {
            Locale::Zh => &ZH,
            Locale::En => &EN,
        }
    }

    pub fn holiday_name<'a>(&self, record: &'a HolidayRecord) -> &'a str {
        match self {
            Locale::Zh => &record.name_local,
            Locale::En => &record.name_english,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::from_env()
    }
}
