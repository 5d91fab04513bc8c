use chrono::{Datelike, Local, Month, NaiveDate, Weekday};
use num_traits::FromPrimitive;
use std::fmt;
use std::str::FromStr;

use crate::store::{HolidayRecord, HolidayStore};

/// Weekday that is highlighted as the default day off.
pub const REST_DAY: Weekday = Weekday::Sun;

pub const DAYS_PER_WEEK: usize = 7;

pub fn days_of_month(month: &Month, year: i32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month.number_from_month(), 1);
    let next = if month.number_from_month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month.number_from_month() + 1, 1)
    };

    match (first, next) {
        (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
        _ => 0,
    }
}

/// A month of a year. Months are 0-based to match the store's query surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthIndex {
    year: i32,
    month0: u32,
}

impl MonthIndex {
    pub fn new(year: i32, month0: u32) -> Option<Self> {
        if month0 < 12 {
            Some(MonthIndex { year, month0 })
        } else {
            None
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month0(&self) -> u32 {
        self.month0
    }

    pub fn month(&self) -> Month {
        Month::from_u32(self.month0 + 1).unwrap_or(Month::January)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1)
    }

    pub fn num_days(&self) -> u32 {
        days_of_month(&self.month(), self.year)
    }

    /// Moves by `delta` months, carrying into the year in both directions.
    pub fn change_month(&mut self, delta: i32) {
        let total = self.year as i64 * 12 + self.month0 as i64 + delta as i64;
        self.year = total.div_euclid(12) as i32;
        self.month0 = total.rem_euclid(12) as u32;
    }

    pub fn next(self) -> Self {
        let mut next = self;
        next.change_month(1);
        next
    }

    pub fn prev(self) -> Self {
        let mut prev = self;
        prev.change_month(-1);
        prev
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month0
    }
}

impl Default for MonthIndex {
    fn default() -> Self {
        MonthIndex::from(Local::now().date_naive())
    }
}

impl<T: Datelike> From<T> for MonthIndex {
    fn from(d: T) -> Self {
        MonthIndex {
            year: d.year(),
            month0: d.month0(),
        }
    }
}

/// `MM - YYYY`
impl fmt::Display for MonthIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02} - {}", self.month0 + 1, self.year)
    }
}

/// Parses `YYYY-MM` with a 1-based month.
impl FromStr for MonthIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("'{}' is not a month, expected YYYY-MM", s);
        let (year, month) = s.trim().rsplit_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;

        match month {
            1..=12 => MonthIndex::new(year, month - 1).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCell {
    /// `None` for padding cells outside the month.
    pub day: Option<u32>,
    /// 0 = Sunday
    pub weekday: u32,
    pub holiday: Option<HolidayRecord>,
    pub is_today: bool,
    pub is_rest_day: bool,
}

impl CalendarCell {
    fn padding(weekday: u32) -> Self {
        CalendarCell {
            day: None,
            weekday,
            holiday: None,
            is_today: false,
            is_rest_day: false,
        }
    }

    pub fn is_padding(&self) -> bool {
        self.day.is_none()
    }

    pub fn is_holiday(&self) -> bool {
        self.holiday.is_some()
    }
}

/// Sunday-first grid of one month, padded to full weeks.
#[derive(Debug, Clone)]
pub struct MonthGrid {
    month: MonthIndex,
    cells: Vec<CalendarCell>,
}

impl MonthGrid {
    pub fn new(month: MonthIndex, store: &HolidayStore, today: NaiveDate) -> Self {
        let offset = month
            .first_day()
            .map(|d| d.weekday().num_days_from_sunday())
            .unwrap_or(0);
        let num_days = month.num_days();
        let holidays = store.lookup_month(month.year(), month.month0());

        let mut cells: Vec<CalendarCell> = (0..offset).map(CalendarCell::padding).collect();

        for day in 1..=num_days {
            let weekday = (offset + day - 1) % DAYS_PER_WEEK as u32;
            cells.push(CalendarCell {
                day: Some(day),
                weekday,
                holiday: holidays.get(&day).map(|&record| record.clone()),
                is_today: month.contains(&today) && today.day() == day,
                is_rest_day: weekday == REST_DAY.num_days_from_sunday(),
            });
        }

        while cells.len() % DAYS_PER_WEEK != 0 {
            let weekday = (cells.len() % DAYS_PER_WEEK) as u32;
            cells.push(CalendarCell::padding(weekday));
        }

        MonthGrid { month, cells }
    }

    pub fn month(&self) -> MonthIndex {
        self.month
    }

    pub fn cells(&self) -> &[CalendarCell] {
        &self.cells
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(DAYS_PER_WEEK)
    }

    pub fn holidays(&self) -> impl Iterator<Item = &HolidayRecord> {
        self.cells.iter().filter_map(|cell| cell.holiday.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::FeedSource;
    use std::path::PathBuf;
    use std::time::Duration;

    fn store() -> HolidayStore {
        let testdata = |name: &str| {
            FeedSource::File(
                [env!("CARGO_MANIFEST_DIR"), "testdata", name]
                    .iter()
                    .collect::<PathBuf>(),
            )
        };
        let mut store = HolidayStore::new();
        store
            .ingest(
                &testdata("holidays-en.json"),
                &testdata("holidays-zh.json"),
                Duration::from_secs(1),
            )
            .unwrap();
        store
    }

    fn month(year: i32, month0: u32) -> MonthIndex {
        MonthIndex::new(year, month0).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_of_month(&Month::February, 2024), 29);
        assert_eq!(days_of_month(&Month::February, 2025), 28);
        assert_eq!(days_of_month(&Month::December, 2025), 31);
        assert_eq!(days_of_month(&Month::April, 2025), 30);
    }

    #[test]
    fn change_month_wraps_years() {
        let mut m = month(2025, 11);
        m.change_month(1);
        assert_eq!(m, month(2026, 0));
        m.change_month(-1);
        assert_eq!(m, month(2025, 11));

        let mut m = month(2025, 0);
        m.change_month(-1);
        assert_eq!(m, month(2024, 11));

        let mut m = month(2025, 5);
        m.change_month(-30);
        assert_eq!(m, month(2022, 11));
        m.change_month(25);
        assert_eq!(m, month(2025, 0));
    }

    #[test]
    fn display_and_parse() {
        assert_eq!(month(2025, 0).to_string(), "01 - 2025");
        assert_eq!("2025-04".parse::<MonthIndex>().unwrap(), month(2025, 3));
        assert!("2025-13".parse::<MonthIndex>().is_err());
        assert!("2025-00".parse::<MonthIndex>().is_err());
        assert!("april".parse::<MonthIndex>().is_err());
    }

    #[test]
    fn grid_is_padded_to_full_weeks() {
        let store = HolidayStore::new();
        for m0 in 0..12 {
            let grid = MonthGrid::new(month(2025, m0), &store, date(2025, 1, 1));
            assert_eq!(grid.cells().len() % DAYS_PER_WEEK, 0);
            let days = grid.cells().iter().filter(|c| !c.is_padding()).count() as u32;
            assert_eq!(days, month(2025, m0).num_days());
        }
    }

    #[test]
    fn first_day_lands_on_its_weekday() {
        // 2025-02-01 is a Saturday
        let grid = MonthGrid::new(month(2025, 1), &HolidayStore::new(), date(2025, 1, 1));
        let cells = grid.cells();
        assert!(cells[..6].iter().all(CalendarCell::is_padding));
        assert_eq!(cells[6].day, Some(1));
        assert_eq!(cells[6].weekday, 6);
        assert!(cells[7].is_rest_day);
        assert_eq!(cells[7].day, Some(2));
        assert_eq!(cells.len(), 35);
    }

    #[test]
    fn marks_today_only_in_its_month() {
        let store = HolidayStore::new();
        let today = date(2025, 4, 18);

        let grid = MonthGrid::new(month(2025, 3), &store, today);
        let marked: Vec<_> = grid.cells().iter().filter(|c| c.is_today).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].day, Some(18));

        let grid = MonthGrid::new(month(2024, 3), &store, today);
        assert!(grid.cells().iter().all(|c| !c.is_today));
    }

    #[test]
    fn holidays_are_attached_to_their_day() {
        let grid = MonthGrid::new(month(2025, 3), &store(), date(2025, 1, 1));

        let days: Vec<_> = grid
            .cells()
            .iter()
            .filter(|c| c.is_holiday())
            .filter_map(|c| c.day)
            .collect();
        assert_eq!(days, vec![4, 18, 19, 21]);

        let names: Vec<_> = grid.holidays().map(|h| h.name_local.as_str()).collect();
        assert_eq!(names[0], "清明節");
    }

    #[test]
    fn empty_store_renders_plain_month() {
        let grid = MonthGrid::new(month(2025, 3), &HolidayStore::new(), date(2025, 1, 1));
        assert_eq!(grid.holidays().count(), 0);
        assert_eq!(grid.weeks().count(), 5);
    }
}
