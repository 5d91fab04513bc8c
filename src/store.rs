use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::provider::{self, FeedDocument, FeedSource, Result};

/// Holiday metadata of one calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayRecord {
    pub date: NaiveDate,
    pub name_local: String,
    pub name_english: String,
}

impl HolidayRecord {
    /// The `YYYY-MM-DD` key of this record.
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayTable {
    records: BTreeMap<NaiveDate, HolidayRecord>,
}

impl HolidayTable {
    /// Merges an English and a local-language feed. The English feed decides
    /// which dates exist; the local feed only contributes names. An empty local
    /// name counts as missing.
    pub fn merge(english: &FeedDocument, local: &FeedDocument) -> Self {
        let local_names: HashMap<NaiveDate, String> = local
            .events()
            .filter_map(|event| {
                let name = event.summary().filter(|name| !name.is_empty())?;
                Some((event.date()?, name.to_owned()))
            })
            .collect();

        let mut skipped = 0usize;
        let mut records = BTreeMap::new();

        for event in english.events() {
            let (date, name_english) = match (event.date(), event.summary()) {
                (Some(date), Some(summary)) => (date, summary.to_owned()),
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            let name_local = local_names
                .get(&date)
                .cloned()
                .unwrap_or_else(|| name_english.clone());

            records.insert(
                date,
                HolidayRecord {
                    date,
                    name_local,
                    name_english,
                },
            );
        }

        if skipped > 0 {
            log::warn!("Skipped {} holiday events without a usable date or name", skipped);
        }

        HolidayTable { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, date: &NaiveDate) -> Option<&HolidayRecord> {
        self.records.get(date)
    }

    pub fn get_by_key(&self, key: &str) -> Option<&HolidayRecord> {
        NaiveDate::parse_from_str(key, "%Y-%m-%d")
            .ok()
            .and_then(|date| self.records.get(&date))
    }

    pub fn iter(&self) -> impl Iterator<Item = &HolidayRecord> {
        self.records.values()
    }

    pub fn of_month(&self, year: i32, month: u32) -> BTreeMap<u32, &HolidayRecord> {
        let begin = match NaiveDate::from_ymd_opt(year, month, 1) {
            Some(date) => date,
            None => return BTreeMap::new(),
        };

        self.records
            .range(begin..)
            .take_while(|(date, _)| date.year() == year && date.month() == month)
            .map(|(date, record)| (date.day(), record))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreState {
    Empty,
    Populated(HolidayTable),
}

impl Default for StoreState {
    fn default() -> Self {
        StoreState::Empty
    }
}

/// Owns the holiday table. Starts out empty and is replaced wholesale by
/// every successful ingest; a failed ingest never touches it.
#[derive(Debug, Clone, Default)]
pub struct HolidayStore {
    state: StoreState,
}

impl HolidayStore {
    pub fn new() -> Self {
        HolidayStore::default()
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn is_populated(&self) -> bool {
        matches!(self.state, StoreState::Populated(_))
    }

    pub fn table(&self) -> Option<&HolidayTable> {
        match &self.state {
            StoreState::Populated(table) => Some(table),
            StoreState::Empty => None,
        }
    }

    /// Applies the result of a finished ingest and returns the number of
    /// installed records.
    pub fn install(&mut self, result: Result<HolidayTable>) -> Result<usize> {
        match result {
            Ok(table) => {
                let count = table.len();
                self.state = StoreState::Populated(table);
                log::info!("Loaded {} holidays", count);
                Ok(count)
            }
            Err(err) => {
                log::warn!("Could not load holidays: {}", err);
                Err(err)
            }
        }
    }

    /// Fetches both feeds, merges them and installs the new table.
    pub fn ingest(
        &mut self,
        english: &FeedSource,
        local: &FeedSource,
        timeout: Duration,
    ) -> Result<usize> {
        self.install(load_table(english, local, timeout))
    }

    /// Holiday on the given date. `month0` is 0-based.
    pub fn lookup(&self, year: i32, month0: u32, day: u32) -> Option<&HolidayRecord> {
        let date = NaiveDate::from_ymd_opt(year, month0.checked_add(1)?, day)?;
        self.table()?.get(&date)
    }

    /// Holidays of the given month keyed by day of month. `month0` is 0-based.
    pub fn lookup_month(&self, year: i32, month0: u32) -> BTreeMap<u32, &HolidayRecord> {
        match (self.table(), month0.checked_add(1)) {
            (Some(table), Some(month)) => table.of_month(year, month),
            _ => BTreeMap::new(),
        }
    }
}

/// Fetches and merges without touching any store. Runs on worker threads.
pub fn load_table(
    english: &FeedSource,
    local: &FeedSource,
    timeout: Duration,
) -> Result<HolidayTable> {
    let (english, local) = provider::fetch_feeds(english, local, timeout)?;
    Ok(HolidayTable::merge(&english, &local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn doc(raw: &str) -> FeedDocument {
        raw.parse().unwrap()
    }

    fn testdata(name: &str) -> FeedSource {
        let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "testdata", name]
            .iter()
            .collect();
        FeedSource::File(path)
    }

    fn populated() -> HolidayStore {
        let mut store = HolidayStore::new();
        store
            .ingest(
                &testdata("holidays-en.json"),
                &testdata("holidays-zh.json"),
                TIMEOUT,
            )
            .unwrap();
        store
    }

    #[test]
    fn english_name_is_local_fallback() {
        let table = HolidayTable::merge(
            &doc(r#"{"vcalendar":[{"vevent":[{"dtstart":["20250101"],"summary":"The first day of January"}]}]}"#),
            &doc(r#"{"vcalendar":[{"vevent":[]}]}"#),
        );

        let record = table.get_by_key("2025-01-01").unwrap();
        assert_eq!(record.key(), "2025-01-01");
        assert_eq!(record.name_english, "The first day of January");
        assert_eq!(record.name_local, "The first day of January");
    }

    #[test]
    fn empty_local_name_falls_back_to_english() {
        let table = HolidayTable::merge(
            &doc(r#"{"vcalendar":[{"vevent":[{"dtstart":["20250201"],"summary":"Spring Festival"}]}]}"#),
            &doc(r#"{"vcalendar":[{"vevent":[{"dtstart":["20250201"],"summary":""}]}]}"#),
        );

        let record = table.get_by_key("2025-02-01").unwrap();
        assert_eq!(record.name_local, "Spring Festival");
        assert_eq!(record.name_english, "Spring Festival");
    }

    #[test]
    fn local_name_is_taken_from_local_feed() {
        let table = HolidayTable::merge(
            &doc(r#"{"vcalendar":[{"vevent":[{"dtstart":["20250201"],"summary":"Spring Festival"}]}]}"#),
            &doc(r#"{"vcalendar":[{"vevent":[{"dtstart":["20250201"],"summary":"春節"}]}]}"#),
        );

        let record = table.get_by_key("2025-02-01").unwrap();
        assert_eq!(record.name_english, "Spring Festival");
        assert_eq!(record.name_local, "春節");
    }

    #[test]
    fn malformed_token_skips_only_that_event() {
        let table = HolidayTable::merge(
            &doc(
                r#"{"vcalendar":[{"vevent":[
                    {"dtstart":["2025-02-01"],"summary":"Dashed"},
                    {"dtstart":["20250405"],"summary":"Ching Ming Festival"}
                ]}]}"#,
            ),
            &doc("{}"),
        );

        assert_eq!(table.len(), 1);
        assert!(table.get_by_key("2025-02-01").is_none());
        assert!(table.get_by_key("2025-04-05").is_some());
    }

    #[test]
    fn local_only_dates_are_dropped() {
        let table = HolidayTable::merge(
            &doc(r#"{"vcalendar":[{"vevent":[{"dtstart":["20251225"],"summary":"Christmas Day"}]}]}"#),
            &doc(
                r#"{"vcalendar":[{"vevent":[
                    {"dtstart":["20251225"],"summary":"聖誕節"},
                    {"dtstart":["20251226"],"summary":"聖誕節後第一個周日"}
                ]}]}"#,
            ),
        );

        assert_eq!(table.len(), 1);
        assert!(table.get_by_key("2025-12-26").is_none());
    }

    #[test]
    fn every_key_comes_from_english_feed() {
        let english_dates: Vec<NaiveDate> = testdata("holidays-en.json")
            .load(TIMEOUT)
            .unwrap()
            .events()
            .filter_map(|e| e.date())
            .collect();

        let store = populated();
        let table = store.table().unwrap();
        assert!(!table.is_empty());
        for record in table.iter() {
            assert!(english_dates.contains(&record.date), "{}", record.key());
        }
    }

    #[test]
    fn lookup_uses_zero_based_month() {
        let store = populated();

        let record = store.lookup(2025, 0, 1).unwrap();
        assert_eq!(record.name_local, "一月一日");
        assert!(store.lookup(2025, 1, 1).is_none());
    }

    #[test]
    fn lookup_matches_key_format() {
        let store = populated();
        let table = store.table().unwrap();

        for (year, month0, day) in &[(2025, 0, 1), (2025, 3, 4), (2025, 11, 25), (2025, 6, 2)] {
            let key = format!("{}-{:02}-{:02}", year, month0 + 1, day);
            assert_eq!(store.lookup(*year, *month0, *day), table.get_by_key(&key));
        }
    }

    #[test]
    fn lookup_out_of_range_is_absent() {
        let store = populated();
        assert!(store.lookup(2025, 12, 1).is_none());
        assert!(store.lookup(2025, 1, 30).is_none());
        assert!(store.lookup(2025, 0, 0).is_none());
        assert!(store.lookup(2025, u32::MAX, 1).is_none());
        assert!(store.lookup_month(2025, 12).is_empty());
        assert!(store.lookup_month(2025, u32::MAX).is_empty());
    }

    #[test]
    fn lookup_month_is_month_subset() {
        let store = populated();
        let table = store.table().unwrap();

        let april = store.lookup_month(2025, 3);
        let expected: Vec<_> = table
            .iter()
            .filter(|r| r.key().starts_with("2025-04"))
            .collect();

        assert_eq!(april.len(), expected.len());
        for record in expected {
            assert_eq!(april.get(&record.date.day()), Some(&record));
        }
    }

    #[test]
    fn queries_are_repeatable() {
        let store = populated();
        assert_eq!(store.lookup_month(2025, 3), store.lookup_month(2025, 3));
        assert_eq!(store.lookup(2025, 0, 1), store.lookup(2025, 0, 1));
    }

    #[test]
    fn failed_ingest_leaves_store_empty() {
        let mut store = HolidayStore::new();
        let res = store.ingest(
            &testdata("does-not-exist-en.json"),
            &testdata("does-not-exist-zh.json"),
            TIMEOUT,
        );

        assert!(res.is_err());
        assert_eq!(store.state(), &StoreState::Empty);
        assert!(store.lookup(2025, 0, 1).is_none());
    }

    #[test]
    fn failed_refresh_keeps_previous_table() {
        let mut store = populated();
        let before = store.table().cloned();

        assert!(store
            .ingest(
                &testdata("holidays-en.json"),
                &testdata("malformed.json"),
                TIMEOUT
            )
            .is_err());
        assert_eq!(store.table().cloned(), before);
    }

    #[test]
    fn successful_refresh_replaces_table() {
        let mut store = populated();
        let count = store
            .ingest(
                &testdata("holidays-en.json"),
                &testdata("empty.json"),
                TIMEOUT,
            )
            .unwrap();

        assert_eq!(store.table().unwrap().len(), count);
        let record = store.lookup(2025, 0, 1).unwrap();
        assert_eq!(record.name_local, record.name_english);
    }
}
