//! Core data types for the dashboard table
//!
//! - `Record`: one (state, date) row with its derived columns
//! - `Table`: date-ordered records, immutable after construction
//! - `LoadReport`: what the cleaning step kept, dropped and nulled

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// One row of the state daily feed
///
/// Count fields are `None` when the feed leaves them blank or the cell is not
/// numeric. Derived fields are filled in by [`crate::data::derive_records`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Record {
    /// Two-letter state or territory code
    pub state: String,
    /// Calendar date the row was checked
    pub date: NaiveDate,
    /// Cumulative positive tests
    pub positive: Option<i64>,
    /// Cumulative test results (positive + negative)
    #[serde(rename = "totalTestResults")]
    pub total_test_results: Option<i64>,
    /// Cumulative deaths
    pub death: Option<i64>,
    /// Cumulative hospitalizations
    pub hospitalized: Option<i64>,
    /// Ordinal day of the year (1-366)
    #[serde(rename = "doy")]
    pub day_of_year: u32,
    /// log10(positive), zero counted as one
    #[serde(rename = "logPos")]
    pub log10_positive: Option<f64>,
    /// Day-over-day fractional increase of positive
    pub perc_increase: Option<f64>,
    /// Mean of the trailing five daily increases
    pub perc_five_increase: Option<f64>,
    /// death / positive
    pub perc_death: Option<f64>,
    /// hospitalized / positive
    pub perc_hosp: Option<f64>,
}

/// Date-ordered collection of records
///
/// Constructed once per load; there are no mutating methods.
#[derive(Debug, Clone, Default)]
pub struct Table {
    records: Vec<Record>,
    latest: Option<NaiveDate>,
    states: Vec<String>,
}

impl Table {
    /// Build a table from records
    ///
    /// Records are stably sorted by date, so rows sharing a date keep the
    /// order they were given in.
    pub fn from_records(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.date);

        let latest = records.last().map(|r| r.date);
        let states: BTreeSet<&str> = records.iter().map(|r| r.state.as_str()).collect();
        let states = states.into_iter().map(str::to_string).collect();

        Self {
            records,
            latest,
            states,
        }
    }

    /// All records, ascending by date
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent date in the table
    pub fn latest(&self) -> Option<NaiveDate> {
        self.latest
    }

    /// Distinct state codes, sorted
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Records for one state, ascending by date
    pub fn for_state<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| r.state == state)
    }

    /// Records on a given date, in feed order
    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &Record> + '_ {
        // Sorted by date: the matching rows form one contiguous run
        let start = self.records.partition_point(|r| r.date < date);
        self.records[start..].iter().take_while(move |r| r.date == date)
    }
}

/// Outcome of the row cleaning step
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct LoadReport {
    /// Data rows read from the CSV body
    pub rows_read: usize,
    /// Rows that made it into the table
    pub rows_kept: usize,
    /// Rows dropped for an unparseable date, blank state or malformed CSV
    pub rows_dropped: usize,
    /// Count cells that were present but not numeric
    pub fields_nulled: usize,
    /// First few problems, with line numbers
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl LoadReport {
    /// Maximum number of warnings retained
    pub const MAX_WARNINGS: usize = 20;

    /// Record a warning, keeping only the first `MAX_WARNINGS`
    pub fn warn(&mut self, message: String) {
        if self.warnings.len() < Self::MAX_WARNINGS {
            self.warnings.push(message);
        }
    }
}

impl std::fmt::Display for LoadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "read={} kept={} dropped={} nulled={}",
            self.rows_read, self.rows_kept, self.rows_dropped, self.fields_nulled
        )
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;

    #[test]
    fn test_table_sorted_and_stable() {
        let table = Table::from_records(vec![
            record("VA", "2020-03-22", Some(5)),
            record("MD", "2020-03-21", Some(1)),
            record("NY", "2020-03-22", Some(9)),
            record("MD", "2020-03-22", Some(2)),
        ]);

        let order: Vec<(&str, u32)> = table
            .records()
            .iter()
            .map(|r| (r.state.as_str(), r.day_of_year))
            .collect();
        assert_eq!(order, vec![("MD", 81), ("VA", 82), ("NY", 82), ("MD", 82)]);
        assert!(table.records().windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_table_latest_and_states() {
        let table = Table::from_records(vec![
            record("VA", "2020-03-22", Some(5)),
            record("MD", "2020-03-21", Some(1)),
        ]);

        assert_eq!(table.latest(), NaiveDate::from_ymd_opt(2020, 3, 22));
        assert_eq!(table.states(), &["MD".to_string(), "VA".to_string()]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::from_records(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.latest(), None);
        assert!(table.states().is_empty());
    }

    #[test]
    fn test_on_date_and_for_state() {
        let table = Table::from_records(vec![
            record("MD", "2020-03-21", Some(1)),
            record("MD", "2020-03-22", Some(2)),
            record("VA", "2020-03-22", Some(5)),
            record("VA", "2020-03-23", Some(6)),
        ]);

        let date = NaiveDate::from_ymd_opt(2020, 3, 22).unwrap();
        let states: Vec<&str> = table.on_date(date).map(|r| r.state.as_str()).collect();
        assert_eq!(states, vec!["MD", "VA"]);

        let va: Vec<Option<i64>> = table.for_state("VA").map(|r| r.positive).collect();
        assert_eq!(va, vec![Some(5), Some(6)]);
    }

    #[test]
    fn test_report_warning_cap() {
        let mut report = LoadReport::default();
        for i in 0..(LoadReport::MAX_WARNINGS + 5) {
            report.warn(format!("line {}", i));
        }
        assert_eq!(report.warnings.len(), LoadReport::MAX_WARNINGS);
    }
}
