//! Feed loader
//!
//! Parses the CSV text and applies the row cleaning policy:
//!
//! - a row whose `dateChecked` cannot be parsed, or whose `state` is blank,
//!   is **dropped**
//! - a count cell that is present but not numeric is **nulled** for that
//!   row only
//! - a blank count cell is simply missing
//!
//! Neither case aborts the load. Only a missing required column does.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::derive::{derive_records, RawRecord};
use super::error::{LoadError, LoadResult};
use super::source::FeedSource;
use super::types::{LoadReport, Table};

/// Columns the table cannot be built without
pub const REQUIRED_COLUMNS: [&str; 4] = ["dateChecked", "state", "positive", "totalTestResults"];

/// Fetch and parse a feed
///
/// Fails with [`LoadError::Fetch`] when the source is unreachable and with
/// [`LoadError::Parse`] when required columns are absent.
pub async fn load(source: &dyn FeedSource) -> LoadResult<(Table, LoadReport)> {
    let origin = source.describe();
    tracing::info!(source = %origin, "Fetching feed");

    let text = source.fetch().await?;
    tracing::debug!(source = %origin, bytes = text.len(), "Feed fetched");

    let (table, report) = parse_feed(&text)?;

    tracing::info!(
        source = %origin,
        records = table.len(),
        states = table.states().len(),
        latest = ?table.latest(),
        dropped = report.rows_dropped,
        nulled = report.fields_nulled,
        "Feed loaded"
    );
    for warning in &report.warnings {
        tracing::debug!(warning = %warning, "Feed row cleaned");
    }

    Ok((table, report))
}

/// Column positions resolved from the header row
struct Columns {
    date: usize,
    state: usize,
    positive: usize,
    total_test_results: usize,
    death: Option<usize>,
    hospitalized: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> LoadResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| find(**name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::Parse { missing });
        }

        // Checked above
        let required = |name: &str| find(name).unwrap_or_default();

        Ok(Self {
            date: required("dateChecked"),
            state: required("state"),
            positive: required("positive"),
            total_test_results: required("totalTestResults"),
            death: find("death"),
            hospitalized: find("hospitalized"),
        })
    }
}

/// Parse feed CSV text into a table
pub fn parse_feed(text: &str) -> LoadResult<(Table, LoadReport)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| LoadError::fetch("feed body", format!("not valid CSV: {}", e)))?
        .clone();
    let columns = Columns::resolve(&headers)?;

    let mut report = LoadReport::default();
    let mut rows = Vec::new();

    for (index, result) in reader.records().enumerate() {
        // Header is line 1
        let line = index + 2;
        report.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                report.rows_dropped += 1;
                report.warn(format!("Line {}: {}", line, e));
                continue;
            }
        };

        match clean_row(&record, &columns, line, &mut report) {
            Some(row) => rows.push(row),
            None => report.rows_dropped += 1,
        }
    }

    report.rows_kept = rows.len();
    let table = Table::from_records(derive_records(rows));

    Ok((table, report))
}

/// Apply the cleaning policy to one CSV row
fn clean_row(
    record: &csv::StringRecord,
    columns: &Columns,
    line: usize,
    report: &mut LoadReport,
) -> Option<RawRecord> {
    let state = record.get(columns.state).unwrap_or_default();
    if state.is_empty() {
        report.warn(format!("Line {}: blank state", line));
        return None;
    }

    let raw_date = record.get(columns.date).unwrap_or_default();
    let date = match parse_date(raw_date) {
        Some(d) => d,
        None => {
            report.warn(format!("Line {}: unparseable dateChecked {:?}", line, raw_date));
            return None;
        }
    };

    let mut count = |column: Option<usize>, name: &str| -> Option<i64> {
        let raw = column.and_then(|c| record.get(c)).unwrap_or_default();
        match parse_count(raw) {
            Ok(value) => value,
            Err(()) => {
                report.fields_nulled += 1;
                report.warn(format!("Line {}: non-numeric {} {:?}", line, name, raw));
                None
            }
        }
    };

    Some(RawRecord {
        state: state.to_uppercase(),
        date,
        positive: count(Some(columns.positive), "positive"),
        total_test_results: count(Some(columns.total_test_results), "totalTestResults"),
        death: count(columns.death, "death"),
        hospitalized: count(columns.hospitalized, "hospitalized"),
    })
}

/// Parse a count cell
///
/// Blank is `Ok(None)`. Whole-valued floats such as `"12.0"` are accepted;
/// floats outside the `i64` range are rejected.
fn parse_count(raw: &str) -> Result<Option<i64>, ()> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(Some(value));
    }
    match raw.parse::<f64>() {
        Ok(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
        {
            Ok(Some(value as i64))
        }
        _ => Err(()),
    }
}

/// Parse a `dateChecked` cell into a calendar date
///
/// Timestamps with an offset are converted to UTC before the date is taken.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }

    None
}
