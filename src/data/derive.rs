//! Derived columns
//!
//! Turns cleaned feed rows into table records. Per-state columns (the
//! percent increases) are computed over each state's observations in date
//! order, so rows are sorted before anything is derived.

use chrono::{Datelike, NaiveDate};
use std::collections::{HashMap, VecDeque};

use super::types::Record;

/// Number of daily increases averaged by `perc_five_increase`
pub const ROLLING_WINDOW: usize = 5;

/// A cleaned feed row before derivation
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub state: String,
    pub date: NaiveDate,
    pub positive: Option<i64>,
    pub total_test_results: Option<i64>,
    pub death: Option<i64>,
    pub hospitalized: Option<i64>,
}

/// log10 of a positive count with zero treated as one
///
/// Zero and one both map to 0.0. Negative counts (feed corrections) have no
/// logarithm and yield `None`.
pub fn log10_positive(positive: i64) -> Option<f64> {
    if positive < 0 {
        return None;
    }
    Some((positive.max(1) as f64).log10())
}

/// Fractional change from `previous` to `current`
///
/// `None` when either value is missing or the previous count is zero.
pub fn percent_increase(previous: Option<i64>, current: Option<i64>) -> Option<f64> {
    match (previous, current) {
        (Some(prev), Some(cur)) if prev != 0 => Some((cur as f64 - prev as f64) / prev as f64),
        _ => None,
    }
}

/// numerator / denominator, `None` when either is missing or the denominator is zero
fn ratio(numerator: Option<i64>, denominator: Option<i64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0 => Some(n as f64 / d as f64),
        _ => None,
    }
}

/// Running per-state state while walking the sorted rows
#[derive(Default)]
struct StateHistory {
    /// Positive count of the previous observation; outer `None` before the first one
    previous: Option<Option<i64>>,
    /// Trailing daily increases, newest last
    window: VecDeque<Option<f64>>,
}

impl StateHistory {
    /// Advance by one observation, returning (daily, rolling) increases
    fn observe(&mut self, positive: Option<i64>) -> (Option<f64>, Option<f64>) {
        let daily = match self.previous {
            Some(previous) => percent_increase(previous, positive),
            None => None,
        };
        self.previous = Some(positive);

        self.window.push_back(daily);
        if self.window.len() > ROLLING_WINDOW {
            self.window.pop_front();
        }

        let rolling = if self.window.len() == ROLLING_WINDOW {
            self.window
                .iter()
                .copied()
                .sum::<Option<f64>>()
                .map(|total| total / ROLLING_WINDOW as f64)
        } else {
            None
        };

        (daily, rolling)
    }
}

/// Sort rows by date and compute every derived column
///
/// The sort is stable: rows sharing a date keep feed order, which also
/// decides which of two same-day rows for a state counts as "previous".
pub fn derive_records(mut rows: Vec<RawRecord>) -> Vec<Record> {
    rows.sort_by_key(|r| r.date);

    let mut history: HashMap<String, StateHistory> = HashMap::new();

    rows.into_iter()
        .map(|raw| {
            let (perc_increase, perc_five_increase) = history
                .entry(raw.state.clone())
                .or_default()
                .observe(raw.positive);

            Record {
                day_of_year: raw.date.ordinal(),
                log10_positive: raw.positive.and_then(log10_positive),
                perc_increase,
                perc_five_increase,
                perc_death: ratio(raw.death, raw.positive),
                perc_hosp: ratio(raw.hospitalized, raw.positive),
                state: raw.state,
                date: raw.date,
                positive: raw.positive,
                total_test_results: raw.total_test_results,
                death: raw.death,
                hospitalized: raw.hospitalized,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(state: &str, day: u32, positive: Option<i64>) -> RawRecord {
        RawRecord {
            state: state.to_string(),
            date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
            positive,
            total_test_results: None,
            death: None,
            hospitalized: None,
        }
    }

    fn close(a: Option<f64>, b: f64) -> bool {
        a.map(|a| (a - b).abs() < 1e-9).unwrap_or(false)
    }

    #[test]
    fn test_log10_zero_substitution() {
        assert_eq!(log10_positive(0), Some(0.0));
        assert_eq!(log10_positive(1), Some(0.0));
        assert_eq!(log10_positive(100), Some(2.0));
        assert_eq!(log10_positive(-3), None);
    }

    #[test]
    fn test_percent_increase() {
        assert!(close(percent_increase(Some(10), Some(15)), 0.5));
        assert_eq!(percent_increase(Some(0), Some(15)), None);
        assert_eq!(percent_increase(None, Some(15)), None);
        assert_eq!(percent_increase(Some(10), None), None);
    }

    #[test]
    fn test_percent_increase_extreme_counts() {
        let increase = percent_increase(Some(-5), Some(i64::MAX)).unwrap();
        assert!(increase.is_finite());
        assert!(increase < 0.0);

        let records = derive_records(vec![raw("MD", 20, Some(-5)), raw("MD", 21, Some(i64::MAX))]);
        assert_eq!(records[0].log10_positive, None);
        assert!(records[1].perc_increase.is_some());
    }

    #[test]
    fn test_daily_increase_per_state() {
        let records = derive_records(vec![
            raw("MD", 20, Some(10)),
            raw("VA", 20, Some(4)),
            raw("MD", 21, Some(20)),
            raw("VA", 21, Some(5)),
        ]);

        let md: Vec<_> = records.iter().filter(|r| r.state == "MD").collect();
        assert_eq!(md[0].perc_increase, None);
        assert!(close(md[1].perc_increase, 1.0));

        let va: Vec<_> = records.iter().filter(|r| r.state == "VA").collect();
        assert_eq!(va[0].perc_increase, None);
        assert!(close(va[1].perc_increase, 0.25));
    }

    #[test]
    fn test_daily_increase_undefined_after_zero() {
        let records = derive_records(vec![raw("MD", 20, Some(0)), raw("MD", 21, Some(3))]);
        assert_eq!(records[1].perc_increase, None);
    }

    #[test]
    fn test_derivation_follows_date_order_not_feed_order() {
        let records = derive_records(vec![raw("MD", 21, Some(20)), raw("MD", 20, Some(10))]);
        assert_eq!(records[0].positive, Some(10));
        assert_eq!(records[0].perc_increase, None);
        assert!(close(records[1].perc_increase, 1.0));
    }

    #[test]
    fn test_rolling_increase_needs_five_daily_values() {
        // Positive doubles every day: every daily increase is 1.0
        let rows: Vec<RawRecord> = (0..7)
            .map(|i| raw("MD", 10 + i, Some(1_i64 << i)))
            .collect();
        let records = derive_records(rows);

        // Observation 1 has no daily value, so the first full window ends at observation 6
        for record in &records[..5] {
            assert_eq!(record.perc_five_increase, None);
        }
        assert!(close(records[5].perc_five_increase, 1.0));
        assert!(close(records[6].perc_five_increase, 1.0));
    }

    #[test]
    fn test_rolling_increase_mean() {
        let positives = [100, 110, 121, 242, 242, 484];
        let rows = positives
            .iter()
            .enumerate()
            .map(|(i, p)| raw("VA", 1 + i as u32, Some(*p)))
            .collect();
        let records = derive_records(rows);

        // Daily: 0.1, 0.1, 1.0, 0.0, 1.0
        assert!(close(records[5].perc_five_increase, 2.2 / 5.0));
    }

    #[test]
    fn test_ratios_and_day_of_year() {
        let mut row = raw("NY", 21, Some(200));
        row.death = Some(4);
        row.hospitalized = Some(50);
        let records = derive_records(vec![row, raw("NJ", 21, Some(0))]);

        assert!(close(records[0].perc_death, 0.02));
        assert!(close(records[0].perc_hosp, 0.25));
        assert_eq!(records[0].day_of_year, 81);
        assert_eq!(records[1].perc_death, None);
        assert_eq!(records[1].log10_positive, Some(0.0));
    }

    #[test]
    fn test_missing_positive_has_no_log() {
        let records = derive_records(vec![raw("GU", 21, None)]);
        assert_eq!(records[0].log10_positive, None);
    }
}
