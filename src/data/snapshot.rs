//! Latest-day snapshot
//!
//! The slice of the table the choropleth is drawn from.

use chrono::NaiveDate;
use serde::Serialize;

use super::types::Table;

/// Positive count of one state on the snapshot date
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SnapshotEntry {
    pub state: String,
    pub positive: i64,
}

/// Records on the table's most recent date, projected to {state, positive}
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Snapshot {
    /// Most recent date in the table; `None` for an empty table
    pub as_of: Option<NaiveDate>,
    /// One entry per record on `as_of` with a known positive count
    pub entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extract the latest-day snapshot from a table
///
/// Rows with a missing positive count are dropped; row order follows the table.
pub fn snapshot(table: &Table) -> Snapshot {
    let Some(as_of) = table.latest() else {
        return Snapshot::default();
    };

    let entries = table
        .on_date(as_of)
        .filter_map(|r| {
            r.positive.map(|positive| SnapshotEntry {
                state: r.state.clone(),
                positive,
            })
        })
        .collect();

    Snapshot {
        as_of: Some(as_of),
        entries,
    }
}
