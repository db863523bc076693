//! COVID Tracking Data Layer
//!
//! Loads the state daily CSV feed into an immutable in-memory table:
//!
//! - **source**: Where the CSV text comes from (HTTP, file, in-memory)
//! - **loader**: CSV parsing and the row cleaning policy
//! - **derive**: Computed columns (day of year, log10, percent increases)
//! - **snapshot**: Latest-day slice used by the choropleth
//! - **types**: `Record`, `Table` and `LoadReport`
//! - **error**: Error types
//!
//! # Pipeline
//!
//! ```text
//!   FeedSource::fetch → parse_feed (clean rows) → derive (sort + columns) → Table
//!                                                                      └→ snapshot
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use covid_dash::data::{load, snapshot, StaticFeed};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let feed = StaticFeed::new("dateChecked,state,positive,totalTestResults\n\
//!                                 2020-03-20T20:00:00Z,MD,10,100\n");
//!     let (table, report) = load(&feed).await?;
//!     let latest = snapshot(&table);
//!
//!     println!("{} rows kept, {} states on {:?}", report.rows_kept, latest.entries.len(), latest.as_of);
//!     Ok(())
//! }
//! ```

pub mod derive;
pub mod error;
pub mod loader;
pub mod snapshot;
pub mod source;
pub mod types;

pub use derive::{derive_records, log10_positive, percent_increase, RawRecord, ROLLING_WINDOW};
pub use error::{LoadError, LoadResult};
pub use loader::{load, parse_feed, REQUIRED_COLUMNS};
pub use snapshot::{snapshot, Snapshot, SnapshotEntry};
pub use source::{FeedSource, FileFeed, HttpFeed, StaticFeed};
pub use types::{LoadReport, Record, Table};
