//! Application context
//!
//! Everything derived from the feed lives here. It is built once before the
//! server accepts connections and is shared behind an `Arc`; there are no
//! mutating methods, so sessions read it without locking.

use chrono::{DateTime, Utc};

use super::controls::ControlValues;
use crate::chart::{build_choropleth, line::normalize_states, ChartSpec};
use crate::config::DashboardConfig;
use crate::data::{self, FeedSource, LoadReport, LoadResult, Snapshot, Table};

/// Immutable process-wide dashboard data
#[derive(Debug)]
pub struct AppContext {
    table: Table,
    snapshot: Snapshot,
    map_chart: ChartSpec,
    report: LoadReport,
    feed: String,
    loaded_at: DateTime<Utc>,
    title: String,
    defaults: ControlValues,
}

impl AppContext {
    /// Build a context from an already loaded table
    ///
    /// Takes the snapshot and builds the map chart; neither is recomputed later.
    pub fn new(
        table: Table,
        report: LoadReport,
        feed: impl Into<String>,
        dashboard: &DashboardConfig,
    ) -> Self {
        let snapshot = data::snapshot(&table);
        let map_chart = build_choropleth(&snapshot);

        Self {
            table,
            snapshot,
            map_chart,
            report,
            feed: feed.into(),
            loaded_at: Utc::now(),
            title: dashboard.title.clone(),
            defaults: ControlValues {
                states: normalize_states(&dashboard.default_states),
                metric: dashboard.default_metric,
                scale: dashboard.default_scale,
            },
        }
    }

    /// Load the feed and build the context
    pub async fn load(source: &dyn FeedSource, dashboard: &DashboardConfig) -> LoadResult<Self> {
        let (table, report) = data::load(source).await?;
        let context = Self::new(table, report, source.describe(), dashboard);

        tracing::info!(
            as_of = ?context.snapshot.as_of,
            map_states = context.snapshot.len(),
            "Dashboard context ready"
        );
        Ok(context)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Choropleth built from the snapshot at load time
    pub fn map_chart(&self) -> &ChartSpec {
        &self.map_chart
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Description of the feed the table came from
    pub fn feed(&self) -> &str {
        &self.feed
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Page heading
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Control values a freshly mounted line chart tab starts with
    pub fn defaults(&self) -> &ControlValues {
        &self.defaults
    }
}
