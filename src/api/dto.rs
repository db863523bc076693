//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::{Metric, Scale};
use crate::dashboard::{ControlId, MetricOption, Tab};
use crate::data::LoadReport;
use crate::websocket::TabCounts;

/// Split a comma-separated `states` query value
///
/// Absent means "no filter"; an empty value is an empty selection.
pub fn split_states(raw: Option<&str>) -> Option<Vec<String>> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect()
    })
}

// ============================================
// CHART DTOs
// ============================================

/// Query parameters for the line chart endpoint
#[derive(Debug, Deserialize)]
pub struct LineChartQuery {
    /// Comma-separated state codes
    #[serde(default)]
    pub states: Option<String>,
    /// Metric key
    #[serde(default = "default_metric")]
    pub metric: String,
    /// Axis scale
    #[serde(default = "default_scale")]
    pub scale: String,
}

fn default_metric() -> String {
    Metric::Positive.key().to_string()
}

fn default_scale() -> String {
    Scale::Linear.key().to_string()
}

// ============================================
// EXPORT DTOs
// ============================================

/// Export query parameters
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Comma-separated state codes; all states when absent
    #[serde(default)]
    pub states: Option<String>,
}

// ============================================
// META DTOs
// ============================================

/// Metric descriptor
#[derive(Debug, Serialize)]
pub struct MetricDto {
    pub key: Metric,
    pub label: String,
}

impl From<MetricOption> for MetricDto {
    fn from(option: MetricOption) -> Self {
        Self {
            key: option.key,
            label: option.label.to_string(),
        }
    }
}

/// Dataset description
#[derive(Debug, Serialize)]
pub struct MetaResponse {
    /// Latest date in the table
    pub as_of: Option<NaiveDate>,
    /// Number of records
    pub records: usize,
    /// Distinct state codes
    pub states: Vec<String>,
    /// Selectable metrics
    pub metrics: Vec<MetricDto>,
    /// Selectable scales
    pub scales: Vec<Scale>,
    /// Where the data came from
    pub feed: String,
    /// When it was loaded
    pub loaded_at: DateTime<Utc>,
    /// Cleaning summary
    pub report: LoadReport,
}

/// One tab of the page layout
#[derive(Debug, Serialize)]
pub struct TabDescriptor {
    pub id: Tab,
    pub label: String,
    pub heading: String,
    pub controls: Vec<ControlId>,
}

impl From<Tab> for TabDescriptor {
    fn from(tab: Tab) -> Self {
        Self {
            id: tab,
            label: tab.label().to_string(),
            heading: tab.heading().to_string(),
            controls: tab.controls().to_vec(),
        }
    }
}

/// Page layout
#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub title: String,
    pub initial_tab: Tab,
    pub tabs: Vec<TabDescriptor>,
    /// Caption shown under every chart
    pub caption: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// Records in the loaded table
    pub records: usize,
    /// Latest date in the table
    pub as_of: Option<NaiveDate>,
    /// Connected dashboard sessions
    pub sessions: usize,
    /// Sessions per active tab
    pub sessions_by_tab: TabCounts,
    /// Server uptime
    pub uptime_seconds: u64,
    /// Crate version
    pub version: String,
}
