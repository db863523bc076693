//! Chart Builders
//!
//! Pure functions from the loaded data to renderer-agnostic chart
//! specifications. The JSON shape follows the `{data, layout}` figure
//! format so a browser can hand it straight to its plotting library.
//!
//! - **params**: The closed sets of metrics and axis scales
//! - **spec**: `ChartSpec` and its parts
//! - **line**: Per-state time series
//! - **choropleth**: Latest-day map
//!
//! Builders hold no state: the same inputs always produce an equal spec.

pub mod choropleth;
pub mod error;
pub mod line;
pub mod params;
pub mod spec;

pub use choropleth::build_choropleth;
pub use error::{ChartError, ChartResult};
pub use line::{build_line_chart, LineChartParams};
pub use params::{Metric, Scale};
pub use spec::{Annotation, Axis, ChartSpec, ColorBar, Geo, Layout, Trace};

/// Caption placed under every chart built from a loaded table
pub fn as_of_caption(as_of: Option<chrono::NaiveDate>) -> String {
    match as_of {
        Some(date) => format!("Data as of {}", date.format("%Y-%m-%d")),
        None => "No data loaded".to_string(),
    }
}
