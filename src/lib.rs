//! # covid-dash
//!
//! COVID-19 testing dashboard - loads the covidtracking.com state daily CSV
//! feed once at startup and serves interactive chart sessions over it.
//!
//! ## Features
//!
//! - **Derived metrics**: log10 positives, daily and 5-day percent increase,
//!   death and hospitalization rates per state
//! - **Chart specifications**: renderer-agnostic `{data, layout}` figures for
//!   a per-state line chart and a latest-day choropleth
//! - **Reactive sessions**: one controller per WebSocket connection, each
//!   control change recomputes the chart from the full control state
//! - **REST API**: stateless chart, snapshot and export endpoints
//!
//! ## Modules
//!
//! - [`data`]: Feed sources, loader, derived columns, snapshot
//! - [`chart`]: Line and choropleth builders
//! - [`dashboard`]: Application context and per-session controller
//! - [`websocket`]: Session transport
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use covid_dash::chart::{build_line_chart, Metric, Scale};
//! use covid_dash::data::{load, FileFeed};
//! use std::collections::BTreeSet;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load and derive
//!     let (table, report) = load(&FileFeed::new("daily.csv")).await?;
//!     println!("{}", report);
//!
//!     // Chart Maryland on a log axis
//!     let states: BTreeSet<String> = ["MD".to_string()].into();
//!     let chart = build_line_chart(&table, &states, Metric::Positive, Scale::Log);
//!
//!     println!("{}", serde_json::to_string_pretty(&chart)?);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod websocket;

// Re-export top-level types for convenience
pub use data::{
    load, snapshot, FeedSource, FileFeed, HttpFeed, LoadError, LoadReport, LoadResult, Record,
    Snapshot, SnapshotEntry, StaticFeed, Table,
};

pub use chart::{
    build_choropleth, build_line_chart, ChartError, ChartResult, ChartSpec, LineChartParams,
    Metric, Scale,
};

pub use dashboard::{AppContext, ControlError, ControlEvent, DashboardSession, Tab, TabView, Update};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{
    websocket_handler, ClientMessage, HubConfig, HubError, ServerMessage, SessionHub,
};

pub use config::{
    ApiConfig, Config, ConfigError, DashboardConfig, FeedConfig, LoggingConfig,
};
