//! Reactive Dashboard
//!
//! Binds the dashboard controls to the chart builders.
//!
//! ## Architecture
//!
//! - **AppContext**: Table, snapshot and map chart, built once at startup and
//!   shared read-only by every session
//! - **DashboardSession**: One client's tab and control values
//! - **Controls**: Tabs, control events and the rendered tab views
//!
//! ## Tabs
//!
//! ```text
//!   state-positive ──select_tab──▶ us-state-map
//!        ▲                              │
//!        └──────────select_tab──────────┘
//!
//!   state-positive: state select, scale select, metric select, line chart
//!   us-state-map:   choropleth
//! ```
//!
//! A control change rebuilds the line chart from the current value of all
//! three controls. Nothing of the previous chart is reused.

mod context;
mod controller;
mod controls;

pub use context::AppContext;
pub use controller::{ControlError, DashboardSession, Update};
pub use controls::{
    ControlEvent, ControlId, ControlPanel, ControlValues, MetricOption, Tab, TabView,
};
