//! Metadata Routes
//!
//! - GET /api/v1/meta - Dataset description
//! - GET /api/v1/layout - Page title and tabs

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{LayoutResponse, MetaResponse, MetricDto, TabDescriptor};
use crate::api::state::AppState;
use crate::chart::{as_of_caption, Scale};
use crate::dashboard::{MetricOption, Tab};

/// GET /api/v1/meta
pub async fn get_meta(State(state): State<Arc<AppState>>) -> Json<MetaResponse> {
    let context = &state.context;
    let table = context.table();

    Json(MetaResponse {
        as_of: table.latest(),
        records: table.len(),
        states: table.states().to_vec(),
        metrics: MetricOption::all().into_iter().map(MetricDto::from).collect(),
        scales: Scale::all().to_vec(),
        feed: context.feed().to_string(),
        loaded_at: context.loaded_at(),
        report: context.report().clone(),
    })
}

/// GET /api/v1/layout
///
/// Static page structure; the chart content comes over the session socket.
pub async fn get_layout(State(state): State<Arc<AppState>>) -> Json<LayoutResponse> {
    Json(LayoutResponse {
        title: state.context.title().to_string(),
        initial_tab: Tab::StatePositive,
        tabs: Tab::all().iter().copied().map(TabDescriptor::from).collect(),
        caption: as_of_caption(state.context.table().latest()),
    })
}
