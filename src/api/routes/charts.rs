//! Chart Routes
//!
//! Stateless chart endpoints. Each request builds from its own parameters
//! only; nothing is remembered between calls.
//!
//! - GET /api/v1/charts/line - Per-state time series
//! - GET /api/v1/charts/map - Latest-day choropleth

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{split_states, LineChartQuery};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::chart::{ChartSpec, LineChartParams};

/// GET /api/v1/charts/line?states=MD,VA&metric=positive&scale=log
///
/// Without `states` the dashboard's default selection is used.
pub async fn line_chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LineChartQuery>,
) -> ApiResult<Json<ChartSpec>> {
    let params = match split_states(query.states.as_deref()) {
        Some(states) => LineChartParams::parse(states, &query.metric, &query.scale)?,
        None => LineChartParams::parse(
            &state.context.defaults().states,
            &query.metric,
            &query.scale,
        )?,
    };

    tracing::debug!(
        states = params.states.len(),
        metric = %params.metric,
        scale = %params.scale,
        "Building line chart"
    );

    Ok(Json(params.build(state.context.table())))
}

/// GET /api/v1/charts/map
pub async fn map_chart(State(state): State<Arc<AppState>>) -> Json<ChartSpec> {
    Json(state.context.map_chart().clone())
}
