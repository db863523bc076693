//! Snapshot Route
//!
//! - GET /api/v1/snapshot - Latest-day positive counts per state

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::data::Snapshot;

/// GET /api/v1/snapshot
pub async fn get_snapshot(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.context.snapshot().clone())
}
