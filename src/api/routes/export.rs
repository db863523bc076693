//! Export Routes
//!
//! Derived table export for offline analysis.
//!
//! - GET /api/v1/export - Export records as CSV

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::api::dto::{split_states, ExportParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::chart::line::normalize_states;
use crate::data::Record;

/// GET /api/v1/export
///
/// Every record with its derived columns, in table order. `states`
/// restricts the rows; all states are exported when it is absent.
pub async fn export_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    // Check if export is enabled
    if !state.config.enable_export {
        return Err(ApiError::Validation(
            "Export feature is disabled".to_string(),
        ));
    }

    let filter: Option<BTreeSet<String>> =
        split_states(params.states.as_deref()).map(normalize_states);

    let table = state.context.table();
    let rows = table.records().iter().filter(|record| match &filter {
        Some(states) => states.contains(&record.state),
        None => true,
    });

    let body = format_csv(rows)?;

    let filename = match table.latest() {
        Some(date) => format!("covid_dash_{}.csv", date.format("%Y%m%d")),
        None => "covid_dash.csv".to_string(),
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}

/// Write records as CSV with a header row
fn format_csv<'a>(records: impl Iterator<Item = &'a Record>) -> ApiResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| ApiError::Internal(format!("CSV encoding failed: {}", e)))?;
    }
    writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV encoding failed: {}", e)))
}
