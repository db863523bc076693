//! Chart parameter errors

use thiserror::Error;

/// A control or query emitted a value outside its closed set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("Unknown metric: {0}")]
    InvalidMetric(String),

    #[error("Unknown axis scale: {0} (expected linear or log)")]
    InvalidScale(String),
}

impl ChartError {
    /// Stable error code for API and WebSocket clients
    pub fn code(&self) -> &'static str {
        match self {
            ChartError::InvalidMetric(_) => "INVALID_METRIC",
            ChartError::InvalidScale(_) => "INVALID_SCALE",
        }
    }
}

/// Result type alias for chart parameter parsing
pub type ChartResult<T> = Result<T, ChartError>;
