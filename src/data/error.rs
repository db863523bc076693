//! Data layer error types
//!
//! Only whole-load failures are errors. Row-level problems are handled by
//! the cleaning policy in the loader and reported through `LoadReport`.

use thiserror::Error;

/// Errors that abort loading the feed
#[derive(Error, Debug)]
pub enum LoadError {
    /// The feed could not be retrieved or is not CSV text
    #[error("Failed to fetch feed from {origin}: {message}")]
    Fetch { origin: String, message: String },

    /// The CSV header lacks columns the table is built from
    #[error("Feed is missing required columns: {}", .missing.join(", "))]
    Parse { missing: Vec<String> },
}

impl LoadError {
    /// Build a fetch error for the given source description
    pub fn fetch(origin: impl Into<String>, message: impl ToString) -> Self {
        LoadError::Fetch {
            origin: origin.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for load operations
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::Parse {
            missing: vec!["dateChecked".to_string(), "positive".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Feed is missing required columns: dateChecked, positive"
        );

        let err = LoadError::fetch("http://example.invalid/daily.csv", "connection refused");
        assert_eq!(
            err.to_string(),
            "Failed to fetch feed from http://example.invalid/daily.csv: connection refused"
        );
    }
}
