//! Error types for planning operations.

use avenue_core::AvenueError;
use thiserror::Error;

/// Result type for planning operations.
pub type AlgoResult<T> = std::result::Result<T, AlgoError>;

/// Errors from synthesis, search and selection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlgoError {
    /// The network model failed (non-convergence, islanding, unknown ids).
    #[error("network model error: {0}")]
    Model(#[from] AvenueError),

    /// A selection referred to a row that does not exist.
    #[error("result row {index} out of range ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    /// The candidate pool would produce more trials than the search allows.
    #[error(
        "{candidates} candidates with edge limit {edge_limit} give {trials} trials, \
         more than the limit of {max_trials}"
    )]
    TooManyTrials {
        candidates: usize,
        edge_limit: usize,
        trials: usize,
        max_trials: usize,
    },

    /// Site layout or area parameters cannot produce a grid.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_convert() {
        let err: AlgoError = AvenueError::Islanded { components: 3 }.into();
        assert!(matches!(err, AlgoError::Model(_)));
        assert!(err.to_string().contains("3 components"));
    }

    #[test]
    fn too_many_trials_display() {
        let err = AlgoError::TooManyTrials {
            candidates: 10,
            edge_limit: 4,
            trials: 385,
            max_trials: 100,
        };
        assert_eq!(
            err.to_string(),
            "10 candidates with edge limit 4 give 385 trials, more than the limit of 100"
        );
    }

    #[test]
    fn row_out_of_range_display() {
        let err = AlgoError::RowOutOfRange { index: 9, len: 4 };
        assert_eq!(err.to_string(), "result row 9 out of range (4 rows)");
    }
}
