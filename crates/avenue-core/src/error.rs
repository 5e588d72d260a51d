//! Unified error type for the network model.
//!
//! Everything the [`NetworkModel`](crate::NetworkModel) contract can fail with
//! is expressed as an [`AvenueError`]. Algorithm crates wrap it in their own
//! error enums so callers can tell model failures apart from caller mistakes.

use crate::{LineId, SiteId};
use thiserror::Error;

/// Errors raised by the grid model and its load-flow solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AvenueError {
    /// A line id that was never registered with this grid
    #[error("unknown line {0}")]
    UnknownLine(LineId),

    /// A site id outside the grid's site arena
    #[error("unknown site {0}")]
    UnknownSite(SiteId),

    /// Structural problems with the input data
    #[error("Validation error: {0}")]
    Validation(String),

    /// The active topology splits into several islands, so the
    /// susceptance matrix cannot be inverted
    #[error("network is islanded into {components} components")]
    Islanded { components: usize },

    /// Sites carry load but no site hosts a generator
    #[error("no generation available to serve {load_mw:.2} MW of load")]
    NoGeneration { load_mw: f64 },

    /// The loss/dispatch fixed point did not settle
    #[error("load flow did not converge after {iterations} iterations (residual {residual:e})")]
    NonConvergence { iterations: usize, residual: f64 },

    /// Linear-algebra failures
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results using AvenueError.
pub type AvenueResult<T> = Result<T, AvenueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AvenueError::NonConvergence {
            iterations: 50,
            residual: 1e-3,
        };
        assert!(err.to_string().contains("did not converge"));
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn test_unknown_line_display() {
        let err = AvenueError::UnknownLine(LineId::new(7));
        assert_eq!(err.to_string(), "unknown line L7");
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> AvenueResult<()> {
            Err(AvenueError::Validation("test".into()))
        }

        fn outer() -> AvenueResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
