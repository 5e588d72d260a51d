use super::backend::{FaerSolver, GaussSolver, LinearSystemBackend};
use crate::error::AvenueError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Simple registry of available linear solvers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    Gauss,
    #[default]
    Faer,
}

impl FromStr for SolverKind {
    type Err = AvenueError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "gauss" => Ok(SolverKind::Gauss),
            "faer" | "default" => Ok(SolverKind::Faer),
            other => Err(AvenueError::Config(format!(
                "unknown solver '{}'; supported values: gauss, faer",
                other
            ))),
        }
    }
}

impl SolverKind {
    pub fn build_solver(self) -> Arc<dyn LinearSystemBackend> {
        match self {
            SolverKind::Gauss => Arc::new(GaussSolver),
            SolverKind::Faer => Arc::new(FaerSolver),
        }
    }

    pub fn available() -> &'static [&'static str] {
        &["gauss", "faer"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverKind::Gauss => "gauss",
            SolverKind::Faer => "faer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_kind_parsing_supports_all_engines() {
        assert_eq!("gauss".parse::<SolverKind>().unwrap(), SolverKind::Gauss);
        assert_eq!("FAER".parse::<SolverKind>().unwrap(), SolverKind::Faer);
        assert!("unknown".parse::<SolverKind>().is_err());
    }

    #[test]
    fn solver_backend_options_solve_diagonal_system() {
        let matrix = vec![vec![2.0, 0.0], vec![0.0, 3.0]];
        let rhs = vec![4.0, 6.0];

        for kind in [SolverKind::Gauss, SolverKind::Faer] {
            let solution = kind.build_solver().solve(&matrix, &rhs).unwrap();
            assert!((solution[0] - 2.0).abs() < 1e-12, "{}", kind.as_str());
            assert!((solution[1] - 2.0).abs() < 1e-12, "{}", kind.as_str());
        }
    }

    #[test]
    fn gauss_rejects_singular_matrix() {
        let matrix = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let err = GaussSolver.solve(&matrix, &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, AvenueError::Solver(_)));
    }

    #[test]
    fn mismatched_rhs_is_reported() {
        let matrix = vec![vec![1.0]];
        assert!(FaerSolver.solve(&matrix, &[1.0, 2.0]).is_err());
    }
}
