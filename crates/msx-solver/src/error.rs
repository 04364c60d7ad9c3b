//! Error types for the Newton and ODE solvers.

use msx_core::{CoreError, RuntimeErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Newton iteration did not converge after {iterations} iterations (residual={residual_norm})")]
    NewtonDidNotConverge { iterations: usize, residual_norm: f64 },

    #[error("Jacobian is singular (zero pivot at column {column})")]
    Singular { column: usize },

    #[error("integrator rejected {rejects} consecutive steps")]
    IntegratorRejected { rejects: usize },

    #[error("illegal math operation in derivative/residual callback: {what}")]
    IllegalMath { what: &'static str },

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for RuntimeErrorCode {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::NewtonDidNotConverge { .. } => RuntimeErrorCode::Newton,
            SolverError::Singular { .. } => RuntimeErrorCode::Newton,
            SolverError::IntegratorRejected { .. } => RuntimeErrorCode::Integrator,
            SolverError::IllegalMath { .. } => RuntimeErrorCode::IllegalMath,
            SolverError::Core(_) => RuntimeErrorCode::IllegalMath,
        }
    }
}
