use msx_core::{CoreError, RuntimeErrorCode};
use msx_expr::ExprError;
use msx_solver::SolverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChemistryError {
    #[error("expression evaluation failed: {0}")]
    Expr(#[from] ExprError),

    #[error("solver failed: {0}")]
    Solver(#[from] SolverError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("too few pipe reaction expressions")]
    NumPipeExpr,

    #[error("too few tank reaction expressions")]
    NumTankExpr,

    #[error("species has no expression for this zone")]
    MissingExpression,
}

pub type ChemistryResult<T> = Result<T, ChemistryError>;

impl From<ChemistryError> for RuntimeErrorCode {
    fn from(err: ChemistryError) -> Self {
        match err {
            ChemistryError::Expr(_) => RuntimeErrorCode::IllegalMath,
            ChemistryError::Solver(e) => e.into(),
            ChemistryError::Core(_) => RuntimeErrorCode::IllegalMath,
            ChemistryError::NumPipeExpr => RuntimeErrorCode::NumPipeExpr,
            ChemistryError::NumTankExpr => RuntimeErrorCode::NumTankExpr,
            ChemistryError::MissingExpression => RuntimeErrorCode::IllegalMath,
        }
    }
}
