use thiserror::Error;

/// Arithmetic or structural fault raised while evaluating a [`crate::MathExpr`].
///
/// Every variant here reduces to `InputErrorCode::IllegalMathExpr` (409) at
/// parse time or `RuntimeErrorCode::IllegalMath` (524) once a project is
/// running; this crate stays agnostic of which caller is asking.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ExprError {
    #[error("division by zero")]
    DivideByZero,
    #[error("logarithm of a non-positive value")]
    LogOfNonPositive,
    #[error("negative base raised to a non-integer power")]
    NegativeBasePow,
    #[error("expression produced a non-finite result")]
    NonFinite,
    #[error("variable resolution failed for index {0}")]
    UnresolvedVariable(i32),
    #[error("operand stack underflow")]
    StackUnderflow,
}
