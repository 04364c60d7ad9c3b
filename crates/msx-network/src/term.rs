use msx_expr::MathExpr;

/// A named sub-expression, reusable inside a species' rate/equilibrium/
/// formula expression via `VarRef::Term`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    pub name: String,
    pub expr: MathExpr,
}
