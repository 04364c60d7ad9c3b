use msx_core::Tolerances;
use msx_expr::MathExpr;

/// Whether a species lives in the bulk fluid or on the pipe wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeciesKind {
    Bulk,
    Wall,
}

/// The role a species plays within one zone kind (pipe or tank). Every
/// species has one of these for pipes and one for tanks; per (I4) a pipe
/// kind is never `Equilibrium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    #[default]
    None,
    Rate,
    Formula,
    Equilibrium,
}

/// A reaction expression bound to one zone kind, or absent.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneExpr {
    pub kind: ExprKind,
    pub expr: Option<MathExpr>,
}

impl ZoneExpr {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(kind: ExprKind, expr: MathExpr) -> Self {
        Self {
            kind,
            expr: Some(expr),
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Species {
    pub name: String,
    pub kind: SpeciesKind,
    pub tolerances: Tolerances,
    pub pipe_expr: ZoneExpr,
    pub tank_expr: ZoneExpr,
    /// Molecular diffusivity, sq ft/sec. Only meaningful for `Wall` species,
    /// where it feeds the Sherwood-number film mass-transfer coefficient;
    /// ignored for `Bulk` species.
    pub diffusivity: f64,
    /// Number of digits after the decimal point used when reporting.
    pub report_precision: u8,
    pub report: bool,
}

impl Species {
    pub fn pipe_kind_is_valid(&self) -> bool {
        !matches!(self.pipe_expr.kind, ExprKind::Equilibrium)
    }
}
