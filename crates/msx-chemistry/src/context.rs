//! Variable resolution for one zone's reaction expressions (spec §4.4,
//! §9 "Variable resolution goes through a single table").
//!
//! A zone is either one pipe segment or one tank compartment. Its
//! [`EvalContext`] bundles everything an expression might reference: the
//! zone's current species concentrations, the term cache (re-evaluated
//! once per derivative/residual call, in declaration order), the
//! link/tank's parameter overrides, the network's global constants, and
//! the cached hydraulic-variable snapshot.

use msx_core::HydVarSnapshot;
use msx_expr::{ExprError, MathExpr, VarRef};
use msx_network::{Constant, Term};

pub struct EvalContext<'a> {
    pub concentrations: &'a [f64],
    pub term_values: &'a [f64],
    pub param_values: &'a [f64],
    pub constants: &'a [Constant],
    pub hydvars: HydVarSnapshot,
}

impl<'a> EvalContext<'a> {
    pub fn resolve(&self, var: VarRef) -> Result<f64, ExprError> {
        let idx = match var {
            VarRef::Species(id) => return lookup(self.concentrations, id.index_usize(), var),
            VarRef::Term(id) => return lookup(self.term_values, id.index_usize(), var),
            VarRef::Param(id) => return lookup(self.param_values, id.index_usize(), var),
            VarRef::Const(id) => {
                return self
                    .constants
                    .get(id.index_usize())
                    .map(|c| c.value)
                    .ok_or(ExprError::UnresolvedVariable(id.index() as i32))
            }
            VarRef::Hyd(h) => h.index(),
        };
        Ok(self.hydvars_value(idx))
    }

    fn hydvars_value(&self, idx: usize) -> f64 {
        msx_core::HydVar::from_index(idx)
            .map(|v| self.hydvars.get(v))
            .unwrap_or(0.0)
    }

    pub fn eval(&self, expr: &MathExpr) -> Result<f64, ExprError> {
        expr.eval(&mut |v| self.resolve(v))
    }
}

fn lookup(slice: &[f64], idx: usize, var: VarRef) -> Result<f64, ExprError> {
    slice
        .get(idx)
        .copied()
        .ok_or_else(|| ExprError::UnresolvedVariable(var_index(var)))
}

fn var_index(var: VarRef) -> i32 {
    match var {
        VarRef::Species(id) | VarRef::Term(id) | VarRef::Param(id) | VarRef::Const(id) => {
            id.index() as i32
        }
        VarRef::Hyd(h) => h.index() as i32,
    }
}

/// Evaluate every term in declaration order, each able to reference species,
/// parameters, constants, hydraulic variables, and any earlier term (spec
/// §4.4 step 2 "evaluates every Term in order").
pub fn eval_terms(
    terms: &[Term],
    concentrations: &[f64],
    param_values: &[f64],
    constants: &[Constant],
    hydvars: HydVarSnapshot,
) -> Result<Vec<f64>, ExprError> {
    let mut values = vec![0.0; terms.len()];
    for (i, term) in terms.iter().enumerate() {
        let ctx = EvalContext {
            concentrations,
            term_values: &values[..i],
            param_values,
            constants,
            hydvars,
        };
        values[i] = ctx.eval(&term.expr)?;
    }
    Ok(values)
}
