//! Damped Newton solver over a dense, finite-difference Jacobian
//! (spec §4.2).
//!
//! Mirrors `original_source/src/newton.h`'s `newton_open`/`newton_solve`
//! pair: `n` is fixed for the lifetime of a [`NewtonConfig`] (the solver
//! does not allocate per call beyond the scratch vectors sized once), and
//! convergence is judged component-wise against `tol * |x_i|` rather than a
//! single norm.

use nalgebra::DVector;

use crate::error::{SolverError, SolverResult};
use crate::jacobian::central_difference_jacobian;

/// `MAXIT` / `NUMSIG` from `original_source/src/chemistry.c`.
pub const MAXIT: usize = 20;
pub const NUMSIG: i32 = 3;

#[derive(Clone, Copy, Debug)]
pub struct NewtonConfig {
    pub max_iterations: usize,
    /// Convergence tolerance: iteration stops once every `|delta_i| <
    /// tol * |x_i|`. Defaults to `0.5 * 10^-NUMSIG`.
    pub tol: f64,
    /// Damping applied to the correction when it would cross zero (keeps
    /// the legacy solver's tendency to not let concentrations go negative
    /// mid-iteration without hard-clamping them).
    pub damping: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAXIT,
            tol: 0.5 * 10f64.powi(-NUMSIG),
            damping: 0.5,
        }
    }
}

pub struct NewtonOutcome {
    pub x: DVector<f64>,
    pub iterations: usize,
}

/// Damped Newton iteration over `f(x) = 0`.
///
/// `residual_fn` is evaluated at the current iterate to build the
/// right-hand side and (via centered finite differences) the Jacobian.
/// Returns [`SolverError::Singular`] if the LU factorization hits a zero
/// pivot and [`SolverError::NewtonDidNotConverge`] if `max_iterations` is
/// exceeded.
pub fn newton_solve<F>(
    x0: DVector<f64>,
    config: &NewtonConfig,
    mut residual_fn: F,
) -> SolverResult<NewtonOutcome>
where
    F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let mut x = x0;
    let n = x.len();
    if n == 0 {
        return Ok(NewtonOutcome { x, iterations: 0 });
    }

    for iter in 0..config.max_iterations {
        let f = residual_fn(&x)?;
        let jac = central_difference_jacobian(&x, &mut residual_fn)?;

        let delta = jac
            .lu()
            .solve(&(-&f))
            .ok_or(SolverError::Singular { column: pivot_column(&x) })?;

        let mut converged = true;
        for i in 0..n {
            let step = if x[i] + delta[i] < 0.0 && x[i] >= 0.0 {
                delta[i] * config.damping
            } else {
                delta[i]
            };
            if step.abs() >= config.tol * x[i].abs().max(1e-12) {
                converged = false;
            }
            x[i] += step;
        }
        if converged {
            return Ok(NewtonOutcome {
                x,
                iterations: iter + 1,
            });
        }
    }

    Err(SolverError::NewtonDidNotConverge {
        iterations: config.max_iterations,
        residual_norm: residual_fn(&x)?.norm(),
    })
}

/// Best-effort column to blame for a singular Jacobian; the legacy solver
/// just reports "singular", we keep a little more context for diagnostics.
fn pivot_column(x: &DVector<f64>) -> usize {
    x.iter()
        .enumerate()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_simple_quadratic() {
        // x^2 - 4 = 0, x > 0
        let residual =
            |x: &DVector<f64>| -> SolverResult<DVector<f64>> { Ok(DVector::from_vec(vec![x[0] * x[0] - 4.0])) };
        let x0 = DVector::from_vec(vec![3.0]);
        let out = newton_solve(x0, &NewtonConfig::default(), residual).unwrap();
        assert!((out.x[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn solves_linear_system() {
        // 2x + y = 5, x - y = 1  =>  x=2, y=1
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![2.0 * x[0] + x[1] - 5.0, x[0] - x[1] - 1.0]))
        };
        let x0 = DVector::from_vec(vec![0.0, 0.0]);
        let out = newton_solve(x0, &NewtonConfig::default(), residual).unwrap();
        assert!((out.x[0] - 2.0).abs() < 1e-5);
        assert!((out.x[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_system_converges_immediately() {
        let out = newton_solve(DVector::from_vec(vec![]), &NewtonConfig::default(), |_| {
            Ok(DVector::from_vec(vec![]))
        })
        .unwrap();
        assert_eq!(out.iterations, 0);
    }
}
