//! Centered finite-difference Jacobian, shared by the Newton solver and the
//! ROS2 integrator (spec §4.2, §4.3).

use nalgebra::{DMatrix, DVector};

use crate::error::SolverResult;

/// Perturbation step for component `i`, matching the legacy `newton.c`
/// choice of `max(|x_i| * eps, eps^2)` with `eps` the square root of machine
/// epsilon.
pub fn fd_step(x_i: f64) -> f64 {
    let eps = f64::EPSILON.sqrt();
    (x_i.abs() * eps).max(eps * eps)
}

/// Centered difference approximation of `d f_i / d x_j`.
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    mut f: F,
) -> SolverResult<DMatrix<f64>>
where
    F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let mut jac = DMatrix::zeros(n, n);
    for j in 0..n {
        let h = fd_step(x[j]);
        let mut x_plus = x.clone();
        x_plus[j] += h;
        let mut x_minus = x.clone();
        x_minus[j] -= h;
        let f_plus = f(&x_plus)?;
        let f_minus = f(&x_minus)?;
        for i in 0..n {
            jac[(i, j)] = (f_plus[i] - f_minus[i]) / (2.0 * h);
        }
    }
    Ok(jac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_of_quadratic() {
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] * x[0], x[1] * x[0]]))
        };
        let x = DVector::from_vec(vec![3.0, 2.0]);
        let jac = central_difference_jacobian(&x, f).unwrap();
        assert!((jac[(0, 0)] - 6.0).abs() < 1e-4);
        assert!((jac[(1, 0)] - 2.0).abs() < 1e-4);
        assert!((jac[(1, 1)] - 3.0).abs() < 1e-4);
    }
}
