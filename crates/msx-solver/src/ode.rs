//! Fixed- and adaptive-step ODE integration (spec §4.3): explicit Euler,
//! Cash-Karp RK5 with embedded error control, and the L-stable 2nd-order
//! Rosenbrock method ROS2.
//!
//! All three share one entry point, [`OdeSolver::integrate`]: advance `y`
//! from `t_now` to `t_end` given per-component tolerances and a suggested
//! initial step. The method is a per-project choice (spec §4.3 "Solver
//! selection is a per-project scalar, not per-species"), not a trait object
//! per call, so [`OdeSolver`] is a small enum rather than `dyn`-dispatched.

use nalgebra::DVector;

use crate::error::{SolverError, SolverResult};
use crate::jacobian::central_difference_jacobian;

/// Which of the three integrators a project's `[OPTIONS] SOLVER` line
/// selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OdeMethod {
    /// Fixed-step explicit Euler: a single derivative evaluation over the
    /// whole interval.
    Eul,
    /// Cash-Karp embedded Runge-Kutta, 5th order with 4th order error
    /// estimate, adaptive step.
    #[default]
    Rk5,
    /// 2nd-order L-stable Rosenbrock, for systems suspected stiff.
    Ros2,
}

/// Maximum consecutive step rejections RK5/ROS2 tolerate before giving up
/// (spec §4.3).
pub const MAX_REJECTS: usize = 100;

pub struct OdeSolver {
    pub method: OdeMethod,
    pub rtol: DVector<f64>,
    pub atol: DVector<f64>,
}

/// Outcome of advancing one interval: the new state and the step actually
/// taken (which may be shorter than requested if the interval needed
/// multiple adaptive substeps — the return value per spec §4.3 is the last
/// substep's size).
pub struct OdeOutcome {
    pub y: DVector<f64>,
    pub h: f64,
}

pub fn ode_solver(method: OdeMethod, rtol: DVector<f64>, atol: DVector<f64>) -> OdeSolver {
    OdeSolver { method, rtol, atol }
}

impl OdeSolver {
    /// Advance `y` from `t_now` to `t_end`, calling `deriv(t, y) -> y'` as
    /// many times as the method needs. `h0` seeds the first adaptive step;
    /// ignored by [`OdeMethod::Eul`].
    pub fn integrate<D>(
        &self,
        y0: &DVector<f64>,
        t_now: f64,
        t_end: f64,
        h0: f64,
        mut deriv: D,
    ) -> SolverResult<OdeOutcome>
    where
        D: FnMut(f64, &DVector<f64>) -> SolverResult<DVector<f64>>,
    {
        match self.method {
            OdeMethod::Eul => self.euler(y0, t_now, t_end, &mut deriv),
            OdeMethod::Rk5 => self.rk5(y0, t_now, t_end, h0, &mut deriv),
            OdeMethod::Ros2 => self.ros2(y0, t_now, t_end, h0, &mut deriv),
        }
    }

    fn euler<D>(
        &self,
        y0: &DVector<f64>,
        t_now: f64,
        t_end: f64,
        deriv: &mut D,
    ) -> SolverResult<OdeOutcome>
    where
        D: FnMut(f64, &DVector<f64>) -> SolverResult<DVector<f64>>,
    {
        let h = t_end - t_now;
        let dy = deriv(t_now, y0)?;
        Ok(OdeOutcome {
            y: y0 + &dy * h,
            h,
        })
    }

    fn error_norm(&self, y_hi: &DVector<f64>, y_lo: &DVector<f64>, y_ref: &DVector<f64>) -> f64 {
        let mut max_e: f64 = 0.0;
        for i in 0..y_hi.len() {
            let scale = self.atol[i] + self.rtol[i] * y_ref[i].abs();
            let e = (y_hi[i] - y_lo[i]).abs() / scale.max(1e-300);
            max_e = max_e.max(e);
        }
        max_e
    }

    fn rk5<D>(
        &self,
        y0: &DVector<f64>,
        t_now: f64,
        t_end: f64,
        h0: f64,
        deriv: &mut D,
    ) -> SolverResult<OdeOutcome>
    where
        D: FnMut(f64, &DVector<f64>) -> SolverResult<DVector<f64>>,
    {
        let span = t_end - t_now;
        if span == 0.0 {
            return Ok(OdeOutcome { y: y0.clone(), h: 0.0 });
        }
        let mut t = t_now;
        let mut y = y0.clone();
        let mut h = h0.abs().min(span.abs()) * span.signum();
        if h == 0.0 {
            h = span;
        }
        let mut rejects = 0usize;
        let mut last_h = h;

        while (t_end - t).abs() > 1e-14 * t_end.abs().max(1.0) {
            if (t + h - t_end) * span.signum() > 0.0 {
                h = t_end - t;
            }
            let (y5, y4) = cash_karp_step(t, &y, h, deriv)?;
            let e = self.error_norm(&y5, &y4, &y);

            if e > 1.0 {
                rejects += 1;
                if rejects > MAX_REJECTS {
                    return Err(SolverError::IntegratorRejected { rejects });
                }
                h *= (0.9 * e.powf(-0.2)).clamp(0.1, 5.0);
                continue;
            }

            t += h;
            y = y5;
            last_h = h;
            h *= (0.9 * e.max(1e-12).powf(-0.2)).clamp(0.1, 5.0);
        }

        Ok(OdeOutcome { y, h: last_h })
    }

    fn ros2<D>(
        &self,
        y0: &DVector<f64>,
        t_now: f64,
        t_end: f64,
        h0: f64,
        deriv: &mut D,
    ) -> SolverResult<OdeOutcome>
    where
        D: FnMut(f64, &DVector<f64>) -> SolverResult<DVector<f64>>,
    {
        let span = t_end - t_now;
        if span == 0.0 {
            return Ok(OdeOutcome { y: y0.clone(), h: 0.0 });
        }
        let gamma = 1.0 + 1.0 / std::f64::consts::SQRT_2;
        let n = y0.len();
        let mut t = t_now;
        let mut y = y0.clone();
        let mut h = h0.abs().min(span.abs()) * span.signum();
        if h == 0.0 {
            h = span;
        }
        let mut rejects = 0usize;
        let mut last_h = h;

        while (t_end - t).abs() > 1e-14 * t_end.abs().max(1.0) {
            if (t + h - t_end) * span.signum() > 0.0 {
                h = t_end - t;
            }

            let f0 = deriv(t, &y)?;
            let jac = central_difference_jacobian(&y, |yy| deriv(t, yy))?;
            let identity = nalgebra::DMatrix::<f64>::identity(n, n);
            let a = &identity * (1.0 / (gamma * h)) - &jac;
            let lu = a.clone().lu();

            let k1 = lu
                .solve(&f0)
                .ok_or(SolverError::IntegratorRejected { rejects: rejects + 1 })?;

            let y_stage = &y + &k1 * h;
            let f1 = deriv(t + h, &y_stage)?;
            let rhs2 = &f1 - &k1 * (2.0 / h);
            let k2 = lu
                .solve(&rhs2)
                .ok_or(SolverError::IntegratorRejected { rejects: rejects + 1 })?;

            let y2 = &y + &k1 * (1.5 * h) + &k2 * (0.5 * h);
            let y1 = &y + &k1 * h;

            let e = self.error_norm(&y2, &y1, &y);
            if e > 1.0 {
                rejects += 1;
                if rejects > MAX_REJECTS {
                    return Err(SolverError::IntegratorRejected { rejects });
                }
                h *= (0.9 * e.powf(-0.2)).clamp(0.1, 5.0);
                continue;
            }

            t += h;
            y = y2;
            last_h = h;
            h *= (0.9 * e.max(1e-12).powf(-0.2)).clamp(0.1, 5.0);
        }

        Ok(OdeOutcome { y, h: last_h })
    }
}

/// Cash-Karp 5(4) tableau; returns (y5, y4).
fn cash_karp_step<D>(
    t: f64,
    y: &DVector<f64>,
    h: f64,
    deriv: &mut D,
) -> SolverResult<(DVector<f64>, DVector<f64>)>
where
    D: FnMut(f64, &DVector<f64>) -> SolverResult<DVector<f64>>,
{
    const B21: f64 = 1.0 / 5.0;
    const B31: f64 = 3.0 / 40.0;
    const B32: f64 = 9.0 / 40.0;
    const B41: f64 = 3.0 / 10.0;
    const B42: f64 = -9.0 / 10.0;
    const B43: f64 = 6.0 / 5.0;
    const B51: f64 = -11.0 / 54.0;
    const B52: f64 = 5.0 / 2.0;
    const B53: f64 = -70.0 / 27.0;
    const B54: f64 = 35.0 / 27.0;
    const B61: f64 = 1631.0 / 55296.0;
    const B62: f64 = 175.0 / 512.0;
    const B63: f64 = 575.0 / 13824.0;
    const B64: f64 = 44275.0 / 110592.0;
    const B65: f64 = 253.0 / 4096.0;

    const C1_5: f64 = 37.0 / 378.0;
    const C3_5: f64 = 250.0 / 621.0;
    const C4_5: f64 = 125.0 / 594.0;
    const C6_5: f64 = 512.0 / 1771.0;

    const C1_4: f64 = 2825.0 / 27648.0;
    const C3_4: f64 = 18575.0 / 48384.0;
    const C4_4: f64 = 13525.0 / 55296.0;
    const C5_4: f64 = 277.0 / 14336.0;
    const C6_4: f64 = 1.0 / 4.0;

    let k1 = deriv(t, y)?;
    let k2 = deriv(t + 0.2 * h, &(y + &k1 * (h * B21)))?;
    let k3 = deriv(t + 0.3 * h, &(y + &k1 * (h * B31) + &k2 * (h * B32)))?;
    let k4 = deriv(
        t + 0.6 * h,
        &(y + &k1 * (h * B41) + &k2 * (h * B42) + &k3 * (h * B43)),
    )?;
    let k5 = deriv(
        t + h,
        &(y + &k1 * (h * B51) + &k2 * (h * B52) + &k3 * (h * B53) + &k4 * (h * B54)),
    )?;
    let k6 = deriv(
        t + 0.875 * h,
        &(y + &k1 * (h * B61)
            + &k2 * (h * B62)
            + &k3 * (h * B63)
            + &k4 * (h * B64)
            + &k5 * (h * B65)),
    )?;

    let y5 = y + (&k1 * C1_5 + &k3 * C3_5 + &k4 * C4_5 + &k6 * C6_5) * h;
    let y4 = y + (&k1 * C1_4 + &k3 * C3_4 + &k4 * C4_4 + &k5 * C5_4 + &k6 * C6_4) * h;
    Ok((y5, y4))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tol_vec(n: usize, v: f64) -> DVector<f64> {
        DVector::from_element(n, v)
    }

    #[test]
    fn euler_single_step() {
        let solver = ode_solver(OdeMethod::Eul, tol_vec(1, 1e-6), tol_vec(1, 1e-6));
        let y0 = DVector::from_vec(vec![1.0]);
        let out = solver
            .integrate(&y0, 0.0, 1.0, 0.0, |_, y| Ok(DVector::from_vec(vec![-y[0]])))
            .unwrap();
        // Euler with a single step over [0,1] for y'=-y starting at 1: y = 1-1 = 0
        assert!((out.y[0] - 0.0).abs() < 1e-9);
    }

    #[test]
    fn rk5_matches_exponential_decay() {
        let solver = ode_solver(OdeMethod::Rk5, tol_vec(1, 1e-10), tol_vec(1, 1e-10));
        let y0 = DVector::from_vec(vec![1.0]);
        let out = solver
            .integrate(&y0, 0.0, 1.0, 0.1, |_, y| Ok(DVector::from_vec(vec![-y[0]])))
            .unwrap();
        assert!((out.y[0] - (-1.0f64).exp()).abs() < 1e-6);
    }

    #[test]
    fn ros2_handles_stiff_quadratic_decay() {
        // y' = -k*y^2, k=1e9: explicit Euler blows up, ROS2 should not.
        let solver = ode_solver(OdeMethod::Ros2, tol_vec(1, 1e-6), tol_vec(1, 1e-9));
        let y0 = DVector::from_vec(vec![1e-3]);
        let k = 1e9;
        let out = solver
            .integrate(&y0, 0.0, 1.0, 1e-6, move |_, y| {
                Ok(DVector::from_vec(vec![-k * y[0] * y[0]]))
            })
            .unwrap();
        assert!(out.y[0].is_finite());
        assert!(out.y[0] >= 0.0);
        assert!(out.y[0] < y0[0]);
    }

    #[test]
    fn rk5_exhausts_reject_budget_when_tolerances_are_zero() {
        // atol=rtol=0 makes every step's error norm infinite, so every step
        // is rejected until the reject budget is exhausted.
        let solver = ode_solver(OdeMethod::Rk5, tol_vec(1, 0.0), tol_vec(1, 0.0));
        let y0 = DVector::from_vec(vec![1.0]);
        let err = solver
            .integrate(&y0, 0.0, 1.0, 0.1, |_, y| Ok(DVector::from_vec(vec![-y[0]])))
            .unwrap_err();
        assert!(matches!(err, SolverError::IntegratorRejected { .. }));
    }
}
