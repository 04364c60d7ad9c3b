//! msx-solver: the Newton equilibrium solver and the three ODE integrators
//! (EUL, RK5, ROS2) that drive the chemistry engine's rate equations
//! (spec §4.2, §4.3).
//!
//! Both solver families share one shape: the caller supplies a dense
//! residual/derivative callback closed over whatever zone (pipe segment or
//! tank) is currently reacting, and gets back either a converged solution or
//! a specific [`SolverError`]. Neither solver owns any state that outlives a
//! single call; the chemistry engine re-enters them once per zone per
//! quality step.

pub mod error;
pub mod jacobian;
pub mod newton;
pub mod ode;

pub use error::{SolverError, SolverResult};
pub use newton::{NewtonConfig, newton_solve};
pub use ode::{OdeMethod, OdeSolver, ode_solver};
