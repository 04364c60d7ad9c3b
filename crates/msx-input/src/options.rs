//! `[OPTIONS]` section state: area/rate unit basis, solver and coupling
//! choice, quality time step, and default integration tolerances.

use msx_chemistry::Coupling;
use msx_core::{AreaUnits, RateUnits};
use msx_solver::OdeMethod;

#[derive(Debug, Clone)]
pub struct Options {
    pub area_units: AreaUnits,
    pub rate_units: RateUnits,
    pub solver: OdeMethod,
    pub coupling: Coupling,
    /// `[OPTIONS] TIMESTEP`, seconds. Matches `Qstep` in
    /// `original_source/src/msxtypes.h`.
    pub timestep: f64,
    /// Default relative tolerance for species whose `[SPECIES]` line omits
    /// one; matches `DefRtol`.
    pub rtol: f64,
    /// Default absolute tolerance; matches `DefAtol`.
    pub atol: f64,
    /// `[OPTIONS] REPORT_START`, seconds; matches `Rstart`. Reporting
    /// snapshots are skipped until `Qtime` reaches this time.
    pub report_start: f64,
    /// `[OPTIONS] REPORT_STEP`, seconds; matches `Rstep`. `0.0` means
    /// "unset", i.e. report on every quality step (the project's
    /// `TIMESTEP` is used as the effective report step).
    pub report_step: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            area_units: AreaUnits::default(),
            rate_units: RateUnits::default(),
            solver: OdeMethod::default(),
            coupling: Coupling::default(),
            timestep: 300.0,
            rtol: 0.01,
            atol: 0.01,
            report_start: 0.0,
            report_step: 0.0,
        }
    }
}

/// Which objects get written to the text report (`[REPORT]` section).
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    pub report_file: Option<String>,
    pub page_size: usize,
}
