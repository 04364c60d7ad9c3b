//! Legacy physical constants and the `Ucf` unit-conversion table.
//!
//! Constants ported verbatim from `original_source/src/globals.h` /
//! `msxtypes.h`. The water-quality engine does not solve hydraulics itself
//! (spec §1 "Out of scope"), so only the option-driven conversions that
//! affect chemistry (surface area basis, reaction-rate time basis) are
//! modeled; flow/volume/length stay in whatever basis the hydraulics file
//! already uses.

/// Kinematic viscosity of water @ 20degC, sq ft/sec.
pub const VISCOS: f64 = 1.1e-5;

pub const M2_PER_FT2: f64 = 0.092_903_04;
pub const CM2_PER_FT2: f64 = 929.030_4;

/// Reporting/parsing tolerance floor, matches `TINY` in `msxtypes.h`.
pub const TINY: f64 = 1.0e-6;
/// Sentinel for "effectively infinite", matches `BIG`.
pub const BIG: f64 = 1.0e10;
/// Sentinel for "value not supplied", matches `MISSING`.
pub const MISSING: f64 = -1.0e10;

/// `[OPTIONS] AREA_UNITS`: the surface-area basis wall-species kinetics and
/// pipe area/volume ratios are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AreaUnits {
    #[default]
    Ft2,
    M2,
    Cm2,
}

/// `[OPTIONS] RATE_UNITS`: the time basis reaction-rate coefficients (and
/// therefore the ODE/Newton solvers' internal clock) are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateUnits {
    Seconds,
    Minutes,
    #[default]
    Hours,
    Days,
}

impl RateUnits {
    pub const fn seconds_per_unit(self) -> f64 {
        match self {
            RateUnits::Seconds => 1.0,
            RateUnits::Minutes => 60.0,
            RateUnits::Hours => 3600.0,
            RateUnits::Days => 86_400.0,
        }
    }
}

impl AreaUnits {
    /// Multiplier converting 1 square foot into this unit.
    pub const fn per_ft2(self) -> f64 {
        match self {
            AreaUnits::Ft2 => 1.0,
            AreaUnits::M2 => M2_PER_FT2,
            AreaUnits::Cm2 => CM2_PER_FT2,
        }
    }
}

/// Unit-conversion factors derived from the project's `[OPTIONS]` section.
#[derive(Debug, Clone, Copy)]
pub struct Ucf {
    pub area_units: AreaUnits,
    pub rate_units: RateUnits,
}

impl Default for Ucf {
    fn default() -> Self {
        Self {
            area_units: AreaUnits::default(),
            rate_units: RateUnits::default(),
        }
    }
}

impl Ucf {
    pub fn new(area_units: AreaUnits, rate_units: RateUnits) -> Self {
        Self {
            area_units,
            rate_units,
        }
    }

    /// Convert an elapsed duration in seconds into the project's reaction
    /// rate time basis, so that expressions written against e.g. `RATE_UNITS
    /// HR` integrate over the same clock their coefficients assume.
    pub fn seconds_to_rate_time(self, seconds: f64) -> f64 {
        seconds / self.rate_units.seconds_per_unit()
    }

    pub fn rate_time_to_seconds(self, rate_time: f64) -> f64 {
        rate_time * self.rate_units.seconds_per_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_unit_round_trip() {
        let ucf = Ucf::new(AreaUnits::Ft2, RateUnits::Hours);
        let t = ucf.seconds_to_rate_time(7200.0);
        assert!((t - 2.0).abs() < 1e-12);
        assert!((ucf.rate_time_to_seconds(t) - 7200.0).abs() < 1e-9);
    }

    #[test]
    fn area_unit_conversion() {
        assert!((AreaUnits::M2.per_ft2() - 0.092_903_04).abs() < 1e-9);
    }
}
