//! Derives the `HydVar[1..8]` snapshot (spec §4.4) from a link's flow and
//! geometry, using the same Colebrook-White/Swamee-Jain friction
//! correlation the hydraulics side of this codebase uses for pipe pressure
//! drop.

use msx_core::{HydVar, HydVarSnapshot, VISCOS};

/// Reynolds number below which flow is treated as laminar.
const LAMINAR_CUTOFF: f64 = 2300.0;

fn friction_factor(reynolds: f64, roughness: f64, diameter: f64) -> f64 {
    if reynolds < 1e-6 {
        return 0.0;
    }
    if reynolds < LAMINAR_CUTOFF {
        64.0 / reynolds
    } else {
        let e_d = roughness / diameter;
        let a = e_d / 3.7;
        let b = 5.74 / reynolds.powf(0.9);
        let f = 0.25 / (a + b).log10().powi(2);
        f.max(1e-4)
    }
}

/// Snapshot the eight hydraulic variables for a pipe given its current flow
/// `q` (signed, cubic feet/sec) and static geometry.
pub fn pipe_hydvars(q: f64, diameter: f64, roughness: f64) -> HydVarSnapshot {
    let area = std::f64::consts::FRAC_PI_4 * diameter * diameter;
    let velocity = if area > 0.0 { q / area } else { 0.0 };
    let reynolds = velocity.abs() * diameter / VISCOS;
    let friction = friction_factor(reynolds, roughness, diameter);
    let shear = velocity.abs() * (friction / 8.0).sqrt();
    let area_volume_ratio = if diameter > 0.0 { 4.0 / diameter } else { 0.0 };

    let mut snap = HydVarSnapshot::default();
    snap.set(HydVar::Diameter, diameter);
    snap.set(HydVar::Flow, q);
    snap.set(HydVar::Velocity, velocity);
    snap.set(HydVar::ReynoldsNumber, reynolds);
    snap.set(HydVar::ShearVelocity, shear);
    snap.set(HydVar::FrictionFactor, friction);
    snap.set(HydVar::AreaVolumeRatio, area_volume_ratio);
    snap.set(HydVar::Roughness, roughness);
    snap
}

/// Tanks expose a zero flow/velocity/Reynolds/shear/friction snapshot; only
/// diameter-like geometry (here, the tank's own area/volume ratio is left
/// at zero since tanks are not cylindrical pipes) and roughness are
/// meaningless, so only what reaction expressions can legitimately use is
/// populated: the rest stay at their default zero.
pub fn tank_hydvars() -> HydVarSnapshot {
    HydVarSnapshot::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_flow_gives_zero_velocity_and_friction() {
        let snap = pipe_hydvars(0.0, 1.0, 0.001);
        assert_eq!(snap.get(HydVar::Velocity), 0.0);
        assert_eq!(snap.get(HydVar::FrictionFactor), 0.0);
    }

    #[test]
    fn turbulent_flow_produces_positive_friction_and_shear() {
        let snap = pipe_hydvars(5.0, 1.0, 0.0015);
        assert!(snap.get(HydVar::ReynoldsNumber) > LAMINAR_CUTOFF);
        assert!(snap.get(HydVar::FrictionFactor) > 0.0);
        assert!(snap.get(HydVar::ShearVelocity) > 0.0);
    }

    #[test]
    fn laminar_flow_uses_64_over_re() {
        let snap = pipe_hydvars(0.01, 1.0, 0.0015);
        let re = snap.get(HydVar::ReynoldsNumber);
        assert!(re < LAMINAR_CUTOFF);
        let expected = 64.0 / re;
        assert!((snap.get(HydVar::FrictionFactor) - expected).abs() < 1e-9);
    }

    #[test]
    fn area_volume_ratio_is_four_over_diameter() {
        let snap = pipe_hydvars(1.0, 2.0, 0.001);
        assert!((snap.get(HydVar::AreaVolumeRatio) - 2.0).abs() < 1e-9);
    }
}
