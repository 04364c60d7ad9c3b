//! The eight hydraulic variables a pipe/tank reaction expression may
//! reference, snapshotted once per zone by the chemistry engine (spec §4.4).

/// Index into the `HydVar[1..8]` snapshot. Variant order matches the legacy
/// `HYD_VAR` enum so expression files that spell out `1` through `8` for
/// these variables keep their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HydVar {
    Diameter,
    Flow,
    Velocity,
    ReynoldsNumber,
    ShearVelocity,
    FrictionFactor,
    AreaVolumeRatio,
    Roughness,
}

impl HydVar {
    pub const COUNT: usize = 8;
    pub const ALL: [HydVar; Self::COUNT] = [
        HydVar::Diameter,
        HydVar::Flow,
        HydVar::Velocity,
        HydVar::ReynoldsNumber,
        HydVar::ShearVelocity,
        HydVar::FrictionFactor,
        HydVar::AreaVolumeRatio,
        HydVar::Roughness,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }
}

/// A dense snapshot of every hydraulic variable for the zone currently being
/// evaluated. Cheap to copy; refreshed once per segment/tank before any
/// derivative or residual callback runs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HydVarSnapshot {
    values: [f64; HydVar::COUNT],
}

impl HydVarSnapshot {
    pub fn get(&self, var: HydVar) -> f64 {
        self.values[var.index()]
    }

    pub fn set(&mut self, var: HydVar, value: f64) {
        self.values[var.index()] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_index() {
        for v in HydVar::ALL {
            assert_eq!(HydVar::from_index(v.index()), Some(v));
        }
    }

    #[test]
    fn snapshot_default_is_zeroed() {
        let snap = HydVarSnapshot::default();
        assert_eq!(snap.get(HydVar::Flow), 0.0);
    }
}
