use msx_core::NodeId;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    pub name: String,
    pub start_node: NodeId,
    pub end_node: NodeId,
    /// Feet.
    pub diameter: f64,
    /// Feet.
    pub length: f64,
    pub roughness: f64,
    /// Initial per-species concentration, dense and indexed by `SpeciesId`.
    pub init_qual: Vec<f64>,
    /// Per-parameter kinetic value override, dense and indexed by `ParamId`,
    /// pre-filled with the network default.
    pub param_values: Vec<f64>,
    pub report: bool,
}

impl Link {
    /// Cross-sectional area in square feet.
    pub fn area(&self) -> f64 {
        std::f64::consts::FRAC_PI_4 * self.diameter * self.diameter
    }

    /// Pipe volume in cubic feet.
    pub fn volume(&self) -> f64 {
        self.area() * self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_matches_cylinder_formula() {
        let link = Link {
            name: "p1".into(),
            start_node: msx_core::NodeId::from_index(0),
            end_node: msx_core::NodeId::from_index(1),
            diameter: 1.0,
            length: 100.0,
            roughness: 100.0,
            init_qual: vec![],
            param_values: vec![],
            report: false,
        };
        let expected = std::f64::consts::FRAC_PI_4 * 100.0;
        assert!((link.volume() - expected).abs() < 1e-9);
    }
}
