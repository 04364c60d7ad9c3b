use msx_core::TankId;

use crate::source::Source;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub name: String,
    pub sources: Vec<Source>,
    /// Initial per-species concentration, dense and indexed by `SpeciesId`.
    pub init_qual: Vec<f64>,
    /// Current per-species concentration; mutated by quality transport.
    pub quality: Vec<f64>,
    pub tank: Option<TankId>,
    pub report: bool,
}

impl Node {
    pub fn is_tank(&self) -> bool {
        self.tank.is_some()
    }
}
