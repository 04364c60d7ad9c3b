use msx_core::NodeId;

/// Tank mixing model (spec §4.6 step 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MixingModel {
    #[default]
    CompleteMix,
    TwoCompartment,
    Fifo,
    Lifo,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tank {
    pub node: NodeId,
    pub mixing_model: MixingModel,
    /// Square feet; used to convert a level-based inflow into a volume in
    /// legacy EPANET hydraulics, not needed once D/H/Q already report flow.
    pub area: f64,
    pub init_volume: f64,
    pub volume: f64,
    /// Size of the inner mixing compartment for `TwoCompartment` tanks;
    /// ignored otherwise.
    pub mix_compartment_volume: f64,
    /// Per-parameter kinetic value override, dense and indexed by `ParamId`.
    pub param_values: Vec<f64>,
    /// Current per-species concentration, dense and indexed by `SpeciesId`.
    pub quality: Vec<f64>,
}

impl Tank {
    pub fn is_two_compartment(&self) -> bool {
        matches!(self.mixing_model, MixingModel::TwoCompartment)
    }

    pub fn is_segmented(&self) -> bool {
        matches!(self.mixing_model, MixingModel::Fifo | MixingModel::Lifo)
    }
}
