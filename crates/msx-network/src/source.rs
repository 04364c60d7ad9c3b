use msx_core::{PatternId, SpeciesId};

/// Source kind, as read from a `[SOURCES]` line (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceKind {
    Concentration,
    MassBooster,
    SetpointBooster,
    FlowPacedBooster,
}

/// A node-local injection of one species. Nodes may carry more than one
/// `Source` for the same species; per the recorded contract (spec §9 "Open
/// questions"), their contributed mass rates sum.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Source {
    pub kind: SourceKind,
    pub species: SpeciesId,
    pub base_value: f64,
    pub pattern: Option<PatternId>,
}
