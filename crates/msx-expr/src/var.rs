use msx_core::{ConstId, HydVar, ParamId, SpeciesId, TermId};

/// A resolved reference to one of the five kinds of value a reaction
/// expression can read.
///
/// The legacy evaluator carries a single flat `ivar` integer and decodes its
/// kind from which cumulative offset range it falls in (species table, then
/// term table, then...). Here the kind is decided once, by whoever builds the
/// expression (`msx-input`'s parser), and baked into the opcode stream as a
/// tagged value instead of a raw offset — resolution at evaluation time is
/// then a single match, not an offset-table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarRef {
    Species(SpeciesId),
    Term(TermId),
    Param(ParamId),
    Const(ConstId),
    Hyd(HydVar),
}
