use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable identifier used across the network and segment arena.
///
/// - `u32` keeps memory small even for large networks.
/// - `NonZero` lets `Option<Id>` be pointer-sized.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::new(index + 1).expect("index+1 is nonzero"))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    pub fn index_usize(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Domain-specific ID aliases (no runtime cost, `Id` underneath).
pub type NodeId = Id;
pub type LinkId = Id;
pub type TankId = Id;
pub type SpeciesId = Id;
pub type TermId = Id;
pub type ParamId = Id;
pub type ConstId = Id;
pub type PatternId = Id;
/// Index into the segment arena (`msx-transport`); segments are recycled
/// through a free list so this is a slot index, not a stable handle across
/// `remove`.
pub type SegId = Id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let id = Id::from_index(i);
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<Id>(),
            core::mem::size_of::<Option<Id>>()
        );
    }
}
