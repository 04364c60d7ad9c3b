//! msx-chemistry: the reaction/equilibrium chemistry engine (spec §4.4).
//!
//! Partitions a network's species into per-zone rate/equilibrium/formula
//! groups at open time, then drives [`msx_solver`]'s ODE and Newton solvers
//! with derivative/residual callbacks built from [`context::EvalContext`].
//! Stateless between calls beyond the partition itself: every `react` call
//! receives the zone's concentration vector and parameter overrides fresh
//! from its caller (`msx-transport`, for segments and tank compartments).

pub mod context;
pub mod coupling;
pub mod engine;
pub mod error;
pub mod partition;

pub use context::EvalContext;
pub use coupling::Coupling;
pub use engine::{ChemistryEngine, ZoneKind};
pub use error::{ChemistryError, ChemistryResult};
pub use partition::SpeciesPartition;
