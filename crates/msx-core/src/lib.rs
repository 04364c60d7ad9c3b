//! msx-core: stable foundation for the water-quality engine.
//!
//! Contains:
//! - ids (compact indices for species/nodes/links/tanks/... )
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error codes, mirroring the legacy 401-409 / 501-524 ranges)
//! - units (unit-conversion table `Ucf` and the legacy physical constants)

pub mod error;
pub mod hydvar;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult, InputErrorCode, RuntimeErrorCode};
pub use hydvar::{HydVar, HydVarSnapshot};
pub use ids::*;
pub use numeric::*;
pub use units::*;
