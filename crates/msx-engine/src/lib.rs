//! msx-engine: the top-level project/run orchestration (spec §5).
//!
//! Sits above the physics crates and exposes a single service-layer entry
//! point ([`project::Project`]) that a thin CLI frontend can drive without
//! knowing the wiring between the solver, the transport model, and the
//! results store. The lifecycle matches the legacy toolkit's
//! `MSXopen`/`MSXusehydfile`/`MSXinit`/`MSXstep`/`MSXclose` calling
//! convention (`original_source/src/toolkitmsx.c`).

pub mod error;
pub mod project;

pub use error::{EngineError, EngineResult};
pub use project::Project;
