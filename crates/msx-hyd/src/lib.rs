//! msx-hyd: sequential reader over a precomputed hydraulics solution
//! (spec §4 "Hydraulic reader", §6 "Hydraulics file").
//!
//! Hands the solver its external physical inputs. This crate only replays
//! a precomputed per-link-flow / per-node-demand-and-head record stream —
//! the hydraulic solve itself is an external collaborator (spec §1).

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{HydError, HydResult};
pub use reader::{HydReader, HydStep};
pub use writer::HydWriter;
