//! msx-transport: segmented Lagrangian pipe transport and tank mixing
//! (spec §4.5-§4.7).
//!
//! Owns the per-link segment arena and drives one quality step's ordered
//! phases (direction, react, advect, accumulate, incident concentrations,
//! node update, source input, release) via [`QualityTransport`].

pub mod error;
pub mod hydvars;
pub mod link_segments;
pub mod segment;
pub mod source;
pub mod tank_mix;
pub mod transport;
pub mod wall;

pub use error::{TransportError, TransportResult};
pub use link_segments::LinkSegments;
pub use segment::{Segment, SegmentArena};
pub use transport::QualityTransport;
