//! msx-network: the static water-quality network model (spec §3).
//!
//! Provides:
//! - Entity types (`Species`, `Term`, `Parameter`, `Constant`, `Pattern`,
//!   `Source`, `Node`, `Link`, `Tank`)
//! - `NetworkBuilder`, an incremental builder with reference validation
//! - `Network`, the immutable, validated result
//!
//! # Example
//!
//! ```
//! use msx_network::NetworkBuilder;
//!
//! let mut builder = NetworkBuilder::new();
//! let n1 = builder.add_node("N1", true);
//! let n2 = builder.add_node("N2", true);
//! builder.add_link("P1", n1, n2, 1.0, 1000.0, 100.0, true);
//! let net = builder.build().unwrap();
//! assert_eq!(net.nodes().len(), 2);
//! assert_eq!(net.links().len(), 1);
//! ```

pub mod builder;
pub mod error;
pub mod link;
pub mod network;
pub mod node;
pub mod param;
pub mod pattern;
pub mod source;
pub mod species;
pub mod tank;
pub mod term;
pub(crate) mod validate;

pub use builder::NetworkBuilder;
pub use error::{NetworkError, NetworkResult};
pub use link::Link;
pub use network::Network;
pub use node::Node;
pub use param::{Constant, Parameter};
pub use pattern::Pattern;
pub use source::{Source, SourceKind};
pub use species::{ExprKind, Species, SpeciesKind, ZoneExpr};
pub use tank::{MixingModel, Tank};
pub use term::Term;
