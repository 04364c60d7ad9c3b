//! Network construction and validation errors.

use msx_core::{CoreError, LinkId, NodeId, ParamId, PatternId, SpeciesId, TankId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// A link refers to a node that doesn't exist.
    InvalidNodeRef { link: LinkId, node: NodeId },

    /// A tank refers to a node that doesn't exist, or a node refers to a
    /// tank that doesn't exist.
    InvalidTankRef { node: NodeId, tank: TankId },

    /// A source/initial-quality entry names a species outside the network.
    InvalidSpeciesRef { what: &'static str, species: SpeciesId },

    /// A source names a pattern outside the network.
    InvalidPatternRef { node: NodeId, pattern: PatternId },

    /// A link/tank parameter override names a parameter outside the network.
    InvalidParamRef { link: LinkId, param: ParamId },

    /// Two nodes or two links share the same identifier string.
    DuplicateName { what: &'static str, name: String },

    /// (I4) a species' pipe-expression kind isn't one of {rate, formula,
    /// none}, or its tank-expression kind isn't one of {rate, formula,
    /// equilibrium, none}.
    BadExprKind { species: SpeciesId, zone: &'static str },

    /// A link's start and end node are the same.
    DegenerateLink { link: LinkId },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::InvalidNodeRef { link, node } => {
                write!(f, "link {link} refers to non-existent node {node}")
            }
            NetworkError::InvalidTankRef { node, tank } => {
                write!(f, "node {node} refers to non-existent tank {tank}")
            }
            NetworkError::InvalidSpeciesRef { what, species } => {
                write!(f, "{what} refers to non-existent species {species}")
            }
            NetworkError::InvalidPatternRef { node, pattern } => {
                write!(f, "node {node} refers to non-existent pattern {pattern}")
            }
            NetworkError::InvalidParamRef { link, param } => {
                write!(f, "link {link} refers to non-existent parameter {param}")
            }
            NetworkError::DuplicateName { what, name } => {
                write!(f, "{what} name '{name}' is used more than once")
            }
            NetworkError::BadExprKind { species, zone } => {
                write!(f, "species {species} has an invalid {zone} expression kind")
            }
            NetworkError::DegenerateLink { link } => {
                write!(f, "link {link} starts and ends at the same node")
            }
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<NetworkError> for CoreError {
    fn from(err: NetworkError) -> Self {
        CoreError::Invariant {
            what: Box::leak(err.to_string().into_boxed_str()),
        }
    }
}

pub type NetworkResult<T> = Result<T, NetworkError>;
