use crate::topology::TopologyError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Topology(#[from] TopologyError),
    #[error("{0}")]
    Engine(#[from] msx_engine::EngineError),
    #[error("{0}")]
    Results(#[from] msx_results::ResultsError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
