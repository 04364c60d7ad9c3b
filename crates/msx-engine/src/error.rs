//! Aggregate error type for the `Project` service layer: every backend
//! crate's error type converges here so a caller only has to match on one
//! enum.

use msx_core::RuntimeErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("chemistry input file error: {0}")]
    Input(#[from] msx_input::InputError),

    #[error("network error: {0}")]
    Network(#[from] msx_network::NetworkError),

    #[error("hydraulics file error: {0}")]
    Hyd(#[from] msx_hyd::HydError),

    #[error("results file error: {0}")]
    Results(#[from] msx_results::ResultsError),

    #[error("chemistry reaction error: {0}")]
    Chemistry(#[from] msx_chemistry::ChemistryError),

    #[error("transport error: {0}")]
    Transport(#[from] msx_transport::TransportError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("a project must be opened before calling this")]
    NotOpened,

    #[error("a project is already opened")]
    AlreadyOpened,

    #[error("no hydraulics file has been attached")]
    NoHydFile,
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<EngineError> for RuntimeErrorCode {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Input(_) => RuntimeErrorCode::MsxInput,
            EngineError::Network(_) => RuntimeErrorCode::InvalidObjectParams,
            EngineError::Hyd(e) => e.into(),
            EngineError::Results(e) => e.into(),
            EngineError::Chemistry(e) => e.into(),
            EngineError::Transport(e) => e.into(),
            EngineError::Io(_) => RuntimeErrorCode::IoOutFile,
            EngineError::NotOpened => RuntimeErrorCode::NotOpened,
            EngineError::AlreadyOpened => RuntimeErrorCode::AlreadyOpened,
            EngineError::NoHydFile => RuntimeErrorCode::NoEpanetFile,
        }
    }
}
