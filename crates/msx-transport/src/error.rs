use msx_chemistry::ChemistryError;
use msx_core::{CoreError, RuntimeErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("reaction failed: {0}")]
    Chemistry(#[from] ChemistryError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("link volume invariant violated on link index {link}: segments sum to {actual}, expected {expected}")]
    VolumeInvariant {
        link: u32,
        actual: f64,
        expected: f64,
    },
}

pub type TransportResult<T> = Result<T, TransportError>;

impl From<TransportError> for RuntimeErrorCode {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Chemistry(e) => e.into(),
            TransportError::Core(_) => RuntimeErrorCode::IllegalMath,
            TransportError::VolumeInvariant { .. } => RuntimeErrorCode::Integrator,
        }
    }
}
