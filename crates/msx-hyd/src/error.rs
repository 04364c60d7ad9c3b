use msx_core::RuntimeErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HydError {
    #[error("i/o error reading hydraulics file: {0}")]
    Io(#[from] std::io::Error),

    #[error("hydraulics file header is truncated or malformed")]
    BadHeader,

    #[error("hydraulics file record is truncated")]
    TruncatedRecord,
}

pub type HydResult<T> = Result<T, HydError>;

impl From<HydError> for RuntimeErrorCode {
    fn from(err: HydError) -> Self {
        match err {
            HydError::Io(_) | HydError::BadHeader | HydError::TruncatedRecord => {
                RuntimeErrorCode::ReadHydFile
            }
        }
    }
}
