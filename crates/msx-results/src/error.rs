//! Binary results file and text report errors.

use msx_core::RuntimeErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("results file has an unrecognized or mismatched header")]
    BadHeader,

    #[error("results file ended in the middle of a record")]
    TruncatedRecord,
}

pub type ResultsResult<T> = Result<T, ResultsError>;

impl From<ResultsError> for RuntimeErrorCode {
    fn from(err: ResultsError) -> Self {
        match err {
            ResultsError::Io(_) | ResultsError::BadHeader | ResultsError::TruncatedRecord => {
                RuntimeErrorCode::IoOutFile
            }
        }
    }
}
