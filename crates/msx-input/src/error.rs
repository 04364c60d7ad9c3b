//! Chemistry input-file parsing errors.
//!
//! The legacy reader (`original_source/src/inputmsx.c`) does not stop at
//! the first bad line: it logs each one, keeps going, and only refuses to
//! open the project once it has collected `MAXERRS` of them. This module
//! mirrors that: [`ParseError`] carries a line number and an
//! [`InputErrorCode`] (401-409), and a full parse fails with the whole
//! batch rather than just the first offender.

use msx_core::InputErrorCode;
use msx_network::NetworkError;

/// Matches `MAXERRS` in `original_source/src/inputmsx.c`: once this many
/// errors have been collected, parsing gives up rather than reading the
/// rest of a badly malformed file.
pub const MAX_ERRORS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub code: InputErrorCode,
    pub detail: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {} ({})", self.line, self.code, self.detail)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("could not read chemistry input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} error(s) parsing chemistry input", .0.len())]
    Parse(Vec<ParseError>),

    #[error("chemistry input builds an invalid network: {0}")]
    Network(#[from] NetworkError),
}

pub type InputResult<T> = Result<T, InputError>;
