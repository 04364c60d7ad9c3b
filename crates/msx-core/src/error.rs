//! Shared error plumbing.
//!
//! The legacy toolkit reports two disjoint numeric ranges: input errors
//! 401-409 (collected while parsing a chemistry file) and runtime errors
//! 501-524 (raised while the project is open). Every error type further out
//! in the workspace eventually reduces to one of these codes so that the
//! process-level exit code contract in spec §6 can be honored.

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}

/// Input-file error codes 401-409, collected while parsing `[SECTIONS]`.
///
/// Messages match `original_source/src/inputmsx.c`'s `InpErrorTxt[]` table.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputErrorCode {
    #[error("Error 401 (too many characters)")]
    LineTooLong = 401,
    #[error("Error 402 (too few input items)")]
    TooFewItems = 402,
    #[error("Error 403 (invalid keyword)")]
    BadKeyword = 403,
    #[error("Error 404 (invalid numeric value)")]
    BadNumber = 404,
    #[error("Error 405 (reference to undefined object)")]
    UndefinedRef = 405,
    #[error("Error 406 (illegal use of a reserved name)")]
    ReservedName = 406,
    #[error("Error 407 (name already used by another object)")]
    DuplicateName = 407,
    #[error("Error 408 (species already assigned an expression)")]
    DuplicateExpr = 408,
    #[error("Error 409 (illegal math expression)")]
    IllegalMathExpr = 409,
}

impl InputErrorCode {
    pub const fn code(self) -> u32 {
        self as u32
    }
}

/// Runtime error codes 501-524, raised once a project is open.
///
/// Messages match `original_source/src/msxproj.c`'s `Errmsg[]` table.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorCode {
    #[error("insufficient memory available")]
    Memory = 501,
    #[error("no EPANET data file supplied")]
    NoEpanetFile = 502,
    #[error("could not open MSX input file")]
    OpenMsxFile = 503,
    #[error("could not open hydraulic results file")]
    OpenHydFile = 504,
    #[error("could not read hydraulic results file")]
    ReadHydFile = 505,
    #[error("could not read MSX input file")]
    MsxInput = 506,
    #[error("too few pipe reaction expressions")]
    NumPipeExpr = 507,
    #[error("too few tank reaction expressions")]
    NumTankExpr = 508,
    #[error("could not open differential equation solver")]
    IntegratorOpen = 509,
    #[error("could not open algebraic equation solver")]
    NewtonOpen = 510,
    #[error("could not open binary results file")]
    OpenOutFile = 511,
    #[error("read/write error on binary results file")]
    IoOutFile = 512,
    #[error("could not integrate reaction rate expressions")]
    Integrator = 513,
    #[error("could not solve reaction equilibrium expressions")]
    Newton = 514,
    #[error("reference made to an unknown type of object")]
    InvalidObjectType = 515,
    #[error("reference made to an illegal object index")]
    InvalidObjectIndex = 516,
    #[error("reference made to an undefined object ID")]
    UndefinedObjectId = 517,
    #[error("invalid property values were specified")]
    InvalidObjectParams = 518,
    #[error("an MSX project was not opened")]
    NotOpened = 519,
    #[error("an MSX project is already opened")]
    AlreadyOpened = 520,
    #[error("could not open MSX report file")]
    OpenRptFile = 521,
    #[error("could not compile chemistry functions")]
    CompileFailed = 522,
    #[error("could not load functions from compiled chemistry file")]
    CompiledLoad = 523,
    #[error("illegal math operation")]
    IllegalMath = 524,
}

impl RuntimeErrorCode {
    pub const fn code(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_codes_match_legacy_numbering() {
        assert_eq!(InputErrorCode::LineTooLong.code(), 401);
        assert_eq!(InputErrorCode::IllegalMathExpr.code(), 409);
    }

    #[test]
    fn runtime_codes_match_legacy_numbering() {
        assert_eq!(RuntimeErrorCode::Memory.code(), 501);
        assert_eq!(RuntimeErrorCode::IllegalMath.code(), 524);
    }

    #[test]
    fn runtime_message_text() {
        let msg = RuntimeErrorCode::Newton.to_string();
        assert!(msg.contains("equilibrium"));
    }
}
