//! Tokenized reaction-expression tree and evaluator (spec §4.1).
//!
//! A [`MathExpr`] is a flat postfix opcode stream built once by the chemistry
//! input reader and evaluated many times by the chemistry engine. Evaluation
//! never allocates beyond the one operand-stack `Vec` sized at construction,
//! is free of interior mutability, and is safe to call from any number of
//! zones concurrently since no state outlives a single `eval` call.

pub mod error;
pub mod expr;
pub mod opcode;
pub mod var;

pub use error::ExprError;
pub use expr::MathExpr;
pub use opcode::{Func, Opcode};
pub use var::VarRef;
