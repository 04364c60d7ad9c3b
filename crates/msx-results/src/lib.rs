//! msx-results: the binary results store and text report writer (spec §6).
//!
//! Sits downstream of a solver, persisting a time series of per-object
//! state and offering a text rendering of it. This crate follows the
//! legacy MSX toolkit's single-file-per-run convention (`binout`),
//! matching `original_source/src/msxout.c`'s per-step save cadence but
//! replacing its embedded SQLite database with a flat binary float-array
//! file, and adds a standalone text reporter (`report`) grounded on
//! `original_source/src/reportmsx.c`.

pub mod binout;
pub mod error;
pub mod report;

pub use binout::{OutHeader, OutReader, OutStep, OutWriter};
pub use error::{ResultsError, ResultsResult};
pub use report::write_report;
