//! Keyword tables for the chemistry input-file format.
//!
//! Transcribed from `original_source/src/msxdict.h`, which is the
//! authoritative copy — `inputmsx.c` carries a slightly stale duplicate of
//! several of these tables (missing `COUPLING` from the options list, a
//! different `MassUnitsWords`) and is not used as the source here.

/// `[TITLE] [SPECIES] [COEFFICIENTS] [TERMS] [PIPES] [TANKS] [SOURCES]
/// [QUALITY] [PARAMETERS] [PATTERNS] [OPTIONS] [REPORT]`, in the order a
/// section header is recognized. Matching is case-insensitive and only the
/// text up to (not including) the closing `]` is significant.
pub const SECTION_WORDS: &[&str] = &[
    "TITLE",
    "SPECIES",
    "COEFFICIENTS",
    "TERMS",
    "PIPES",
    "TANKS",
    "SOURCES",
    "QUALITY",
    "PARAMETERS",
    "PATTERNS",
    "OPTIONS",
    "REPORT",
];

pub const REPORT_WORDS: &[&str] = &["NODE", "LINK", "SPECIE", "FILE", "PAGESIZE"];

pub const OPTION_TYPE_WORDS: &[&str] = &[
    "AREA_UNITS",
    "RATE_UNITS",
    "SOLVER",
    "COUPLING",
    "TIMESTEP",
    "RTOL",
    "ATOL",
    "REPORT_START",
    "REPORT_STEP",
];

pub const SOURCE_TYPE_WORDS: &[&str] = &["CONCEN", "MASS", "FLOWPACED", "SETPOINT"];

pub const MIXING_TYPE_WORDS: &[&str] = &["MIXED", "2COMP", "FIFO", "LIFO"];

pub const MASS_UNITS_WORDS: &[&str] = &["MG", "UG", "MOLE", "MMOL"];

pub const AREA_UNITS_WORDS: &[&str] = &["FT2", "M2", "CM2"];

pub const TIME_UNITS_WORDS: &[&str] = &["SEC", "MIN", "HR", "DAY"];

pub const SOLVER_TYPE_WORDS: &[&str] = &["EUL", "RK5", "ROS2"];

pub const COUPLING_WORDS: &[&str] = &["NONE", "FULL"];

pub const EXPR_TYPE_WORDS: &[&str] = &["RATE", "FORMULA", "EQUIL"];

/// Find a keyword in `table` case-insensitively, returning its index.
pub fn find_index(table: &[&str], word: &str) -> Option<usize> {
    table.iter().position(|kw| kw.eq_ignore_ascii_case(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_case_insensitive() {
        assert_eq!(find_index(SOLVER_TYPE_WORDS, "rk5"), Some(1));
        assert_eq!(find_index(SOLVER_TYPE_WORDS, "ROS2"), Some(2));
        assert_eq!(find_index(SOLVER_TYPE_WORDS, "bogus"), None);
    }

    #[test]
    fn options_include_coupling() {
        assert!(find_index(OPTION_TYPE_WORDS, "COUPLING").is_some());
    }
}
