//! Line-oriented tokenizer for the chemistry input-file format.
//!
//! Matches `original_source/src/inputmsx.c`'s `getNewSection`/`gettokens`
//! pair: `;` starts a trailing comment, whitespace separates tokens, and a
//! line whose first token opens with `[` is a section header rather than a
//! data line. `MAXTOKS` bounds how many tokens a single data line may carry.
use crate::error::ParseError;
use msx_core::InputErrorCode;

/// Matches `MAXTOKS` in `original_source/src/inputmsx.c`.
pub const MAX_TOKENS: usize = 40;

#[derive(Debug, Clone)]
pub struct Line {
    pub number: usize,
    pub tokens: Vec<String>,
    /// Comment-stripped line text, trimmed but otherwise unsplit. Used by
    /// `[TITLE]`, where internal spacing is significant.
    pub text: String,
}

impl Line {
    pub fn is_section_header(&self) -> bool {
        self.tokens
            .first()
            .is_some_and(|t| t.starts_with('['))
    }

    /// The section name with its brackets and any trailing comment text
    /// stripped, upper-cased for keyword matching.
    pub fn section_name(&self) -> Option<String> {
        let first = self.tokens.first()?;
        let trimmed = first.trim_start_matches('[').trim_end_matches(']');
        Some(trimmed.to_ascii_uppercase())
    }
}

/// Strip a `;`-prefixed comment and split the remainder into whitespace
/// tokens, dropping blank lines. `line_no` is 1-based, matching the error
/// messages a user would see for a flagged line.
pub fn tokenize(raw: &str, line_no: usize) -> Result<Option<Line>, ParseError> {
    let code = match raw.find(';') {
        Some(i) => &raw[..i],
        None => raw,
    };
    let tokens: Vec<String> = code.split_whitespace().map(str::to_owned).collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    if tokens.len() > MAX_TOKENS {
        return Err(ParseError {
            line: line_no,
            code: InputErrorCode::LineTooLong,
            detail: format!("line has more than {MAX_TOKENS} tokens"),
        });
    }
    Ok(Some(Line {
        number: line_no,
        tokens,
        text: code.trim().to_string(),
    }))
}

/// Tokenize every line of a chemistry input file, skipping blanks and
/// comment-only lines but keeping section headers in the stream.
pub fn tokenize_all(text: &str) -> Result<Vec<Line>, ParseError> {
    let mut lines = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        if let Some(line) = tokenize(raw, i + 1)? {
            lines.push(line);
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_splits_tokens() {
        let line = tokenize("BULK  Cl2   MG  ; chlorine", 3).unwrap().unwrap();
        assert_eq!(line.tokens, vec!["BULK", "Cl2", "MG"]);
    }

    #[test]
    fn blank_and_comment_only_lines_are_skipped() {
        assert!(tokenize("   ", 1).unwrap().is_none());
        assert!(tokenize("; just a comment", 2).unwrap().is_none());
    }

    #[test]
    fn recognizes_section_headers() {
        let line = tokenize("[SPECIES]", 1).unwrap().unwrap();
        assert!(line.is_section_header());
        assert_eq!(line.section_name().as_deref(), Some("SPECIES"));
    }

    #[test]
    fn rejects_too_many_tokens() {
        let long_line = (0..MAX_TOKENS + 1)
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let err = tokenize(&long_line, 5).unwrap_err();
        assert_eq!(err.code, InputErrorCode::LineTooLong);
    }
}
