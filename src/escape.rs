//! Escaping Grammar
//!
//! `,` separates fields, `!` separates nodes, `\` escapes either of them or
//! itself. Nothing else may follow a backslash.

use thiserror::Error;

pub const FIELD_SEPARATOR: char = ',';
pub const NODE_SEPARATOR: char = '!';
pub const ESCAPE: char = '\\';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscapeError {
    #[error("invalid escape sequence at byte {position}: backslash followed by {found:?}")]
    InvalidEscape { position: usize, found: char },

    #[error("dangling backslash at byte {position}")]
    DanglingEscape { position: usize },
}

fn is_reserved(c: char) -> bool {
    c == FIELD_SEPARATOR || c == NODE_SEPARATOR || c == ESCAPE
}

/// Prefix every reserved character with a backslash.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if is_reserved(c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Exact inverse of [`escape`].
pub fn unescape(value: &str) -> Result<String, EscapeError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.char_indices();
    while let Some((position, c)) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some((_, next)) if is_reserved(next) => out.push(next),
            Some((_, found)) => return Err(EscapeError::InvalidEscape { position, found }),
            None => return Err(EscapeError::DanglingEscape { position }),
        }
    }
    Ok(out)
}

/// Split on every unescaped `delimiter`, leaving escape sequences in place.
///
/// Always yields at least one (possibly empty) segment.
pub fn split_unescaped(input: &str, delimiter: char) -> Vec<&str> {
    let mut segments = vec![];
    let mut start = 0;
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == ESCAPE {
            chars.next();
        } else if c == delimiter {
            segments.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }
    segments.push(&input[start..]);
    segments
}
