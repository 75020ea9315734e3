//! Escaped-record codec for the flat job configuration
//!
//! Structured settings travel to workers as plain strings, so every value this
//! crate stores is built from two nesting levels:
//!
//! - a *record*: an ordered list of fields joined by [`FIELD_DELIMITER`]
//! - a *list*: an ordered list of record tokens joined by [`LIST_DELIMITER`]
//!
//! Each level escapes its own delimiter and [`ESCAPE`] with a leading
//! [`ESCAPE`], so any field content survives, delimiters and NUL included.
//! A sequence made of exactly one empty element is written as the marker
//! `\.` to keep it distinct from the empty sequence.

use thiserror::Error;

/// Separates the fields of one record
pub const FIELD_DELIMITER: char = ':';

/// Separates the records of one list
pub const LIST_DELIMITER: char = ',';

/// Escapes a delimiter or itself
pub const ESCAPE: char = '\\';

const EMPTY_MARKER: char = '.';

/// Errors raised while decoding an escaped string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("dangling escape at end of input (position {position})")]
    DanglingEscape { position: usize },

    #[error("unknown escape sequence '\\{found}' at position {position}")]
    UnknownEscape { found: char, position: usize },

    #[error("empty-element marker at position {position} must be the whole input")]
    MisplacedEmptyMarker { position: usize },
}

/// Encode the fields of one record into a single token
pub fn encode_record<S: AsRef<str>>(fields: &[S]) -> String {
    join_escaped(fields, FIELD_DELIMITER)
}

/// Decode a token produced by [`encode_record`]
pub fn decode_record(token: &str) -> Result<Vec<String>, CodecError> {
    split_escaped(token, FIELD_DELIMITER)
}

/// Encode a list of tokens into one string
pub fn encode_list<S: AsRef<str>>(tokens: &[S]) -> String {
    join_escaped(tokens, LIST_DELIMITER)
}

/// Decode a string produced by [`encode_list`]
pub fn decode_list(encoded: &str) -> Result<Vec<String>, CodecError> {
    split_escaped(encoded, LIST_DELIMITER)
}

/// Append a token to an encoded list, validating what is already there
///
/// `None` stands for a list that was never written.
pub fn append_to_list(existing: Option<&str>, token: &str) -> Result<String, CodecError> {
    let mut tokens = match existing {
        Some(encoded) => decode_list(encoded)?,
        None => Vec::new(),
    };
    tokens.push(token.to_string());
    Ok(encode_list(&tokens))
}

fn join_escaped<S: AsRef<str>>(items: &[S], delimiter: char) -> String {
    if let [only] = items {
        if only.as_ref().is_empty() {
            return format!("{ESCAPE}{EMPTY_MARKER}");
        }
    }

    let mut out = String::new();
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            out.push(delimiter);
        }
        for c in item.as_ref().chars() {
            if c == ESCAPE || c == delimiter {
                out.push(ESCAPE);
            }
            out.push(c);
        }
    }
    out
}

fn split_escaped(input: &str, delimiter: char) -> Result<Vec<String>, CodecError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = input.char_indices();

    while let Some((position, c)) = chars.next() {
        if c == delimiter {
            items.push(std::mem::take(&mut current));
            continue;
        }
        if c != ESCAPE {
            current.push(c);
            continue;
        }
        match chars.next() {
            None => return Err(CodecError::DanglingEscape { position }),
            Some((_, next)) if next == ESCAPE || next == delimiter => current.push(next),
            Some((_, EMPTY_MARKER)) => {
                // only valid as the complete input
                if position != 0 || input.len() != 2 {
                    return Err(CodecError::MisplacedEmptyMarker { position });
                }
            }
            Some((_, found)) => return Err(CodecError::UnknownEscape { found, position }),
        }
    }

    items.push(current);
    Ok(items)
}
