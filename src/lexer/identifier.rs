//! Character classes for identifiers and whitespace
//!
//! These are pure functions so they can be tested and reused independently of
//! any reader state. Keyword names coming from strings are validated with them.

/// Punctuation allowed at the start of an identifier besides letters
const LEADING_PUNCTUATION: &[char] = &['_', '$', '*', '+', '!', '?', '<', '>', '=', '/', '&', '%'];

/// Whitespace separating tokens
pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace()
}

/// Characters an identifier ignores entirely: control characters that are not whitespace
pub fn is_ignorable(c: char) -> bool {
    c.is_control() && !c.is_whitespace()
}

/// Can `c` start an identifier?
pub fn is_identifier_start(c: char) -> bool {
    (c.is_alphabetic() || LEADING_PUNCTUATION.contains(&c)) && !is_ignorable(c)
}

/// Can `c` continue an identifier after its first character?
pub fn is_identifier_char(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit() || c == '\'' || c == '-' || c == '.'
}

/// True when the whole string is a well-formed identifier
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_char),
        _ => false,
    }
}
