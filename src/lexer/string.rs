//! String literal scanning

use super::source::CharStream;
use crate::error::{Error, Result};

/// A scanned string literal body
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedString {
    /// Unescaped contents
    pub value: String,
    /// Raw newlines consumed inside the literal
    pub newlines: usize,
}

/// Scans a string body; the opening quote has already been consumed
///
/// `line` and `offset` locate the opening quote for error reporting.
pub fn scan_string(stream: &mut CharStream, line: usize, offset: usize) -> Result<ScannedString> {
    let mut value = String::new();
    let mut newlines = 0;

    loop {
        let c = stream
            .advance()
            .ok_or(Error::UnterminatedString { line, offset })?;
        match c {
            '"' => break,
            '\\' => {
                let escaped = stream
                    .advance()
                    .ok_or(Error::UnterminatedString { line, offset })?;
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    'b' => value.push('\u{8}'),
                    'f' => value.push('\u{c}'),
                    '\\' => value.push('\\'),
                    '"' => value.push('"'),
                    'u' => value.push(scan_unicode_escape(stream, line + newlines)?),
                    _ => {
                        return Err(Error::SyntaxError {
                            line: line + newlines,
                            offset: stream.offset(),
                            message: format!("Invalid escape sequence \\{}", escaped),
                        })
                    }
                }
            }
            '\n' => {
                newlines += 1;
                value.push(c);
            }
            _ => value.push(c),
        }
    }

    Ok(ScannedString { value, newlines })
}

fn scan_unicode_escape(stream: &mut CharStream, line: usize) -> Result<char> {
    let offset = stream.offset();
    let mut digits = String::with_capacity(4);
    for _ in 0..4 {
        match stream.advance() {
            Some(c) if c.is_ascii_hexdigit() => digits.push(c),
            Some(c) => {
                stream.unread(c);
                break;
            }
            None => break,
        }
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .filter(|_| digits.len() == 4)
        .and_then(char::from_u32)
        .ok_or_else(|| Error::SyntaxError {
            line,
            offset,
            message: format!("Invalid unicode escape \\u{}", digits),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(body: &str) -> Result<ScannedString> {
        let mut stream = CharStream::from_text(body);
        scan_string(&mut stream, 1, 0)
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(scan("hello\"").unwrap().value, "hello");
    }

    #[test]
    fn test_escaped_quote_does_not_terminate() {
        assert_eq!(scan(r#"say \"hi\"""#).unwrap().value, "say \"hi\"");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(scan(r#"a\nb\tc\\dA""#).unwrap().value, "a\nb\tc\\dA");
    }

    #[test]
    fn test_newlines_are_counted() {
        let scanned = scan("line1\nline2\nline3\"").unwrap();
        assert_eq!(scanned.newlines, 2);
    }

    #[test]
    fn test_unterminated_reports_start() {
        let mut stream = CharStream::from_text("never closed");
        let err = scan_string(&mut stream, 4, 17).unwrap_err();
        assert_eq!(err, Error::UnterminatedString { line: 4, offset: 17 });
    }

    #[test]
    fn test_invalid_escape() {
        assert!(matches!(scan(r#"\q""#), Err(Error::SyntaxError { .. })));
    }

    #[test]
    fn test_surrogate_escape_rejected() {
        assert!(matches!(scan(r#"\uD800""#), Err(Error::SyntaxError { .. })));
    }
}
