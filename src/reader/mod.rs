//! Readtable-driven reader
//!
//! There is no separate tokenizing pass. At every character position the reader
//! asks its table whether the character is bound to a [`ReaderMacro`]; if so the
//! handler takes over, otherwise the character is skipped (whitespace), starts a
//! number, or starts a symbol token.
//!
//! Handlers return a [`Read`] outcome instead of signalling through errors: a
//! closing delimiter is reported as [`Read::Close`] and the collection handler
//! that opened the group decides whether it matches.

pub mod macros;

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lexer::{is_whitespace, starts_number, CharStream, NumberScanner};
use crate::runtime::Expr;

/// Outcome of one step of the dispatch loop
#[derive(Debug, Clone, PartialEq)]
pub enum Read {
    /// A complete expression
    Form(Expr),
    /// A closing delimiter, by name
    Close(String),
    /// The handler consumed input but produced nothing (comments, newlines)
    Skip,
    /// End of input
    Eof,
    /// Input ended where a prefix macro expected its operand
    Truncated {
        /// The prefix that was left without an operand
        context: String,
        /// Line where the operand was expected
        line: usize,
        /// Absolute character offset where the operand was expected
        offset: usize,
    },
}

/// A handler bound to one or more characters in the readtable
///
/// The reader is passed explicitly so handlers can consume characters and read
/// nested forms.
pub trait ReaderMacro: Send + Sync {
    /// Runs the handler; `trigger` has already been consumed
    fn apply(&self, reader: &mut ReadTable, trigger: char) -> Result<Read>;
}

/// Reader settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Read bare integer lexemes (no `n` suffix, no radix prefix) as floats
    pub prefer_floats: bool,
}

/// Character stream plus the table of reader macros consulted while reading it
pub struct ReadTable {
    stream: CharStream,
    table: HashMap<char, Arc<dyn ReaderMacro>>,
    config: ReaderConfig,
    line: usize,
}

impl ReadTable {
    /// Reader over a string with the standard table
    pub fn new(text: &str) -> Self {
        Self::with_config(text, ReaderConfig::default())
    }

    /// Reader over a string with the standard table and `config`
    pub fn with_config(text: &str, config: ReaderConfig) -> Self {
        Self::from_stream(CharStream::from_text(text), config)
    }

    /// Reader pulling characters lazily from a buffered source
    pub fn from_reader<R: BufRead + 'static>(reader: R, config: ReaderConfig) -> Self {
        Self::from_stream(CharStream::from_reader(reader), config)
    }

    /// Reader over any character stream with the standard table
    pub fn from_stream(stream: CharStream, config: ReaderConfig) -> Self {
        let mut reader = ReadTable {
            stream,
            table: HashMap::new(),
            config,
            line: 1,
        };
        macros::install_standard(&mut reader);
        reader
    }

    /// Binds `trigger` to `handler`, replacing any existing binding
    pub fn add_macro(&mut self, trigger: char, handler: Arc<dyn ReaderMacro>) {
        self.table.insert(trigger, handler);
    }

    /// Removes the binding for `trigger`
    pub fn remove_macro(&mut self, trigger: char) {
        self.table.remove(&trigger);
    }

    /// Is `c` bound to a reader macro?
    pub fn is_bound(&self, c: char) -> bool {
        self.table.contains_key(&c)
    }

    /// Reads one expression; `None` at end of input
    ///
    /// A closing delimiter with no open group is a `MismatchedDelimiter`.
    pub fn read(&mut self) -> Result<Option<Expr>> {
        match self.read_form()? {
            Read::Form(expr) => Ok(Some(expr)),
            Read::Close(delimiter) => Err(self.stray_delimiter(delimiter)),
            Read::Skip | Read::Eof => Ok(None),
            Read::Truncated {
                context,
                line,
                offset,
            } => Err(Error::SyntaxError {
                line,
                offset,
                message: format!("expected a form after {}", context),
            }),
        }
    }

    /// Reads every remaining expression
    pub fn read_all(&mut self) -> Result<Vec<Expr>> {
        let mut forms = Vec::new();
        while let Some(expr) = self.read()? {
            forms.push(expr);
        }
        Ok(forms)
    }

    /// One pass of the dispatch loop; never returns [`Read::Skip`]
    pub fn read_form(&mut self) -> Result<Read> {
        loop {
            let c = match self.stream.advance() {
                Some(c) => c,
                None => return Ok(Read::Eof),
            };

            if let Some(handler) = self.table.get(&c).cloned() {
                tracing::trace!(trigger = %c, line = self.line, "reader macro");
                match handler.apply(self, c)? {
                    Read::Skip => continue,
                    outcome => return Ok(outcome),
                }
            }

            if is_whitespace(c) {
                continue;
            }

            if starts_number(c, self.stream.peek()) {
                let table = &self.table;
                let literal = NumberScanner::new(
                    &mut self.stream,
                    c,
                    |ch| table.contains_key(&ch),
                    self.config.prefer_floats,
                    self.line,
                )
                .scan()?;
                return Ok(Read::Form(Expr::from(literal)));
            }

            let token = self.read_token(c);
            return Ok(Read::Form(finish_token(&token)));
        }
    }

    /// Reads the expression a prefix macro applies to
    ///
    /// Yields [`Read::Form`], or [`Read::Truncated`] naming `context` when the
    /// input ends first, so an open collection can still report its closer.
    pub fn read_operand(&mut self, context: &str) -> Result<Read> {
        let (line, offset) = (self.line, self.offset());
        match self.read_form()? {
            Read::Close(delimiter) => Err(self.stray_delimiter(delimiter)),
            Read::Skip | Read::Eof => Ok(self.truncated(context, line, offset)),
            outcome => Ok(outcome),
        }
    }

    /// The outcome for a prefix at `line`/`offset` that found no operand
    pub fn truncated(&self, context: &str, line: usize, offset: usize) -> Read {
        Read::Truncated {
            context: context.to_string(),
            line,
            offset,
        }
    }

    /// Accumulates a symbol token up to whitespace or a bound character
    fn read_token(&mut self, first: char) -> String {
        let mut token = first.to_string();
        while let Some(c) = self.stream.advance() {
            if is_whitespace(c) || self.is_bound(c) {
                self.stream.unread(c);
                break;
            }
            token.push(c);
        }
        token
    }

    fn stray_delimiter(&self, delimiter: String) -> Error {
        Error::MismatchedDelimiter {
            expected: None,
            found: Some(delimiter),
            line: self.line,
            offset: self.offset().saturating_sub(1),
        }
    }

    /// True once no input remains
    pub fn is_finished(&mut self) -> bool {
        self.stream.is_finished()
    }

    /// Consumes the next character
    pub fn advance(&mut self) -> Option<char> {
        self.stream.advance()
    }

    /// Looks at the next character without consuming it
    pub fn peek(&mut self) -> Option<char> {
        self.stream.peek()
    }

    /// Pushes one character back
    pub fn unread(&mut self, c: char) {
        self.stream.unread(c);
    }

    /// The underlying character stream
    pub fn stream(&mut self) -> &mut CharStream {
        &mut self.stream
    }

    /// Current line, starting at 1
    pub fn line(&self) -> usize {
        self.line
    }

    /// Characters consumed so far
    pub fn offset(&self) -> usize {
        self.stream.offset()
    }

    /// Advances the line counter
    pub fn bump_line(&mut self, lines: usize) {
        self.line += lines;
    }

    /// Settings this reader was created with
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

/// Classifies a finished token as a literal or a symbol
fn finish_token(token: &str) -> Expr {
    match token {
        "nil" => Expr::Nil,
        "true" => Expr::True,
        "false" => Expr::False,
        name => Expr::symbol(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn read_one(text: &str) -> Result<Option<Expr>> {
        ReadTable::new(text).read()
    }

    fn sym(name: &str) -> Expr {
        Expr::symbol(name)
    }

    #[test]
    fn test_read_numbers() {
        assert_eq!(read_one("0x1123").unwrap(), Some(Expr::Int(0x1123)));
        assert_eq!(
            read_one("0o7777777777n").unwrap(),
            Some(Expr::BigInt(BigInt::from(0o7777777777i64)))
        );
        assert_eq!(read_one("3.14159").unwrap(), Some(Expr::Float(3.14159)));
        assert_eq!(read_one("015").unwrap(), Some(Expr::Int(13)));
        assert_eq!(read_one("015.5").unwrap(), Some(Expr::Float(15.5)));
        assert_eq!(read_one("-7").unwrap(), Some(Expr::Int(-7)));
    }

    #[test]
    fn test_prefer_floats_switch() {
        let mut floats = ReadTable::with_config(
            "42 0x10 7n",
            ReaderConfig {
                prefer_floats: true,
            },
        );
        assert_eq!(floats.read().unwrap(), Some(Expr::Float(42.0)));
        assert_eq!(floats.read().unwrap(), Some(Expr::Int(16)));
        assert_eq!(floats.read().unwrap(), Some(Expr::BigInt(BigInt::from(7))));

        assert_eq!(read_one("42").unwrap(), Some(Expr::Int(42)));
    }

    #[test]
    fn test_read_tokens() {
        assert_eq!(read_one("nil").unwrap(), Some(Expr::Nil));
        assert_eq!(read_one("true").unwrap(), Some(Expr::True));
        assert_eq!(read_one("false").unwrap(), Some(Expr::False));
        assert_eq!(read_one("foo-bar?").unwrap(), Some(sym("foo-bar?")));
        assert_eq!(read_one("-").unwrap(), Some(sym("-")));
        assert_eq!(read_one("if").unwrap(), Some(sym("if")));
        match read_one("if").unwrap() {
            Some(Expr::Symbol(s)) => assert!(s.is_special()),
            other => panic!("expected symbol, got {:?}", other),
        }
    }

    #[test]
    fn test_token_stops_at_bound_char() {
        let mut reader = ReadTable::new("abc(def)");
        assert_eq!(reader.read().unwrap(), Some(sym("abc")));
        assert_eq!(
            reader.read().unwrap(),
            Some(Expr::seq(vec![sym("def")]))
        );
    }

    #[test]
    fn test_read_list() {
        assert_eq!(
            read_one("(+ 1 2 3)").unwrap(),
            Some(Expr::seq(vec![
                sym("+"),
                Expr::Int(1),
                Expr::Int(2),
                Expr::Int(3)
            ]))
        );
    }

    #[test]
    fn test_eof_yields_none() {
        let mut reader = ReadTable::new("  \n ; comment only\n");
        assert_eq!(reader.read().unwrap(), None);
        assert!(reader.is_finished());
        assert_eq!(reader.read().unwrap(), None);
    }

    #[test]
    fn test_stray_closer() {
        match read_one(")") {
            Err(Error::MismatchedDelimiter {
                expected: None,
                found: Some(found),
                ..
            }) => assert_eq!(found, ")"),
            other => panic!("expected mismatched delimiter, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_number() {
        assert!(matches!(
            read_one("12abc"),
            Err(Error::MalformedNumber { .. })
        ));
    }

    #[test]
    fn test_line_tracking() {
        let mut reader = ReadTable::new("a\nb\n\"x\ny\"\nc");
        reader.read_all().unwrap();
        assert_eq!(reader.line(), 5);
    }

    #[test]
    fn test_streaming_source() {
        let input = std::io::Cursor::new("(def x 1)\n(+ x 2)\n".as_bytes().to_vec());
        let mut reader = ReadTable::from_reader(input, ReaderConfig::default());
        let forms = reader.read_all().unwrap();
        assert_eq!(forms.len(), 2);
        assert_eq!(
            forms[1],
            Expr::seq(vec![sym("+"), sym("x"), Expr::Int(2)])
        );
    }

    struct Bang;

    impl ReaderMacro for Bang {
        fn apply(&self, _reader: &mut ReadTable, _trigger: char) -> Result<Read> {
            Ok(Read::Form(Expr::keyword("bang")))
        }
    }

    #[test]
    fn test_custom_macro() {
        let mut reader = ReadTable::new("foo!");
        reader.add_macro('!', Arc::new(Bang));
        assert_eq!(reader.read().unwrap(), Some(sym("foo")));
        assert_eq!(reader.read().unwrap(), Some(Expr::keyword("bang")));
        assert_eq!(reader.read().unwrap(), None);
    }
}
