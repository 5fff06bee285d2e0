//! Standard reader macros
//!
//! | Trigger | Handler |
//! |---|---|
//! | `(` `[` `{` | [`Accumulator`] collecting forms into a list, vector or map |
//! | `)` `]` `}` | [`Delimiter`] reporting the closing character |
//! | `'` `` ` `` `~` `~@` | [`Wrap`] / [`Unquote`] building `(quote x)` and friends |
//! | `:` | [`KeywordMacro`] |
//! | `\` | [`CharacterMacro`] |
//! | `"` | [`StringMacro`] |
//! | `;` | [`CommentMacro`] |
//! | newline | [`NewlineMacro`] |

use std::sync::Arc;

use super::{Read, ReadTable, ReaderMacro};
use crate::error::{Error, Result};
use crate::lexer::{is_identifier, is_whitespace, scan_string};
use crate::runtime::{Expr, Map};

/// Binds every standard handler into `reader`
pub fn install_standard(reader: &mut ReadTable) {
    reader.add_macro('(', Arc::new(Accumulator::new(Collection::List)));
    reader.add_macro('[', Arc::new(Accumulator::new(Collection::Vector)));
    reader.add_macro('{', Arc::new(Accumulator::new(Collection::Map)));
    for close in [')', ']', '}'] {
        reader.add_macro(close, Arc::new(Delimiter));
    }
    reader.add_macro('\'', Arc::new(Wrap::new("quote")));
    reader.add_macro('`', Arc::new(Wrap::new("quasiquote")));
    reader.add_macro('~', Arc::new(Unquote));
    reader.add_macro(':', Arc::new(KeywordMacro));
    reader.add_macro('\\', Arc::new(CharacterMacro));
    reader.add_macro('"', Arc::new(StringMacro));
    reader.add_macro(';', Arc::new(CommentMacro));
    reader.add_macro('\n', Arc::new(NewlineMacro));
}

/// Shape an [`Accumulator`] reduces its forms into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// `( ... )`
    List,
    /// `[ ... ]`
    Vector,
    /// `{ k v ... }`, always immutable
    Map,
}

impl Collection {
    fn closer(self) -> &'static str {
        match self {
            Collection::List => ")",
            Collection::Vector => "]",
            Collection::Map => "}",
        }
    }
}

/// Reads forms until its own closing delimiter
pub struct Accumulator {
    kind: Collection,
}

impl Accumulator {
    /// Accumulator reducing into `kind`
    pub fn new(kind: Collection) -> Self {
        Accumulator { kind }
    }

    fn reduce(&self, items: Vec<Expr>, line: usize, offset: usize) -> Result<Expr> {
        match self.kind {
            Collection::List => Ok(Expr::seq(items)),
            Collection::Vector => Ok(Expr::vector(items)),
            Collection::Map => {
                if items.len() % 2 != 0 {
                    return Err(Error::SyntaxError {
                        line,
                        offset,
                        message: format!(
                            "map literal needs an even number of forms, got {}",
                            items.len()
                        ),
                    });
                }
                let mut iter = items.into_iter();
                let mut pairs = Vec::new();
                while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
                    pairs.push((k, v));
                }
                Ok(Expr::Map(Map::from_pairs(pairs, false)))
            }
        }
    }
}

impl ReaderMacro for Accumulator {
    fn apply(&self, reader: &mut ReadTable, _trigger: char) -> Result<Read> {
        let line = reader.line();
        let offset = reader.offset().saturating_sub(1);
        let closer = self.kind.closer();
        let mut items = Vec::new();

        loop {
            match reader.read_form()? {
                Read::Form(expr) => items.push(expr),
                Read::Close(found) if found == closer => {
                    return self.reduce(items, line, offset).map(Read::Form);
                }
                Read::Close(found) => {
                    return Err(Error::MismatchedDelimiter {
                        expected: Some(closer.to_string()),
                        found: Some(found),
                        line,
                        offset,
                    })
                }
                Read::Skip => continue,
                Read::Eof | Read::Truncated { .. } => {
                    return Err(Error::MismatchedDelimiter {
                        expected: Some(closer.to_string()),
                        found: None,
                        line,
                        offset,
                    })
                }
            }
        }
    }
}

/// Closing delimiter; reports itself to whichever accumulator is open
pub struct Delimiter;

impl ReaderMacro for Delimiter {
    fn apply(&self, _reader: &mut ReadTable, trigger: char) -> Result<Read> {
        Ok(Read::Close(trigger.to_string()))
    }
}

/// Wraps the next form as `(head form)`
pub struct Wrap {
    head: &'static str,
}

impl Wrap {
    /// Prefix macro producing `(head form)`
    pub fn new(head: &'static str) -> Self {
        Wrap { head }
    }
}

impl ReaderMacro for Wrap {
    fn apply(&self, reader: &mut ReadTable, trigger: char) -> Result<Read> {
        match reader.read_operand(&trigger.to_string())? {
            Read::Form(operand) => Ok(Read::Form(Expr::seq(vec![
                Expr::symbol(self.head),
                operand,
            ]))),
            ended => Ok(ended),
        }
    }
}

/// `~form` is `(unquote form)`, `~@form` is `(splice-unquote form)`
pub struct Unquote;

impl ReaderMacro for Unquote {
    fn apply(&self, reader: &mut ReadTable, _trigger: char) -> Result<Read> {
        let (head, context) = if reader.peek() == Some('@') {
            reader.advance();
            ("splice-unquote", "~@")
        } else {
            ("unquote", "~")
        };
        match reader.read_operand(context)? {
            Read::Form(operand) => Ok(Read::Form(Expr::seq(vec![Expr::symbol(head), operand]))),
            ended => Ok(ended),
        }
    }
}

/// `:name` or `:"name"`
pub struct KeywordMacro;

impl ReaderMacro for KeywordMacro {
    fn apply(&self, reader: &mut ReadTable, _trigger: char) -> Result<Read> {
        let (line, offset) = (reader.line(), reader.offset().saturating_sub(1));
        let name = match reader.read_operand(":")? {
            Read::Form(name) => name,
            ended => return Ok(ended),
        };
        let keyword = match name {
            Expr::Symbol(sym) => Expr::keyword(sym.name()),
            Expr::String(name) if is_identifier(&name) => Expr::keyword(&name),
            Expr::Nil => Expr::keyword("nil"),
            Expr::True => Expr::keyword("true"),
            Expr::False => Expr::keyword("false"),
            other => {
                return Err(Error::SyntaxError {
                    line,
                    offset,
                    message: format!("invalid keyword name: {}", other),
                })
            }
        };
        Ok(Read::Form(keyword))
    }
}

/// Names accepted after a backslash
const NAMED_CHARACTERS: &[(&str, char)] = &[
    ("newline", '\n'),
    ("space", ' '),
    ("tab", '\t'),
    ("backspace", '\u{8}'),
    ("formfeed", '\u{c}'),
    ("return", '\r'),
];

/// `\c`, `\newline` and friends, `\uXXXX`
pub struct CharacterMacro;

impl CharacterMacro {
    fn decode(literal: &str) -> Option<char> {
        let mut chars = literal.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(c);
        }
        if let Some((_, c)) = NAMED_CHARACTERS.iter().find(|(name, _)| *name == literal) {
            return Some(*c);
        }
        let hex = literal.strip_prefix('u')?;
        if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        // from_u32 rejects surrogates
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    }
}

impl ReaderMacro for CharacterMacro {
    fn apply(&self, reader: &mut ReadTable, _trigger: char) -> Result<Read> {
        let (line, offset) = (reader.line(), reader.offset().saturating_sub(1));
        let mut literal = match reader.advance() {
            Some(first) => first.to_string(),
            None => return Ok(reader.truncated("\\", line, reader.offset())),
        };
        while let Some(c) = reader.advance() {
            if is_whitespace(c) || reader.is_bound(c) {
                reader.unread(c);
                break;
            }
            literal.push(c);
        }
        match Self::decode(&literal) {
            Some(c) => Ok(Read::Form(Expr::Char(c))),
            None => Err(Error::UnsupportedCharacterLiteral {
                literal,
                line,
                offset,
            }),
        }
    }
}

/// String literal
pub struct StringMacro;

impl ReaderMacro for StringMacro {
    fn apply(&self, reader: &mut ReadTable, _trigger: char) -> Result<Read> {
        let (line, offset) = (reader.line(), reader.offset().saturating_sub(1));
        let scanned = scan_string(reader.stream(), line, offset)?;
        reader.bump_line(scanned.newlines);
        Ok(Read::Form(Expr::String(scanned.value)))
    }
}

/// `;` to end of line
pub struct CommentMacro;

impl ReaderMacro for CommentMacro {
    fn apply(&self, reader: &mut ReadTable, _trigger: char) -> Result<Read> {
        while let Some(c) = reader.advance() {
            if c == '\n' {
                // leave it for the newline macro
                reader.unread(c);
                break;
            }
        }
        Ok(Read::Skip)
    }
}

/// Counts lines
pub struct NewlineMacro;

impl ReaderMacro for NewlineMacro {
    fn apply(&self, reader: &mut ReadTable, _trigger: char) -> Result<Read> {
        reader.bump_line(1);
        Ok(Read::Skip)
    }
}
