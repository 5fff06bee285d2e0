//! Number literal scanning
//!
//! Grammar, decided one character at a time:
//!
//! ```text
//! number  := sign? (radix | octal | decimal)
//! radix   := '0' ('x'|'X' hex+ | 'b'|'B' bin+ | 'o'|'O' oct+) 'n'?
//! octal   := '0' digit+ 'n'?          (falls back to decimal on 8, 9, '.', 'e')
//!                                      (always an integer, even when floats are preferred)
//! decimal := digit+ ('.' digit*)? (('e'|'E') sign? digit+)? 'n'?
//! ```
//!
//! The `n` suffix forces an arbitrary-precision integer and is only legal on
//! integer-shaped lexemes. A number must end at end of input, whitespace, or a
//! character bound in the readtable.

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use super::identifier::is_whitespace;
use super::source::CharStream;
use crate::error::{Error, Result};

/// A scanned numeric literal
#[derive(Debug, Clone, PartialEq)]
pub enum NumberLiteral {
    /// Fits a native integer
    Integer(i64),
    /// Arbitrary precision, from the `n` suffix or native overflow
    BigInteger(BigInt),
    /// Floating point
    Float(f64),
}

/// Scanner state for one number token
pub struct NumberScanner<'a, F: Fn(char) -> bool> {
    stream: &'a mut CharStream,
    /// Is this character bound to a reader macro?
    is_bound: F,
    prefer_floats: bool,
    line: usize,
    /// Offset of the first character of the token
    start: usize,
    lexeme: String,
}

impl<'a, F: Fn(char) -> bool> NumberScanner<'a, F> {
    /// Creates a scanner; `first` is the already-consumed first character
    pub fn new(
        stream: &'a mut CharStream,
        first: char,
        is_bound: F,
        prefer_floats: bool,
        line: usize,
    ) -> Self {
        let start = stream.offset().saturating_sub(1);
        NumberScanner {
            stream,
            is_bound,
            prefer_floats,
            line,
            start,
            lexeme: first.to_string(),
        }
    }

    /// Scans the rest of the token
    pub fn scan(mut self) -> Result<NumberLiteral> {
        let mut first = self.first_char();
        let negative = first == '-';
        if first == '+' || first == '-' {
            first = match self.stream.advance() {
                Some(c) if c.is_ascii_digit() => c,
                _ => return Err(self.malformed()),
            };
            self.lexeme.push(first);
        }

        if first == '0' {
            match self.stream.peek() {
                Some('x') | Some('X') => return self.scan_radix(16, negative),
                Some('b') | Some('B') => return self.scan_radix(2, negative),
                Some('o') | Some('O') => return self.scan_radix(8, negative),
                Some(c) if c.is_ascii_digit() => return self.scan_leading_zero(negative),
                _ => {}
            }
        }

        self.scan_decimal(first, negative)
    }

    fn first_char(&self) -> char {
        self.lexeme.chars().next().unwrap_or('0')
    }

    fn malformed(&self) -> Error {
        Error::MalformedNumber {
            lexeme: self.lexeme.clone(),
            line: self.line,
            offset: self.start,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.stream.advance()?;
        self.lexeme.push(c);
        Some(c)
    }

    /// Consumes characters while `pred` holds, returning them
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(c) = self.stream.peek() {
            if !pred(c) {
                break;
            }
            self.bump();
            taken.push(c);
        }
        taken
    }

    /// Consumes an `n` suffix if one follows
    fn take_bigint_suffix(&mut self) -> bool {
        if self.stream.peek() == Some('n') {
            self.bump();
            true
        } else {
            false
        }
    }

    /// The token must stop here
    fn expect_boundary(&mut self) -> Result<()> {
        match self.stream.peek() {
            None => Ok(()),
            Some(c) if is_whitespace(c) || (self.is_bound)(c) => Ok(()),
            Some(_) => {
                self.bump();
                Err(self.malformed())
            }
        }
    }

    fn scan_radix(mut self, radix: u32, negative: bool) -> Result<NumberLiteral> {
        self.bump();
        let digits = self.take_while(|c| c.is_digit(radix));
        if digits.is_empty() {
            return Err(self.malformed());
        }
        let big = self.take_bigint_suffix();
        self.expect_boundary()?;
        self.integer(&digits, radix, negative, big)
    }

    fn scan_leading_zero(mut self, negative: bool) -> Result<NumberLiteral> {
        let digits = self.take_while(|c| c.is_ascii_digit());
        match self.stream.peek() {
            Some('.') | Some('e') | Some('E') => {
                let mantissa = format!("0{}", digits);
                return self.scan_fraction(mantissa, negative);
            }
            _ => {}
        }
        let big = self.take_bigint_suffix();
        self.expect_boundary()?;
        // leading-zero lexemes are integers whether or not floats are preferred
        let radix = if digits.chars().all(|c| c.is_digit(8)) { 8 } else { 10 };
        self.integer(&digits, radix, negative, big)
    }

    fn scan_decimal(mut self, first: char, negative: bool) -> Result<NumberLiteral> {
        let mut mantissa = first.to_string();
        mantissa.push_str(&self.take_while(|c| c.is_ascii_digit()));
        match self.stream.peek() {
            Some('.') | Some('e') | Some('E') => self.scan_fraction(mantissa, negative),
            _ => {
                let big = self.take_bigint_suffix();
                self.expect_boundary()?;
                self.decimal_integer(&mantissa, negative, big)
            }
        }
    }

    /// Fraction and exponent after an integer mantissa
    fn scan_fraction(mut self, mut text: String, negative: bool) -> Result<NumberLiteral> {
        if self.stream.peek() == Some('.') {
            self.bump();
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        if let Some(e) = self.stream.peek().filter(|c| *c == 'e' || *c == 'E') {
            self.bump();
            text.push(e);
            if let Some(sign) = self.stream.peek().filter(|c| *c == '+' || *c == '-') {
                self.bump();
                text.push(sign);
            }
            let exponent = self.take_while(|c| c.is_ascii_digit());
            if exponent.is_empty() {
                return Err(self.malformed());
            }
            text.push_str(&exponent);
        }
        self.expect_boundary()?;
        let value: f64 = text.parse().map_err(|_| self.malformed())?;
        Ok(NumberLiteral::Float(if negative { -value } else { value }))
    }

    fn decimal_integer(&self, digits: &str, negative: bool, big: bool) -> Result<NumberLiteral> {
        if self.prefer_floats && !big {
            let value: f64 = digits.parse().map_err(|_| self.malformed())?;
            return Ok(NumberLiteral::Float(if negative { -value } else { value }));
        }
        self.integer(digits, 10, negative, big)
    }

    fn integer(&self, digits: &str, radix: u32, negative: bool, big: bool) -> Result<NumberLiteral> {
        let magnitude =
            BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(|| self.malformed())?;
        let value = if negative { -magnitude } else { magnitude };
        if big {
            return Ok(NumberLiteral::BigInteger(value));
        }
        Ok(match value.to_i64() {
            Some(n) => NumberLiteral::Integer(n),
            None => NumberLiteral::BigInteger(value),
        })
    }
}

/// Can `c` (followed by `next`) begin a number token?
pub fn starts_number(c: char, next: Option<char>) -> bool {
    c.is_ascii_digit()
        || ((c == '+' || c == '-') && next.map_or(false, |n| n.is_ascii_digit()))
}
