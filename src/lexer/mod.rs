//! Lexical layer for the reader
//!
//! Character sources with push-back, plus the scanners the readtable calls for
//! numbers, strings and identifier validation.

pub mod identifier;
mod number;
mod source;
mod string;

pub use identifier::{is_identifier, is_identifier_char, is_identifier_start, is_whitespace};
pub use number::{starts_number, NumberLiteral, NumberScanner};
pub use source::{CharSource, CharStream, StrSource, StreamSource};
pub use string::{scan_string, ScannedString};
