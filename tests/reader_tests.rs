//! End-to-end tests for the readtable reader

use std::sync::Arc;

use num_bigint::BigInt;
use readlisp::reader::macros::{Accumulator, Collection, Delimiter};
use readlisp::{Error, Expr, Read, ReadTable, ReaderConfig, ReaderMacro};

fn read_one(source: &str) -> Result<Option<Expr>, Error> {
    ReadTable::new(source).read()
}

fn form(source: &str) -> Expr {
    read_one(source).unwrap().unwrap()
}

fn sym(name: &str) -> Expr {
    Expr::symbol(name)
}

// ====================
// Numbers
// ====================

#[test]
fn test_radix_literals() {
    assert_eq!(form("0x1123"), Expr::Int(0x1123));
    assert_eq!(form("0XfF"), Expr::Int(255));
    assert_eq!(form("0b1011"), Expr::Int(11));
    assert_eq!(form("0o17"), Expr::Int(15));
    assert_eq!(form("-0x10"), Expr::Int(-16));
}

#[test]
fn test_big_integer_suffix() {
    assert_eq!(
        form("0o7777777777n"),
        Expr::BigInt(BigInt::from(0o7777777777i64))
    );
    assert_eq!(form("5n"), Expr::BigInt(BigInt::from(5)));
    let huge: BigInt = "123456789012345678901234567890".parse().unwrap();
    assert_eq!(form("123456789012345678901234567890"), Expr::BigInt(huge));
}

#[test]
fn test_leading_zero_octal_backtracks() {
    assert_eq!(form("015"), Expr::Int(13));
    assert_eq!(form("015.5"), Expr::Float(15.5));
    assert_eq!(form("019"), Expr::Int(19));
    assert_eq!(form("0"), Expr::Int(0));
}

#[test]
fn test_floats() {
    assert_eq!(form("3.14159"), Expr::Float(3.14159));
    assert_eq!(form("1e3"), Expr::Float(1000.0));
    assert_eq!(form("-2.5E-1"), Expr::Float(-0.25));
}

#[test]
fn test_number_must_end_at_boundary() {
    assert!(matches!(
        read_one("123abc"),
        Err(Error::MalformedNumber { .. })
    ));
    assert_eq!(
        form("(1)"),
        Expr::seq(vec![Expr::Int(1)])
    );
    assert!(matches!(read_one("1.5n"), Err(Error::MalformedNumber { .. })));
}

#[test]
fn test_prefer_floats_both_ways() {
    let floats = ReaderConfig {
        prefer_floats: true,
    };
    let mut reader = ReadTable::with_config("10 015 019 2n", floats);
    assert_eq!(reader.read().unwrap(), Some(Expr::Float(10.0)));
    // only bare decimal integers are affected
    assert_eq!(reader.read().unwrap(), Some(Expr::Int(13)));
    assert_eq!(reader.read().unwrap(), Some(Expr::Int(19)));
    assert_eq!(reader.read().unwrap(), Some(Expr::BigInt(BigInt::from(2))));

    let mut reader = ReadTable::with_config("10", ReaderConfig::default());
    assert_eq!(reader.read().unwrap(), Some(Expr::Int(10)));
}

// ====================
// Collections and delimiters
// ====================

#[test]
fn test_read_plus_form() {
    assert_eq!(
        form("(+ 1 2 3)"),
        Expr::seq(vec![sym("+"), Expr::Int(1), Expr::Int(2), Expr::Int(3)])
    );
}

#[test]
fn test_unclosed_list() {
    match read_one("(a b") {
        Err(err @ Error::MismatchedDelimiter { .. }) => {
            assert!(err.is_incomplete_input());
            assert!(err.to_string().contains("expected )"));
        }
        other => panic!("expected mismatched delimiter, got {:?}", other),
    }
}

#[test]
fn test_stray_close_paren() {
    match read_one(")") {
        Err(err @ Error::MismatchedDelimiter { .. }) => {
            assert!(!err.is_incomplete_input());
            assert!(err.to_string().contains(")"));
        }
        other => panic!("expected mismatched delimiter, got {:?}", other),
    }
}

#[test]
fn test_nested_unclosed_reports_innermost() {
    match read_one("(a [b") {
        Err(Error::MismatchedDelimiter {
            expected: Some(expected),
            found: None,
            offset,
            ..
        }) => {
            assert_eq!(expected, "]");
            assert_eq!(offset, 3);
        }
        other => panic!("expected mismatched delimiter, got {:?}", other),
    }
}

#[test]
fn test_quote_at_end_of_list_is_incomplete() {
    match read_one("(list '\n") {
        Err(err @ Error::MismatchedDelimiter { .. }) => {
            assert!(err.is_incomplete_input());
            assert!(err.to_string().contains("expected )"));
        }
        other => panic!("expected mismatched delimiter, got {:?}", other),
    }
}

#[test]
fn test_keyword_and_character_at_end_of_collection() {
    assert!(matches!(
        read_one("(a :"),
        Err(Error::MismatchedDelimiter { expected: Some(ref e), found: None, .. }) if e == ")"
    ));
    assert!(matches!(
        read_one("[1 \\"),
        Err(Error::MismatchedDelimiter { expected: Some(ref e), found: None, .. }) if e == "]"
    ));
}

#[test]
fn test_error_positions_track_lines() {
    match read_one("(a\n b\n 12x)") {
        Err(Error::MalformedNumber { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected malformed number, got {:?}", other),
    }
}

// ====================
// Quoting and atoms
// ====================

#[test]
fn test_quote_sugar() {
    assert_eq!(form("'foo"), Expr::seq(vec![sym("quote"), sym("foo")]));
    assert_eq!(
        form("~@xs"),
        Expr::seq(vec![sym("splice-unquote"), sym("xs")])
    );
}

#[test]
fn test_special_form_symbols_are_tagged() {
    let from_reader = form("quote");
    let plain = Expr::Symbol(readlisp::runtime::Symbol::plain("quote"));
    assert_ne!(from_reader, plain);
    assert_eq!(from_reader, sym("quote"));
}

#[test]
fn test_keyword_interning() {
    match (form(":abc"), form(":\"abc\"")) {
        (Expr::Keyword(a), Expr::Keyword(b)) => assert!(a.ptr_eq(&b)),
        other => panic!("expected keywords, got {:?}", other),
    }
}

#[test]
fn test_string_escapes() {
    assert_eq!(form(r#""a\tb\nA""#), Expr::string("a\tb\nA"));
    assert!(matches!(
        read_one(r#""bad \q""#),
        Err(Error::SyntaxError { .. })
    ));
}

#[test]
fn test_read_all_forms() {
    let mut reader = ReadTable::new("1 :two \"three\" [4] ; five\n");
    let forms = reader.read_all().unwrap();
    assert_eq!(
        forms,
        vec![
            Expr::Int(1),
            Expr::keyword("two"),
            Expr::string("three"),
            Expr::vector(vec![Expr::Int(4)]),
        ]
    );
    assert!(reader.is_finished());
}

// ====================
// Extending the table
// ====================

struct Discard;

impl ReaderMacro for Discard {
    fn apply(&self, reader: &mut ReadTable, _trigger: char) -> readlisp::Result<Read> {
        match reader.read_operand("#")? {
            Read::Form(_) => Ok(Read::Skip),
            ended => Ok(ended),
        }
    }
}

#[test]
fn test_custom_prefix_at_end_of_vector() {
    let mut reader = ReadTable::new("[1 #");
    reader.add_macro('#', Arc::new(Discard));
    assert!(matches!(
        reader.read(),
        Err(Error::MismatchedDelimiter { found: None, .. })
    ));
}

#[test]
fn test_custom_discard_macro() {
    let mut reader = ReadTable::new("(1 #2 3)");
    reader.add_macro('#', Arc::new(Discard));
    assert_eq!(
        reader.read().unwrap(),
        Some(Expr::seq(vec![Expr::Int(1), Expr::Int(3)]))
    );
}

#[test]
fn test_custom_opener_waits_for_its_own_closer() {
    let mut reader = ReadTable::new("<1 2>");
    reader.add_macro('<', Arc::new(Accumulator::new(Collection::Vector)));
    reader.add_macro('>', Arc::new(Delimiter));
    // '>' now closes, but the vector accumulator waits for ']'
    assert!(matches!(
        reader.read(),
        Err(Error::MismatchedDelimiter { .. })
    ));
}
