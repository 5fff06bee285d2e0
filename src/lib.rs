//! # readlisp - An extensible-reader Lisp
//!
//! A small Lisp interpreter built around two pieces:
//!
//! - a **readtable reader**: every character position consults a table of
//!   reader macros, so quoting, collections, keywords, characters, strings and
//!   comments are all handlers that can be replaced or extended;
//! - a **trampolined evaluator**: tail positions loop instead of recursing, so
//!   tail-recursive programs run in constant stack space.
//!
//! ## Quick Start
//!
//! ```rust
//! use readlisp::{Evaluator, Expr};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut evaluator = Evaluator::new();
//! let result = evaluator.eval_str(
//!     r#"
//!     (def sum-to (fn* [n acc]
//!       (if (= n 0) acc (sum-to (- n 1) (+ acc n)))))
//!     (sum-to 10 0)
//!     "#,
//! )?;
//!
//! assert_eq!(result, Expr::Int(55));
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading Without Evaluating
//!
//! ```rust
//! use readlisp::{Expr, ReadTable};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reader = ReadTable::new("'foo 0x10 015");
//! assert_eq!(
//!     reader.read()?,
//!     Some(Expr::seq(vec![Expr::symbol("quote"), Expr::symbol("foo")]))
//! );
//! assert_eq!(reader.read()?, Some(Expr::Int(16)));
//! assert_eq!(reader.read()?, Some(Expr::Int(13))); // leading zero is octal
//! assert_eq!(reader.read()?, None);
//! # Ok(())
//! # }
//! ```
//!
//! ## Language Overview
//!
//! ### Data Types
//! - `nil`, `true`, `false`
//! - Integers (`42`, `0xff`, `0b101`, `017`), big integers (`12n`), floats (`3.14`)
//! - Characters (`\a`, `\newline`, `\u0041`), strings (`"hi\n"`)
//! - Symbols, keywords (`:name`)
//! - Lists `(1 2 3)`, vectors `[1 2 3]`, maps `{:a 1}`
//!
//! ### Special Forms
//! - `def`, `let*`, `do`, `if`, `fn*`
//! - `quote`, `quasiquote` (`` ` ``, `~`, `~@`), `quasiquote-expand`
//! - `defmacro`, `macroexpand`
//! - `try` / `catch`
//!
//! ## Macros and Quasiquote
//!
//! ```rust
//! use readlisp::{Evaluator, Expr};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut evaluator = Evaluator::new();
//! evaluator.eval_str("(defmacro unless [c then else] `(if ~c ~else ~then))")?;
//! assert_eq!(evaluator.eval_str("(unless false :a :b)")?, Expr::keyword("a"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Failures are [`Error`] values. Inside a program, `try`/`catch` binds the
//! error's message:
//!
//! ```rust
//! use readlisp::{Error, Evaluator, Expr};
//!
//! let mut evaluator = Evaluator::new();
//! assert_eq!(
//!     evaluator.eval_str(r#"(try (throw "boom") (catch e e))"#).unwrap(),
//!     Expr::string("boom")
//! );
//!
//! match evaluator.eval_str("(/ 10 0)") {
//!     Err(Error::DivisionByZero) => {}
//!     other => panic!("expected division by zero, got {:?}", other),
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`lexer`] - character sources, number/string scanners, identifier classes
//! - [`reader`] - the readtable and its standard reader macros
//! - [`runtime`] - expressions, scopes, printer and the evaluator
//! - [`tools`] - native functions seeded into the global scope

#![allow(clippy::result_large_err)] // Error carries positions and messages by value

/// Version of the readlisp interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod lexer;
pub mod reader;
pub mod runtime;
pub mod tools;

// Re-export main types
pub use error::{Error, ErrorPhase, Result};
pub use reader::{Read, ReadTable, ReaderConfig, ReaderMacro};
pub use runtime::{pr_str, Environment, Evaluator, Expr, InterpreterConfig};
pub use tools::{Tool, ToolRegistry};
