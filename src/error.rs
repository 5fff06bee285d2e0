//! Error types for the readlisp reader and evaluator

use thiserror::Error;

/// Reader and interpreter errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Reader errors
    /// Generic syntax error raised by a reader macro
    ///
    /// **Triggered by:** Invalid escapes, keyword names that are not identifiers,
    /// map literals with an odd number of forms
    /// **Example:** `"\q"`, `:"1abc"`, `{:a}`
    #[error("Syntax error at line {line}, offset {offset}: {message}")]
    SyntaxError {
        /// Line number where error occurred
        line: usize,
        /// Absolute character offset where error occurred
        offset: usize,
        /// Error description
        message: String,
    },

    /// Unbalanced collection delimiter
    ///
    /// **Triggered by:** A collection that never closes, a closing delimiter
    /// with no opener, or a closing delimiter of the wrong kind
    /// **Example:** `(a b` (expects `)`), `)` alone, `(a]`
    #[error("Mismatched delimiter at line {line}, offset {offset}: {}", describe_mismatch(.expected, .found))]
    MismatchedDelimiter {
        /// The closing delimiter the reader was waiting for, `None` for a stray closer
        expected: Option<String>,
        /// The delimiter found instead, `None` at end of input
        found: Option<String>,
        /// Line number of the opening form (or the stray closer)
        line: usize,
        /// Absolute character offset of the opening form (or the stray closer)
        offset: usize,
    },

    /// Number lexeme that does not follow the number grammar
    ///
    /// **Triggered by:** Digits running into a non-delimiter character
    /// **Example:** `12abc`, `0xZZ`, `1e`
    #[error("Malformed number '{lexeme}' at line {line}, offset {offset}")]
    MalformedNumber {
        /// Characters consumed before the failure
        lexeme: String,
        /// Line number where the number started
        line: usize,
        /// Absolute character offset where the number started
        offset: usize,
    },

    /// String literal without a closing quote
    #[error("Unterminated string starting at line {line}, offset {offset}")]
    UnterminatedString {
        /// Line number of the opening quote
        line: usize,
        /// Absolute character offset of the opening quote
        offset: usize,
    },

    /// Character literal that is not a single character or a known name
    ///
    /// **Triggered by:** `\foo`, `\uD800` (surrogate), `\u12`
    #[error("Unsupported character literal '\\{literal}' at line {line}, offset {offset}")]
    UnsupportedCharacterLiteral {
        /// The literal text after the backslash
        literal: String,
        /// Line number of the literal
        line: usize,
        /// Absolute character offset of the literal
        offset: usize,
    },

    // Evaluation errors
    /// Reference to a symbol with no binding in the environment chain
    ///
    /// **Triggered by:** Using a name before `def` or outside its `let*`
    /// **Example:** `x` (when x was never defined)
    /// **Prevention:** Bind names with `(def x value)` before use
    #[error("Unbound symbol: {name}")]
    UnboundSymbol {
        /// Symbol name
        name: String,
    },

    /// Special form used with the wrong shape
    ///
    /// **Triggered by:** `(def x)`, `(let* (x 1) x)`, `(fn* x)`
    #[error("Malformed {form}: {reason}")]
    MalformedSpecialForm {
        /// Special form name
        form: String,
        /// What is wrong with it
        reason: String,
    },

    /// Write to a map that was created immutable
    ///
    /// **Triggered by:** `(assoc! {:a 1} :b 2)` (map literals are immutable)
    /// **Prevention:** Build mutable maps with `hash-map`
    #[error("Cannot mutate an immutable map")]
    ImmutableMutation,

    /// Attempt to call a non-callable value
    #[error("Value is not callable: {type_name}")]
    NotCallable {
        /// Type name of the value in head position
        type_name: String,
    },

    /// Invalid arguments passed to a function
    ///
    /// **Triggered by:** Wrong argument count or shape
    /// **Example:** `(first)`, `((fn* [a b] a) 1)`
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        /// Function name
        tool: String,
        /// Reason for invalid arguments
        reason: String,
    },

    /// Type mismatch error
    ///
    /// **Triggered by:** Operation expecting one type but receiving another
    /// **Example:** `(+ "hello" 5)`, `(< 1 2.0)`
    #[error("Type error: expected {expected}, got {got}")]
    TypeError {
        /// Expected type
        expected: String,
        /// Actual type
        got: String,
    },

    /// Integer division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Collection index out of bounds
    ///
    /// **Triggered by:** `(nth [1 2 3] 5)`
    #[error("Index out of bounds: {index} for collection of length {length}")]
    IndexOutOfBounds {
        /// Requested index
        index: i64,
        /// Collection length
        length: usize,
    },

    /// I/O failure while reading a file or stream
    #[error("I/O error: {0}")]
    IoError(String),

    /// Interpreter configuration that could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure raised by user code with `throw`
    ///
    /// Displays the bare message so `catch` binds exactly the thrown text.
    #[error("{0}")]
    Thrown(String),
}

fn describe_mismatch(expected: &Option<String>, found: &Option<String>) -> String {
    match (expected, found) {
        (Some(expected), Some(found)) => format!("expected {}, found {}", expected, found),
        (Some(expected), None) => format!("expected {}, found end of input", expected),
        (None, Some(found)) => format!("unexpected {}", found),
        (None, None) => "unbalanced input".to_string(),
    }
}

/// The stage at which an error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPhase {
    /// Raised while turning text into expressions
    Read,
    /// Raised while evaluating an expression
    Evaluate,
}

impl Error {
    /// Create a type error from expected and actual type names
    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeError {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create an arity or shape error for a named function
    pub fn invalid_args(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed special form error
    pub fn malformed(form: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedSpecialForm {
            form: form.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error by the stage that raised it
    pub fn phase(&self) -> ErrorPhase {
        match self {
            Error::SyntaxError { .. }
            | Error::MismatchedDelimiter { .. }
            | Error::MalformedNumber { .. }
            | Error::UnterminatedString { .. }
            | Error::UnsupportedCharacterLiteral { .. } => ErrorPhase::Read,
            _ => ErrorPhase::Evaluate,
        }
    }

    /// True when more input could complete the form that failed to read
    pub fn is_incomplete_input(&self) -> bool {
        matches!(
            self,
            Error::MismatchedDelimiter {
                expected: Some(_),
                found: None,
                ..
            } | Error::UnterminatedString { .. }
        )
    }
}

/// Result type for readlisp operations
pub type Result<T> = std::result::Result<T, Error>;
