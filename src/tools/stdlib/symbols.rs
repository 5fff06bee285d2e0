//! Symbol and keyword constructors

use crate::error::{Error, Result};
use crate::lexer::is_identifier;
use crate::runtime::{Expr, Symbol};
use crate::tools::{Tool, ToolRegistry};

/// Register symbol and keyword tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(SymbolTool);
    registry.register(KeywordTool);
}

/// symbol - Make a plain symbol from a string
///
/// The result never carries the special-form tag, so `(symbol "if")` is an
/// ordinary identifier.
pub struct SymbolTool;

impl Tool for SymbolTool {
    fn name(&self) -> &str {
        "symbol"
    }

    fn description(&self) -> &str {
        "Make a plain symbol from a string"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        match &args[0] {
            Expr::String(name) => Ok(Expr::Symbol(Symbol::plain(name))),
            Expr::Symbol(sym) => Ok(Expr::Symbol(Symbol::plain(sym.name()))),
            other => Err(Error::type_error("string", other.type_name())),
        }
    }
}

/// keyword - Make a keyword from a string, symbol or keyword
pub struct KeywordTool;

impl Tool for KeywordTool {
    fn name(&self) -> &str {
        "keyword"
    }

    fn description(&self) -> &str {
        "Make a keyword from a string or symbol"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        match &args[0] {
            kw @ Expr::Keyword(_) => Ok(kw.clone()),
            Expr::Symbol(sym) => Ok(Expr::keyword(sym.name())),
            Expr::String(name) if is_identifier(name) => Ok(Expr::keyword(name)),
            Expr::String(name) => Err(Error::invalid_args(
                self.name(),
                format!("{:?} is not a valid keyword name", name),
            )),
            other => Err(Error::type_error("string or symbol", other.type_name())),
        }
    }
}
