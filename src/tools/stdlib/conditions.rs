//! Raising errors from user code
//!
//! `throw` produces an error that `try`/`catch` can intercept like any other.

use crate::error::{Error, Result};
use crate::runtime::{pr_str, Expr};
use crate::tools::{Tool, ToolRegistry};

/// Register condition tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(ThrowTool);
}

/// throw - Signal an error carrying a value
///
/// Strings become the error message as-is; any other value is rendered in its
/// readable printed form.
pub struct ThrowTool;

impl Tool for ThrowTool {
    fn name(&self) -> &str {
        "throw"
    }

    fn description(&self) -> &str {
        "Signal an error carrying the given value"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        let message = match &args[0] {
            Expr::String(text) => text.clone(),
            other => pr_str(other, true),
        };
        Err(Error::Thrown(message))
    }
}
