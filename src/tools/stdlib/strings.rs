//! String building and printing tools

use crate::error::Result;
use crate::runtime::{pr_str, Expr};
use crate::tools::{Tool, ToolRegistry};

/// Register string and printing tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(StrTool);
    registry.register(PrStrTool);
    registry.register(PrnTool);
    registry.register(PrintlnTool);
}

fn join(args: &[Expr], readably: bool, separator: &str) -> String {
    args.iter()
        .map(|arg| pr_str(arg, readably))
        .collect::<Vec<_>>()
        .join(separator)
}

/// str - Concatenate the display forms of the arguments
pub struct StrTool;

impl Tool for StrTool {
    fn name(&self) -> &str {
        "str"
    }

    fn description(&self) -> &str {
        "Concatenate the display forms of the arguments (nil contributes nothing)"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        let text: String = args
            .iter()
            .filter(|arg| !matches!(arg, Expr::Nil))
            .map(|arg| pr_str(arg, false))
            .collect();
        Ok(Expr::String(text))
    }
}

/// pr-str - Readable forms joined by spaces
pub struct PrStrTool;

impl Tool for PrStrTool {
    fn name(&self) -> &str {
        "pr-str"
    }

    fn description(&self) -> &str {
        "Readable forms of the arguments joined by spaces"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        Ok(Expr::String(join(args, true, " ")))
    }
}

/// prn - Print readable forms and a newline
pub struct PrnTool;

impl Tool for PrnTool {
    fn name(&self) -> &str {
        "prn"
    }

    fn description(&self) -> &str {
        "Print readable forms of the arguments, then a newline"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        println!("{}", join(args, true, " "));
        Ok(Expr::Nil)
    }
}

/// println - Print display forms and a newline
pub struct PrintlnTool;

impl Tool for PrintlnTool {
    fn name(&self) -> &str {
        "println"
    }

    fn description(&self) -> &str {
        "Print display forms of the arguments, then a newline"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        println!("{}", join(args, false, " "));
        Ok(Expr::Nil)
    }
}
