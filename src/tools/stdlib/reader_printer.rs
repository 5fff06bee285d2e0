//! Reader entry points exposed to programs

use crate::error::{Error, Result};
use crate::reader::{ReadTable, ReaderConfig};
use crate::runtime::Expr;
use crate::tools::{Tool, ToolRegistry};

/// Register reader tools; `read-string` reads with `config`
pub fn register(registry: &mut ToolRegistry, config: ReaderConfig) {
    registry.register(ReadStringTool { config });
    registry.register(SlurpTool);
}

/// read-string - Read the first form of a string
pub struct ReadStringTool {
    config: ReaderConfig,
}

impl Tool for ReadStringTool {
    fn name(&self) -> &str {
        "read-string"
    }

    fn description(&self) -> &str {
        "Read the first form of a string (nil when it holds none)"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        let source = match &args[0] {
            Expr::String(text) => text,
            other => return Err(Error::type_error("string", other.type_name())),
        };
        let mut reader = ReadTable::with_config(source, self.config.clone());
        Ok(reader.read()?.unwrap_or(Expr::Nil))
    }
}

/// slurp - Contents of a file as a string
pub struct SlurpTool;

impl Tool for SlurpTool {
    fn name(&self) -> &str {
        "slurp"
    }

    fn description(&self) -> &str {
        "Contents of a file as a string"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        let path = match &args[0] {
            Expr::String(path) => path,
            other => return Err(Error::type_error("string", other.type_name())),
        };
        std::fs::read_to_string(path)
            .map(Expr::String)
            .map_err(|e| Error::IoError(format!("{}: {}", path, e)))
    }
}
