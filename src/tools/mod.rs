//! Native functions for readlisp
//!
//! Every primitive is a [`Tool`]. A [`ToolRegistry`] collects them and the
//! evaluator seeds each one into the global scope under its name.

pub mod stdlib;

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::reader::ReaderConfig;
use crate::runtime::Expr;

/// Tool trait - every native function implements this
pub trait Tool: Send + Sync {
    /// Name the function is bound to
    fn name(&self) -> &str;

    /// One-line description
    fn description(&self) -> &str;

    /// Apply the function to already-evaluated arguments
    fn execute(&self, args: &[Expr]) -> Result<Expr>;

    /// Exact argument count, if fixed
    fn arity(&self) -> Option<usize> {
        None // None means variadic
    }

    /// Fails with `InvalidArguments` when `args` does not match `arity`
    fn check_arity(&self, args: &[Expr]) -> Result<()> {
        match self.arity() {
            Some(n) if n != args.len() => Err(Error::invalid_args(
                self.name(),
                format!("expected {} arguments, got {}", n, args.len()),
            )),
            _ => Ok(()),
        }
    }
}

/// Tool registry
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create new registry with the standard library
    pub fn new() -> Self {
        Self::with_reader_config(ReaderConfig::default())
    }

    /// Standard library whose `read-string` uses `config`
    pub fn with_reader_config(config: ReaderConfig) -> Self {
        let mut registry = Self::empty();
        stdlib::register_all(&mut registry, config);
        registry
    }

    /// Create empty registry (for testing)
    pub fn empty() -> Self {
        ToolRegistry {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    /// Get tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if tool exists
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names
    pub fn list_tools(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get tool count
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// All tools, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.values()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fails unless `args` has at least `min` elements
pub(crate) fn expect_at_least(tool: &str, args: &[Expr], min: usize) -> Result<()> {
    if args.len() < min {
        return Err(Error::invalid_args(
            tool,
            format!("expected at least {} arguments, got {}", min, args.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestTool;

    impl Tool for TestTool {
        fn name(&self) -> &str {
            "test"
        }

        fn description(&self) -> &str {
            "A test tool"
        }

        fn execute(&self, args: &[Expr]) -> Result<Expr> {
            self.check_arity(args)?;
            Ok(args[0].clone())
        }

        fn arity(&self) -> Option<usize> {
            Some(1)
        }
    }

    #[test]
    fn test_registry_basic() {
        let mut registry = ToolRegistry::empty();
        registry.register(TestTool);

        assert!(registry.has("test"));
        assert_eq!(registry.count(), 1);

        let tool = registry.get("test").unwrap();
        assert_eq!(tool.execute(&[Expr::Int(42)]).unwrap(), Expr::Int(42));
    }

    #[test]
    fn test_check_arity() {
        let err = TestTool.execute(&[]).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments { .. }));
    }

    #[test]
    fn test_standard_library_is_registered() {
        let registry = ToolRegistry::new();
        for name in ["+", "first", "assoc!", "read-string", "throw", "pr-str"] {
            assert!(registry.has(name), "missing {}", name);
        }
        assert!(registry.get("no-such-tool").is_none());
    }

    #[test]
    fn test_list_tools_sorted() {
        let registry = ToolRegistry::new();
        let names = registry.list_tools();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
