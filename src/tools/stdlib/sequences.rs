//! List and vector tools

use crate::error::{Error, Result};
use crate::runtime::Expr;
use crate::tools::{Tool, ToolRegistry};

/// Register all sequence tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(ListTool);
    registry.register(ListpTool);
    registry.register(VectorTool);
    registry.register(VecTool);
    registry.register(CountTool);
    registry.register(EmptypTool);
    registry.register(SeqTool);
    registry.register(FirstTool);
    registry.register(RestTool);
    registry.register(NthTool);
    registry.register(LastTool);
    registry.register(ConsTool);
    registry.register(ConcatTool);
}

/// Elements of a list, vector or nil
fn items<'a>(tool: &str, expr: &'a Expr) -> Result<&'a [Expr]> {
    match expr {
        Expr::Nil => Ok(&[]),
        Expr::Seq(items) | Expr::Vector(items) => Ok(items.as_slice()),
        other => Err(Error::type_error(
            format!("list or vector for {}", tool),
            other.type_name(),
        )),
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// list - Build a list from the arguments
pub struct ListTool;

impl Tool for ListTool {
    fn name(&self) -> &str {
        "list"
    }

    fn description(&self) -> &str {
        "Build a list from the arguments"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        Ok(Expr::seq(args.to_vec()))
    }
}

/// vector - Build a vector from the arguments
pub struct VectorTool;

impl Tool for VectorTool {
    fn name(&self) -> &str {
        "vector"
    }

    fn description(&self) -> &str {
        "Build a vector from the arguments"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        Ok(Expr::vector(args.to_vec()))
    }
}

/// vec - Convert a list (or vector) into a vector
pub struct VecTool;

impl Tool for VecTool {
    fn name(&self) -> &str {
        "vec"
    }

    fn description(&self) -> &str {
        "Convert a list into a vector"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        match &args[0] {
            v @ Expr::Vector(_) => Ok(v.clone()),
            other => Ok(Expr::vector(items(self.name(), other)?.to_vec())),
        }
    }
}

/// cons - Prepend an element to a list or vector, giving a list
pub struct ConsTool;

impl Tool for ConsTool {
    fn name(&self) -> &str {
        "cons"
    }

    fn description(&self) -> &str {
        "Prepend an element, giving a list"
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        let tail = items(self.name(), &args[1])?;
        let mut result = Vec::with_capacity(tail.len() + 1);
        result.push(args[0].clone());
        result.extend_from_slice(tail);
        Ok(Expr::seq(result))
    }
}

/// concat - Join lists and vectors into one list
pub struct ConcatTool;

impl Tool for ConcatTool {
    fn name(&self) -> &str {
        "concat"
    }

    fn description(&self) -> &str {
        "Join lists and vectors into one list"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        let mut result = Vec::new();
        for arg in args {
            result.extend_from_slice(items(self.name(), arg)?);
        }
        Ok(Expr::seq(result))
    }
}

// ============================================================================
// Inspection
// ============================================================================

/// list? - True for lists
pub struct ListpTool;

impl Tool for ListpTool {
    fn name(&self) -> &str {
        "list?"
    }

    fn description(&self) -> &str {
        "True if the argument is a list"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        Ok(Expr::from(matches!(args[0], Expr::Seq(_))))
    }
}

/// count - Number of elements in a collection or characters in a string
pub struct CountTool;

impl Tool for CountTool {
    fn name(&self) -> &str {
        "count"
    }

    fn description(&self) -> &str {
        "Number of elements in a collection"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        let count = match &args[0] {
            Expr::Map(map) => map.len(),
            Expr::String(s) => s.chars().count(),
            other => items(self.name(), other)?.len(),
        };
        Ok(Expr::Int(count as i64))
    }
}

/// empty? - True for an empty collection or nil
pub struct EmptypTool;

impl Tool for EmptypTool {
    fn name(&self) -> &str {
        "empty?"
    }

    fn description(&self) -> &str {
        "True if the collection has no elements"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        let empty = match &args[0] {
            Expr::Map(map) => map.is_empty(),
            Expr::String(s) => s.is_empty(),
            other => items(self.name(), other)?.is_empty(),
        };
        Ok(Expr::from(empty))
    }
}

/// seq - View a collection as a list; nil when empty
///
/// Strings decompose into single-character strings.
pub struct SeqTool;

impl Tool for SeqTool {
    fn name(&self) -> &str {
        "seq"
    }

    fn description(&self) -> &str {
        "View a collection as a list, or nil when empty"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        let elements: Vec<Expr> = match &args[0] {
            Expr::String(s) => s.chars().map(|c| Expr::String(c.to_string())).collect(),
            Expr::Map(map) => map
                .entries()
                .into_iter()
                .map(|(k, v)| Expr::vector(vec![k, v]))
                .collect(),
            other => items(self.name(), other)?.to_vec(),
        };
        if elements.is_empty() {
            Ok(Expr::Nil)
        } else {
            Ok(Expr::seq(elements))
        }
    }
}

/// first - First element, or nil
pub struct FirstTool;

impl Tool for FirstTool {
    fn name(&self) -> &str {
        "first"
    }

    fn description(&self) -> &str {
        "First element of a collection, or nil"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        Ok(items(self.name(), &args[0])?
            .first()
            .cloned()
            .unwrap_or(Expr::Nil))
    }
}

/// rest - All but the first element, as a list
pub struct RestTool;

impl Tool for RestTool {
    fn name(&self) -> &str {
        "rest"
    }

    fn description(&self) -> &str {
        "All but the first element, as a list"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        let elements = items(self.name(), &args[0])?;
        Ok(Expr::seq(elements.iter().skip(1).cloned().collect()))
    }
}

/// nth - Element at an index
pub struct NthTool;

impl Tool for NthTool {
    fn name(&self) -> &str {
        "nth"
    }

    fn description(&self) -> &str {
        "Element at a zero-based index"
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        let elements = items(self.name(), &args[0])?;
        let index = match &args[1] {
            Expr::Int(n) => *n,
            other => return Err(Error::type_error("integer index", other.type_name())),
        };
        usize::try_from(index)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .ok_or(Error::IndexOutOfBounds {
                index,
                length: elements.len(),
            })
    }
}

/// last - Last element, or nil
pub struct LastTool;

impl Tool for LastTool {
    fn name(&self) -> &str {
        "last"
    }

    fn description(&self) -> &str {
        "Last element of a collection, or nil"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        Ok(items(self.name(), &args[0])?
            .last()
            .cloned()
            .unwrap_or(Expr::Nil))
    }
}
