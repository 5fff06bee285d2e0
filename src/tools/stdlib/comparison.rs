//! Equality and ordering tools
//!
//! `=` is structural equality over any expressions. Ordering is only defined
//! between numbers of the same kind.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::runtime::Expr;
use crate::tools::{expect_at_least, Tool, ToolRegistry};

/// Register all comparison tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(EqualTool);
    registry.register(LessTool);
    registry.register(LessEqualTool);
    registry.register(GreaterTool);
    registry.register(GreaterEqualTool);
}

/// = - True if all arguments are structurally equal
pub struct EqualTool;

impl Tool for EqualTool {
    fn name(&self) -> &str {
        "="
    }

    fn description(&self) -> &str {
        "True if all arguments are structurally equal"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        expect_at_least(self.name(), args, 1)?;
        Ok(Expr::from(args.windows(2).all(|pair| pair[0] == pair[1])))
    }
}

/// Orders two numbers of the same kind; `None` when either is NaN
fn compare(tool: &str, a: &Expr, b: &Expr) -> Result<Option<Ordering>> {
    match (a, b) {
        (Expr::Int(x), Expr::Int(y)) => Ok(Some(x.cmp(y))),
        (Expr::BigInt(x), Expr::BigInt(y)) => Ok(Some(x.cmp(y))),
        (Expr::Float(x), Expr::Float(y)) => Ok(x.partial_cmp(y)),
        _ => Err(Error::type_error(
            format!("two numbers of the same kind for {}", tool),
            format!("{} and {}", a.type_name(), b.type_name()),
        )),
    }
}

/// Checks `accept` on every adjacent pair
fn chain(tool: &str, args: &[Expr], accept: fn(Ordering) -> bool) -> Result<Expr> {
    expect_at_least(tool, args, 1)?;
    for pair in args.windows(2) {
        match compare(tool, &pair[0], &pair[1])? {
            Some(ordering) if accept(ordering) => {}
            _ => return Ok(Expr::False),
        }
    }
    Ok(Expr::True)
}

macro_rules! ordering_tool {
    ($tool:ident, $name:expr, $desc:expr, $accept:expr) => {
        #[doc = $desc]
        pub struct $tool;

        impl Tool for $tool {
            fn name(&self) -> &str {
                $name
            }

            fn description(&self) -> &str {
                $desc
            }

            fn execute(&self, args: &[Expr]) -> Result<Expr> {
                chain($name, args, $accept)
            }
        }
    };
}

ordering_tool!(
    LessTool,
    "<",
    "True if arguments are strictly increasing",
    |o| o == Ordering::Less
);
ordering_tool!(
    LessEqualTool,
    "<=",
    "True if arguments are non-decreasing",
    |o| o != Ordering::Greater
);
ordering_tool!(
    GreaterTool,
    ">",
    "True if arguments are strictly decreasing",
    |o| o == Ordering::Greater
);
ordering_tool!(
    GreaterEqualTool,
    ">=",
    "True if arguments are non-increasing",
    |o| o != Ordering::Less
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Expr::vector(vec![Expr::Int(1), Expr::string("x")]);
        let b = Expr::vector(vec![Expr::Int(1), Expr::string("x")]);
        assert_eq!(EqualTool.execute(&[a, b]).unwrap(), Expr::True);
        assert_eq!(
            EqualTool.execute(&[Expr::Int(1), Expr::Float(1.0)]).unwrap(),
            Expr::False
        );
    }

    #[test]
    fn test_chained_ordering() {
        let args = [Expr::Int(1), Expr::Int(2), Expr::Int(3)];
        assert_eq!(LessTool.execute(&args).unwrap(), Expr::True);
        assert_eq!(GreaterTool.execute(&args).unwrap(), Expr::False);
        let flat = [Expr::Int(2), Expr::Int(2)];
        assert_eq!(LessEqualTool.execute(&flat).unwrap(), Expr::True);
        assert_eq!(GreaterEqualTool.execute(&flat).unwrap(), Expr::True);
        assert_eq!(LessTool.execute(&flat).unwrap(), Expr::False);
    }

    #[test]
    fn test_mixed_kinds_rejected() {
        assert!(matches!(
            LessTool.execute(&[Expr::Int(1), Expr::Float(2.0)]),
            Err(Error::TypeError { .. })
        ));
    }

    #[test]
    fn test_nan_is_unordered() {
        let args = [Expr::Float(f64::NAN), Expr::Float(1.0)];
        assert_eq!(LessTool.execute(&args).unwrap(), Expr::False);
        assert_eq!(GreaterEqualTool.execute(&args).unwrap(), Expr::False);
    }
}
