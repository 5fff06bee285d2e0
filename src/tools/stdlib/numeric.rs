//! Arithmetic tools
//!
//! Operands are promoted pairwise: two integers stay integers (wrapping on
//! overflow), a big integer promotes the other side to a big integer, and a
//! float promotes everything to float.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::error::{Error, Result};
use crate::runtime::Expr;
use crate::tools::{Tool, ToolRegistry};

/// Register all arithmetic tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(AddTool);
    registry.register(SubTool);
    registry.register(MulTool);
    registry.register(DivTool);
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

/// A numeric operand after type checking
#[derive(Debug, Clone)]
enum Num {
    Int(i64),
    Big(BigInt),
    Float(f64),
}

impl Num {
    fn from_expr(tool: &str, expr: &Expr) -> Result<Num> {
        match expr {
            Expr::Int(n) => Ok(Num::Int(*n)),
            Expr::BigInt(n) => Ok(Num::Big(n.clone())),
            Expr::Float(x) => Ok(Num::Float(*x)),
            other => Err(Error::type_error(
                format!("number for {}", tool),
                other.type_name(),
            )),
        }
    }

    fn into_expr(self) -> Expr {
        match self {
            Num::Int(n) => Expr::Int(n),
            Num::Big(n) => Expr::BigInt(n),
            Num::Float(x) => Expr::Float(x),
        }
    }

    fn to_f64(&self) -> f64 {
        match self {
            Num::Int(n) => *n as f64,
            Num::Big(n) => n.to_f64().unwrap_or(f64::NAN),
            Num::Float(x) => *x,
        }
    }

    fn to_big(&self) -> BigInt {
        match self {
            Num::Int(n) => BigInt::from(*n),
            Num::Big(n) => n.clone(),
            // floats never reach here: they dominate the promotion
            Num::Float(x) => BigInt::from(*x as i64),
        }
    }
}

fn apply(op: Op, lhs: Num, rhs: Num) -> Result<Num> {
    match (&lhs, &rhs) {
        (Num::Float(_), _) | (_, Num::Float(_)) => {
            let (a, b) = (lhs.to_f64(), rhs.to_f64());
            Ok(Num::Float(match op {
                Op::Add => a + b,
                Op::Sub => a - b,
                Op::Mul => a * b,
                Op::Div => a / b,
            }))
        }
        (Num::Big(_), _) | (_, Num::Big(_)) => {
            let (a, b) = (lhs.to_big(), rhs.to_big());
            Ok(Num::Big(match op {
                Op::Add => a + b,
                Op::Sub => a - b,
                Op::Mul => a * b,
                Op::Div => {
                    if b.is_zero() {
                        return Err(Error::DivisionByZero);
                    }
                    a / b
                }
            }))
        }
        (Num::Int(a), Num::Int(b)) => Ok(Num::Int(match op {
            Op::Add => a.wrapping_add(*b),
            Op::Sub => a.wrapping_sub(*b),
            Op::Mul => a.wrapping_mul(*b),
            Op::Div => {
                if *b == 0 {
                    return Err(Error::DivisionByZero);
                }
                a.wrapping_div(*b)
            }
        })),
    }
}

/// Left fold of `op` over the arguments
///
/// `empty` is the result for no arguments (None makes that an error) and
/// `unary_base` is the left operand when there is a single argument.
fn fold(tool: &str, op: Op, args: &[Expr], empty: Option<i64>, unary_base: i64) -> Result<Expr> {
    let (first, rest) = match args.split_first() {
        Some(split) => split,
        None => {
            return empty.map(Expr::Int).ok_or_else(|| {
                Error::invalid_args(tool, "expected at least 1 argument, got 0")
            })
        }
    };
    let first = Num::from_expr(tool, first)?;
    if rest.is_empty() {
        return apply(op, Num::Int(unary_base), first).map(Num::into_expr);
    }
    let mut acc = first;
    for arg in rest {
        acc = apply(op, acc, Num::from_expr(tool, arg)?)?;
    }
    Ok(acc.into_expr())
}

macro_rules! arithmetic_tool {
    ($tool:ident, $name:expr, $desc:expr, $op:expr, $empty:expr, $unary_base:expr) => {
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
                fold($name, $op, args, $empty, $unary_base)
            }
        }
    };
}

arithmetic_tool!(AddTool, "+", "Sum of the arguments (0 with none)", Op::Add, Some(0), 0);
arithmetic_tool!(
    SubTool,
    "-",
    "Subtract the rest from the first argument, or negate a single argument",
    Op::Sub,
    None,
    0
);
arithmetic_tool!(MulTool, "*", "Product of the arguments (1 with none)", Op::Mul, Some(1), 1);
arithmetic_tool!(
    DivTool,
    "/",
    "Divide the first argument by the rest, or take the reciprocal of one",
    Op::Div,
    None,
    1
);
