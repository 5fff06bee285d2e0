//! Runtime: the expression model, scopes, printer and the evaluator

mod environment;
mod evaluator;
mod expr;
mod printer;

pub use environment::{Environment, ScopeId};
pub use evaluator::{quasiquote, Evaluator, InterpreterConfig};
pub use expr::{
    is_special_form, Expr, Function, FunctionKind, Keyword, Lambda, Map, Params, Symbol,
    SPECIAL_FORMS,
};
pub use printer::pr_str;
