//! Type predicate tools

use crate::error::Result;
use crate::runtime::Expr;
use crate::tools::{Tool, ToolRegistry};

/// Register all type predicate tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(NilpTool);
    registry.register(TruepTool);
    registry.register(FalsepTool);
    registry.register(SymbolpTool);
    registry.register(KeywordpTool);
    registry.register(StringpTool);
    registry.register(NumberpTool);
    registry.register(VectorpTool);
    registry.register(MappTool);
    registry.register(FnpTool);
    registry.register(MacropTool);
}

macro_rules! type_predicate {
    ($tool:ident, $name:expr, $desc:expr, $pattern:pat $(if $guard:expr)?) => {
        #[doc = $desc]
        pub struct $tool;

        impl Tool for $tool {
            fn name(&self) -> &str {
                $name
            }

            fn description(&self) -> &str {
                $desc
            }

            fn arity(&self) -> Option<usize> {
                Some(1)
            }

            fn execute(&self, args: &[Expr]) -> Result<Expr> {
                self.check_arity(args)?;
                Ok(Expr::from(matches!(&args[0], $pattern $(if $guard)?)))
            }
        }
    };
}

type_predicate!(NilpTool, "nil?", "True if the argument is nil", Expr::Nil);
type_predicate!(TruepTool, "true?", "True if the argument is true", Expr::True);
type_predicate!(FalsepTool, "false?", "True if the argument is false", Expr::False);
type_predicate!(SymbolpTool, "symbol?", "True for symbols", Expr::Symbol(_));
type_predicate!(KeywordpTool, "keyword?", "True for keywords", Expr::Keyword(_));
type_predicate!(StringpTool, "string?", "True for strings", Expr::String(_));
type_predicate!(
    NumberpTool,
    "number?",
    "True for integers, big integers and floats",
    Expr::Int(_) | Expr::BigInt(_) | Expr::Float(_)
);
type_predicate!(VectorpTool, "vector?", "True for vectors", Expr::Vector(_));
type_predicate!(MappTool, "map?", "True for maps", Expr::Map(_));
type_predicate!(
    FnpTool,
    "fn?",
    "True for functions that are not macros",
    Expr::Function(f) if !f.is_macro()
);
type_predicate!(
    MacropTool,
    "macro?",
    "True for functions flagged as macros",
    Expr::Function(f) if f.is_macro()
);
