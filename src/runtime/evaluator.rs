use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::environment::{Environment, ScopeId};
use super::expr::{Expr, Function, FunctionKind, Lambda, Map, Params, Symbol};
use crate::error::{Error, Result};
use crate::reader::{ReadTable, ReaderConfig};
use crate::tools::ToolRegistry;

/// Interpreter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Settings for every reader the evaluator creates, `read-string` included
    pub reader: ReaderConfig,
    /// Upper bound on consecutive expansions of one form
    pub max_macro_expansions: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            reader: ReaderConfig::default(),
            max_macro_expansions: 10_000,
        }
    }
}

impl InterpreterConfig {
    /// Parses a configuration from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// Trampolined evaluator
///
/// Special forms are dispatched directly:
/// - `(def name value)` - Bind in the current scope
/// - `(let* [name value ...] body...)` - Sequential bindings, tail body
/// - `(do form...)` - Sequence, tail last form
/// - `(if test then else?)` - Only `nil` and `false` are falsy
/// - `(fn* name? [params] body...)` - Closure over the current scope
/// - `(quote x)`, `(quasiquote x)`, `(quasiquote-expand x)`
/// - `(macroexpand form)`, `(defmacro name [params] body...)`
/// - `(try body... (catch e handler...))`
///
/// Every tail position (the bodies of `let*`, `do`, `if`, `try` handlers,
/// `quasiquote` and interpreted function calls) continues the evaluation loop
/// instead of recursing, so tail-recursive programs run in constant stack.
pub struct Evaluator {
    env: Environment,
    config: InterpreterConfig,
}

enum Application {
    Done(Expr),
    Tail(Expr, ScopeId),
}

impl Evaluator {
    /// Creates an evaluator with the standard library and default settings
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    /// Creates an evaluator with the standard library and `config`
    pub fn with_config(config: InterpreterConfig) -> Self {
        let registry = ToolRegistry::with_reader_config(config.reader.clone());
        Self::build(registry, config)
    }

    /// Creates an evaluator whose global scope holds exactly `registry`
    pub fn with_registry(registry: ToolRegistry) -> Self {
        Self::build(registry, InterpreterConfig::default())
    }

    fn build(registry: ToolRegistry, config: InterpreterConfig) -> Self {
        let mut env = Environment::new();
        let global = env.global();
        for tool in registry.iter() {
            env.set(
                global,
                tool.name(),
                Expr::Function(Function::native(Arc::clone(tool))),
            );
        }
        tracing::debug!(tools = registry.count(), "global scope seeded");
        Evaluator { env, config }
    }

    /// Evaluates `expr` in the global scope
    pub fn eval(&mut self, expr: &Expr) -> Result<Expr> {
        let global = self.env.global();
        self.eval_in(expr.clone(), global)
    }

    /// Reads and evaluates every form in `source`, returning the last value
    ///
    /// Evaluation stops at the first failure; definitions made by earlier forms
    /// are kept.
    pub fn eval_str(&mut self, source: &str) -> Result<Expr> {
        let mut reader = ReadTable::with_config(source, self.config.reader.clone());
        let mut last = Expr::Nil;
        while let Some(form) = reader.read()? {
            last = self.eval(&form)?;
        }
        Ok(last)
    }

    /// Expands `expr` as far as macro calls go, without evaluating the result
    pub fn macroexpand(&mut self, expr: &Expr) -> Result<Expr> {
        let global = self.env.global();
        self.expand_macros(expr.clone(), global)
    }

    /// Binds `name` in the global scope
    pub fn define(&mut self, name: &str, value: Expr) {
        let global = self.env.global();
        self.env.set(global, name, value);
    }

    /// Looks `name` up in the global scope
    pub fn lookup(&self, name: &str) -> Option<Expr> {
        self.env.lookup(self.env.global(), name)
    }

    /// The scope arena
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Active settings
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Evaluates in `scope`, releasing every scope this evaluation created
    fn eval_in(&mut self, expr: Expr, scope: ScopeId) -> Result<Expr> {
        let mut owned = Vec::new();
        let result = self.eval_loop(expr, scope, &mut owned);
        for id in owned {
            self.env.release(id);
        }
        result
    }

    fn eval_loop(
        &mut self,
        mut expr: Expr,
        mut scope: ScopeId,
        owned: &mut Vec<ScopeId>,
    ) -> Result<Expr> {
        loop {
            if !expr.is_list_shaped() {
                return self.eval_literal(&expr, scope);
            }
            expr = self.expand_macros(expr, scope)?;
            let items = match &expr {
                Expr::Seq(items) if !items.is_empty() => Arc::clone(items),
                other => return self.eval_literal(other, scope),
            };

            if let Expr::Symbol(head) = &items[0] {
                if head.is_special() {
                    match head.name() {
                        "def" => return self.eval_def(&items, scope),

                        "let*" => {
                            let child = self.env.child(scope);
                            owned.push(child);
                            expr = self.bind_let_star(&items, child)?;
                            scope = child;
                            continue;
                        }

                        "do" => {
                            expr = self.eval_leading(&items[1..], scope)?;
                            continue;
                        }

                        "if" => {
                            if items.len() != 3 && items.len() != 4 {
                                return Err(Error::malformed(
                                    "if",
                                    format!(
                                        "expected a test and one or two branches, got {} operands",
                                        items.len() - 1
                                    ),
                                ));
                            }
                            let test = self.eval_in(items[1].clone(), scope)?;
                            expr = if test.is_truthy() {
                                items[2].clone()
                            } else {
                                items.get(3).cloned().unwrap_or(Expr::Nil)
                            };
                            continue;
                        }

                        "fn*" => return self.eval_fn(&items, scope),

                        "quote" => {
                            expect_operands("quote", &items, 1)?;
                            return Ok(items[1].clone());
                        }

                        "quasiquote" => {
                            expect_operands("quasiquote", &items, 1)?;
                            expr = quasiquote(&items[1])?;
                            continue;
                        }

                        "quasiquote-expand" => {
                            expect_operands("quasiquote-expand", &items, 1)?;
                            return quasiquote(&items[1]);
                        }

                        "macroexpand" => {
                            expect_operands("macroexpand", &items, 1)?;
                            return self.expand_macros(items[1].clone(), scope);
                        }

                        "defmacro" => return self.eval_defmacro(&items, scope),

                        "try" => {
                            let (body, handler) = split_try(&items)?;
                            match self.eval_in(body, scope) {
                                Ok(value) => return Ok(value),
                                Err(err) => {
                                    let (name, handler_body) = match handler {
                                        Some(handler) => handler,
                                        None => return Err(err),
                                    };
                                    tracing::debug!(error = %err, binding = name.name(), "caught failure");
                                    let child = self.env.child(scope);
                                    owned.push(child);
                                    self.env.set(child, name.name(), Expr::String(err.to_string()));
                                    expr = handler_body;
                                    scope = child;
                                    continue;
                                }
                            }
                        }

                        "unquote" | "splice-unquote" => {
                            return Err(Error::malformed(
                                head.name(),
                                "only valid inside quasiquote",
                            ))
                        }

                        "catch" => {
                            return Err(Error::malformed("catch", "only valid inside try"))
                        }

                        _ => {}
                    }
                }
            }

            let mut args = Vec::with_capacity(items.len() - 1);
            for operand in &items[1..] {
                args.push(self.eval_in(operand.clone(), scope)?);
            }
            let callee = match self.eval_in(items[0].clone(), scope)? {
                Expr::Function(function) => function,
                other => {
                    return Err(Error::NotCallable {
                        type_name: other.type_name().to_string(),
                    })
                }
            };

            match self.prepare_call(&callee, args)? {
                Application::Done(value) => return Ok(value),
                Application::Tail(body, call) => {
                    // nothing below this frame can see the scopes it created any more
                    for id in owned.drain(..) {
                        self.env.release(id);
                    }
                    owned.push(call);
                    expr = body;
                    scope = call;
                }
            }
        }
    }

    /// Runs a native function, or binds an interpreted one's arguments
    fn prepare_call(&mut self, function: &Function, args: Vec<Expr>) -> Result<Application> {
        match function.kind() {
            FunctionKind::Native(tool) => tool.execute(&args).map(Application::Done),
            FunctionKind::Interpreted(lambda) => {
                let name = lambda.name.as_ref().map(Symbol::name).unwrap_or("fn*");
                let call = self.env.bind(lambda.closure, name, &lambda.params, args)?;
                Ok(Application::Tail(lambda.body.clone(), call))
            }
        }
    }

    /// Applies `function` to already-evaluated arguments outside the loop
    fn apply(&mut self, function: &Function, args: Vec<Expr>) -> Result<Expr> {
        match self.prepare_call(function, args)? {
            Application::Done(value) => Ok(value),
            Application::Tail(body, call) => {
                let result = self.eval_in(body, call);
                self.env.release(call);
                result
            }
        }
    }

    fn eval_literal(&mut self, expr: &Expr, scope: ScopeId) -> Result<Expr> {
        match expr {
            Expr::Symbol(sym) => self.env.get(scope, sym.name()),
            Expr::Vector(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items.iter() {
                    values.push(self.eval_in(item.clone(), scope)?);
                }
                Ok(Expr::vector(values))
            }
            // mutable maps are runtime values and keep their identity
            Expr::Map(map) if !map.is_mutable() => {
                let mut pairs = Vec::with_capacity(map.len());
                for (key, value) in map.entries() {
                    let key = self.eval_in(key, scope)?;
                    let value = self.eval_in(value, scope)?;
                    pairs.push((key, value));
                }
                Ok(Expr::Map(Map::from_pairs(pairs, false)))
            }
            other => Ok(other.clone()),
        }
    }

    /// The macro and its unevaluated operands, if `expr` is a macro call
    fn macro_call(&self, expr: &Expr, scope: ScopeId) -> Option<(Function, Vec<Expr>)> {
        let items = match expr {
            Expr::Seq(items) if !items.is_empty() => items,
            _ => return None,
        };
        let head = match &items[0] {
            Expr::Symbol(sym) if !sym.is_special() => sym,
            _ => return None,
        };
        match self.env.lookup(scope, head.name())? {
            Expr::Function(function) if function.is_macro() => {
                Some((function, items[1..].to_vec()))
            }
            _ => None,
        }
    }

    fn expand_macros(&mut self, mut expr: Expr, scope: ScopeId) -> Result<Expr> {
        let mut steps = 0;
        while let Some((function, args)) = self.macro_call(&expr, scope) {
            if steps == self.config.max_macro_expansions {
                return Err(Error::malformed(
                    "macroexpand",
                    format!("expansion did not settle after {} steps", steps),
                ));
            }
            steps += 1;
            tracing::debug!(
                name = function.name().unwrap_or("<anonymous>"),
                step = steps,
                "expanding macro"
            );
            expr = self.apply(&function, args)?;
        }
        Ok(expr)
    }

    /// Evaluates all but the last form for effect and returns the last one
    fn eval_leading(&mut self, forms: &[Expr], scope: ScopeId) -> Result<Expr> {
        match forms.split_last() {
            Some((last, leading)) => {
                for form in leading {
                    self.eval_in(form.clone(), scope)?;
                }
                Ok(last.clone())
            }
            None => Ok(Expr::Nil),
        }
    }

    fn eval_def(&mut self, items: &[Expr], scope: ScopeId) -> Result<Expr> {
        expect_operands("def", items, 2)?;
        let name = binding_name("def", &items[1])?;
        let value = self.eval_in(items[2].clone(), scope)?;
        tracing::debug!(name = name.name(), "def");
        self.env.set(scope, name.name(), value.clone());
        Ok(value)
    }

    /// Binds `let*` pairs into `child` one at a time; returns the tail form
    fn bind_let_star(&mut self, items: &[Expr], child: ScopeId) -> Result<Expr> {
        let bindings = match items.get(1) {
            Some(Expr::Vector(bindings)) | Some(Expr::Seq(bindings)) => Arc::clone(bindings),
            Some(other) => {
                return Err(Error::malformed(
                    "let*",
                    format!("bindings must be a vector, got {}", other.type_name()),
                ))
            }
            None => return Err(Error::malformed("let*", "missing bindings")),
        };
        if bindings.len() % 2 != 0 {
            return Err(Error::malformed(
                "let*",
                "bindings need an even number of forms",
            ));
        }
        for pair in bindings.chunks(2) {
            let name = binding_name("let*", &pair[0])?;
            let value = self.eval_in(pair[1].clone(), child)?;
            self.env.set(child, name.name(), value);
        }
        self.eval_leading(&items[2..], child)
    }

    /// Builds the closure described by `(fn* name? [params] body...)`
    fn make_lambda(&mut self, form: &str, operands: &[Expr], scope: ScopeId) -> Result<Lambda> {
        let (name, rest) = match operands.split_first() {
            Some((first @ Expr::Symbol(_), rest)) => (Some(binding_name(form, first)?), rest),
            _ => (None, operands),
        };
        let (params, body) = match rest.split_first() {
            Some((Expr::Vector(params), body)) | Some((Expr::Seq(params), body)) => {
                (Params::parse(form, params)?, body)
            }
            _ => return Err(Error::malformed(form, "expected a parameter vector")),
        };
        self.env.capture(scope);
        Ok(Lambda {
            params,
            body: wrap_do(body),
            name,
            closure: scope,
        })
    }

    fn eval_fn(&mut self, items: &[Expr], scope: ScopeId) -> Result<Expr> {
        let lambda = self.make_lambda("fn*", &items[1..], scope)?;
        let name = lambda.name.clone();
        let function = Expr::Function(Function::interpreted(lambda));
        if let Some(name) = name {
            self.env.set(scope, name.name(), function.clone());
        }
        Ok(function)
    }

    fn eval_defmacro(&mut self, items: &[Expr], scope: ScopeId) -> Result<Expr> {
        if !matches!(items.get(1), Some(Expr::Symbol(_))) {
            return Err(Error::malformed("defmacro", "expected a macro name"));
        }
        let lambda = self.make_lambda("defmacro", &items[1..], scope)?;
        let name = match &lambda.name {
            Some(name) => name.clone(),
            None => return Err(Error::malformed("defmacro", "expected a macro name")),
        };
        let function = Function::interpreted(lambda);
        function.set_macro();
        tracing::debug!(name = name.name(), "defmacro");
        self.env.set(scope, name.name(), Expr::Function(function.clone()));
        Ok(Expr::Function(function))
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn expect_operands(form: &str, items: &[Expr], count: usize) -> Result<()> {
    if items.len() != count + 1 {
        return Err(Error::malformed(
            form,
            format!("expected {} operands, got {}", count, items.len() - 1),
        ));
    }
    Ok(())
}

/// A symbol that may be bound: not a special-form keyword
fn binding_name(form: &str, expr: &Expr) -> Result<Symbol> {
    match expr {
        Expr::Symbol(sym) if !sym.is_special() => Ok(sym.clone()),
        Expr::Symbol(sym) => Err(Error::malformed(
            form,
            format!("cannot bind special form name {}", sym.name()),
        )),
        other => Err(Error::malformed(
            form,
            format!("expected a symbol, got {}", other.type_name()),
        )),
    }
}

/// Zero forms are `nil`, one form is itself, more become `(do ...)`
fn wrap_do(forms: &[Expr]) -> Expr {
    match forms {
        [] => Expr::Nil,
        [single] => single.clone(),
        _ => {
            let mut items = Vec::with_capacity(forms.len() + 1);
            items.push(Expr::symbol("do"));
            items.extend(forms.iter().cloned());
            Expr::seq(items)
        }
    }
}

/// Splits `(try body... (catch e handler...))` into the body and the first handler
fn split_try(items: &[Expr]) -> Result<(Expr, Option<(Symbol, Expr)>)> {
    let operands = &items[1..];
    let split = operands
        .iter()
        .position(|item| item.is_form("catch"))
        .unwrap_or(operands.len());
    let (body, clauses) = operands.split_at(split);

    if let Some(stray) = clauses.iter().find(|clause| !clause.is_form("catch")) {
        return Err(Error::malformed(
            "try",
            format!("unexpected {} after catch clause", stray.type_name()),
        ));
    }

    let handler = match clauses.first().and_then(Expr::as_items) {
        Some(clause) => {
            let name = match clause.get(1) {
                Some(binding) => binding_name("catch", binding)?,
                None => return Err(Error::malformed("catch", "expected a binding symbol")),
            };
            Some((name, wrap_do(&clause[2..])))
        }
        None => None,
    };
    Ok((wrap_do(body), handler))
}

/// Rewrites a quasiquote template into list-building code
///
/// Symbols and maps are quoted, `(unquote x)` becomes `x`, and lists and vectors
/// become nested `cons`/`concat` calls ending in `(list)`.
pub fn quasiquote(template: &Expr) -> Result<Expr> {
    match template {
        Expr::Symbol(_) | Expr::Map(_) => Ok(quote(template.clone())),
        Expr::Seq(items) | Expr::Vector(items) if items.is_empty() => {
            Ok(quote(template.clone()))
        }
        Expr::Seq(items) if template.is_form("unquote") => {
            if items.len() != 2 {
                return Err(Error::malformed("unquote", "expected exactly one operand"));
            }
            Ok(items[1].clone())
        }
        Expr::Seq(items) => quasiquote_items(items),
        Expr::Vector(items) => Ok(Expr::seq(vec![
            Expr::symbol("vec"),
            quasiquote_items(items)?,
        ])),
        other => Ok(other.clone()),
    }
}

fn quasiquote_items(items: &[Expr]) -> Result<Expr> {
    let mut acc = Expr::seq(vec![Expr::symbol("list")]);
    for item in items.iter().rev() {
        acc = match item {
            Expr::Seq(splice) if item.is_form("splice-unquote") => {
                if splice.len() != 2 {
                    return Err(Error::malformed(
                        "splice-unquote",
                        "expected exactly one operand",
                    ));
                }
                Expr::seq(vec![Expr::symbol("concat"), splice[1].clone(), acc])
            }
            _ => Expr::seq(vec![Expr::symbol("cons"), quasiquote(item)?, acc]),
        };
    }
    Ok(acc)
}

fn quote(expr: Expr) -> Expr {
    Expr::seq(vec![Expr::symbol("quote"), expr])
}
