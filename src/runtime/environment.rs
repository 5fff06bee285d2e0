use std::collections::HashMap;
use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use super::expr::{Expr, Params};
use crate::error::{Error, Result};

new_key_type! {
    /// Handle to a scope in the environment arena
    pub struct ScopeId;
}

/// Arena of lexical scopes
///
/// Each scope holds its bindings and the handle of its parent. Closures keep
/// the handle of their defining scope, so a scope outlives the form that
/// created it only when something captured it.
#[derive(Debug)]
pub struct Environment {
    scopes: SlotMap<ScopeId, Scope>,
    global: ScopeId,
}

/// Single scope in the environment
#[derive(Debug)]
struct Scope {
    /// Bindings defined in this scope
    bindings: HashMap<Arc<str>, Expr>,
    /// Enclosing scope (None for the global scope)
    parent: Option<ScopeId>,
    /// Set once a closure refers to this scope or a descendant
    captured: bool,
}

impl Scope {
    fn new(parent: Option<ScopeId>) -> Self {
        Scope {
            bindings: HashMap::new(),
            parent,
            captured: false,
        }
    }
}

impl Environment {
    /// Creates an environment holding only the global scope
    pub fn new() -> Self {
        let mut scopes = SlotMap::with_key();
        let mut root = Scope::new(None);
        root.captured = true;
        let global = scopes.insert(root);
        Environment { scopes, global }
    }

    /// The root scope
    pub fn global(&self) -> ScopeId {
        self.global
    }

    /// Creates an empty scope nested in `parent`
    pub fn child(&mut self, parent: ScopeId) -> ScopeId {
        let id = self.scopes.insert(Scope::new(Some(parent)));
        tracing::trace!(?id, ?parent, "scope created");
        id
    }

    /// Binds `name` in exactly this scope, replacing any previous binding there
    pub fn set(&mut self, scope: ScopeId, name: &str, value: Expr) {
        if let Some(scope) = self.scopes.get_mut(scope) {
            scope.bindings.insert(Arc::from(name), value);
        }
    }

    /// Looks `name` up from `scope` outward
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<Expr> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scopes.get(id)?;
            if let Some(value) = scope.bindings.get(name) {
                return Some(value.clone());
            }
            current = scope.parent;
        }
        None
    }

    /// Looks `name` up, failing when no scope in the chain binds it
    pub fn get(&self, scope: ScopeId, name: &str) -> Result<Expr> {
        self.lookup(scope, name).ok_or_else(|| Error::UnboundSymbol {
            name: name.to_string(),
        })
    }

    /// Creates a call scope under `parent` binding `params` to `args`
    ///
    /// A rest parameter receives the unconsumed arguments as a list.
    pub fn bind(
        &mut self,
        parent: ScopeId,
        fn_name: &str,
        params: &Params,
        mut args: Vec<Expr>,
    ) -> Result<ScopeId> {
        if !params.accepts(args.len()) {
            let expected = match params.rest {
                Some(_) => format!("at least {}", params.fixed.len()),
                None => params.fixed.len().to_string(),
            };
            return Err(Error::invalid_args(
                fn_name,
                format!("expected {} arguments, got {}", expected, args.len()),
            ));
        }

        let rest = args.split_off(params.fixed.len());
        let scope = self.child(parent);
        for (param, arg) in params.fixed.iter().zip(args) {
            self.set(scope, param.name(), arg);
        }
        if let Some(rest_param) = &params.rest {
            self.set(scope, rest_param.name(), Expr::seq(rest));
        }
        Ok(scope)
    }

    /// Marks `scope` and every ancestor as reachable from a closure
    pub fn capture(&mut self, scope: ScopeId) {
        let mut current = Some(scope);
        while let Some(id) = current {
            match self.scopes.get_mut(id) {
                Some(scope) if !scope.captured => {
                    scope.captured = true;
                    current = scope.parent;
                }
                _ => break,
            }
        }
    }

    /// Frees `scope` unless a closure captured it
    pub fn release(&mut self, scope: ScopeId) {
        if matches!(self.scopes.get(scope), Some(s) if !s.captured) {
            self.scopes.remove(scope);
            tracing::trace!(?scope, "scope released");
        }
    }

    /// Number of live scopes, including the global one
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Nesting depth of `scope` (0 for the global scope)
    pub fn depth(&self, scope: ScopeId) -> usize {
        let mut depth = 0;
        let mut current = self.scopes.get(scope).and_then(|s| s.parent);
        while let Some(id) = current {
            depth += 1;
            current = self.scopes.get(id).and_then(|s| s.parent);
        }
        depth
    }

    /// Names bound directly in `scope`, sorted
    pub fn names(&self, scope: ScopeId) -> Vec<String> {
        let mut names: Vec<String> = self
            .scopes
            .get(scope)
            .map(|s| s.bindings.keys().map(|k| k.to_string()).collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
