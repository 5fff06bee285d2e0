use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use num_bigint::BigInt;
use parking_lot::{Mutex, RwLock};

use super::environment::ScopeId;
use crate::error::{Error, Result};
use crate::lexer::NumberLiteral;
use crate::tools::Tool;

/// Names the evaluator handles directly instead of applying
pub const SPECIAL_FORMS: &[&str] = &[
    "def",
    "let*",
    "do",
    "if",
    "fn*",
    "quote",
    "quasiquote",
    "quasiquote-expand",
    "unquote",
    "splice-unquote",
    "macroexpand",
    "defmacro",
    "try",
    "catch",
];

lazy_static! {
    static ref INTERNED: Mutex<HashSet<Arc<str>>> = Mutex::new(HashSet::new());
}

/// Returns the shared storage for `name`, allocating it on first use
fn intern(name: &str) -> Arc<str> {
    let mut table = INTERNED.lock();
    if let Some(existing) = table.get(name) {
        return existing.clone();
    }
    let shared: Arc<str> = Arc::from(name);
    table.insert(shared.clone());
    shared
}

/// True if `name` is one of the evaluator's special forms
pub fn is_special_form(name: &str) -> bool {
    SPECIAL_FORMS.contains(&name)
}

/// Identifier, optionally tagged as a special-form keyword
///
/// Two symbols are equal only when both name and tag match.
#[derive(Clone)]
pub struct Symbol {
    name: Arc<str>,
    special: bool,
}

impl Symbol {
    /// Symbol as the reader produces it: special-form names get the tag
    pub fn new(name: &str) -> Self {
        if is_special_form(name) {
            Symbol {
                name: intern(name),
                special: true,
            }
        } else {
            Symbol {
                name: Arc::from(name),
                special: false,
            }
        }
    }

    /// Symbol that never carries the special-form tag
    pub fn plain(name: &str) -> Self {
        Symbol {
            name: Arc::from(name),
            special: false,
        }
    }

    /// The symbol's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Is this the special-form token rather than an ordinary identifier?
    pub fn is_special(&self) -> bool {
        self.special
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.special == other.special && self.name == other.name
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.special {
            write!(f, "Symbol({}, special)", self.name)
        } else {
            write!(f, "Symbol({})", self.name)
        }
    }
}

/// Self-evaluating name, interned process-wide
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Keyword(Arc<str>);

impl Keyword {
    /// Interns a keyword by name (without the leading colon)
    pub fn new(name: &str) -> Self {
        Keyword(intern(name))
    }

    /// The keyword's name without the colon
    pub fn name(&self) -> &str {
        &self.0
    }

    /// True if both keywords share interned storage
    pub fn ptr_eq(&self, other: &Keyword) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Keyword({})", self.0)
    }
}

/// Map from expression keys to expression values
///
/// Maps built by the reader are immutable; `hash-map` builds mutable ones.
/// Cloning a `Map` shares its table.
#[derive(Clone, Debug)]
pub struct Map {
    table: Arc<RwLock<IndexMap<Expr, Expr>>>,
    mutable: bool,
}

impl Map {
    /// Builds a map from key/value pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Expr, Expr)>, mutable: bool) -> Self {
        Map {
            table: Arc::new(RwLock::new(pairs.into_iter().collect())),
            mutable,
        }
    }

    /// Can this map be changed in place?
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value for `key`
    pub fn get(&self, key: &Expr) -> Option<Expr> {
        self.table.read().get(key).cloned()
    }

    /// Is `key` present?
    pub fn contains_key(&self, key: &Expr) -> bool {
        self.table.read().contains_key(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> Vec<Expr> {
        self.table.read().keys().cloned().collect()
    }

    /// Values in insertion order
    pub fn values(&self) -> Vec<Expr> {
        self.table.read().values().cloned().collect()
    }

    /// Entries in insertion order
    pub fn entries(&self) -> Vec<(Expr, Expr)> {
        self.table
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// New map with `pairs` added; keeps this map's mutability
    pub fn assoc(&self, pairs: impl IntoIterator<Item = (Expr, Expr)>) -> Map {
        let mut table = self.table.read().clone();
        table.extend(pairs);
        Map {
            table: Arc::new(RwLock::new(table)),
            mutable: self.mutable,
        }
    }

    /// New map without `keys`; keeps this map's mutability
    pub fn dissoc(&self, keys: &[Expr]) -> Map {
        let mut table = self.table.read().clone();
        for key in keys {
            table.shift_remove(key);
        }
        Map {
            table: Arc::new(RwLock::new(table)),
            mutable: self.mutable,
        }
    }

    /// Adds `pairs` in place
    pub fn assoc_in_place(&self, pairs: impl IntoIterator<Item = (Expr, Expr)>) -> Result<()> {
        if !self.mutable {
            return Err(Error::ImmutableMutation);
        }
        // keys may contain this very map, so hash them outside the write lock
        let mut table = self.table.read().clone();
        table.extend(pairs);
        *self.table.write() = table;
        Ok(())
    }

    /// Removes `keys` in place
    pub fn dissoc_in_place(&self, keys: &[Expr]) -> Result<()> {
        if !self.mutable {
            return Err(Error::ImmutableMutation);
        }
        let mut table = self.table.read().clone();
        for key in keys {
            table.shift_remove(key);
        }
        *self.table.write() = table;
        Ok(())
    }

    /// True if both maps share the same table
    pub fn ptr_eq(&self, other: &Map) -> bool {
        Arc::ptr_eq(&self.table, &other.table)
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.table.read() == *other.table.read()
    }
}

/// Parameter list of an interpreted function
///
/// `[a b & more]` binds `a` and `b` positionally and `more` to the remaining
/// arguments as a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Positional parameters
    pub fixed: Vec<Symbol>,
    /// Rest parameter following `&`
    pub rest: Option<Symbol>,
}

impl Params {
    /// Parses the elements of a parameter vector
    pub fn parse(form: &str, items: &[Expr]) -> Result<Params> {
        let mut fixed = Vec::new();
        let mut iter = items.iter();
        while let Some(item) = iter.next() {
            let sym = match item {
                Expr::Symbol(sym) if !sym.is_special() => sym,
                other => {
                    return Err(Error::malformed(
                        form,
                        format!("parameter must be a symbol, got {}", other.type_name()),
                    ))
                }
            };
            if sym.name() == "&" {
                let rest = match (iter.next(), iter.next()) {
                    (Some(Expr::Symbol(rest)), None) if !rest.is_special() => rest.clone(),
                    _ => {
                        return Err(Error::malformed(
                            form,
                            "& must be followed by exactly one parameter name",
                        ))
                    }
                };
                return Ok(Params {
                    fixed,
                    rest: Some(rest),
                });
            }
            fixed.push(sym.clone());
        }
        Ok(Params { fixed, rest: None })
    }

    /// Does a call with `count` arguments fit this parameter list?
    pub fn accepts(&self, count: usize) -> bool {
        match self.rest {
            Some(_) => count >= self.fixed.len(),
            None => count == self.fixed.len(),
        }
    }

    /// The parameter vector as written
    pub fn to_expr(&self) -> Expr {
        let mut items: Vec<Expr> = self.fixed.iter().cloned().map(Expr::Symbol).collect();
        if let Some(rest) = &self.rest {
            items.push(Expr::symbol("&"));
            items.push(Expr::Symbol(rest.clone()));
        }
        Expr::vector(items)
    }
}

/// A user-defined function closing over its defining scope
#[derive(Debug, Clone)]
pub struct Lambda {
    /// Declared parameters
    pub params: Params,
    /// Body, already wrapped in `do` when several forms were given
    pub body: Expr,
    /// Name given in `(fn* name [...] ...)` or `defmacro`
    pub name: Option<Symbol>,
    /// Scope the function was created in
    pub closure: ScopeId,
}

/// What a function runs when applied
pub enum FunctionKind {
    /// Host callable from the primitive library
    Native(Arc<dyn Tool>),
    /// Interpreted body evaluated by the trampoline
    Interpreted(Lambda),
}

struct FunctionData {
    kind: FunctionKind,
    is_macro: AtomicBool,
}

/// A callable value; compared by identity
#[derive(Clone)]
pub struct Function(Arc<FunctionData>);

impl Function {
    /// Wraps a primitive tool
    pub fn native(tool: Arc<dyn Tool>) -> Self {
        Function(Arc::new(FunctionData {
            kind: FunctionKind::Native(tool),
            is_macro: AtomicBool::new(false),
        }))
    }

    /// Wraps an interpreted lambda
    pub fn interpreted(lambda: Lambda) -> Self {
        Function(Arc::new(FunctionData {
            kind: FunctionKind::Interpreted(lambda),
            is_macro: AtomicBool::new(false),
        }))
    }

    /// Native or interpreted body
    pub fn kind(&self) -> &FunctionKind {
        &self.0.kind
    }

    /// Name of the function, if it has one
    pub fn name(&self) -> Option<&str> {
        match &self.0.kind {
            FunctionKind::Native(tool) => Some(tool.name()),
            FunctionKind::Interpreted(lambda) => lambda.name.as_ref().map(Symbol::name),
        }
    }

    /// Is the macro flag set?
    pub fn is_macro(&self) -> bool {
        self.0.is_macro.load(Ordering::Acquire)
    }

    /// Marks this function as a macro; the flag is never cleared
    pub fn set_macro(&self) {
        self.0.is_macro.store(true, Ordering::Release);
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.0.kind {
            FunctionKind::Native(tool) => write!(f, "Native({})", tool.name()),
            FunctionKind::Interpreted(lambda) => f
                .debug_struct("Interpreted")
                .field("name", &lambda.name)
                .field("params", &lambda.params)
                .field("macro", &self.is_macro())
                .finish(),
        }
    }
}

/// Expression: the single data model shared by reader, evaluator and primitives
#[derive(Debug, Clone)]
pub enum Expr {
    // Singletons
    /// The empty value; falsy
    Nil,
    /// Boolean true
    True,
    /// Boolean false; falsy
    False,

    // Numbers
    /// 64-bit integer
    Int(i64),
    /// Arbitrary-precision integer
    BigInt(BigInt),
    /// 64-bit float
    Float(f64),

    // Text
    /// Single character
    Char(char),
    /// Owned text
    String(String),
    /// Identifier
    Symbol(Symbol),
    /// Interned self-evaluating name
    Keyword(Keyword),

    // Collections
    /// Ordered list; non-empty lists are evaluated as forms
    Seq(Arc<Vec<Expr>>),
    /// Indexable collection; evaluates element-wise
    Vector(Arc<Vec<Expr>>),
    /// Key/value map
    Map(Map),

    /// Native or interpreted function
    Function(Function),
}

impl Expr {
    /// Symbol as the reader would produce it
    pub fn symbol(name: &str) -> Expr {
        Expr::Symbol(Symbol::new(name))
    }

    /// Interned keyword
    pub fn keyword(name: &str) -> Expr {
        Expr::Keyword(Keyword::new(name))
    }

    /// String from anything string-like
    pub fn string(text: impl Into<String>) -> Expr {
        Expr::String(text.into())
    }

    /// List from its elements
    pub fn seq(items: Vec<Expr>) -> Expr {
        Expr::Seq(Arc::new(items))
    }

    /// Vector from its elements
    pub fn vector(items: Vec<Expr>) -> Expr {
        Expr::Vector(Arc::new(items))
    }

    /// Returns the type name of the expression as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Nil => "nil",
            Expr::True | Expr::False => "boolean",
            Expr::Int(_) => "integer",
            Expr::BigInt(_) => "biginteger",
            Expr::Float(_) => "float",
            Expr::Char(_) => "character",
            Expr::String(_) => "string",
            Expr::Symbol(_) => "symbol",
            Expr::Keyword(_) => "keyword",
            Expr::Seq(_) => "list",
            Expr::Vector(_) => "vector",
            Expr::Map(_) => "map",
            Expr::Function(f) if f.is_macro() => "macro",
            Expr::Function(_) => "function",
        }
    }

    /// Only `nil` and `false` are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Expr::Nil | Expr::False)
    }

    /// A non-empty list, evaluated as a form
    pub fn is_list_shaped(&self) -> bool {
        matches!(self, Expr::Seq(items) if !items.is_empty())
    }

    /// Elements of a list or vector
    pub fn as_items(&self) -> Option<&[Expr]> {
        match self {
            Expr::Seq(items) | Expr::Vector(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// The symbol, if this is one
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Expr::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    /// True for a list whose head is the special-form symbol `name`
    pub fn is_form(&self, name: &str) -> bool {
        match self {
            Expr::Seq(items) => matches!(
                items.first(),
                Some(Expr::Symbol(head)) if head.is_special() && head.name() == name
            ),
            _ => false,
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Nil, Expr::Nil) | (Expr::True, Expr::True) | (Expr::False, Expr::False) => {
                true
            }
            (Expr::Int(a), Expr::Int(b)) => a == b,
            (Expr::BigInt(a), Expr::BigInt(b)) => a == b,
            (Expr::Float(a), Expr::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Expr::Char(a), Expr::Char(b)) => a == b,
            (Expr::String(a), Expr::String(b)) => a == b,
            (Expr::Symbol(a), Expr::Symbol(b)) => a == b,
            (Expr::Keyword(a), Expr::Keyword(b)) => a == b,
            (Expr::Seq(a), Expr::Seq(b)) => a == b,
            (Expr::Vector(a), Expr::Vector(b)) => a == b,
            (Expr::Map(a), Expr::Map(b)) => a == b,
            // Functions compared by identity
            (Expr::Function(a), Expr::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Expr::Nil | Expr::True | Expr::False => {}
            Expr::Int(n) => n.hash(state),
            Expr::BigInt(n) => n.hash(state),
            Expr::Float(x) => {
                // 0.0 == -0.0 and NaN == NaN under Eq, so they must hash alike
                let bits = if *x == 0.0 {
                    0
                } else if x.is_nan() {
                    f64::NAN.to_bits()
                } else {
                    x.to_bits()
                };
                bits.hash(state)
            }
            Expr::Char(c) => c.hash(state),
            Expr::String(s) => s.hash(state),
            Expr::Symbol(s) => s.hash(state),
            Expr::Keyword(k) => k.hash(state),
            Expr::Seq(items) | Expr::Vector(items) => items.hash(state),
            Expr::Map(m) => m.len().hash(state),
            Expr::Function(f) => f.addr().hash(state),
        }
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        if b {
            Expr::True
        } else {
            Expr::False
        }
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Expr::Int(n)
    }
}

impl From<f64> for Expr {
    fn from(x: f64) -> Self {
        Expr::Float(x)
    }
}

impl From<BigInt> for Expr {
    fn from(n: BigInt) -> Self {
        Expr::BigInt(n)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::String(s.to_string())
    }
}

impl From<NumberLiteral> for Expr {
    fn from(n: NumberLiteral) -> Self {
        match n {
            NumberLiteral::Integer(n) => Expr::Int(n),
            NumberLiteral::BigInteger(n) => Expr::BigInt(n),
            NumberLiteral::Float(x) => Expr::Float(x),
        }
    }
}
