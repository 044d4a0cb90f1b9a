//! Symbol tables for the interpreter.
//!
//! Tables nest lexically. The outermost table holds the intrinsic constants
//! (`T`, `F`, `NULL`, `PI`, `E`, `INF`, `NAN`); the global table sits inside
//! it, and every pushed scope sits inside the one before. Lookups walk
//! outward; definitions always land in the innermost table, unless the name
//! is a constant anywhere in the chain, in which case they are rejected.
//!
//! Each table holds a strong reference to its parent and none to its
//! children, so an inner table can be dropped at any time without touching
//! the tables outside it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use rill_value::errors::{constant_redefinition, undefined_identifier};
use rill_value::{EvalError, EvalResult, Value};

/// Whether a binding can be redefined or removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    Variable,
    Constant,
}

impl Mutability {
    #[inline]
    pub fn is_constant(self) -> bool {
        matches!(self, Mutability::Constant)
    }
}

/// Single-threaded shared handle to one table.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    mutability: Mutability,
}

/// One symbol table.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<String, Binding>,
    parent: Option<LocalScope<Scope>>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Whether `name` is a constant in this table or any enclosing one.
    pub fn is_constant(&self, name: &str) -> bool {
        match self.bindings.get(name) {
            Some(binding) if binding.mutability.is_constant() => true,
            _ => self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.borrow().is_constant(name)),
        }
    }

    /// Bind `name` in this table.
    pub fn define(&mut self, name: &str, value: Value, mutability: Mutability) -> Result<(), EvalError> {
        if self.is_constant(name) {
            return Err(constant_redefinition(name));
        }
        self.bindings.insert(name.to_string(), Binding { value, mutability });
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(binding) = self.bindings.get(name) {
            return Some(binding.value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.borrow().lookup(name))
    }

    /// Remove `name` from the innermost table that binds it.
    ///
    /// Returns whether a binding was removed.
    pub fn remove(&mut self, name: &str) -> Result<bool, EvalError> {
        match self.bindings.get(name) {
            Some(binding) if binding.mutability.is_constant() => Err(constant_redefinition(name)),
            Some(_) => Ok(self.bindings.remove(name).is_some()),
            None => match &self.parent {
                Some(parent) => parent.borrow_mut().remove(name),
                None => Ok(false),
            },
        }
    }

    fn collect(&self, out: &mut FxHashMap<String, (Value, Mutability)>) {
        for (name, binding) in &self.bindings {
            out.entry(name.clone())
                .or_insert_with(|| (binding.value.clone(), binding.mutability));
        }
        if let Some(parent) = &self.parent {
            parent.borrow().collect(out);
        }
    }
}

/// The interpreter's chain of symbol tables.
#[derive(Debug)]
pub struct Environment {
    /// Innermost table last; `scopes[0]` is the global table.
    scopes: Vec<LocalScope<Scope>>,
    intrinsics: LocalScope<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        let intrinsics = LocalScope::new(intrinsic_constants());
        let global = LocalScope::new(Scope::with_parent(intrinsics.clone()));
        Environment {
            scopes: vec![global],
            intrinsics,
        }
    }

    /// Number of tables above the intrinsic constants.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self) {
        let parent = self.current().clone();
        self.scopes.push(LocalScope::new(Scope::with_parent(parent)));
    }

    /// Drop the innermost table; the global table is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    #[inline]
    fn current(&self) -> &LocalScope<Scope> {
        self.scopes.last().unwrap_or(&self.intrinsics)
    }

    /// Bind a variable in the innermost table.
    pub fn define(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        self.current().borrow_mut().define(name, value, Mutability::Variable)
    }

    /// Bind a constant in the innermost table.
    pub fn define_constant(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        self.current().borrow_mut().define(name, value, Mutability::Constant)
    }

    pub fn lookup(&self, name: &str) -> EvalResult {
        self.current()
            .borrow()
            .lookup(name)
            .ok_or_else(|| undefined_identifier(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.current().borrow().lookup(name).is_some()
    }

    pub fn is_constant(&self, name: &str) -> bool {
        self.current().borrow().is_constant(name)
    }

    /// Remove a variable; constants cannot be removed, unknown names are ignored.
    pub fn remove(&mut self, name: &str) -> Result<(), EvalError> {
        self.current().borrow_mut().remove(name).map(|_| ())
    }

    /// Every visible binding, innermost shadowing outermost, sorted by name.
    pub fn visible_bindings(&self) -> Vec<(String, Value, Mutability)> {
        let mut collected = FxHashMap::default();
        self.current().borrow().collect(&mut collected);
        let mut bindings: Vec<_> = collected
            .into_iter()
            .map(|(name, (value, mutability))| (name, value, mutability))
            .collect();
        bindings.sort_by(|a, b| a.0.cmp(&b.0));
        bindings
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn intrinsic_constants() -> Scope {
    let mut scope = Scope::new();
    for (name, value) in [
        ("T", Value::logical(true)),
        ("F", Value::logical(false)),
        ("NULL", Value::null()),
        ("PI", Value::float(std::f64::consts::PI)),
        ("E", Value::float(std::f64::consts::E)),
        ("INF", Value::float(f64::INFINITY)),
        ("NAN", Value::float(f64::NAN)),
    ] {
        scope.bindings.insert(
            name.to_string(),
            Binding {
                value,
                mutability: Mutability::Constant,
            },
        );
    }
    scope
}
