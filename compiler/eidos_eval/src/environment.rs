//! Symbol table.
//!
//! Two scopes are visible from any point in a script: the interpreter's
//! own locals and, behind them, the constants scope shared by every
//! interpreter of a runtime. The constants scope holds the intrinsic
//! constants (`T`, `F`, `NULL`, `PI`, `E`, `INF`, `NAN`) and everything
//! `defineConstant()` adds. The top-level interpreter's locals are the
//! global variables; each user-defined call gets fresh locals chained
//! directly to the constants scope.

use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use eidos_ir::{Name, SharedInterner, StringInterner};
use eidos_value::errors::{
    already_defined, constant_redefinition, constant_removal, iterator_reassignment,
    undefined_identifier,
};
use eidos_value::{Constants, EvalError, EvalResult, Value};

/// A single-threaded shared scope.
///
/// Wraps `Rc<RefCell<T>>` so that every scope allocation goes through
/// [`LocalScope::new`].
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
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

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// How a name was bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    /// Added by `defineConstant()`; removable with `removeConstants = T`.
    Constant,
    /// Built into the language; never removable.
    Intrinsic,
}

#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    kind: BindingKind,
}

/// One scope of name bindings.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Binding>,
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

    #[inline]
    pub fn define(&mut self, name: Name, value: Value, kind: BindingKind) {
        self.bindings.insert(name, Binding { value, kind });
    }

    /// Look up `name` here or in a parent.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        if let Some(binding) = self.bindings.get(&name) {
            return Some(binding.value.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().lookup(name))
    }

    /// Binding kind of `name` in this scope only.
    #[inline]
    pub fn kind_of(&self, name: Name) -> Option<BindingKind> {
        self.bindings.get(&name).map(|b| b.kind)
    }

    fn remove(&mut self, name: Name) -> bool {
        self.bindings.remove(&name).is_some()
    }

    fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.bindings.keys().copied()
    }
}

/// A constants scope holding the intrinsic constants.
pub fn intrinsic_scope(interner: &StringInterner, constants: &Constants) -> LocalScope<Scope> {
    let mut scope = Scope::new();
    for (name, value) in constants.named() {
        scope.define(interner.intern(name), value.clone(), BindingKind::Intrinsic);
    }
    LocalScope::new(scope)
}

/// Lookup failure that embedders and `exists()` can tell apart from other
/// evaluation errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("undefined identifier {name}")]
pub struct UndefinedSymbol {
    pub name: String,
}

impl From<UndefinedSymbol> for EvalError {
    fn from(err: UndefinedSymbol) -> Self {
        undefined_identifier(&err.name)
    }
}

/// The names visible to one interpreter.
#[derive(Debug)]
pub struct SymbolTable {
    interner: SharedInterner,
    constants: LocalScope<Scope>,
    locals: LocalScope<Scope>,
    /// Loop variables of the `for` loops currently running.
    iterators: FxHashSet<Name>,
}

impl SymbolTable {
    pub fn new(interner: SharedInterner, constants: LocalScope<Scope>) -> Self {
        let locals = LocalScope::new(Scope::with_parent(constants.clone()));
        SymbolTable {
            interner,
            constants,
            locals,
            iterators: FxHashSet::default(),
        }
    }

    /// Fresh locals for a user-defined call, sharing the constants scope.
    #[must_use]
    pub fn function_scope(&self) -> SymbolTable {
        SymbolTable::new(self.interner.clone(), self.constants.clone())
    }

    fn text(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Value bound to `name`, or a distinguishable [`UndefinedSymbol`].
    pub fn lookup_or_special_raise(&self, name: Name) -> Result<Value, UndefinedSymbol> {
        self.locals
            .borrow()
            .lookup(name)
            .ok_or_else(|| UndefinedSymbol {
                name: self.text(name).to_string(),
            })
    }

    pub fn lookup(&self, name: Name) -> EvalResult {
        self.lookup_or_special_raise(name).map_err(EvalError::from)
    }

    /// Bind a variable in the locals scope.
    pub fn define(&mut self, name: Name, value: Value) -> Result<(), EvalError> {
        if self.is_constant(name) {
            return Err(constant_redefinition(self.text(name)));
        }
        if self.is_iterator(name) {
            return Err(iterator_reassignment(self.text(name)));
        }
        self.locals
            .borrow_mut()
            .define(name, value, BindingKind::Variable);
        Ok(())
    }

    /// Rebind a loop variable from the `for` driver; skips the iterator
    /// check that [`define`](Self::define) makes.
    pub(crate) fn set_iterator_value(&mut self, name: Name, value: Value) {
        self.locals
            .borrow_mut()
            .define(name, value, BindingKind::Variable);
    }

    /// Add a constant visible to every interpreter of the runtime.
    pub fn define_constant(&mut self, name: Name, value: Value) -> Result<(), EvalError> {
        if self.contains(name) {
            return Err(already_defined(self.text(name)));
        }
        self.constants
            .borrow_mut()
            .define(name, value, BindingKind::Constant);
        Ok(())
    }

    /// Remove a binding. Returns whether anything was bound.
    ///
    /// Constants need `remove_constant`; intrinsic constants can never be
    /// removed.
    pub fn remove(&mut self, name: Name, remove_constant: bool) -> Result<bool, EvalError> {
        if self.is_local(name) {
            if self.is_iterator(name) {
                return Err(iterator_reassignment(self.text(name)));
            }
            return Ok(self.locals.borrow_mut().remove(name));
        }
        match self.constants.borrow().kind_of(name) {
            None => return Ok(false),
            Some(BindingKind::Intrinsic) => return Err(constant_removal(self.text(name), true)),
            Some(_) if !remove_constant => return Err(constant_removal(self.text(name), false)),
            Some(_) => {}
        }
        Ok(self.constants.borrow_mut().remove(name))
    }

    /// Remove every local variable that is not a running loop variable.
    pub fn clear_variables(&mut self) {
        let iterators = &self.iterators;
        self.locals
            .borrow_mut()
            .bindings
            .retain(|name, _| iterators.contains(name));
    }

    pub fn is_constant(&self, name: Name) -> bool {
        self.constants.borrow().kind_of(name).is_some()
    }

    #[inline]
    pub fn is_iterator(&self, name: Name) -> bool {
        self.iterators.contains(&name)
    }

    pub fn contains(&self, name: Name) -> bool {
        self.is_local(name) || self.is_constant(name)
    }

    /// Whether `name` is bound in the locals scope.
    pub fn is_local(&self, name: Name) -> bool {
        self.locals.borrow().kind_of(name).is_some()
    }

    /// Protect `name` from reassignment while a `for` loop runs.
    pub fn mark_iterator(&mut self, name: Name) -> Result<(), EvalError> {
        if self.is_constant(name) {
            return Err(constant_redefinition(self.text(name)));
        }
        if !self.iterators.insert(name) {
            return Err(iterator_reassignment(self.text(name)));
        }
        Ok(())
    }

    pub fn release_iterator(&mut self, name: Name) {
        self.iterators.remove(&name);
    }

    /// Run `f` on the stored value of local `name`, in place.
    pub(crate) fn with_local_mut<R>(
        &self,
        name: Name,
        f: impl FnOnce(&mut Value) -> R,
    ) -> Option<R> {
        let mut locals = self.locals.borrow_mut();
        locals.bindings.get_mut(&name).map(|b| f(&mut b.value))
    }

    /// Every visible name, sorted.
    pub fn symbol_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .locals
            .borrow()
            .names()
            .chain(self.constants.borrow().names())
            .map(|name| self.text(name))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests;
