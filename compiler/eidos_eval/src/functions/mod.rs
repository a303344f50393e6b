//! Function registry and the core built-in library.
//!
//! Every callable name maps to a [`FunctionEntry`]: its signature and how
//! to run it. Built-ins (native and delegated) are registered once when the
//! runtime is created and can never be replaced; user-defined functions are
//! added by function declarations and may be redeclared.

mod builtins;
mod conversion;
mod system;
mod vectors;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use eidos_ir::{Name, NodeId, SharedInterner};
use eidos_value::errors::builtin_replacement;
use eidos_value::{EvalError, EvalResult, Signature};
use rustc_hash::FxHashMap;

use crate::binder::BoundArgs;
use crate::interpreter::Interpreter;
use crate::script::Script;

/// A built-in implemented in Rust.
pub type NativeFn = fn(&mut Interpreter<'_>, &BoundArgs) -> EvalResult;

/// Embedding hook for functions the core library does not provide.
pub trait FunctionDelegate {
    /// Run delegated function `name` with checked arguments.
    fn call(&self, name: &str, args: &BoundArgs, interpreter: &mut Interpreter<'_>)
        -> EvalResult;
}

/// A function declared by script code.
#[derive(Debug)]
pub struct UserFunction {
    /// The script that declared it; the body's nodes live there.
    pub script: Rc<Script>,
    pub body: NodeId,
    /// Parameter names, in declaration order.
    pub params: Vec<Name>,
}

/// How a registered function runs.
#[derive(Clone)]
pub enum Callee {
    Native(NativeFn),
    User(Rc<UserFunction>),
    Delegated,
}

impl fmt::Debug for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callee::Native(_) => f.write_str("Native"),
            Callee::User(user) => f.debug_tuple("User").field(&user.body).finish(),
            Callee::Delegated => f.write_str("Delegated"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FunctionEntry {
    pub signature: Rc<Signature>,
    pub callee: Callee,
}

impl FunctionEntry {
    pub fn is_builtin(&self) -> bool {
        !matches!(self.callee, Callee::User(_))
    }
}

/// Name to function map shared by every interpreter of a runtime.
pub struct FunctionRegistry {
    interner: SharedInterner,
    entries: RefCell<FxHashMap<Name, FunctionEntry>>,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new(interner: SharedInterner) -> Self {
        FunctionRegistry {
            interner,
            entries: RefCell::new(FxHashMap::default()),
        }
    }

    /// A registry holding the core built-in library.
    pub fn with_builtins(interner: SharedInterner) -> Self {
        let registry = Self::new(interner);
        builtins::register(&registry);
        registry
    }

    fn insert(&self, signature: Rc<Signature>, callee: Callee) -> Result<(), EvalError> {
        let name = self.interner.intern(signature.name());
        let mut entries = self.entries.borrow_mut();
        if entries.get(&name).is_some_and(FunctionEntry::is_builtin) {
            return Err(builtin_replacement(signature.name()));
        }
        tracing::debug!(function = signature.name(), ?callee, "registering function");
        entries.insert(name, FunctionEntry { signature, callee });
        Ok(())
    }

    /// Add a native built-in.
    pub fn register_native(&self, signature: Signature, function: NativeFn) -> Result<(), EvalError> {
        self.insert(Rc::new(signature), Callee::Native(function))
    }

    /// Add a function run by the runtime's [`FunctionDelegate`].
    pub fn register_delegated(&self, signature: Signature) -> Result<(), EvalError> {
        self.insert(Rc::new(signature), Callee::Delegated)
    }

    /// Add or replace a user-defined function.
    pub fn register_user(
        &self,
        signature: Rc<Signature>,
        function: UserFunction,
    ) -> Result<(), EvalError> {
        self.insert(signature, Callee::User(Rc::new(function)))
    }

    pub fn get(&self, name: Name) -> Option<FunctionEntry> {
        self.entries.borrow().get(&name).cloned()
    }

    pub fn get_by_str(&self, name: &str) -> Option<FunctionEntry> {
        self.get(self.interner.get(name)?)
    }

    pub fn is_builtin(&self, name: Name) -> bool {
        self.entries
            .borrow()
            .get(&name)
            .is_some_and(FunctionEntry::is_builtin)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .entries
            .borrow()
            .keys()
            .map(|&name| self.interner.lookup(name))
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests;
