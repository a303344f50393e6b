//! `InterpreterBuilder` for creating Interpreter instances.

use std::rc::Rc;

use super::Interpreter;
use crate::diagnostics::{CallStack, DEFAULT_MAX_CALL_DEPTH};
use crate::environment::SymbolTable;
use crate::runtime::Runtime;
use crate::script::Script;

/// Builder for [`Interpreter`].
///
/// Top-level interpreters usually take the defaults: fresh global
/// variables and a call-depth limit of [`DEFAULT_MAX_CALL_DEPTH`]. Child
/// interpreters for user-defined calls pass the callee's symbol table and
/// share the caller's call stack.
pub struct InterpreterBuilder<'rt> {
    runtime: &'rt Runtime,
    script: Rc<Script>,
    symbols: Option<SymbolTable>,
    call_stack: Option<CallStack>,
    max_call_depth: Option<usize>,
}

impl<'rt> InterpreterBuilder<'rt> {
    pub fn new(runtime: &'rt Runtime, script: Rc<Script>) -> Self {
        Self {
            runtime,
            script,
            symbols: None,
            call_stack: None,
            max_call_depth: Some(DEFAULT_MAX_CALL_DEPTH),
        }
    }

    /// Limit on nested user-defined calls; `None` for unlimited.
    ///
    /// Ignored when an explicit call stack is supplied.
    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Run against an existing symbol table, e.g. to keep global
    /// variables across scripts.
    #[must_use]
    pub fn symbols(mut self, symbols: SymbolTable) -> Self {
        self.symbols = Some(symbols);
        self
    }

    #[must_use]
    pub fn call_stack(mut self, stack: CallStack) -> Self {
        self.call_stack = Some(stack);
        self
    }

    pub fn build(self) -> Interpreter<'rt> {
        let runtime = self.runtime;
        Interpreter {
            runtime,
            script: self.script,
            symbols: self.symbols.unwrap_or_else(|| runtime.symbol_table()),
            call_stack: self
                .call_stack
                .unwrap_or_else(|| CallStack::new(self.max_call_depth)),
            loop_depth: 0,
        }
    }
}
