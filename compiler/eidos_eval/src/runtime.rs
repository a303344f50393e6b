//! Process-wide evaluator state.
//!
//! A [`Runtime`] is created once per embedding and shared by reference
//! with every interpreter it runs: the top-level one and the children made
//! for user-defined calls. It owns everything those interpreters have in
//! common.

use std::rc::Rc;

use eidos_ir::{Name, SharedInterner, StringInterner};
use eidos_value::Constants;

use crate::debug_points::DebugPoints;
use crate::environment::{intrinsic_scope, LocalScope, Scope, SymbolTable};
use crate::error_context::ErrorContext;
use crate::functions::{FunctionDelegate, FunctionRegistry};
use crate::interpreter::{Interpreter, InterpreterBuilder};
use crate::print_handler::OutputStreams;
use crate::script::Script;

/// Names the evaluator compares against on hot paths.
#[derive(Clone, Copy, Debug)]
pub(crate) struct KnownNames {
    pub(crate) c: Name,
    pub(crate) seq_len: Name,
    pub(crate) seq_along: Name,
}

impl KnownNames {
    fn new(interner: &StringInterner) -> Self {
        KnownNames {
            c: interner.intern("c"),
            seq_len: interner.intern("seqLen"),
            seq_along: interner.intern("seqAlong"),
        }
    }
}

pub struct Runtime {
    interner: SharedInterner,
    constants: Constants,
    constants_scope: LocalScope<Scope>,
    registry: FunctionRegistry,
    streams: OutputStreams,
    delegate: Option<Rc<dyn FunctionDelegate>>,
    debug_points: Option<DebugPoints>,
    error_context: ErrorContext,
    pub(crate) names: KnownNames,
}

impl Runtime {
    /// A runtime with its own interner, the built-in library, and output
    /// to stdout/stderr.
    pub fn new() -> Self {
        Self::with_interner(SharedInterner::new())
    }

    /// A runtime sharing `interner` with the code that builds its scripts.
    pub fn with_interner(interner: SharedInterner) -> Self {
        let constants = Constants::new();
        let constants_scope = intrinsic_scope(&interner, &constants);
        let registry = FunctionRegistry::with_builtins(interner.clone());
        let names = KnownNames::new(&interner);
        tracing::debug!(functions = registry.names().len(), "runtime created");
        Runtime {
            interner,
            constants,
            constants_scope,
            registry,
            streams: OutputStreams::default(),
            delegate: None,
            debug_points: None,
            error_context: ErrorContext::new(),
            names,
        }
    }

    #[must_use]
    pub fn with_streams(mut self, streams: OutputStreams) -> Self {
        self.streams = streams;
        self
    }

    /// Hook that runs functions registered with
    /// [`FunctionRegistry::register_delegated`].
    #[must_use]
    pub fn with_delegate(mut self, delegate: Rc<dyn FunctionDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    #[must_use]
    pub fn with_debug_points(mut self, points: DebugPoints) -> Self {
        self.debug_points = Some(points);
        self
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn streams(&self) -> &OutputStreams {
        &self.streams
    }

    pub fn delegate(&self) -> Option<&Rc<dyn FunctionDelegate>> {
        self.delegate.as_ref()
    }

    pub fn debug_points(&self) -> Option<&DebugPoints> {
        self.debug_points.as_ref()
    }

    pub fn error_context(&self) -> &ErrorContext {
        &self.error_context
    }

    /// A top-level symbol table: fresh global variables over the shared
    /// constants.
    pub fn symbol_table(&self) -> SymbolTable {
        SymbolTable::new(self.interner.clone(), self.constants_scope.clone())
    }

    /// A top-level interpreter for `script` with default settings.
    pub fn interpreter(&self, script: Rc<Script>) -> Interpreter<'_> {
        InterpreterBuilder::new(self, script).build()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
