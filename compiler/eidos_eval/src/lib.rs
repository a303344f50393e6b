//! Eidos Eval - tree-walking evaluator for Eidos scripts.
//!
//! # Architecture
//!
//! - [`Runtime`]: state shared by every interpreter of one embedding
//!   (interner, constants, function registry, output streams)
//! - [`Interpreter`]: walks one [`Script`] against one [`SymbolTable`]
//! - [`evaluate_binary`] / [`evaluate_unary`]: vectorized operators by
//!   direct dispatch over value kinds
//! - [`FunctionRegistry`]: built-in, delegated and user-defined functions
//! - [`FillPlan`]: per-call-site argument binding, cached on the script
//!
//! Value types come from `eidos_value`; syntax trees from `eidos_ir`.
//!
//! # Tracing
//!
//! The evaluator emits `tracing` events: function dispatch at `debug`,
//! every node at `trace`. [`init_tracing`] installs a subscriber for
//! binaries and tests that want to see them.

mod binder;
mod debug_points;
mod diagnostics;
mod environment;
mod error_context;
mod functions;
mod interpreter;
mod operators;
mod print_handler;
mod runtime;
mod script;
mod stack;
mod unary_operators;

use std::sync::Once;

pub use eidos_value::{EvalError, EvalErrorKind, EvalResult, Value};

pub use binder::{BoundArgs, FillPlan, Slot};
pub use debug_points::DebugPoints;
pub use diagnostics::{CallFrame, CallFrameGuard, CallStack, DEFAULT_MAX_CALL_DEPTH};
pub use environment::{
    intrinsic_scope, BindingKind, LocalScope, Scope, SymbolTable, UndefinedSymbol,
};
pub use error_context::{Blame, ErrorContext, ErrorContextGuard};
pub use functions::{
    Callee, FunctionDelegate, FunctionEntry, FunctionRegistry, NativeFn, UserFunction,
};
pub use interpreter::{Flow, Interpreter, InterpreterBuilder};
pub use operators::evaluate_binary;
pub use print_handler::{
    buffer_handler, silent_handler, stderr_handler, stdout_handler, BufferPrintHandler,
    OutputStreams, PrintHandlerImpl, SharedPrintHandler,
};
pub use runtime::Runtime;
pub use script::{Script, ScriptOrigin};
pub use stack::ensure_sufficient_stack;
pub use unary_operators::evaluate_unary;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Does nothing unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=eidos_eval=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
