//! Blame positions for errors.
//!
//! Every node evaluated in the user's script blames its own span. Nodes of
//! an internal script (function bodies supplied by the embedding, with no
//! position in the user's text) blame the user-script call site that is
//! current in the [`ErrorContext`] instead.

use std::cell::Cell;

use eidos_ir::Span;
use eidos_value::EvalError;

/// Position an error is reported at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Blame {
    pub span: Span,
    /// Whether `span` indexes the user's script.
    pub in_user_script: bool,
}

/// The current blame position, saved and restored around call dispatch.
#[derive(Debug, Default)]
pub struct ErrorContext {
    current: Cell<Option<Blame>>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Blame> {
        self.current.get()
    }

    /// Make `blame` current until the guard drops.
    #[must_use = "the previous position is restored when the guard drops"]
    pub fn push(&self, blame: Blame) -> ErrorContextGuard<'_> {
        let previous = self.current.replace(Some(blame));
        ErrorContextGuard {
            context: self,
            previous,
        }
    }

    /// The user-script position an internal-script error is reported at.
    pub fn user_blame(&self) -> Option<Span> {
        self.current
            .get()
            .filter(|blame| blame.in_user_script)
            .map(|blame| blame.span)
    }

    /// Give `err` a position if it has none yet.
    ///
    /// A user-script node with the placeholder span leaves the error for
    /// an enclosing node to place.
    pub fn blame(&self, err: EvalError, node_span: Span, in_user_script: bool) -> EvalError {
        if err.span.is_some() {
            return err;
        }
        if in_user_script {
            if node_span.is_dummy() {
                return err;
            }
            return err.with_span(node_span);
        }
        match self.user_blame() {
            Some(span) => err.with_span(span),
            None => err,
        }
    }
}

/// Restores the previous blame position on drop.
pub struct ErrorContextGuard<'ctx> {
    context: &'ctx ErrorContext,
    previous: Option<Blame>,
}

impl Drop for ErrorContextGuard<'_> {
    fn drop(&mut self) {
        self.context.current.set(self.previous);
    }
}
