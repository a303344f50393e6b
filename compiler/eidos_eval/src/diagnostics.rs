//! Call frame tracking for user-defined function calls.
//!
//! `CallStack` bounds recursion depth and captures backtraces at error
//! sites. The backtrace is stored on `EvalError` as `EvalBacktrace`
//! (defined in `eidos_value`), innermost call first.

use std::cell::RefCell;
use std::rc::Rc;

use eidos_ir::{Name, Span, StringInterner};
use eidos_value::errors::{recursion_limit_exceeded, BacktraceFrame, EvalBacktrace};
use eidos_value::EvalError;

/// Call depth allowed when none is configured.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// One active user-defined call.
#[derive(Clone, Debug)]
pub struct CallFrame {
    pub name: Name,
    /// Call site in the caller's script.
    pub call_span: Option<Span>,
}

/// Live call stack shared by an interpreter and the children it creates
/// for calls.
///
/// Clones share one frame list, so a child interpreter sees its caller's
/// frames without copying them. Frames are pushed with [`CallStack::enter`]
/// and popped when the returned [`CallFrameGuard`] drops.
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Rc<RefCell<Vec<CallFrame>>>,
    max_depth: Option<usize>,
}

impl CallStack {
    /// `max_depth` is `None` for unlimited.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            frames: Rc::new(RefCell::new(Vec::new())),
            max_depth,
        }
    }

    /// Push a frame, or fail with "maximum recursion depth exceeded". The
    /// frame is not pushed on failure.
    pub fn enter(&self, frame: CallFrame) -> Result<CallFrameGuard, EvalError> {
        let mut frames = self.frames.borrow_mut();
        if let Some(max) = self.max_depth {
            if frames.len() >= max {
                return Err(recursion_limit_exceeded(max));
            }
        }
        frames.push(frame);
        Ok(CallFrameGuard {
            frames: Rc::clone(&self.frames),
        })
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.borrow().is_empty()
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Snapshot of the stack, most recent call first.
    pub fn capture(&self, interner: &StringInterner) -> EvalBacktrace {
        let frames = self
            .frames
            .borrow()
            .iter()
            .rev()
            .map(|f| BacktraceFrame {
                name: interner.lookup(f.name).to_string(),
                span: f.call_span,
            })
            .collect();
        EvalBacktrace::new(frames)
    }

    /// Attach a backtrace unless the error already carries one or the
    /// stack is empty.
    pub fn attach_backtrace(&self, err: EvalError, interner: &StringInterner) -> EvalError {
        if self.is_empty() || err.backtrace.is_some() {
            return err;
        }
        err.with_backtrace(self.capture(interner))
    }
}

/// Pops the frame pushed by [`CallStack::enter`] on drop.
#[must_use = "the frame is popped when the guard drops"]
pub struct CallFrameGuard {
    frames: Rc<RefCell<Vec<CallFrame>>>,
}

impl Drop for CallFrameGuard {
    fn drop(&mut self) {
        self.frames.borrow_mut().pop();
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_CALL_DEPTH))
    }
}
