//! RAII guard for running loops.
//!
//! [`LoopGuard`] holds `&mut Interpreter` and derefs to it, so the loop body
//! runs through the guard. Dropping it, on success, `?` or unwinding,
//! releases the loop's iterator variables and leaves the loop.

use std::ops::{Deref, DerefMut};

use eidos_ir::Name;
use eidos_value::EvalError;
use smallvec::SmallVec;

use super::Interpreter;

pub(super) struct LoopGuard<'guard, 'rt> {
    interpreter: &'guard mut Interpreter<'rt>,
    /// Names marked as iterators by this loop.
    iterators: SmallVec<[Name; 2]>,
}

impl Drop for LoopGuard<'_, '_> {
    fn drop(&mut self) {
        for &name in &self.iterators {
            self.interpreter.symbols.release_iterator(name);
        }
        self.interpreter.loop_depth -= 1;
    }
}

impl<'rt> Deref for LoopGuard<'_, 'rt> {
    type Target = Interpreter<'rt>;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for LoopGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl<'rt> Interpreter<'rt> {
    /// Enter a loop whose body may use `next` and `break`, protecting
    /// `iterators` from reassignment until the guard drops.
    ///
    /// Fails if an iterator is a constant or already protected by an
    /// enclosing loop; names marked before the failure are released.
    pub(super) fn enter_loop(
        &mut self,
        iterators: &[Name],
    ) -> Result<LoopGuard<'_, 'rt>, EvalError> {
        self.loop_depth += 1;
        let mut guard = LoopGuard {
            interpreter: self,
            iterators: SmallVec::new(),
        };
        for &name in iterators {
            guard.interpreter.symbols.mark_iterator(name)?;
            guard.iterators.push(name);
        }
        tracing::debug!(depth = guard.interpreter.loop_depth, "entered loop");
        Ok(guard)
    }
}
