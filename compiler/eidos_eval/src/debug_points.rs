//! Line-based execution traces.
//!
//! A statement on a registered line writes `#DEBUG (line N): <kind>` to the
//! diagnostics stream before it runs and `#DEBUG (line N): => <value>`
//! after it completes normally.

use rustc_hash::FxHashSet;

#[derive(Clone, Debug, Default)]
pub struct DebugPoints {
    lines: FxHashSet<u32>,
}

impl DebugPoints {
    pub fn new(lines: impl IntoIterator<Item = u32>) -> Self {
        DebugPoints {
            lines: lines.into_iter().collect(),
        }
    }

    #[inline]
    pub fn contains(&self, line: u32) -> bool {
        self.lines.contains(&line)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The trace line written before a statement runs.
pub(crate) fn entry_line(line: u32, kind: &str) -> String {
    format!("#DEBUG (line {line}): {kind}")
}

/// The trace line written after a statement produces `value`.
pub(crate) fn exit_line(line: u32, value: &str) -> String {
    format!("#DEBUG (line {line}): => {value}")
}
