//! Source location spans.
//!
//! A span is the byte range of the token a node was parsed from. Spans are
//! relative to the script that owns the node; the evaluator never needs the
//! source text itself.

use std::fmt;

/// Byte range of a token, `end` exclusive.
///
/// Layout: 8 bytes (two `u32` offsets).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(C)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Placeholder for nodes synthesized without a source position.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// True for the placeholder span.
    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::Span;
    crate::static_assert_size!(Span, 8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_is_default() {
        assert_eq!(Span::default(), Span::DUMMY);
        assert!(Span::DUMMY.is_dummy());
        assert!(!Span::new(0, 1).is_dummy());
    }

    #[test]
    fn display_matches_debug() {
        let span = Span::new(100, 200);
        assert_eq!(format!("{span:?}"), "100..200");
        assert_eq!(format!("{span}"), "100..200");
    }
}
