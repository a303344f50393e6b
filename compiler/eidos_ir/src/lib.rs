//! Syntax tree, spans and interned names for the Eidos evaluator.
//!
//! The evaluator never tokenizes or parses; it walks an [`Ast`] produced by
//! an external parser or by [`AstBuilder`]. Everything here is plain data.

/// Compile-time size check for hot types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod ast;
mod builder;
mod interner;
mod mask;
mod name;
mod span;

pub use ast::{Ast, BinaryOp, Node, NodeId, NodeKind, NodeRange, UnaryOp};
pub use builder::AstBuilder;
pub use interner::{InternError, SharedInterner, StringInterner};
pub use mask::{TypeSpec, ValueMask};
pub use name::Name;
pub use span::Span;
