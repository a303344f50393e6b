//! The syntax tree consumed by the evaluator.
//!
//! Nodes live in a flat arena ([`Ast`]) and refer to each other by
//! [`NodeId`]. Variable-length children (block statements, call arguments,
//! subscript axes, `&`/`|` operands, `for` clauses, parameters) are stored as
//! a [`NodeRange`] into a side list so that [`Node`] stays small and `Copy`.

mod operators;

pub use operators::{BinaryOp, UnaryOp};

use crate::{Name, Span, TypeSpec};

/// Index of a node in its [`Ast`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A contiguous run of child ids stored in [`Ast::list`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct NodeRange {
    pub start: u32,
    pub len: u32,
}

impl NodeRange {
    pub const EMPTY: NodeRange = NodeRange { start: 0, len: 0 };

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// What a node is.
///
/// Statement kinds (`Block` through `FunctionDecl`) produce control flow;
/// the rest are expressions producing values. `NamedArg`, `Omitted`,
/// `InClause` and `Param` only appear as children of calls, subscripts,
/// `for` loops and function declarations respectively.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NodeKind {
    // Statements
    /// `{ ... }` or the script root.
    Block(NodeRange),
    /// The null statement `;`.
    Empty,
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        cond: NodeId,
    },
    /// `for (a in x, b in y) body`; every clause is an `InClause` node.
    For {
        clauses: NodeRange,
        body: NodeId,
    },
    Next,
    Break,
    Return(Option<NodeId>),
    FunctionDecl {
        return_type: TypeSpec,
        name: Name,
        params: NodeRange,
        body: NodeId,
    },

    // Expressions
    /// Numeric literal; the payload is the token text.
    Number(Name),
    String(Name),
    Identifier(Name),
    /// `start:end`
    Range {
        start: NodeId,
        end: NodeId,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    /// `a & b & ...`, all operands in one node.
    And(NodeRange),
    /// `a | b | ...`, all operands in one node.
    Or(NodeRange),
    /// `target[i]` or `target[i, j, ...]`.
    Subset {
        target: NodeId,
        indices: NodeRange,
    },
    /// `target.name`
    Member {
        target: NodeId,
        name: Name,
    },
    /// `callee(args)`; the callee is an `Identifier` or `Member` node.
    Call {
        callee: NodeId,
        args: NodeRange,
    },
    Assign {
        target: NodeId,
        value: NodeId,
    },
    /// `cond ? a else b`
    Conditional {
        cond: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },

    // Auxiliary children
    /// `name = value` inside a call's argument list.
    NamedArg {
        name: Name,
        value: NodeId,
    },
    /// An empty axis in `m[, j]`.
    Omitted,
    /// `var in seq` inside a `for` header.
    InClause {
        var: Name,
        seq: NodeId,
    },
    /// `type name` or `type name = default` in a function header.
    Param {
        ty: TypeSpec,
        name: Name,
        default: Option<NodeId>,
    },
}

impl NodeKind {
    /// Short label used by execution traces.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Block(_) => "compound statement",
            Self::Empty => "null statement",
            Self::If { .. } => "if statement",
            Self::While { .. } => "while statement",
            Self::DoWhile { .. } => "do-while statement",
            Self::For { .. } => "for statement",
            Self::Next => "next statement",
            Self::Break => "break statement",
            Self::Return(_) => "return statement",
            Self::FunctionDecl { .. } => "function declaration",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Identifier(_) => "identifier",
            Self::Range { .. } => "range",
            Self::Binary { .. } => "binary operator",
            Self::Unary { .. } => "unary operator",
            Self::And(_) => "'&' operator",
            Self::Or(_) => "'|' operator",
            Self::Subset { .. } => "subscript",
            Self::Member { .. } => "member access",
            Self::Call { .. } => "call",
            Self::Assign { .. } => "assignment",
            Self::Conditional { .. } => "conditional",
            Self::NamedArg { .. } => "named argument",
            Self::Omitted => "omitted index",
            Self::InClause { .. } => "in clause",
            Self::Param { .. } => "parameter",
        }
    }
}

/// One syntax tree node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// 1-based source line, 0 when unknown.
    pub line: u32,
}

/// Arena owning every node of one script.
#[derive(Clone, Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    lists: Vec<NodeId>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its id.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32::MAX` nodes.
    pub fn alloc(&mut self, kind: NodeKind, span: Span, line: u32) -> NodeId {
        let index = u32::try_from(self.nodes.len())
            .unwrap_or_else(|_| panic!("syntax tree exceeds u32::MAX nodes"));
        self.nodes.push(Node { kind, span, line });
        NodeId(index)
    }

    /// Store a child list and return its range.
    ///
    /// # Panics
    /// Panics if the list storage exceeds `u32::MAX` entries.
    pub fn alloc_list(&mut self, ids: &[NodeId]) -> NodeRange {
        let start = u32::try_from(self.lists.len())
            .unwrap_or_else(|_| panic!("syntax tree lists exceed u32::MAX entries"));
        let len = u32::try_from(ids.len())
            .unwrap_or_else(|_| panic!("child list exceeds u32::MAX entries"));
        self.lists.extend_from_slice(ids);
        NodeRange { start, len }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn list(&self, range: NodeRange) -> &[NodeId] {
        let start = range.start as usize;
        &self.lists[start..start + range.len()]
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{NodeId, NodeRange};
    crate::static_assert_size!(NodeId, 4);
    crate::static_assert_size!(NodeRange, 8);
}

#[cfg(test)]
mod tests;
