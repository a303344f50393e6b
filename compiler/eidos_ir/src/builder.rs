//! Programmatic construction of syntax trees.
//!
//! Embedders without a parser, and the evaluator's own tests, build scripts
//! through [`AstBuilder`]. Every node gets a distinct synthetic span so that
//! error positions can be told apart, and the line set with
//! [`AstBuilder::at_line`].

use crate::{Ast, BinaryOp, Name, NodeId, NodeKind, Span, StringInterner, TypeSpec, UnaryOp};

/// Incremental [`Ast`] builder.
pub struct AstBuilder<'a> {
    interner: &'a StringInterner,
    ast: Ast,
    line: u32,
    cursor: u32,
}

impl<'a> AstBuilder<'a> {
    pub fn new(interner: &'a StringInterner) -> Self {
        AstBuilder {
            interner,
            ast: Ast::new(),
            line: 1,
            cursor: 0,
        }
    }

    /// Line number recorded on nodes created from now on.
    pub fn at_line(&mut self, line: u32) -> &mut Self {
        self.line = line;
        self
    }

    /// The span the next node of width `width` will get.
    fn next_span(&mut self, width: usize) -> Span {
        let width = u32::try_from(width.max(1)).unwrap_or(u32::MAX);
        let start = self.cursor;
        let end = start.saturating_add(width);
        self.cursor = end.saturating_add(1);
        Span::new(start, end)
    }

    fn push(&mut self, kind: NodeKind, width: usize) -> NodeId {
        let span = self.next_span(width);
        self.ast.alloc(kind, span, self.line)
    }

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    // Literals and names

    /// A numeric literal from its token text, e.g. `"3"`, `"2.5"`, `"1e3"`.
    pub fn number(&mut self, text: &str) -> NodeId {
        let name = self.interner.intern(text);
        self.push(NodeKind::Number(name), text.len())
    }

    /// An integer literal; negative values become unary minus.
    pub fn int(&mut self, value: i64) -> NodeId {
        let literal = self.number(&value.unsigned_abs().to_string());
        if value < 0 {
            self.unary(UnaryOp::Neg, literal)
        } else {
            literal
        }
    }

    /// A float literal; the token text always carries a decimal point.
    pub fn float(&mut self, value: f64) -> NodeId {
        if value.is_nan() {
            return self.ident("NAN");
        }
        if value.is_infinite() {
            let inf = self.ident("INF");
            return if value < 0.0 {
                self.unary(UnaryOp::Neg, inf)
            } else {
                inf
            };
        }
        let mut text = format!("{:?}", value.abs());
        if !text.contains('.') {
            match text.find('e') {
                Some(pos) => text.insert_str(pos, ".0"),
                None => text.push_str(".0"),
            }
        }
        let literal = self.number(&text);
        if value.is_sign_negative() && value != 0.0 {
            self.unary(UnaryOp::Neg, literal)
        } else {
            literal
        }
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        let name = self.interner.intern(value);
        self.push(NodeKind::String(name), value.len() + 2)
    }

    pub fn ident(&mut self, name: &str) -> NodeId {
        let interned = self.interner.intern(name);
        self.push(NodeKind::Identifier(interned), name.len())
    }

    // Operators

    pub fn range(&mut self, start: NodeId, end: NodeId) -> NodeId {
        self.push(NodeKind::Range { start, end }, 1)
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.push(NodeKind::Binary { op, lhs, rhs }, op.as_symbol().len())
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.push(NodeKind::Unary { op, operand }, 1)
    }

    pub fn and(&mut self, operands: &[NodeId]) -> NodeId {
        let range = self.ast.alloc_list(operands);
        self.push(NodeKind::And(range), 1)
    }

    pub fn or(&mut self, operands: &[NodeId]) -> NodeId {
        let range = self.ast.alloc_list(operands);
        self.push(NodeKind::Or(range), 1)
    }

    pub fn conditional(&mut self, cond: NodeId, then_expr: NodeId, else_expr: NodeId) -> NodeId {
        self.push(
            NodeKind::Conditional {
                cond,
                then_expr,
                else_expr,
            },
            1,
        )
    }

    // Access

    /// `target[indices...]`; use [`AstBuilder::omitted`] for empty axes.
    pub fn subset(&mut self, target: NodeId, indices: &[NodeId]) -> NodeId {
        let indices = self.ast.alloc_list(indices);
        self.push(NodeKind::Subset { target, indices }, 1)
    }

    pub fn omitted(&mut self) -> NodeId {
        self.push(NodeKind::Omitted, 0)
    }

    pub fn member(&mut self, target: NodeId, name: &str) -> NodeId {
        let name_id = self.interner.intern(name);
        self.push(
            NodeKind::Member {
                target,
                name: name_id,
            },
            name.len() + 1,
        )
    }

    /// `name(args...)`
    pub fn call(&mut self, name: &str, args: &[NodeId]) -> NodeId {
        let callee = self.ident(name);
        let args = self.ast.alloc_list(args);
        self.push(NodeKind::Call { callee, args }, 1)
    }

    /// `target.name(args...)`
    pub fn method_call(&mut self, target: NodeId, name: &str, args: &[NodeId]) -> NodeId {
        let callee = self.member(target, name);
        let args = self.ast.alloc_list(args);
        self.push(NodeKind::Call { callee, args }, 1)
    }

    /// `name = value` inside an argument list.
    pub fn named(&mut self, name: &str, value: NodeId) -> NodeId {
        let name_id = self.interner.intern(name);
        self.push(
            NodeKind::NamedArg {
                name: name_id,
                value,
            },
            name.len(),
        )
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.push(NodeKind::Assign { target, value }, 1)
    }

    /// `name = value` with a bare identifier target.
    pub fn assign_to(&mut self, name: &str, value: NodeId) -> NodeId {
        let target = self.ident(name);
        self.assign(target, value)
    }

    // Statements

    pub fn block(&mut self, statements: &[NodeId]) -> NodeId {
        let range = self.ast.alloc_list(statements);
        self.push(NodeKind::Block(range), 1)
    }

    pub fn empty(&mut self) -> NodeId {
        self.push(NodeKind::Empty, 1)
    }

    pub fn if_then(&mut self, cond: NodeId, then_branch: NodeId) -> NodeId {
        self.push(
            NodeKind::If {
                cond,
                then_branch,
                else_branch: None,
            },
            2,
        )
    }

    pub fn if_else(&mut self, cond: NodeId, then_branch: NodeId, else_branch: NodeId) -> NodeId {
        self.push(
            NodeKind::If {
                cond,
                then_branch,
                else_branch: Some(else_branch),
            },
            2,
        )
    }

    pub fn while_loop(&mut self, cond: NodeId, body: NodeId) -> NodeId {
        self.push(NodeKind::While { cond, body }, 5)
    }

    pub fn do_while(&mut self, body: NodeId, cond: NodeId) -> NodeId {
        self.push(NodeKind::DoWhile { body, cond }, 2)
    }

    /// `for (var in seq) body`
    pub fn for_in(&mut self, var: &str, seq: NodeId, body: NodeId) -> NodeId {
        self.for_clauses(&[(var, seq)], body)
    }

    /// `for (a in x, b in y, ...) body`
    pub fn for_clauses(&mut self, clauses: &[(&str, NodeId)], body: NodeId) -> NodeId {
        let clause_ids: Vec<NodeId> = clauses
            .iter()
            .map(|&(var, seq)| {
                let var = self.interner.intern(var);
                self.push(NodeKind::InClause { var, seq }, 2)
            })
            .collect();
        let clauses = self.ast.alloc_list(&clause_ids);
        self.push(NodeKind::For { clauses, body }, 3)
    }

    pub fn next(&mut self) -> NodeId {
        self.push(NodeKind::Next, 4)
    }

    pub fn break_loop(&mut self) -> NodeId {
        self.push(NodeKind::Break, 5)
    }

    pub fn return_value(&mut self, value: Option<NodeId>) -> NodeId {
        self.push(NodeKind::Return(value), 6)
    }

    /// A parameter for [`AstBuilder::function`].
    pub fn param(&mut self, ty: TypeSpec, name: &str, default: Option<NodeId>) -> NodeId {
        let name_id = self.interner.intern(name);
        self.push(
            NodeKind::Param {
                ty,
                name: name_id,
                default,
            },
            name.len(),
        )
    }

    /// `function (return_type)name(params) body`
    pub fn function(
        &mut self,
        return_type: TypeSpec,
        name: &str,
        params: &[NodeId],
        body: NodeId,
    ) -> NodeId {
        let name_id = self.interner.intern(name);
        let params = self.ast.alloc_list(params);
        self.push(
            NodeKind::FunctionDecl {
                return_type,
                name: name_id,
                params,
                body,
            },
            8,
        )
    }

    /// Wrap `statements` in a root block and hand back the finished tree.
    pub fn finish(mut self, statements: &[NodeId]) -> Ast {
        let root = self.block(statements);
        self.ast.set_root(root);
        self.ast
    }

    /// The tree built so far, without a root.
    pub fn ast(&self) -> &Ast {
        &self.ast
    }
}
