//! Blocks, conditionals and loops.

use std::rc::Rc;

use eidos_ir::{Name, NodeId, NodeKind, NodeRange};
use eidos_value::errors::{condition_size, for_iteration_mismatch};
use eidos_value::{EvalError, EvalResult, Value};
use smallvec::SmallVec;

use super::range::{check_operands, int_endpoints, make_range, IntRange};
use super::{Flow, Interpreter};

/// The sequence one `in` clause walks.
enum Sequence {
    /// `a:b` over integers, or `seqLen()`/`seqAlong()`, never materialized.
    Ints(IntRange),
    /// Any other value, walked element by element.
    Values(Value),
}

impl Sequence {
    fn len(&self) -> usize {
        match self {
            Sequence::Ints(range) => range.len(),
            Sequence::Values(value) => value.len(),
        }
    }

    fn at(&self, index: usize) -> Result<Value, EvalError> {
        match self {
            Sequence::Ints(range) => Ok(Value::int_scalar(range.at(index))),
            Sequence::Values(value) => value.element(index),
        }
    }
}

impl Interpreter<'_> {
    pub(super) fn exec_block(&mut self, statements: NodeRange) -> Result<Flow, EvalError> {
        let script = Rc::clone(&self.script);
        let mut last = self.constants().invisible_null.clone();
        for &statement in script.list(statements) {
            match self.exec(statement)? {
                Flow::Normal(value) => last = value,
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal(last))
    }

    /// Evaluate a condition: a singleton that converts to logical.
    fn condition(&mut self, node: NodeId, statement: &'static str) -> Result<bool, EvalError> {
        let value = self.eval(node)?;
        let constants = self.constants();
        if value.ptr_eq(&constants.t) {
            return Ok(true);
        }
        if value.ptr_eq(&constants.f) {
            return Ok(false);
        }
        if !value.is_singleton() {
            return Err(condition_size(statement));
        }
        value.truth_at(0)
    }

    pub(super) fn exec_if(
        &mut self,
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    ) -> Result<Flow, EvalError> {
        if self.condition(cond, "if statement")? {
            self.exec(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.exec(else_branch)
        } else {
            Ok(Flow::Normal(self.constants().invisible_null.clone()))
        }
    }

    pub(super) fn eval_conditional(
        &mut self,
        cond: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    ) -> EvalResult {
        if self.condition(cond, "ternary conditional")? {
            self.eval(then_expr)
        } else {
            self.eval(else_expr)
        }
    }

    pub(super) fn exec_while(&mut self, cond: NodeId, body: NodeId) -> Result<Flow, EvalError> {
        let mut looped = self.enter_loop(&[])?;
        while looped.condition(cond, "while loop")? {
            match looped.exec(body)? {
                Flow::Normal(_) | Flow::Next => {}
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
            }
        }
        Ok(Flow::Normal(looped.constants().invisible_null.clone()))
    }

    pub(super) fn exec_do_while(&mut self, body: NodeId, cond: NodeId) -> Result<Flow, EvalError> {
        let mut looped = self.enter_loop(&[])?;
        loop {
            match looped.exec(body)? {
                Flow::Normal(_) | Flow::Next => {}
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
            }
            if !looped.condition(cond, "do-while loop")? {
                break;
            }
        }
        Ok(Flow::Normal(looped.constants().invisible_null.clone()))
    }

    /// `for (a in x, b in y, ...) body`.
    ///
    /// Every sequence is evaluated, and all must have the same length,
    /// before the body first runs.
    pub(super) fn exec_for(&mut self, clauses: NodeRange, body: NodeId) -> Result<Flow, EvalError> {
        let script = Rc::clone(&self.script);
        let mut vars: SmallVec<[Name; 2]> = SmallVec::new();
        let mut sequences: SmallVec<[Sequence; 2]> = SmallVec::new();
        for &clause in script.list(clauses) {
            let NodeKind::InClause { var, seq } = *script.kind(clause) else {
                return Err(EvalError::new("for loop clause is not an 'in' clause"));
            };
            let sequence = self
                .sequence(seq)
                .map_err(|err| self.blame(err, clause))?;
            vars.push(var);
            sequences.push(sequence);
        }

        let count = sequences.first().map_or(0, Sequence::len);
        if sequences.iter().any(|s| s.len() != count) {
            return Err(for_iteration_mismatch());
        }

        let mut looped = self.enter_loop(&vars)?;
        for index in 0..count {
            for (&var, sequence) in vars.iter().zip(&sequences) {
                let value = sequence.at(index)?;
                looped.symbols.set_iterator_value(var, value);
            }
            match looped.exec(body)? {
                Flow::Normal(_) | Flow::Next => {}
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
            }
        }
        Ok(Flow::Normal(looped.constants().invisible_null.clone()))
    }

    /// Evaluate one `in` clause's sequence, lazily where its shape allows.
    fn sequence(&mut self, node: NodeId) -> Result<Sequence, EvalError> {
        match *self.script.kind(node) {
            NodeKind::Range { start, end } => {
                let first = self.eval(start)?;
                let last = self.eval(end)?;
                check_operands(&first, &last)?;
                match int_endpoints(&first, &last) {
                    Some((a, b)) => Ok(Sequence::Ints(IntRange::new(a, b)?)),
                    None => make_range(&first, &last).map(Sequence::Values),
                }
            }
            NodeKind::Call { callee, args } => {
                let names = self.runtime.names;
                let arg_nodes = self.script.list(args);
                let single = match arg_nodes {
                    [arg] if !matches!(self.script.kind(*arg), NodeKind::NamedArg { .. }) => {
                        Some(*arg)
                    }
                    _ => None,
                };
                let target = match *self.script.kind(callee) {
                    NodeKind::Identifier(name) if name == names.seq_len || name == names.seq_along => {
                        single.map(|arg| (name, arg))
                    }
                    _ => None,
                };
                let Some((name, arg)) = target else {
                    return self.eval(node).map(Sequence::Values);
                };

                let value = self.eval(arg)?;
                if name == names.seq_along {
                    return Ok(Sequence::Ints(IntRange::counting(value.len())));
                }
                match value.as_ints() {
                    Some(&[n]) if n >= 0 => Ok(Sequence::Ints(IntRange::counting(
                        usize::try_from(n).unwrap_or(usize::MAX),
                    ))),
                    // Let seqLen() itself report the bad argument.
                    _ => self
                        .invoke_function(node, name, &[value], &[None])
                        .map(Sequence::Values),
                }
            }
            _ => self.eval(node).map(Sequence::Values),
        }
    }
}
