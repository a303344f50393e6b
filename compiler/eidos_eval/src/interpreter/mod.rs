//! Tree-walking interpreter.
//!
//! Every node kind has one routine, selected by `match` over the closed
//! [`NodeKind`] enum. Expressions go through [`Interpreter::eval`] and
//! produce a [`Value`]; statements go through [`Interpreter::exec`] and
//! produce a [`Flow`] that loops and function bodies consume.
//!
//! Helper modules:
//!
//! - `control` - blocks, conditionals, loops
//! - `expr` - literals, member access, `&` and `|`
//! - `range` - the `:` operator
//! - `subscript` - `x[i]` and `x[i, j, ...]`
//! - `assign` - assignment and its in-place fast paths
//! - `call` - function and method dispatch
//! - `function_decl` - user-defined function declarations
//!
//! Errors unwind as `Err(EvalError)`. On the way out each node gives the
//! error its span if it has none yet, so the innermost node wins.

mod assign;
mod builder;
mod call;
mod control;
mod expr;
mod function_decl;
mod loop_guard;
mod range;
mod subscript;

pub use builder::InterpreterBuilder;

use std::rc::Rc;

use eidos_ir::{Name, NodeId, NodeKind};
use eidos_value::errors::stray_control;
use eidos_value::{Constants, EvalError, EvalResult, Value};

use crate::debug_points::{entry_line, exit_line};
use crate::diagnostics::CallStack;
use crate::environment::SymbolTable;
use crate::operators::evaluate_binary;
use crate::runtime::Runtime;
use crate::script::Script;
use crate::stack::ensure_sufficient_stack;
use crate::unary_operators::evaluate_unary;

/// Outcome of executing a statement.
#[derive(Clone, Debug)]
pub enum Flow {
    /// Completed; carries the statement's value.
    Normal(Value),
    Next,
    Break,
    Return(Value),
}

/// Evaluates one script against one symbol table.
pub struct Interpreter<'rt> {
    pub(crate) runtime: &'rt Runtime,
    pub(crate) script: Rc<Script>,
    pub(crate) symbols: SymbolTable,
    pub(crate) call_stack: CallStack,
    /// Number of loops enclosing the statement being executed, within
    /// this interpreter's function body.
    pub(crate) loop_depth: u32,
}

impl<'rt> Interpreter<'rt> {
    pub fn runtime(&self) -> &'rt Runtime {
        self.runtime
    }

    pub fn script(&self) -> &Rc<Script> {
        &self.script
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Give back the symbol table, e.g. to run another script against the
    /// same global variables.
    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    pub fn call_depth(&self) -> usize {
        self.call_stack.depth()
    }

    #[inline]
    pub(crate) fn constants(&self) -> &'rt Constants {
        self.runtime.constants()
    }

    #[inline]
    pub(crate) fn name_str(&self, name: Name) -> &'static str {
        self.runtime.interner().lookup(name)
    }

    /// Run the script's root block. Returns the value of its last
    /// statement, or the value of a top-level `return`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate_block(&mut self) -> EvalResult {
        let root = self.script.root();
        match self.exec(root)? {
            Flow::Normal(value) | Flow::Return(value) => Ok(value),
            // `exec` raises for next/break outside a loop.
            Flow::Next | Flow::Break => Ok(self.constants().void.clone()),
        }
    }

    /// Like [`evaluate_block`](Self::evaluate_block), but with
    /// `print_output` each visible top-level result is echoed to the
    /// output stream as it is produced.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate_interpreter_block(&mut self, print_output: bool) -> EvalResult {
        let script = Rc::clone(&self.script);
        let root = script.root();
        let statements: &[NodeId] = match script.kind(root) {
            NodeKind::Block(list) => script.list(*list),
            _ => std::slice::from_ref(&root),
        };

        let mut last = self.constants().void.clone();
        for &statement in statements {
            match self.exec(statement)? {
                Flow::Normal(value) => {
                    if print_output && !value.is_invisible() && !value.is_void() {
                        self.runtime.streams().output.println(&value.to_string());
                    }
                    last = value;
                }
                Flow::Return(value) => return Ok(value),
                Flow::Next | Flow::Break => {}
            }
        }
        Ok(last)
    }

    /// Give `err` a position: this node's span in a user script, the
    /// current user-script call site otherwise.
    pub(crate) fn blame(&self, err: EvalError, node: NodeId) -> EvalError {
        self.runtime
            .error_context()
            .blame(err, self.script.node(node).span, self.script.is_user())
    }

    /// Evaluate an expression node.
    pub(crate) fn eval(&mut self, node: NodeId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_node(node)).map_err(|err| self.blame(err, node))
    }

    fn eval_node(&mut self, id: NodeId) -> EvalResult {
        let kind = *self.script.kind(id);
        tracing::trace!(node = kind.label(), "eval");
        match kind {
            NodeKind::Number(text) => self.eval_number(id, text),
            NodeKind::String(text) => Ok(self.eval_string(id, text)),
            NodeKind::Identifier(name) => self.symbols.lookup(name),
            NodeKind::Range { start, end } => self.eval_range(id, start, end),
            NodeKind::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                evaluate_binary(self.constants(), op, &lhs, &rhs)
            }
            NodeKind::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                evaluate_unary(self.constants(), op, &operand)
            }
            NodeKind::And(operands) => self.eval_logical(operands, true),
            NodeKind::Or(operands) => self.eval_logical(operands, false),
            NodeKind::Subset { target, indices } => self.eval_subset(target, indices),
            NodeKind::Member { target, name } => self.eval_member(target, name),
            NodeKind::Call { callee, args } => self.eval_call(id, callee, args),
            NodeKind::Assign { target, value } => self.eval_assign(target, value),
            NodeKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => self.eval_conditional(cond, then_expr, else_expr),
            NodeKind::NamedArg { .. }
            | NodeKind::Omitted
            | NodeKind::InClause { .. }
            | NodeKind::Param { .. } => Err(EvalError::new(format!(
                "{} cannot be evaluated outside its parent",
                kind.label()
            ))),
            NodeKind::Block(_)
            | NodeKind::Empty
            | NodeKind::If { .. }
            | NodeKind::While { .. }
            | NodeKind::DoWhile { .. }
            | NodeKind::For { .. }
            | NodeKind::Next
            | NodeKind::Break
            | NodeKind::Return(_)
            | NodeKind::FunctionDecl { .. } => match self.exec_node(id)? {
                Flow::Normal(value) => Ok(value),
                _ => Err(EvalError::new(format!(
                    "{} cannot be used as a value",
                    kind.label()
                ))),
            },
        }
    }

    /// Execute a statement node.
    pub(crate) fn exec(&mut self, node: NodeId) -> Result<Flow, EvalError> {
        let line = self.script.node(node).line;
        let traced = self
            .runtime
            .debug_points()
            .is_some_and(|points| points.contains(line));
        if traced {
            let label = self.script.kind(node).label();
            self.runtime
                .streams()
                .diagnostics
                .println(&entry_line(line, label));
        }

        let flow = ensure_sufficient_stack(|| self.exec_node(node))
            .map_err(|err| self.blame(err, node))?;

        if traced {
            if let Flow::Normal(value) = &flow {
                self.runtime
                    .streams()
                    .diagnostics
                    .println(&exit_line(line, &value.to_string()));
            }
        }
        Ok(flow)
    }

    fn exec_node(&mut self, id: NodeId) -> Result<Flow, EvalError> {
        let kind = *self.script.kind(id);
        match kind {
            NodeKind::Block(statements) => self.exec_block(statements),
            NodeKind::Empty => Ok(Flow::Normal(self.constants().invisible_null.clone())),
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.exec_if(cond, then_branch, else_branch),
            NodeKind::While { cond, body } => self.exec_while(cond, body),
            NodeKind::DoWhile { body, cond } => self.exec_do_while(body, cond),
            NodeKind::For { clauses, body } => self.exec_for(clauses, body),
            NodeKind::Next => {
                if self.loop_depth == 0 {
                    return Err(stray_control("next"));
                }
                Ok(Flow::Next)
            }
            NodeKind::Break => {
                if self.loop_depth == 0 {
                    return Err(stray_control("break"));
                }
                Ok(Flow::Break)
            }
            NodeKind::Return(value) => {
                let value = match value {
                    Some(node) => self.eval(node)?,
                    None => self.constants().void.clone(),
                };
                Ok(Flow::Return(value))
            }
            NodeKind::FunctionDecl {
                return_type,
                name,
                params,
                body,
            } => self
                .declare_function(return_type, name, params, body)
                .map(Flow::Normal),
            _ => self.eval_node(id).map(Flow::Normal),
        }
    }
}

#[cfg(test)]
mod tests;
