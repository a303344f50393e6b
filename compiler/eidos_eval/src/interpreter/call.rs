//! Function and method calls.
//!
//! Arguments are evaluated left to right in call-site order, then arranged
//! by the call site's cached [`FillPlan`] and checked against the
//! signature. User-defined functions run in a child interpreter with fresh
//! locals over the shared constants scope.

use std::rc::Rc;

use eidos_ir::{Name, NodeId, NodeKind, NodeRange};
use eidos_value::errors::{object_required, undefined_function, EvalNote};
use eidos_value::{EvalError, EvalResult, Signature, Value, Vector};
use smallvec::SmallVec;

use super::{Flow, Interpreter, InterpreterBuilder};
use crate::binder::{BoundArgs, FillPlan};
use crate::diagnostics::CallFrame;
use crate::error_context::Blame;
use crate::functions::{Callee, FunctionEntry, UserFunction};

/// Evaluated call-site arguments and their names, in call-site order.
type Arguments = (SmallVec<[Value; 4]>, SmallVec<[Option<Name>; 4]>);

impl Interpreter<'_> {
    pub(super) fn eval_call(&mut self, id: NodeId, callee: NodeId, args: NodeRange) -> EvalResult {
        match *self.script.kind(callee) {
            NodeKind::Identifier(name) => {
                let entry = self
                    .function_entry(name)
                    .map_err(|err| self.note_variable(err, callee, name))?;
                let (values, names) = self.eval_arguments(args)?;
                self.call_entry(id, &entry, &values, &names)
            }
            NodeKind::Member { target, name } => self.call_method(id, target, name, args),
            _ => Err(EvalError::new(
                "a call requires a function name or a method on an object",
            )),
        }
    }

    fn function_entry(&self, name: Name) -> Result<FunctionEntry, EvalError> {
        self.runtime
            .registry()
            .get(name)
            .ok_or_else(|| undefined_function(self.name_str(name)))
    }

    /// Point out that an unknown function name is bound as a variable.
    fn note_variable(&self, err: EvalError, callee: NodeId, name: Name) -> EvalError {
        if !self.symbols.contains(name) {
            return err;
        }
        let note = format!("{} is a variable, not a function", self.name_str(name));
        err.with_note(EvalNote::with_span(note, self.script.node(callee).span))
    }

    /// Call function `name` with arguments that are already evaluated, as
    /// if from call site `call_node`.
    pub(crate) fn invoke_function(
        &mut self,
        call_node: NodeId,
        name: Name,
        values: &[Value],
        names: &[Option<Name>],
    ) -> EvalResult {
        let entry = self.function_entry(name)?;
        self.call_entry(call_node, &entry, values, names)
    }

    fn eval_arguments(&mut self, args: NodeRange) -> Result<Arguments, EvalError> {
        let script = Rc::clone(&self.script);
        let nodes = script.list(args);
        let mut values = SmallVec::with_capacity(nodes.len());
        let mut names = SmallVec::with_capacity(nodes.len());
        for &node in nodes {
            match *script.kind(node) {
                NodeKind::NamedArg { name, value } => {
                    values.push(self.eval(value)?);
                    names.push(Some(name));
                }
                _ => {
                    values.push(self.eval(node)?);
                    names.push(None);
                }
            }
        }
        Ok((values, names))
    }

    /// The fill plan of `call_node` for `signature`, built on first use.
    fn fill_plan(
        &self,
        call_node: NodeId,
        signature: &Rc<Signature>,
        names: &[Option<Name>],
    ) -> Result<Rc<FillPlan>, EvalError> {
        if let Some(plan) = self.script.cached_plan(call_node, signature) {
            return Ok(plan);
        }
        let arg_names: SmallVec<[Option<&str>; 4]> = names
            .iter()
            .map(|name| name.map(|name| self.name_str(name)))
            .collect();
        let plan = Rc::new(FillPlan::build(signature, &arg_names)?);
        self.script.cache_plan(call_node, signature, &plan);
        Ok(plan)
    }

    fn call_entry(
        &mut self,
        call_node: NodeId,
        entry: &FunctionEntry,
        values: &[Value],
        names: &[Option<Name>],
    ) -> EvalResult {
        let plan = self.fill_plan(call_node, &entry.signature, names)?;
        let bound = plan.bind(&entry.signature, values)?;
        self.dispatch(call_node, entry, &bound)
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(function = entry.signature.name())
    )]
    fn dispatch(
        &mut self,
        call_node: NodeId,
        entry: &FunctionEntry,
        args: &BoundArgs,
    ) -> EvalResult {
        let runtime = self.runtime;
        let _blame = self.script.is_user().then(|| {
            runtime.error_context().push(Blame {
                span: self.script.node(call_node).span,
                in_user_script: true,
            })
        });

        let signature = &entry.signature;
        let result = match &entry.callee {
            Callee::Native(function) => function(self, args)?,
            Callee::User(function) => self.call_user(call_node, signature, function, args)?,
            Callee::Delegated => {
                let delegate = runtime.delegate().cloned().ok_or_else(|| {
                    EvalError::new(format!(
                        "no function delegate is installed to run {}",
                        signature.call_label()
                    ))
                })?;
                let name = signature.delegate_name().unwrap_or(signature.name());
                delegate.call(name, args, self)?
            }
        };
        signature.check_return(&result)?;
        Ok(result)
    }

    /// Run a user-defined function body in a child interpreter.
    ///
    /// Falling off the end of the body, or a bare `return;`, yields void.
    fn call_user(
        &mut self,
        call_node: NodeId,
        signature: &Signature,
        function: &UserFunction,
        args: &BoundArgs,
    ) -> EvalResult {
        let runtime = self.runtime;
        let _frame = self.call_stack.enter(CallFrame {
            name: runtime.interner().intern(signature.name()),
            call_span: Some(self.script.node(call_node).span),
        })?;

        let mut symbols = self.symbols.function_scope();
        for (&param, value) in function.params.iter().zip(args.values()) {
            symbols.define(param, value.clone().into_visible())?;
        }

        let mut child = InterpreterBuilder::new(runtime, Rc::clone(&function.script))
            .symbols(symbols)
            .call_stack(self.call_stack.clone())
            .build();
        let flow = child
            .exec(function.body)
            .map_err(|err| self.call_stack.attach_backtrace(err, runtime.interner()))?;
        Ok(match flow {
            Flow::Return(value) => value,
            Flow::Normal(_) | Flow::Next | Flow::Break => runtime.constants().void.clone(),
        })
    }

    /// `target.name(args...)`, called on every element of the receiver.
    fn call_method(
        &mut self,
        id: NodeId,
        target: NodeId,
        name: Name,
        args: NodeRange,
    ) -> EvalResult {
        let receiver = self.eval(target)?;
        let method = self.name_str(name);
        let Vector::Object(objects) = receiver.vector() else {
            return Err(object_required("method call", receiver.value_type().name()));
        };
        let Some(class) = &objects.class else {
            self.eval_arguments(args)?;
            return Ok(self.constants().null.clone());
        };
        let signature = Rc::clone(class.method(method)?);

        let (values, names) = self.eval_arguments(args)?;
        let plan = self.fill_plan(id, &signature, &names)?;
        let bound = plan.bind(&signature, &values)?.to_vec();

        let results = objects
            .elements
            .iter()
            .map(|element| {
                let result = element.call_method(method, &bound)?;
                signature.check_return(&result)?;
                Ok(result)
            })
            .collect::<Result<Vec<_>, EvalError>>()?;

        match results.as_slice() {
            [single] => Ok(single.clone()),
            all if !all.is_empty() && all.iter().all(Value::is_void) => {
                Ok(self.constants().void.clone())
            }
            all => Value::concat(all),
        }
    }
}
