//! `function (type)name(params) { body }`.

use std::rc::Rc;

use eidos_ir::{Name, NodeId, NodeKind, NodeRange, TypeSpec, UnaryOp, ValueMask};
use eidos_value::errors::invalid_default;
use eidos_value::{EvalError, EvalResult, Param, SignatureBuilder};

use super::Interpreter;
use crate::functions::UserFunction;

impl Interpreter<'_> {
    /// Register a user-defined function. Redeclaring a user-defined name
    /// replaces it; built-in names cannot be taken.
    pub(super) fn declare_function(
        &mut self,
        return_type: TypeSpec,
        name: Name,
        params: NodeRange,
        body: NodeId,
    ) -> EvalResult {
        let script = Rc::clone(&self.script);
        let mut builder = SignatureBuilder::function(self.name_str(name), return_type.mask);
        if let Some(class) = return_type.class {
            builder = builder.return_class(self.name_str(class));
        }

        let mut names = Vec::with_capacity(params.len());
        for &param in script.list(params) {
            let NodeKind::Param {
                ty,
                name: param_name,
                default,
            } = *script.kind(param)
            else {
                return Err(EvalError::new(
                    "function parameter list holds a node that is not a parameter",
                ));
            };
            let default = default
                .map(|node| self.param_default(param_name, node))
                .transpose()?;
            let mask = if default.is_some() {
                ty.mask | ValueMask::OPTIONAL
            } else {
                ty.mask
            };
            builder = builder.push(Param {
                name: self.name_str(param_name).to_string(),
                mask,
                class: ty.class.map(|class| self.name_str(class).to_string()),
                default,
            });
            names.push(param_name);
        }

        let signature = builder.finish()?;
        tracing::debug!(%signature, "declaring function");
        self.runtime.registry().register_user(
            Rc::new(signature),
            UserFunction {
                script,
                body,
                params: names,
            },
        )?;
        Ok(self.constants().void.clone())
    }

    /// A parameter default: a numeric or string literal, a negated numeric
    /// literal, or an intrinsic constant.
    fn param_default(&mut self, param: Name, node: NodeId) -> EvalResult {
        match *self.script.kind(node) {
            NodeKind::Number(_) | NodeKind::String(_) => self.eval(node),
            NodeKind::Unary {
                op: UnaryOp::Neg,
                operand,
            } if matches!(self.script.kind(operand), NodeKind::Number(_)) => self.eval(node),
            NodeKind::Identifier(name) => {
                let text = self.name_str(name);
                self.constants()
                    .named()
                    .into_iter()
                    .find(|&(constant, _)| constant == text)
                    .map(|(_, value)| value.clone())
                    .ok_or_else(|| invalid_default(self.name_str(param)))
            }
            _ => Err(invalid_default(self.name_str(param))),
        }
    }
}
