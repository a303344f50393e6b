//! Callable signatures.
//!
//! A signature names a function or method, declares its return type and
//! lists its parameters. Construction goes through [`SignatureBuilder`],
//! which enforces the parameter ordering rules once so the binder can trust
//! them.

use std::fmt;

use eidos_ir::ValueMask;

use crate::errors::{
    argument_singleton, argument_type, object_class_mismatch, return_type, EvalError,
};
use crate::value::{Value, ValueType};

/// Rejected parameter list.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("parameter {name} of {callee} is declared twice")]
    DuplicateParameter { name: String, callee: String },
    #[error("required parameter {name} of {callee} follows an optional parameter")]
    RequiredAfterOptional { name: String, callee: String },
    #[error("parameter {name} of {callee} follows the ellipsis")]
    AfterEllipsis { name: String, callee: String },
    #[error("optional parameter {name} of {callee} has no default value")]
    MissingDefault { name: String, callee: String },
}

impl From<SignatureError> for EvalError {
    fn from(err: SignatureError) -> Self {
        EvalError::new(err.to_string())
    }
}

/// Functions are called by name; methods on an object receiver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallableKind {
    Function,
    Method,
}

/// One declared parameter.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: String,
    pub mask: ValueMask,
    /// Required object element class, for object-typed parameters.
    pub class: Option<String>,
    /// Present exactly when the mask is optional.
    pub default: Option<Value>,
}

impl Param {
    pub fn is_optional(&self) -> bool {
        self.mask.is_optional()
    }

    fn describe(&self) -> String {
        let body = (self.mask - ValueMask::OPTIONAL).describe(self.class.as_deref(), &self.name);
        match &self.default {
            Some(default) if self.is_optional() => format!("[{body} = {default}]"),
            _ => body,
        }
    }
}

/// Immutable description of a callable.
#[derive(Clone, Debug)]
pub struct Signature {
    name: String,
    kind: CallableKind,
    return_mask: ValueMask,
    return_class: Option<String>,
    params: Vec<Param>,
    ellipsis: bool,
    /// Name the embedding hook is asked to run, for delegated functions.
    delegate_name: Option<String>,
}

impl Signature {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CallableKind {
        self.kind
    }

    pub fn return_mask(&self) -> ValueMask {
        self.return_mask
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<&Param> {
        self.params.get(index)
    }

    /// Index of the parameter called `name`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Whether extra unnamed arguments are collected after the parameters.
    pub fn has_ellipsis(&self) -> bool {
        self.ellipsis
    }

    pub fn delegate_name(&self) -> Option<&str> {
        self.delegate_name.as_deref()
    }

    /// `function f()` or `method m()`, as used in error messages.
    pub fn call_label(&self) -> String {
        match self.kind {
            CallableKind::Function => format!("function {}()", self.name),
            CallableKind::Method => format!("method {}()", self.name),
        }
    }

    /// Check one bound argument against parameter `index`.
    pub fn check_argument(&self, index: usize, value: &Value) -> Result<(), EvalError> {
        let Some(param) = self.params.get(index) else {
            return Ok(());
        };
        let ty = value.value_type();
        if !param.mask.kinds().intersects(ty.mask_bit()) {
            return Err(argument_type(
                index + 1,
                &param.name,
                ty.name(),
                &self.call_label(),
            ));
        }
        if let (Some(expected), Some(class)) = (&param.class, value.object_class()) {
            if class.name() != expected {
                return Err(object_class_mismatch(expected, class.name()));
            }
        }
        if param.mask.requires_singleton() && ty != ValueType::Null && value.len() != 1 {
            return Err(argument_singleton(
                index + 1,
                &param.name,
                value.len(),
                &self.call_label(),
            ));
        }
        Ok(())
    }

    /// Check a return value. NULL is always accepted; void only when the
    /// declared return type is void.
    pub fn check_return(&self, value: &Value) -> Result<(), EvalError> {
        let ty = value.value_type();
        let ok = match ty {
            ValueType::Null => true,
            ValueType::Void => self.return_mask.kinds() == ValueMask::NULL,
            _ => self.return_mask.kinds().intersects(ty.mask_bit()),
        };
        if !ok {
            return Err(return_type(ty.name(), &self.call_label()));
        }
        if let (Some(expected), Some(class)) = (&self.return_class, value.object_class()) {
            if class.name() != expected {
                return Err(object_class_mismatch(expected, class.name()));
            }
        }
        if self.return_mask.requires_singleton() && ty != ValueType::Null && value.len() != 1 {
            return Err(return_type(ty.name(), &self.call_label()));
        }
        Ok(())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ret = self
            .return_mask
            .describe(self.return_class.as_deref(), "");
        let mut parts: Vec<String> = self.params.iter().map(Param::describe).collect();
        if self.ellipsis {
            parts.push("...".to_string());
        }
        if parts.is_empty() {
            parts.push("void".to_string());
        }
        write!(f, "({ret}){}({})", self.name, parts.join(", "))
    }
}

/// Builder for [`Signature`].
#[derive(Debug)]
pub struct SignatureBuilder {
    sig: Signature,
    /// First ordering violation, reported by `finish`.
    error: Option<SignatureError>,
}

impl SignatureBuilder {
    pub fn function(name: &str, return_mask: ValueMask) -> Self {
        Self::new(name, CallableKind::Function, return_mask)
    }

    pub fn method(name: &str, return_mask: ValueMask) -> Self {
        Self::new(name, CallableKind::Method, return_mask)
    }

    fn new(name: &str, kind: CallableKind, return_mask: ValueMask) -> Self {
        SignatureBuilder {
            sig: Signature {
                name: name.to_string(),
                kind,
                return_mask,
                return_class: None,
                params: Vec::new(),
                ellipsis: false,
                delegate_name: None,
            },
            error: None,
        }
    }

    #[must_use]
    pub fn return_class(mut self, class: &str) -> Self {
        self.sig.return_class = Some(class.to_string());
        self
    }

    /// Route calls through the embedding hook under `name`.
    #[must_use]
    pub fn delegate(mut self, name: &str) -> Self {
        self.sig.delegate_name = Some(name.to_string());
        self
    }

    /// A required parameter.
    #[must_use]
    pub fn param(self, mask: ValueMask, name: &str) -> Self {
        self.push(Param {
            name: name.to_string(),
            mask: mask - ValueMask::OPTIONAL,
            class: None,
            default: None,
        })
    }

    /// An optional parameter with its default.
    #[must_use]
    pub fn optional(self, mask: ValueMask, name: &str, default: Value) -> Self {
        self.push(Param {
            name: name.to_string(),
            mask: mask | ValueMask::OPTIONAL,
            class: None,
            default: Some(default),
        })
    }

    /// A parameter with a fully specified declaration.
    #[must_use]
    pub fn push(mut self, param: Param) -> Self {
        if self.error.is_none() {
            self.error = self.validate(&param);
        }
        self.sig.params.push(param);
        self
    }

    /// Constrain the most recently added parameter to an object class.
    #[must_use]
    pub fn of_class(mut self, class: &str) -> Self {
        if let Some(param) = self.sig.params.last_mut() {
            param.class = Some(class.to_string());
        }
        self
    }

    /// Collect extra unnamed arguments after the declared parameters.
    #[must_use]
    pub fn ellipsis(mut self) -> Self {
        self.sig.ellipsis = true;
        self
    }

    fn validate(&self, param: &Param) -> Option<SignatureError> {
        let callee = self.sig.call_label();
        let name = param.name.clone();
        if self.sig.ellipsis {
            return Some(SignatureError::AfterEllipsis { name, callee });
        }
        if self.sig.params.iter().any(|p| p.name == param.name) {
            return Some(SignatureError::DuplicateParameter { name, callee });
        }
        if param.is_optional() && param.default.is_none() {
            return Some(SignatureError::MissingDefault { name, callee });
        }
        let after_optional = self.sig.params.last().is_some_and(Param::is_optional);
        if after_optional && !param.is_optional() {
            return Some(SignatureError::RequiredAfterOptional { name, callee });
        }
        None
    }

    pub fn finish(self) -> Result<Signature, SignatureError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.sig),
        }
    }
}
