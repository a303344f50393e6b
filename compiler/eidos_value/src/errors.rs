//! Evaluation errors.
//!
//! A failure is an `Err(EvalError)` that unwinds to the embedding caller;
//! there is no in-language recovery. `EvalErrorKind` carries the structured
//! data and `message` its rendering. Factory functions below are the public
//! way to build errors; they are `#[cold]` since errors are off the hot path.

use eidos_ir::Span;
use std::fmt;

use crate::value::Value;

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
///
/// Grouped by the taxonomy: type errors, shape errors, range errors,
/// binding errors, and control-flow misuse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Type
    UnsupportedOperand {
        op: String,
        type_name: &'static str,
    },
    OperandCombination {
        op: String,
        left: &'static str,
        right: &'static str,
    },
    NullComparison {
        op: String,
    },
    InvalidConversion {
        from: &'static str,
        to: &'static str,
    },
    AssignmentTypeMismatch {
        target: &'static str,
        value: &'static str,
    },
    ObjectClassMismatch {
        expected: String,
        got: String,
    },
    ObjectRequired {
        op: String,
        type_name: &'static str,
    },
    PropertyType {
        property: String,
        type_name: &'static str,
    },

    // Shape
    SizeMismatch {
        op: String,
    },
    NonConformable {
        op: String,
    },
    ConditionSize {
        statement: &'static str,
    },
    AssignmentSize,
    LogicalIndexSize,
    SubscriptRank {
        given: usize,
        rank: usize,
    },
    ForIterationMismatch,
    RangeOperandSize,

    // Range
    IndexOutOfRange {
        index: i64,
    },
    IntegerOverflow {
        operation: String,
    },
    RangeTooLong {
        limit: usize,
    },
    RangeUnderflow,
    RangeNonFinite,
    InvalidNumber {
        text: String,
    },
    StackOverflow {
        depth: usize,
    },

    // Binding
    UndefinedIdentifier {
        name: String,
    },
    UndefinedFunction {
        name: String,
    },
    ConstantRedefinition {
        name: String,
    },
    IteratorReassignment {
        name: String,
    },
    AlreadyDefined {
        name: String,
    },
    ConstantRemoval {
        name: String,
        intrinsic: bool,
    },
    InvalidDefault {
        name: String,
    },
    DuplicateArgument {
        name: String,
        callee: String,
    },
    ArgumentOutOfOrder {
        name: String,
        callee: String,
    },
    UnnamedAfterNamed {
        callee: String,
    },
    UnknownArgument {
        name: String,
        callee: String,
    },
    TooManyArguments {
        max: usize,
        got: usize,
        callee: String,
    },
    MissingArgument {
        name: String,
        callee: String,
    },
    SkippedRequired {
        skipped: String,
        named: String,
        callee: String,
    },
    ArgumentType {
        position: usize,
        name: String,
        type_name: &'static str,
        callee: String,
    },
    ArgumentSingleton {
        position: usize,
        name: String,
        size: usize,
        callee: String,
    },
    ReturnType {
        type_name: &'static str,
        callee: String,
    },
    BuiltinReplacement {
        name: String,
    },

    // Objects
    UndefinedProperty {
        property: String,
        class: String,
    },
    UndefinedMethod {
        method: String,
        class: String,
    },
    ReadOnlyProperty {
        property: String,
        class: String,
    },
    NotAnLvalue,

    // Control flow
    StrayControl {
        statement: &'static str,
    },

    /// Raised by script code through `stop()`.
    Stop {
        message: String,
    },

    /// Errors without a structured category (host objects, delegates).
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Type
            Self::UnsupportedOperand { op, type_name } => {
                write!(f, "operand type {type_name} is not supported by the '{op}' operator")
            }
            Self::OperandCombination { op, left, right } => write!(
                f,
                "the combination of operand types {left} and {right} is not supported by the binary '{op}' operator"
            ),
            Self::NullComparison { op } => write!(
                f,
                "testing NULL with the '{op}' operator is an error; use isNULL()"
            ),
            Self::InvalidConversion { from, to } => {
                write!(f, "operand type {from} cannot be converted to type {to}")
            }
            Self::AssignmentTypeMismatch { target, value } => write!(
                f,
                "type mismatch in assignment: {value} cannot be assigned into {target}"
            ),
            Self::ObjectClassMismatch { expected, got } => write!(
                f,
                "object element type {got} does not match expected type {expected}"
            ),
            Self::ObjectRequired { op, type_name } => write!(
                f,
                "operand type {type_name} is not supported by the '{op}' operator; \
                 an object operand is required"
            ),
            Self::PropertyType {
                property,
                type_name,
            } => write!(
                f,
                "value of type {type_name} cannot be assigned to property {property}"
            ),

            // Shape
            Self::SizeMismatch { op } => write!(
                f,
                "the '{op}' operator requires that either (1) both operands have the same \
                 size(), or (2) one operand has size() == 1"
            ),
            Self::NonConformable { op } => {
                write!(f, "non-conformable array operands to the '{op}' operator")
            }
            Self::ConditionSize { statement } => {
                write!(f, "condition for {statement} has size() != 1")
            }
            Self::AssignmentSize => write!(
                f,
                "assignment to a subscript requires an rvalue that is a singleton \
                 (multiplex assignment) or that has a size() matching the size() of the lvalue"
            ),
            Self::LogicalIndexSize => write!(
                f,
                "the '[]' operator requires that the size() of a logical index operand \
                 must match the size() of the indexed operand"
            ),
            Self::SubscriptRank { given, rank } => write!(
                f,
                "the '[]' operator received {given} subscripts for an operand of dimension {rank}"
            ),
            Self::ForIterationMismatch => write!(
                f,
                "all 'in' clauses of a for loop must have the same number of iterations"
            ),
            Self::RangeOperandSize => {
                write!(f, "operands of the ':' operator must have size() == 1")
            }

            // Range
            Self::IndexOutOfRange { index } => {
                write!(f, "out-of-range index {index} used with the '[]' operator")
            }
            Self::IntegerOverflow { operation } => write!(f, "integer overflow in {operation}"),
            Self::RangeTooLong { limit } => {
                write!(f, "a range with more than {limit} entries cannot be constructed")
            }
            Self::RangeUnderflow => write!(
                f,
                "the floating-point range could not be constructed due to underflow"
            ),
            Self::RangeNonFinite => {
                write!(f, "operands of the ':' operator must be finite")
            }
            Self::InvalidNumber { text } => {
                write!(f, "'{text}' could not be represented as a number")
            }
            Self::StackOverflow { depth } => {
                write!(f, "maximum recursion depth exceeded (limit: {depth})")
            }

            // Binding
            Self::UndefinedIdentifier { name } => write!(f, "undefined identifier {name}"),
            Self::UndefinedFunction { name } => write!(f, "unrecognized function name {name}"),
            Self::ConstantRedefinition { name } => {
                write!(f, "identifier '{name}' is a constant and cannot be redefined")
            }
            Self::IteratorReassignment { name } => write!(
                f,
                "identifier '{name}' is a loop iterator and cannot be reassigned inside its loop"
            ),
            Self::AlreadyDefined { name } => {
                write!(f, "identifier '{name}' is already defined")
            }
            Self::ConstantRemoval { name, intrinsic } => {
                if *intrinsic {
                    write!(f, "intrinsic constant {name} cannot be removed")
                } else {
                    write!(
                        f,
                        "constant {name} cannot be removed unless removeConstants is T"
                    )
                }
            }
            Self::InvalidDefault { name } => write!(
                f,
                "default value for parameter {name} must be a literal or an intrinsic constant"
            ),
            Self::DuplicateArgument { name, callee } => {
                write!(f, "argument {name} supplied more than once in call to {callee}")
            }
            Self::ArgumentOutOfOrder { name, callee } => {
                write!(f, "named argument {name} supplied out of order in call to {callee}")
            }
            Self::UnnamedAfterNamed { callee } => write!(
                f,
                "unnamed argument may not follow a named argument in call to {callee}"
            ),
            Self::UnknownArgument { name, callee } => {
                write!(f, "named argument {name} does not match any parameter of {callee}")
            }
            Self::TooManyArguments { max, got, callee } => write!(
                f,
                "{callee} requires at most {max} argument(s), but {got} are supplied"
            ),
            Self::MissingArgument { name, callee } => {
                write!(f, "missing required argument {name} for {callee}")
            }
            Self::SkippedRequired {
                skipped,
                named,
                callee,
            } => write!(
                f,
                "named argument {named} skipped over required parameter {skipped} in call to {callee}"
            ),
            Self::ArgumentType {
                position,
                name,
                type_name,
                callee,
            } => write!(
                f,
                "argument {position} ({name}) cannot be type {type_name} for {callee}"
            ),
            Self::ArgumentSingleton {
                position,
                name,
                size,
                callee,
            } => write!(
                f,
                "argument {position} ({name}) must be a singleton (size() == 1) for {callee}, \
                 but size() == {size}"
            ),
            Self::ReturnType { type_name, callee } => {
                write!(f, "return value cannot be type {type_name} for {callee}")
            }
            Self::BuiltinReplacement { name } => {
                write!(f, "cannot replace built-in function {name}()")
            }

            // Objects
            Self::UndefinedProperty { property, class } => {
                write!(f, "property {property} is not defined for object element type {class}")
            }
            Self::UndefinedMethod { method, class } => {
                write!(f, "method {method}() is not defined on object element type {class}")
            }
            Self::ReadOnlyProperty { property, class } => {
                write!(f, "property {property} of {class} is read-only")
            }
            Self::NotAnLvalue => write!(f, "lvalue required on the left side of assignment"),

            // Control flow
            Self::StrayControl { statement } => write!(
                f,
                "statement \"{statement}\" encountered with no enclosing loop"
            ),

            Self::Stop { message } => {
                if message.is_empty() {
                    write!(f, "stop() called")
                } else {
                    write!(f, "{message}")
                }
            }
            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Secondary information attached to an error.
#[derive(Clone, Debug)]
pub struct EvalNote {
    pub message: String,
    pub span: Option<Span>,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span: Some(span),
        }
    }
}

/// One user-defined call active when an error was raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    pub name: String,
    /// Call site, in the caller's script.
    pub span: Option<Span>,
}

/// Snapshot of the call stack at the error site, innermost call first.
#[derive(Clone, Debug, Default)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "call backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "  {i}: {}()", frame.name)?;
            if let Some(span) = frame.span {
                write!(f, " at {span}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Rendered message; equals `kind.to_string()` for factory-built errors.
    pub message: String,
    /// Blamed position in the user's script, attached while unwinding.
    pub span: Option<Span>,
    pub backtrace: Option<EvalBacktrace>,
    pub notes: Vec<EvalNote>,
}

impl EvalError {
    /// An uncategorized error. Prefer the factory functions.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_kind(EvalErrorKind::Custom { message })
    }

    pub fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            span: None,
            backtrace: None,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: EvalNote) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR: {}", self.message)?;
        if let Some(span) = self.span {
            write!(f, " (at {span})")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

// Type errors

#[cold]
pub fn unsupported_operand(op: &str, type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedOperand {
        op: op.to_string(),
        type_name,
    })
}

#[cold]
pub fn operand_combination(op: &str, left: &'static str, right: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::OperandCombination {
        op: op.to_string(),
        left,
        right,
    })
}

#[cold]
pub fn null_comparison(op: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NullComparison { op: op.to_string() })
}

#[cold]
pub fn invalid_conversion(from: &'static str, to: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidConversion { from, to })
}

#[cold]
pub fn object_required(op: &str, type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ObjectRequired {
        op: op.to_string(),
        type_name,
    })
}

#[cold]
pub fn property_type(property: &str, type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PropertyType {
        property: property.to_string(),
        type_name,
    })
}

#[cold]
pub fn assignment_type_mismatch(target: &'static str, value: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssignmentTypeMismatch { target, value })
}

#[cold]
pub fn object_class_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ObjectClassMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

// Shape errors

#[cold]
pub fn size_mismatch(op: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::SizeMismatch { op: op.to_string() })
}

#[cold]
pub fn non_conformable(op: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NonConformable { op: op.to_string() })
}

#[cold]
pub fn condition_size(statement: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConditionSize { statement })
}

#[cold]
pub fn assignment_size() -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssignmentSize)
}

#[cold]
pub fn logical_index_size() -> EvalError {
    EvalError::from_kind(EvalErrorKind::LogicalIndexSize)
}

#[cold]
pub fn subscript_rank(given: usize, rank: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::SubscriptRank { given, rank })
}

#[cold]
pub fn for_iteration_mismatch() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ForIterationMismatch)
}

#[cold]
pub fn range_operand_size() -> EvalError {
    EvalError::from_kind(EvalErrorKind::RangeOperandSize)
}

// Range errors

#[cold]
pub fn range_non_finite() -> EvalError {
    EvalError::from_kind(EvalErrorKind::RangeNonFinite)
}

#[cold]
pub fn index_out_of_range(index: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfRange { index })
}

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow {
        operation: operation.to_string(),
    })
}

#[cold]
pub fn range_too_long(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RangeTooLong { limit })
}

#[cold]
pub fn range_underflow() -> EvalError {
    EvalError::from_kind(EvalErrorKind::RangeUnderflow)
}

#[cold]
pub fn invalid_number(text: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidNumber {
        text: text.to_string(),
    })
}

#[cold]
pub fn recursion_limit_exceeded(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

// Binding errors

#[cold]
pub fn undefined_identifier(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedIdentifier {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedFunction {
        name: name.to_string(),
    })
}

#[cold]
pub fn constant_redefinition(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConstantRedefinition {
        name: name.to_string(),
    })
}

#[cold]
pub fn iterator_reassignment(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IteratorReassignment {
        name: name.to_string(),
    })
}

#[cold]
pub fn already_defined(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AlreadyDefined {
        name: name.to_string(),
    })
}

#[cold]
pub fn constant_removal(name: &str, intrinsic: bool) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConstantRemoval {
        name: name.to_string(),
        intrinsic,
    })
}

#[cold]
pub fn invalid_default(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidDefault {
        name: name.to_string(),
    })
}

#[cold]
pub fn duplicate_argument(name: &str, callee: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateArgument {
        name: name.to_string(),
        callee: callee.to_string(),
    })
}

#[cold]
pub fn argument_out_of_order(name: &str, callee: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgumentOutOfOrder {
        name: name.to_string(),
        callee: callee.to_string(),
    })
}

#[cold]
pub fn unnamed_after_named(callee: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnnamedAfterNamed {
        callee: callee.to_string(),
    })
}

#[cold]
pub fn unknown_argument(name: &str, callee: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownArgument {
        name: name.to_string(),
        callee: callee.to_string(),
    })
}

#[cold]
pub fn too_many_arguments(max: usize, got: usize, callee: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyArguments {
        max,
        got,
        callee: callee.to_string(),
    })
}

#[cold]
pub fn missing_argument(name: &str, callee: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingArgument {
        name: name.to_string(),
        callee: callee.to_string(),
    })
}

#[cold]
pub fn skipped_required(skipped: &str, named: &str, callee: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::SkippedRequired {
        skipped: skipped.to_string(),
        named: named.to_string(),
        callee: callee.to_string(),
    })
}

#[cold]
pub fn argument_type(
    position: usize,
    name: &str,
    type_name: &'static str,
    callee: &str,
) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgumentType {
        position,
        name: name.to_string(),
        type_name,
        callee: callee.to_string(),
    })
}

#[cold]
pub fn argument_singleton(position: usize, name: &str, size: usize, callee: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgumentSingleton {
        position,
        name: name.to_string(),
        size,
        callee: callee.to_string(),
    })
}

#[cold]
pub fn return_type(type_name: &'static str, callee: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReturnType {
        type_name,
        callee: callee.to_string(),
    })
}

#[cold]
pub fn builtin_replacement(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BuiltinReplacement {
        name: name.to_string(),
    })
}

// Object errors

#[cold]
pub fn undefined_property(property: &str, class: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedProperty {
        property: property.to_string(),
        class: class.to_string(),
    })
}

#[cold]
pub fn undefined_method(method: &str, class: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedMethod {
        method: method.to_string(),
        class: class.to_string(),
    })
}

#[cold]
pub fn read_only_property(property: &str, class: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReadOnlyProperty {
        property: property.to_string(),
        class: class.to_string(),
    })
}

#[cold]
pub fn not_an_lvalue() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAnLvalue)
}

// Control flow

#[cold]
pub fn stray_control(statement: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StrayControl { statement })
}

#[cold]
pub fn stop_called(message: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Stop {
        message: message.to_string(),
    })
}
