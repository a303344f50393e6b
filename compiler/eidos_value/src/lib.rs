//! Value model, host objects, signatures and errors for the Eidos evaluator.
//!
//! Values are `Rc`-based and single-threaded: an interpreter and all the
//! values it touches live on one thread.

pub mod errors;
mod signature;
mod value;

pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use signature::{CallableKind, Param, Signature, SignatureBuilder, SignatureError};
pub use value::{
    format_float, format_logical, same_object, Constants, Dimensions, ObjectClass,
    ObjectElement, ObjectRef, ObjectVector, PropertySignature, Value, ValueData, ValueType,
    Vector,
};
