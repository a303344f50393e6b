//! Signatures of the core built-in library.
//!
//! The table pairs each signature with its native implementation in
//! `vectors`, `conversion` or `system`.

use eidos_ir::ValueMask;
use eidos_value::{EvalError, SignatureBuilder, Value, Vector};

use super::{conversion, system, vectors, FunctionRegistry, NativeFn};

pub(super) fn register(registry: &FunctionRegistry) {
    for (builder, function) in table() {
        let registered = builder
            .finish()
            .map_err(EvalError::from)
            .and_then(|signature| registry.register_native(signature, function));
        if let Err(err) = registered {
            tracing::error!(%err, "built-in function rejected");
        }
    }
}

fn entry(builder: SignatureBuilder, function: NativeFn) -> (SignatureBuilder, NativeFn) {
    (builder, function)
}

fn null() -> Value {
    Value::new(Vector::Null)
}

fn table() -> Vec<(SignatureBuilder, NativeFn)> {
    let any = ValueMask::ANY;
    let void = ValueMask::NULL;
    let int_s = ValueMask::INT | ValueMask::SINGLETON;
    let logical_s = ValueMask::LOGICAL | ValueMask::SINGLETON;
    let string_s = ValueMask::STRING | ValueMask::SINGLETON;
    let null_or_int_s = ValueMask::NULL | int_s;
    let null_or_string_s = ValueMask::NULL | string_s;
    let f = || Value::logical(vec![false]);

    vec![
        // Vector construction and shape
        entry(SignatureBuilder::function("c", any).ellipsis(), vectors::c),
        entry(
            SignatureBuilder::function("size", int_s).param(any, "x"),
            vectors::size,
        ),
        entry(
            SignatureBuilder::function("length", int_s).param(any, "x"),
            vectors::size,
        ),
        entry(
            SignatureBuilder::function("matrix", any)
                .param(any, "data")
                .optional(null_or_int_s, "nrow", null())
                .optional(null_or_int_s, "ncol", null())
                .optional(logical_s, "byrow", f()),
            vectors::matrix,
        ),
        entry(
            SignatureBuilder::function("array", any)
                .param(any, "data")
                .param(ValueMask::INT, "dim"),
            vectors::array,
        ),
        entry(
            SignatureBuilder::function("dim", ValueMask::NULL | ValueMask::INT).param(any, "x"),
            vectors::dim,
        ),
        entry(
            SignatureBuilder::function("rep", any)
                .param(any, "x")
                .param(int_s, "count"),
            vectors::rep,
        ),
        entry(
            SignatureBuilder::function("repEach", any)
                .param(any, "x")
                .param(ValueMask::INT, "count"),
            vectors::rep_each,
        ),
        entry(
            SignatureBuilder::function("seqLen", ValueMask::INT).param(int_s, "length"),
            vectors::seq_len,
        ),
        entry(
            SignatureBuilder::function("seqAlong", ValueMask::INT).param(any, "x"),
            vectors::seq_along,
        ),
        entry(
            SignatureBuilder::function("sum", ValueMask::NUMERIC | ValueMask::SINGLETON)
                .param(ValueMask::LOGICAL | ValueMask::NUMERIC, "x"),
            vectors::sum,
        ),
        // Typed constructors and conversion
        entry(
            SignatureBuilder::function("logical", ValueMask::LOGICAL).optional(
                int_s,
                "length",
                Value::int_scalar(0),
            ),
            conversion::logical,
        ),
        entry(
            SignatureBuilder::function("integer", ValueMask::INT).optional(
                int_s,
                "length",
                Value::int_scalar(0),
            ),
            conversion::integer,
        ),
        entry(
            SignatureBuilder::function("float", ValueMask::FLOAT).optional(
                int_s,
                "length",
                Value::int_scalar(0),
            ),
            conversion::float,
        ),
        entry(
            SignatureBuilder::function("string", ValueMask::STRING).optional(
                int_s,
                "length",
                Value::int_scalar(0),
            ),
            conversion::string,
        ),
        entry(
            SignatureBuilder::function("asLogical", ValueMask::LOGICAL).param(any, "x"),
            conversion::as_logical,
        ),
        entry(
            SignatureBuilder::function("asInteger", ValueMask::INT).param(any, "x"),
            conversion::as_integer,
        ),
        entry(
            SignatureBuilder::function("asFloat", ValueMask::FLOAT).param(any, "x"),
            conversion::as_float,
        ),
        entry(
            SignatureBuilder::function("asString", ValueMask::STRING).param(any, "x"),
            conversion::as_string,
        ),
        // Output, identity and the symbol table
        entry(
            SignatureBuilder::function("print", void).param(any, "x"),
            system::print,
        ),
        entry(
            SignatureBuilder::function("cat", void)
                .param(any, "x")
                .optional(string_s, "sep", Value::string_scalar(" ")),
            system::cat,
        ),
        entry(
            SignatureBuilder::function("identical", logical_s)
                .param(any, "x")
                .param(any, "y"),
            system::identical,
        ),
        entry(
            SignatureBuilder::function("isNULL", logical_s).param(any, "x"),
            system::is_null,
        ),
        entry(
            SignatureBuilder::function("type", string_s).param(any, "x"),
            system::type_of,
        ),
        entry(
            SignatureBuilder::function("exists", logical_s).param(string_s, "symbol"),
            system::exists,
        ),
        entry(
            SignatureBuilder::function("rm", void)
                .optional(ValueMask::NULL | ValueMask::STRING, "variableNames", null())
                .optional(logical_s, "removeConstants", f()),
            system::rm,
        ),
        entry(
            SignatureBuilder::function("defineConstant", void)
                .param(string_s, "symbol")
                .param(any, "x"),
            system::define_constant,
        ),
        entry(
            SignatureBuilder::function("stop", void).optional(null_or_string_s, "message", null()),
            system::stop,
        ),
        entry(
            SignatureBuilder::function("invisible", any).param(any, "x"),
            system::invisible,
        ),
        entry(
            SignatureBuilder::function("functionSignature", void).optional(
                null_or_string_s,
                "functionName",
                null(),
            ),
            system::function_signature,
        ),
    ]
}
