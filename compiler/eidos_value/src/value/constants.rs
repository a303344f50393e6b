//! Shared immutable values.

use super::{Value, Vector};

/// Values handed out by clone instead of allocated per use.
///
/// Created once per runtime; the intrinsic constants scope binds the
/// named ones (`T`, `F`, `NULL`, `PI`, `E`, `INF`, `NAN`).
#[derive(Clone, Debug)]
pub struct Constants {
    pub t: Value,
    pub f: Value,
    pub null: Value,
    pub invisible_null: Value,
    pub void: Value,
    pub logical_empty: Value,
    pub pi: Value,
    pub e: Value,
    pub inf: Value,
    pub nan: Value,
}

impl Constants {
    pub fn new() -> Self {
        Constants {
            t: Value::logical(vec![true]),
            f: Value::logical(vec![false]),
            null: Value::new(Vector::Null),
            invisible_null: Value::new(Vector::Null).into_invisible(),
            void: Value::new(Vector::Void),
            logical_empty: Value::logical(Vec::new()),
            pi: Value::float_scalar(std::f64::consts::PI),
            e: Value::float_scalar(std::f64::consts::E),
            inf: Value::float_scalar(f64::INFINITY),
            nan: Value::float_scalar(f64::NAN),
        }
    }

    /// Cached `T` or `F`.
    #[inline]
    pub fn logical(&self, value: bool) -> Value {
        if value {
            self.t.clone()
        } else {
            self.f.clone()
        }
    }

    /// The named intrinsic constants, in definition order.
    pub fn named(&self) -> [(&'static str, &Value); 7] {
        [
            ("T", &self.t),
            ("F", &self.f),
            ("NULL", &self.null),
            ("PI", &self.pi),
            ("E", &self.e),
            ("INF", &self.inf),
            ("NAN", &self.nan),
        ]
    }
}

impl Default for Constants {
    fn default() -> Self {
        Self::new()
    }
}
