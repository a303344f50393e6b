//! Call-site argument binding.
//!
//! A call site's shape (which arguments are named, and how) is fixed, so
//! the mapping from call-site arguments to signature slots is computed once
//! per (call site, signature) pair as a [`FillPlan`] and cached on the
//! script. Every call then evaluates its arguments into a fresh buffer and
//! applies the plan, so recursive re-entry through one call site never
//! shares argument storage.

use smallvec::SmallVec;

use eidos_value::errors::{
    argument_out_of_order, duplicate_argument, missing_argument, skipped_required,
    too_many_arguments, unknown_argument, unnamed_after_named,
};
use eidos_value::{EvalError, Signature, Value, Vector};

/// Where one parameter's value comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    /// The call-site argument at this position.
    Arg(usize),
    /// The parameter's declared default.
    Default,
}

/// Mapping from call-site arguments to signature parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FillPlan {
    /// One entry per declared parameter.
    slots: SmallVec<[Slot; 4]>,
    /// Call-site positions collected by the ellipsis, in order.
    extras: SmallVec<[usize; 2]>,
}

impl FillPlan {
    /// Plan a call with one entry per call-site argument: `None` for an
    /// unnamed argument, `Some(name)` for `name = value`.
    pub fn build(signature: &Signature, arg_names: &[Option<&str>]) -> Result<FillPlan, EvalError> {
        let params = signature.params();
        let label = || signature.call_label();

        let mut slots: SmallVec<[Option<Slot>; 4]> = SmallVec::from_elem(None, params.len());
        let mut extras = SmallVec::new();
        let mut cursor = 0usize;
        let mut seen_named = false;

        for (position, name) in arg_names.iter().enumerate() {
            match name {
                None => {
                    if seen_named {
                        return Err(unnamed_after_named(&label()));
                    }
                    if cursor < params.len() {
                        slots[cursor] = Some(Slot::Arg(position));
                        cursor += 1;
                    } else if signature.has_ellipsis() {
                        extras.push(position);
                    } else {
                        return Err(too_many_arguments(params.len(), arg_names.len(), &label()));
                    }
                }
                Some(name) => {
                    seen_named = true;
                    let Some(target) = signature.position_of(name) else {
                        return Err(unknown_argument(name, &label()));
                    };
                    if target < cursor {
                        return Err(match slots[target] {
                            Some(Slot::Arg(_)) => duplicate_argument(name, &label()),
                            _ => argument_out_of_order(name, &label()),
                        });
                    }
                    for skipped in cursor..target {
                        if !params[skipped].is_optional() {
                            return Err(skipped_required(&params[skipped].name, name, &label()));
                        }
                        slots[skipped] = Some(Slot::Default);
                    }
                    slots[target] = Some(Slot::Arg(position));
                    cursor = target + 1;
                }
            }
        }

        for param in &params[cursor..] {
            if !param.is_optional() {
                return Err(missing_argument(&param.name, &label()));
            }
        }

        Ok(FillPlan {
            slots: slots
                .into_iter()
                .map(|slot| slot.unwrap_or(Slot::Default))
                .collect(),
            extras,
        })
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn extras(&self) -> &[usize] {
        &self.extras
    }

    /// Arrange evaluated call-site arguments (in call-site order) and check
    /// them against the signature.
    pub fn bind(&self, signature: &Signature, args: &[Value]) -> Result<BoundArgs, EvalError> {
        let mut values = SmallVec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter().enumerate() {
            let value = match *slot {
                Slot::Arg(position) => args[position].clone(),
                Slot::Default => signature
                    .param(index)
                    .and_then(|p| p.default.clone())
                    .unwrap_or_else(|| Value::new(Vector::Null)),
            };
            signature.check_argument(index, &value)?;
            values.push(value);
        }
        let rest = self.extras.iter().map(|&position| args[position].clone()).collect();
        Ok(BoundArgs { values, rest })
    }
}

/// Arguments of one call, one per declared parameter, plus ellipsis extras.
#[derive(Clone, Debug)]
pub struct BoundArgs {
    values: SmallVec<[Value; 4]>,
    rest: Vec<Value>,
}

impl BoundArgs {
    pub fn new(values: impl IntoIterator<Item = Value>, rest: Vec<Value>) -> Self {
        BoundArgs {
            values: values.into_iter().collect(),
            rest,
        }
    }

    /// Argument for parameter `index`.
    ///
    /// # Panics
    /// Panics if `index` is not a parameter of the bound signature.
    #[inline]
    pub fn get(&self, index: usize) -> &Value {
        &self.values[index]
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Extra unnamed arguments collected by the ellipsis.
    pub fn rest(&self) -> &[Value] {
        &self.rest
    }

    /// Parameters then ellipsis extras, as one flat list.
    pub fn to_vec(&self) -> Vec<Value> {
        self.values.iter().chain(&self.rest).cloned().collect()
    }
}
