//! `x[i]` and `x[i, j, ...]`.
//!
//! Selection is computed as a list of flat, column-major offsets into the
//! base. Reads gather those offsets; subscripted assignment writes them.

use std::rc::Rc;

use eidos_ir::{NodeId, NodeKind, NodeRange};
use eidos_value::errors::{
    index_out_of_range, logical_index_size, subscript_rank, unsupported_operand,
};
use eidos_value::{Dimensions, EvalError, EvalResult, Value, Vector};
use smallvec::SmallVec;

use super::Interpreter;

/// One evaluated subscript; `None` for an omitted axis.
pub(super) type Selector = Option<Value>;

/// Elements picked by a subscript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Selection {
    /// Flat offsets into the base, in result order.
    pub(super) offsets: Vec<usize>,
    /// Extents of the result for a multi-axis subscript.
    pub(super) dims: Option<Dimensions>,
}

/// Offsets picked along one axis of `extent` elements.
fn axis_offsets(index: &Value, extent: usize) -> Result<Vec<usize>, EvalError> {
    match index.vector() {
        Vector::Null => Ok((0..extent).collect()),
        // An empty mask selects nothing whatever the extent.
        Vector::Logical(flags) if flags.is_empty() => Ok(Vec::new()),
        Vector::Logical(flags) => {
            if flags.len() != extent {
                return Err(logical_index_size());
            }
            Ok(flags
                .iter()
                .enumerate()
                .filter_map(|(i, &keep)| keep.then_some(i))
                .collect())
        }
        Vector::Int(values) => values
            .iter()
            .map(|&i| {
                usize::try_from(i)
                    .ok()
                    .filter(|&offset| offset < extent)
                    .ok_or_else(|| index_out_of_range(i))
            })
            .collect(),
        Vector::Float(values) => values
            .iter()
            .map(|&x| {
                let t = x.trunc();
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "float to integer casts saturate; the bound check follows"
                )]
                let i = t as i64;
                #[expect(
                    clippy::cast_precision_loss,
                    reason = "extents are far below 2^53"
                )]
                let in_range = t >= 0.0 && t < extent as f64;
                if in_range {
                    usize::try_from(i).map_err(|_| index_out_of_range(i))
                } else {
                    Err(index_out_of_range(i))
                }
            })
            .collect(),
        _ => Err(unsupported_operand("[]", index.value_type().name())),
    }
}

/// Resolve `selectors` against `base`.
pub(super) fn select(base: &Value, selectors: &[Selector]) -> Result<Selection, EvalError> {
    if let [selector] = selectors {
        let offsets = match selector {
            Some(index) => axis_offsets(index, base.len())?,
            None => (0..base.len()).collect(),
        };
        return Ok(Selection {
            offsets,
            dims: None,
        });
    }

    let extents: &[usize] = base.dims().map_or(&[], Dimensions::extents);
    if extents.len() != selectors.len() {
        return Err(subscript_rank(selectors.len(), extents.len().max(1)));
    }

    let per_axis = selectors
        .iter()
        .zip(extents)
        .map(|(selector, &extent)| match selector {
            Some(index) => axis_offsets(index, extent),
            None => Ok((0..extent).collect()),
        })
        .collect::<Result<SmallVec<[Vec<usize>; 2]>, _>>()?;

    let strides = base.dims().map(Dimensions::strides).unwrap_or_default();
    let result_extents: SmallVec<[usize; 2]> = per_axis.iter().map(Vec::len).collect();
    let total: usize = result_extents.iter().product();

    // Odometer over the selected coordinates, first axis fastest.
    let mut offsets = Vec::with_capacity(total);
    let mut cursor: SmallVec<[usize; 2]> = SmallVec::from_elem(0, per_axis.len());
    for _ in 0..total {
        offsets.push(
            per_axis
                .iter()
                .zip(&cursor)
                .zip(&strides)
                .map(|((axis, &at), &stride)| axis[at] * stride)
                .sum(),
        );
        for (axis, at) in cursor.iter_mut().enumerate() {
            *at += 1;
            if *at < result_extents[axis] {
                break;
            }
            *at = 0;
        }
    }

    Ok(Selection {
        offsets,
        dims: Dimensions::new(&result_extents),
    })
}

impl Interpreter<'_> {
    /// Evaluate the subscripts of a `Subset` node.
    pub(super) fn eval_selectors(&mut self, indices: NodeRange) -> Result<SmallVec<[Selector; 2]>, EvalError> {
        let script = Rc::clone(&self.script);
        script
            .list(indices)
            .iter()
            .map(|&node| match script.kind(node) {
                NodeKind::Omitted => Ok(None),
                _ => self.eval(node).map(Some),
            })
            .collect()
    }

    pub(super) fn eval_subset(&mut self, target: NodeId, indices: NodeRange) -> EvalResult {
        let base = self.eval(target)?;
        let selectors = self.eval_selectors(indices)?;
        match base.vector() {
            Vector::Void => Err(unsupported_operand("[]", base.value_type().name())),
            Vector::Null => Ok(self.constants().null.clone()),
            vector => {
                let selection = select(&base, &selectors)?;
                Ok(Value::with_dims(
                    vector.gather(&selection.offsets),
                    selection.dims,
                ))
            }
        }
    }
}
