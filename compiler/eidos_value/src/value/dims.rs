//! Matrix and array dimensions.

use smallvec::SmallVec;
use std::fmt;

/// Per-axis extents of a matrix (rank 2) or array (rank > 2).
///
/// Storage is column-major: the first axis varies fastest. A plain vector
/// has no `Dimensions` at all, so a value never carries rank 0 or 1.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Dimensions(SmallVec<[usize; 2]>);

impl Dimensions {
    /// Build from extents; `None` when the rank is below 2.
    pub fn new(extents: &[usize]) -> Option<Self> {
        if extents.len() < 2 {
            return None;
        }
        Some(Dimensions(SmallVec::from_slice(extents)))
    }

    /// A `rows x cols` matrix.
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Dimensions(SmallVec::from_slice(&[rows, cols]))
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn extents(&self) -> &[usize] {
        &self.0
    }

    /// Total element count, `None` on overflow.
    pub fn product(&self) -> Option<usize> {
        self.0.iter().try_fold(1usize, |acc, &e| acc.checked_mul(e))
    }

    /// Column-major stride of each axis.
    pub fn strides(&self) -> SmallVec<[usize; 4]> {
        let mut strides = SmallVec::with_capacity(self.0.len());
        let mut step = 1usize;
        for &extent in &self.0 {
            strides.push(step);
            step = step.saturating_mul(extent);
        }
        strides
    }

    /// Flat offset of a per-axis coordinate.
    pub fn offset(&self, coords: &[usize]) -> usize {
        self.strides()
            .iter()
            .zip(coords)
            .map(|(stride, coord)| stride * coord)
            .sum()
    }
}

impl fmt::Debug for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "Dimensions({})", parts.join("x"))
    }
}
