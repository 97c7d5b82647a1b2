//! Batch planning and shape validation.
//!
//! An operand of rank `N` with `active` trailing dimensions has batch shape
//! `size[..N - active]`. All operands of one call must share the batch shape.

use ndblas_view::{Allocator, IndexIter, Tensor};

use crate::{LinalgError, Result};

/// Traversal of a batch shared by several operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traversal {
    /// Every operand's batch collapses to `base + k * step` for `k < count`.
    Fused { count: usize, steps: Vec<isize> },
    /// Walk the batch coordinates with an [`IndexIter`].
    Indexed,
}

/// Per-call batch plan over a fixed list of operands.
#[derive(Debug, Clone)]
pub struct Plan {
    shape: Vec<usize>,
    strides: Vec<Vec<isize>>,
    traversal: Traversal,
}

/// Collapse a batch into a single step, if possible.
///
/// Dimensions of extent 1 are ignored; every remaining consecutive pair must
/// satisfy `stride[i] == stride[j] * size[j]`. Returns `Some(0)` when the
/// batch has at most one element.
pub fn fuse(shape: &[usize], strides: &[isize]) -> Option<isize> {
    let mut dims = shape
        .iter()
        .zip(strides.iter())
        .filter(|(&n, _)| n > 1)
        .map(|(&n, &s)| (n, s));
    let Some(mut inner) = dims.next_back() else {
        return Some(0);
    };
    let step = inner.1;
    for outer in dims.rev() {
        if outer.1 != inner.1 * inner.0 as isize {
            return None;
        }
        inner = outer;
    }
    Some(step)
}

impl Plan {
    /// Plan a traversal of `shape` for operands with the given batch strides
    /// (one stride vector per operand, each of length `shape.len()`).
    pub fn new(op: &str, shape: &[usize], strides: Vec<Vec<isize>>) -> Self {
        let count: usize = shape.iter().product();
        let steps: Option<Vec<isize>> = strides.iter().map(|s| fuse(shape, s)).collect();
        let traversal = match steps {
            Some(steps) => Traversal::Fused { count, steps },
            None => Traversal::Indexed,
        };
        log::trace!(
            "{op}: {} traversal over batch {:?} ({count} kernel calls)",
            match traversal {
                Traversal::Fused { .. } => "fused",
                Traversal::Indexed => "indexed",
            },
            shape
        );
        Self {
            shape: shape.to_vec(),
            strides,
            traversal,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn count(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn traversal(&self) -> &Traversal {
        &self.traversal
    }

    /// Call `f` with each operand's element offset (relative to its base
    /// pointer), once per batch element, in ascending batch order.
    pub fn for_each(&self, mut f: impl FnMut(&[isize])) {
        let mut offsets = vec![0isize; self.strides.len()];
        match &self.traversal {
            Traversal::Fused { count, steps } => {
                for k in 0..*count {
                    for (o, &s) in offsets.iter_mut().zip(steps.iter()) {
                        *o = k as isize * s;
                    }
                    f(&offsets);
                }
            }
            Traversal::Indexed => {
                let mut it = IndexIter::begin(&self.shape);
                while !it.is_end() {
                    for (o, s) in offsets.iter_mut().zip(self.strides.iter()) {
                        *o = it.offset(s);
                    }
                    f(&offsets);
                    it.advance();
                }
            }
        }
    }
}

/// Batch shape and active extents of an operand with `active` trailing dims.
/// Active extents and strides must fit the kernel's `i32`.
pub(crate) fn split<'a, T, A: Allocator>(
    op: &'static str,
    operand: &'static str,
    t: &'a Tensor<T, A>,
    active: usize,
) -> Result<(&'a [usize], &'a [usize])> {
    let rank = t.dimension();
    if rank < active {
        return Err(LinalgError::OperandRank {
            op,
            operand,
            min: active,
            rank,
        });
    }
    let (batch, extents) = t.size().split_at(rank - active);
    for (&n, &s) in extents.iter().zip(&t.stride()[rank - active..]) {
        if i32::try_from(n).is_err() {
            return Err(kernel_range(op, operand, "extent", n as i128));
        }
        if i32::try_from(s).is_err() {
            return Err(kernel_range(op, operand, "stride", s as i128));
        }
    }
    Ok((batch, extents))
}

fn kernel_range(op: &'static str, operand: &'static str, what: &'static str, value: i128) -> LinalgError {
    LinalgError::KernelRange {
        op,
        operand,
        what,
        value,
    }
}

/// Batch strides (all but the trailing `active` strides).
pub(crate) fn batch_strides<T, A: Allocator>(t: &Tensor<T, A>, active: usize) -> Vec<isize> {
    t.stride()[..t.dimension() - active].to_vec()
}

pub(crate) fn same_batch(
    op: &'static str,
    operand: &'static str,
    expected: &[usize],
    actual: &[usize],
) -> Result<()> {
    if expected != actual {
        return Err(LinalgError::BatchMismatch {
            op,
            operand,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}

pub(crate) fn same_extent(
    op: &'static str,
    operand: &'static str,
    expected: usize,
    actual: usize,
) -> Result<()> {
    if expected != actual {
        return Err(LinalgError::DimensionMismatch {
            op,
            operand,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Vector operand: returns `(batch, len)`.
pub(crate) fn vector<'a, T, A: Allocator>(
    op: &'static str,
    operand: &'static str,
    t: &'a Tensor<T, A>,
) -> Result<(&'a [usize], usize)> {
    let (batch, active) = split(op, operand, t, 1)?;
    Ok((batch, active[0]))
}

/// Matrix operand: returns `(batch, rows, cols)`.
pub(crate) fn matrix<'a, T, A: Allocator>(
    op: &'static str,
    operand: &'static str,
    t: &'a Tensor<T, A>,
) -> Result<(&'a [usize], usize, usize)> {
    let (batch, active) = split(op, operand, t, 2)?;
    Ok((batch, active[0], active[1]))
}

/// Square matrix operand: returns `(batch, n)`.
pub(crate) fn square<'a, T, A: Allocator>(
    op: &'static str,
    operand: &'static str,
    t: &'a Tensor<T, A>,
) -> Result<(&'a [usize], usize)> {
    let (batch, rows, cols) = matrix(op, operand, t)?;
    if rows != cols {
        return Err(LinalgError::NotSquare {
            op,
            operand,
            rows,
            cols,
        });
    }
    Ok((batch, rows))
}

/// Check a vector operand against an expected batch and length.
pub(crate) fn expect_vector<T, A: Allocator>(
    op: &'static str,
    operand: &'static str,
    t: &Tensor<T, A>,
    batch: &[usize],
    len: usize,
) -> Result<()> {
    let (b, n) = vector(op, operand, t)?;
    same_batch(op, operand, batch, b)?;
    same_extent(op, operand, len, n)
}

/// Check a matrix operand against an expected batch and shape.
pub(crate) fn expect_matrix<T, A: Allocator>(
    op: &'static str,
    operand: &'static str,
    t: &Tensor<T, A>,
    batch: &[usize],
    rows: usize,
    cols: usize,
) -> Result<()> {
    let (b, r, c) = matrix(op, operand, t)?;
    same_batch(op, operand, batch, b)?;
    same_extent(op, operand, rows, r)?;
    same_extent(op, operand, cols, c)
}

/// Check a per-batch scalar output.
pub(crate) fn expect_scalar<T, A: Allocator>(
    op: &'static str,
    operand: &'static str,
    t: &Tensor<T, A>,
    batch: &[usize],
) -> Result<()> {
    same_batch(op, operand, batch, t.size())
}

/// `batch ++ tail`.
pub(crate) fn shape(batch: &[usize], tail: &[usize]) -> Vec<usize> {
    let mut s = batch.to_vec();
    s.extend_from_slice(tail);
    s
}
