//! Structured constructors: identities, diagonals, triangles, ranges.
//!
//! Matrix-shaped functions treat the last two dimensions as the matrix and
//! every leading dimension as a batch.

use num_traits::{Float, NumCast};

use crate::index::IndexIter;
use crate::storage::{Allocator, Global};
use crate::tensor::Tensor;
use crate::{Result, Scalar, TensorError};

fn real_from_usize<R: Float>(n: usize) -> R {
    <R as NumCast>::from(n).unwrap_or_else(R::infinity)
}

/// `n x m` matrix with ones on the main diagonal.
pub fn eye<T: Scalar>(n: usize, m: usize) -> Tensor<T> {
    eye_batched_in(&[], n, m, Global)
}

/// Stack of identity matrices with leading shape `batch`.
pub fn eye_batched<T: Scalar>(batch: &[usize], n: usize, m: usize) -> Tensor<T> {
    eye_batched_in(batch, n, m, Global)
}

pub fn eye_batched_in<T: Scalar, A: Allocator>(
    batch: &[usize],
    n: usize,
    m: usize,
    alloc: A,
) -> Tensor<T, A> {
    let mut size = batch.to_vec();
    size.extend_from_slice(&[n, m]);
    let r = size.len();
    Tensor::from_fn_in(
        &size,
        |idx| {
            if idx[r - 2] == idx[r - 1] {
                T::one()
            } else {
                T::zero()
            }
        },
        alloc,
    )
}

/// Square matrices with `v`'s last dimension on diagonal `k` (`k > 0` above
/// the main diagonal). Leading dimensions of `v` are batch dimensions.
pub fn diag<T: Scalar, A: Allocator>(v: &Tensor<T, A>, k: isize) -> Result<Tensor<T, A>> {
    let rank = v.dimension();
    if rank == 0 {
        return Err(TensorError::InvalidArgument(
            "diag requires at least one dimension".into(),
        ));
    }
    let len = v.size()[rank - 1];
    let n = len + k.unsigned_abs();
    let values = v.to_vec();

    let mut size = v.size()[..rank - 1].to_vec();
    size.extend_from_slice(&[n, n]);
    let mut out = Vec::with_capacity(size.iter().product());
    let mut it = IndexIter::begin(&size);
    let mut slot = 0usize;
    while !it.is_end() {
        let c = it.coord();
        let (i, j) = (c[rank - 1], c[rank]);
        let value = if j as isize - i as isize == k {
            let p = if k >= 0 { i } else { j };
            // Each batch matrix holds n*n slots and draws on `len` values.
            values[(slot / (n * n)) * len + p]
        } else {
            T::zero()
        };
        out.push(value);
        slot += 1;
        it.advance();
    }
    Ok(Tensor::from_values_in(&out, &size, v.allocator().clone()))
}

/// Dense copy of diagonal `k` of each trailing matrix.
pub fn diagonal<T: Scalar, A: Allocator>(a: &Tensor<T, A>, k: isize) -> Result<Tensor<T, A>> {
    let rank = a.dimension();
    if rank < 2 {
        return Err(TensorError::InvalidArgument(format!(
            "diagonal requires a matrix, got rank {rank}"
        )));
    }
    let (n, m) = (a.size()[rank - 2], a.size()[rank - 1]);
    let (row0, col0) = if k >= 0 {
        (0, k as usize)
    } else {
        (k.unsigned_abs(), 0)
    };
    let len = if row0 < n && col0 < m {
        (n - row0).min(m - col0)
    } else {
        0
    };

    let (sr, sc) = (a.stride()[rank - 2], a.stride()[rank - 1]);
    let mut size = a.size()[..rank - 2].to_vec();
    let mut stride = a.stride()[..rank - 2].to_vec();
    size.push(len);
    stride.push(sr + sc);
    let offset = if len > 0 {
        (a.offset() as isize + row0 as isize * sr + col0 as isize * sc) as usize
    } else {
        a.offset()
    };
    Ok(a.view(&size, Some(&stride), Some(offset))?.deep_clone())
}

fn triangle<T: Scalar, A: Allocator>(
    a: &Tensor<T, A>,
    op: &str,
    keep: impl Fn(isize) -> bool,
) -> Result<Tensor<T, A>> {
    let rank = a.dimension();
    if rank < 2 {
        return Err(TensorError::InvalidArgument(format!(
            "{op} requires a matrix, got rank {rank}"
        )));
    }
    let values: Vec<T> = IndexIter::begin(a.size())
        .zip(a.iter())
        .map(|(c, x)| {
            let offset = c[rank - 1] as isize - c[rank - 2] as isize;
            if keep(offset) {
                x
            } else {
                T::zero()
            }
        })
        .collect();
    Ok(Tensor::from_values_in(&values, a.size(), a.allocator().clone()))
}

/// Keep elements on or below diagonal `k`.
pub fn tril<T: Scalar, A: Allocator>(a: &Tensor<T, A>, k: isize) -> Result<Tensor<T, A>> {
    triangle(a, "tril", |d| d <= k)
}

/// Keep elements on or above diagonal `k`.
pub fn triu<T: Scalar, A: Allocator>(a: &Tensor<T, A>, k: isize) -> Result<Tensor<T, A>> {
    triangle(a, "triu", |d| d >= k)
}

/// `[0, 1, ..., n-1]`.
pub fn arange<T: Scalar>(n: usize) -> Tensor<T> {
    Tensor::from_fn(&[n], |idx| T::from_real(real_from_usize(idx[0])))
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace<T: Scalar>(start: T, stop: T, n: usize) -> Tensor<T> {
    if n == 1 {
        return Tensor::full(&[1], start);
    }
    let step = (stop - start) / T::from_real(real_from_usize(n.saturating_sub(1)));
    Tensor::from_fn(&[n], |idx| {
        if idx[0] + 1 == n {
            stop
        } else {
            start + step * T::from_real(real_from_usize(idx[0]))
        }
    })
}
