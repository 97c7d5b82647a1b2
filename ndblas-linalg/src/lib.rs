//! Batched BLAS dispatch over the leading dimensions of strided tensors.
//!
//! A kernel works on the trailing one (vector) or two (matrix) dimensions of
//! each operand, its *active* dimensions. Every leading dimension is a batch
//! dimension, and [`Linalg`] issues one kernel call per batch element:
//!
//! - when every operand's batch collapses to a single `(count, step)` pair,
//!   the batch is walked by pointer arithmetic;
//! - otherwise an [`IndexIter`](ndblas_view::IndexIter) walks the batch in
//!   row-major coordinate order.
//!
//! All shapes are validated before any kernel call or output write, so a
//! failing call leaves every output untouched.
//!
//! Each operation comes in three calling conventions with identical batching:
//!
//! - `op(..)` returns a freshly allocated result;
//! - `op_into(.., &mut out)` writes into (or updates) a caller view;
//! - `op_slice(.., &mut [T])` does the same on a dense row-major slice.
//!
//! # Example
//!
//! ```
//! use ndblas_linalg::{KernelOptions, Linalg};
//! use ndblas_view::Tensor;
//!
//! // Two independent 2x2 products in one call.
//! let a = Tensor::<f64>::from_fn(&[2, 2, 2], |i| (i[0] + i[1] * 2 + i[2]) as f64);
//! let b = Tensor::<f64>::from_fn(&[2, 2, 2], |i| if i[1] == i[2] { 1.0 } else { 0.0 });
//! let la = Linalg::<f64>::new();
//! let c = la.gemm(KernelOptions::new(), 1.0, &a, &b).unwrap();
//! assert_eq!(c.to_vec(), a.to_vec());
//! ```

use std::marker::PhantomData;

use ndblas_kernel::BlasScalar;
use ndblas_view::{Allocator, ErrorKind, Global, Storage, Tensor, TensorError};

pub mod batch;
pub mod level1;
pub mod level2;
pub mod level3;
pub mod operand;

pub use ndblas_kernel::{Diag, KernelOptions, Order, Side, Transpose, UpLo};

/// Errors raised by the dispatcher. Every one is detected before the first
/// kernel call.
#[derive(Debug, thiserror::Error)]
pub enum LinalgError {
    /// An operand has fewer dimensions than the kernel's active dimensions.
    #[error("{op}: operand `{operand}` needs rank >= {min}, got rank {rank}")]
    OperandRank {
        op: &'static str,
        operand: &'static str,
        min: usize,
        rank: usize,
    },

    /// Active extents disagree.
    #[error("{op}: `{operand}` has extent {actual} where {expected} is required")]
    DimensionMismatch {
        op: &'static str,
        operand: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Leading (batch) shapes disagree.
    #[error("{op}: batch shape of `{operand}` is {actual:?}, expected {expected:?}")]
    BatchMismatch {
        op: &'static str,
        operand: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The kernel requires a square matrix.
    #[error("{op}: `{operand}` must be square, got {rows}x{cols}")]
    NotSquare {
        op: &'static str,
        operand: &'static str,
        rows: usize,
        cols: usize,
    },

    /// An active extent or stride does not fit the kernel's 32-bit integers.
    #[error("{op}: `{operand}` has {what} {value}, outside the kernel's 32-bit range")]
    KernelRange {
        op: &'static str,
        operand: &'static str,
        what: &'static str,
        value: i128,
    },

    #[error(transparent)]
    Tensor(#[from] TensorError),
}

impl LinalgError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinalgError::OperandRank { .. }
            | LinalgError::DimensionMismatch { .. }
            | LinalgError::BatchMismatch { .. } => ErrorKind::OutOfRange,
            LinalgError::NotSquare { .. } | LinalgError::KernelRange { .. } => {
                ErrorKind::InvalidArgument
            }
            LinalgError::Tensor(e) => e.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LinalgError>;

/// Batched dispatcher for element kind `T`.
///
/// The handle is the slot a native backend would use for its context or
/// workspace; the reference and CBLAS backends need none, so it is an
/// opaque integer. Results of constructive calls are allocated through the
/// dispatcher's allocator.
#[derive(Debug, Clone)]
pub struct Linalg<T, A: Allocator = Global> {
    handle: i32,
    alloc: A,
    _marker: PhantomData<fn() -> T>,
}

impl<T: BlasScalar> Linalg<T> {
    pub fn new() -> Self {
        Self::with_allocator(Global)
    }
}

impl<T: BlasScalar> Default for Linalg<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: BlasScalar, A: Allocator> Linalg<T, A> {
    pub fn with_allocator(alloc: A) -> Self {
        Self {
            handle: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn handle(&self) -> i32 {
        self.handle
    }

    #[inline]
    pub fn set_handle(&mut self, handle: i32) {
        self.handle = handle;
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Dense row-major result buffer.
    pub(crate) fn alloc_zeros<U: Copy + num_traits::Zero>(&self, size: &[usize]) -> Tensor<U, A> {
        Tensor::zeros_in(size, self.alloc.clone())
    }

    /// Adopt `out` as a non-owning row-major tensor of shape `size`.
    ///
    /// Fails with `StorageBounds` when the slice is shorter than `size`
    /// requires, before anything is written.
    pub(crate) fn adopt_slice<U: Copy>(&self, out: &mut [U], size: &[usize]) -> Result<Tensor<U, A>> {
        // SAFETY: the tensor is dropped before `out`'s borrow ends, and the
        // storage never frees foreign memory.
        let storage = unsafe { Storage::from_raw_parts_in(out.as_mut_ptr(), out.len(), self.alloc.clone()) };
        let stride = ndblas_view::row_major_strides(size);
        Ok(Tensor::from_storage(storage, size, &stride, 0)?)
    }
}
