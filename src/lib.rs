//! Strided n-dimensional tensors with batched BLAS dispatch.
//!
//! This crate re-exports the workspace:
//!
//! - [`ndblas_traits`]: element kinds ([`Scalar`], [`ElementKind`], [`CastFrom`])
//! - [`ndblas_view`]: [`Storage`], [`Tensor`], [`IndexIter`], pointwise [`math`],
//!   constructors in [`create`] and [`serialize`]
//! - [`ndblas_kernel`]: the column-major routine table and the row-major
//!   [`cxxblas`] adapter
//! - [`ndblas_linalg`]: [`Linalg`], which runs a kernel once per batch element
//!   of its operands' leading dimensions
//!
//! # Example
//!
//! ```rust
//! use ndblas::{KernelOptions, Linalg, Tensor, Transpose};
//!
//! // A batch of four 3x2 matrices times their own transposes.
//! let a = Tensor::<f64>::from_fn(&[4, 3, 2], |i| (i[0] + i[1] * 2 + i[2]) as f64);
//! let la = Linalg::<f64>::new();
//! let gram = la
//!     .gemm(KernelOptions::new().trans_b(Transpose::Trans), 1.0, &a, &a)
//!     .unwrap();
//! assert_eq!(gram.size(), &[4, 3, 3]);
//!
//! let x = a.select(2, 0).unwrap(); // first column of every matrix
//! let norms = la.nrm2(&x).unwrap();
//! assert_eq!(norms.size(), &[4]);
//! ```
//!
//! # Backends
//!
//! The default backend is a pure-Rust reference implementation. The `blas`
//! feature routes the hot routines to a system CBLAS; see
//! [`BACKEND_NAME`].

pub use ndblas_kernel::{cxxblas, BlasScalar, Diag, KernelOptions, Order, Side, Transpose, UpLo, BACKEND_NAME};
pub use ndblas_linalg::{batch, Linalg, LinalgError};
pub use ndblas_traits::{CastFrom, ElementKind, Scalar};
pub use ndblas_view::{
    create, math, row_major_strides, serialize, AllocStats, Allocator, ErrorKind, Global, IndexIter,
    Storage, Tensor, TensorError, TrackingAllocator,
};

pub use ndblas_kernel;
pub use ndblas_linalg;
pub use ndblas_traits;
pub use ndblas_view;
