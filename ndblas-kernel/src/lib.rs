//! Numeric kernel layer for ndblas.
//!
//! Two levels:
//!
//! - [`BlasScalar`]: the per-element-kind routine table with Fortran
//!   (column-major, char-flag) conventions. Pure-Rust kernels from
//!   [`reference`] by default, CBLAS with the `blas` feature.
//! - [`cxxblas`]: the adapter that accepts row-major or column-major strided
//!   operands and flag enums, and translates them into one table call.
//!
//! # Example
//!
//! ```
//! use ndblas_kernel::{cxxblas, Order, Transpose};
//!
//! // y = A x with A = [[1, 2], [3, 4]] stored row-major.
//! let a = [1.0f64, 2.0, 3.0, 4.0];
//! let x = [1.0f64, 1.0];
//! let mut y = [0.0f64; 2];
//! unsafe {
//!     cxxblas::gemv(
//!         Order::RowMajor, Transpose::NoTrans, 2, 2,
//!         1.0, a.as_ptr(), 2, x.as_ptr(), 1, 0.0, y.as_mut_ptr(), 1,
//!     );
//! }
//! assert_eq!(y, [3.0, 7.0]);
//! ```

#[cfg(feature = "blas")]
extern crate cblas_sys;

/// Per-kind routine table and its CBLAS bindings.
pub mod backend;
/// Row-major adapter over the routine table.
pub mod cxxblas;
/// Layout and operation flags.
pub mod flags;
/// Pure-Rust column-major kernels.
pub mod reference;

pub use backend::{BlasScalar, BACKEND_NAME};
pub use flags::{Diag, KernelOptions, Order, Side, Transpose, UpLo};
