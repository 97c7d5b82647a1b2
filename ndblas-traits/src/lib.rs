//! Shared traits for the ndblas crates.
//!
//! This crate provides the element-type vocabulary shared across
//! `ndblas-view`, `ndblas-kernel` and `ndblas-linalg`:
//!
//! - [`Scalar`]: the four numeric element kinds (real32, real64, complex32,
//!   complex64) with conjugation, real/complex splitting and POD encodings
//! - [`ElementKind`]: a runtime tag for those kinds
//! - [`CastFrom`]: element-wise conversion between kinds
//!
//! External crates can depend on `ndblas-traits` alone to write code that is
//! generic over element kind.

pub mod cast;
pub mod pod;
pub mod scalar;

pub use cast::CastFrom;
pub use pod::{PodComplexF32, PodComplexF64};
pub use scalar::{ElementKind, Scalar};
