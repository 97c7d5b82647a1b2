//! Row-major adapter over the column-major routine table.
//!
//! Each function takes layout and operation flags as enums, dimensions as
//! `usize`, increments as `isize` and operands as raw pointers, and issues
//! exactly one [`BlasScalar`](crate::BlasScalar) call (plus a scratch
//! conjugate where row-major `ConjTrans` has no column-major equivalent).
//!
//! Vectors use the tensor convention: element `i` lives at `x + i * inc`,
//! also for negative `inc`. The adapter rebases such vectors onto their
//! lowest address before calling the kernel.
//!
//! A row-major matrix is the column-major storage of its transpose, so the
//! adapter swaps dimensions and flips the transpose, triangle and side flags
//! instead of moving data.
//!
//! Nothing here validates its arguments.

pub mod level1;
pub mod level2;
pub mod level3;

pub use level1::*;
pub use level2::*;
pub use level3::*;

use ndblas_traits::Scalar;

/// Kernel integer for an extent or leading dimension. Callers keep `n`
/// within `i32`; `ndblas-linalg` rejects larger operands before dispatch.
#[inline]
pub(crate) fn int(n: usize) -> i32 {
    debug_assert!(i32::try_from(n).is_ok(), "extent {n} exceeds i32");
    n as i32
}

#[inline]
pub(crate) fn inc32(inc: isize) -> i32 {
    debug_assert!(i32::try_from(inc).is_ok(), "increment {inc} exceeds i32");
    inc as i32
}

/// Lowest address of an `n`-vector whose element `i` is at `x + i * inc`.
#[inline]
pub(crate) fn lowest<T>(x: *const T, n: usize, inc: isize) -> *const T {
    if inc < 0 && n > 0 {
        x.wrapping_offset((n as isize - 1) * inc)
    } else {
        x
    }
}

#[inline]
pub(crate) fn lowest_mut<T>(x: *mut T, n: usize, inc: isize) -> *mut T {
    lowest(x as *const T, n, inc) as *mut T
}

/// Dense conjugated copy of a strided vector.
pub(crate) unsafe fn conj_copy<T: Scalar>(n: usize, x: *const T, inc: isize) -> Vec<T> {
    (0..n).map(|i| (*x.offset(i as isize * inc)).conj()).collect()
}

pub(crate) unsafe fn conj_in_place<T: Scalar>(n: usize, x: *mut T, inc: isize) {
    for i in 0..n {
        let p = x.offset(i as isize * inc);
        *p = (*p).conj();
    }
}
