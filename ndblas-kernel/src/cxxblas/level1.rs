//! Vector-vector routines.

use super::{inc32, int, lowest, lowest_mut};
use crate::BlasScalar;

/// `Σ |re(x_i)| + |im(x_i)|`.
pub unsafe fn asum<T: BlasScalar>(n: usize, x: *const T, incx: isize) -> T::Real {
    T::asum(int(n), lowest(x, n, incx), inc32(incx.abs()))
}

pub unsafe fn nrm2<T: BlasScalar>(n: usize, x: *const T, incx: isize) -> T::Real {
    T::nrm2(int(n), lowest(x, n, incx), inc32(incx.abs()))
}

/// Zero-based position of the first element of largest `|re| + |im|`.
pub unsafe fn iamax<T: BlasScalar>(n: usize, x: *const T, incx: isize) -> usize {
    if n == 0 {
        return 0;
    }
    let j = T::iamax(int(n), lowest(x, n, incx), inc32(incx.abs()));
    if incx < 0 {
        n - 1 - j
    } else {
        j
    }
}

pub unsafe fn scal<T: BlasScalar>(n: usize, alpha: T, x: *mut T, incx: isize) {
    T::scal(int(n), alpha, lowest_mut(x, n, incx), inc32(incx.abs()))
}

/// `y += alpha * x`.
pub unsafe fn axpy<T: BlasScalar>(
    n: usize,
    alpha: T,
    x: *const T,
    incx: isize,
    y: *mut T,
    incy: isize,
) {
    T::axpy(
        int(n),
        alpha,
        lowest(x, n, incx),
        inc32(incx),
        lowest_mut(y, n, incy),
        inc32(incy),
    )
}

pub unsafe fn copy<T: BlasScalar>(n: usize, x: *const T, incx: isize, y: *mut T, incy: isize) {
    T::copy(
        int(n),
        lowest(x, n, incx),
        inc32(incx),
        lowest_mut(y, n, incy),
        inc32(incy),
    )
}

pub unsafe fn swap<T: BlasScalar>(n: usize, x: *mut T, incx: isize, y: *mut T, incy: isize) {
    T::swap(
        int(n),
        lowest_mut(x, n, incx),
        inc32(incx),
        lowest_mut(y, n, incy),
        inc32(incy),
    )
}

/// Unconjugated dot product.
pub unsafe fn dot<T: BlasScalar>(n: usize, x: *const T, incx: isize, y: *const T, incy: isize) -> T {
    dotu(n, x, incx, y, incy)
}

pub unsafe fn dotu<T: BlasScalar>(
    n: usize,
    x: *const T,
    incx: isize,
    y: *const T,
    incy: isize,
) -> T {
    T::dotu(
        int(n),
        lowest(x, n, incx),
        inc32(incx),
        lowest(y, n, incy),
        inc32(incy),
    )
}

/// `Σ conj(x_i) * y_i`.
pub unsafe fn dotc<T: BlasScalar>(
    n: usize,
    x: *const T,
    incx: isize,
    y: *const T,
    incy: isize,
) -> T {
    T::dotc(
        int(n),
        lowest(x, n, incx),
        inc32(incx),
        lowest(y, n, incy),
        inc32(incy),
    )
}

/// Plane rotation `x' = c x + s y`, `y' = c y - conj(s) x`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn rot<T: BlasScalar>(
    n: usize,
    x: *mut T,
    incx: isize,
    y: *mut T,
    incy: isize,
    c: T::Real,
    s: T,
) {
    T::rot(
        int(n),
        lowest_mut(x, n, incx),
        inc32(incx),
        lowest_mut(y, n, incy),
        inc32(incy),
        c,
        s,
    )
}
