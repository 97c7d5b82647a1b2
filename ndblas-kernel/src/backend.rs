//! Per-kind routine table.
//!
//! [`BlasScalar`] selects one routine per {operation, element kind}. Every
//! method has a pure-Rust default from [`reference`](crate::reference); with
//! the `blas` feature the four standard kinds route the hot routines (dot,
//! axpy, asum, nrm2, scal, gemv, gemm) to CBLAS in column-major layout.
//!
//! All methods follow Fortran conventions: column-major storage, ASCII flag
//! characters, `i32` dimensions and a negative increment addressing the
//! vector from its lowest element.
//!
//! # Safety
//!
//! Every method is `unsafe`: pointers must be valid for the extents implied
//! by the dimensions, leading dimensions and increments, and output buffers
//! must not alias inputs unless the routine reads and writes the same operand.

use crate::reference;
use ndblas_traits::Scalar;

/// Name of the backend the routine table is bound to.
#[cfg(feature = "blas")]
pub const BACKEND_NAME: &str = "cblas";
#[cfg(not(feature = "blas"))]
pub const BACKEND_NAME: &str = "reference";

#[allow(clippy::too_many_arguments, clippy::missing_safety_doc)]
pub trait BlasScalar: Scalar {
    unsafe fn asum(n: i32, x: *const Self, incx: i32) -> Self::Real {
        reference::asum(n, x, incx)
    }

    unsafe fn nrm2(n: i32, x: *const Self, incx: i32) -> Self::Real {
        reference::nrm2(n, x, incx)
    }

    unsafe fn iamax(n: i32, x: *const Self, incx: i32) -> usize {
        reference::iamax(n, x, incx)
    }

    unsafe fn scal(n: i32, alpha: Self, x: *mut Self, incx: i32) {
        reference::scal(n, alpha, x, incx)
    }

    unsafe fn axpy(n: i32, alpha: Self, x: *const Self, incx: i32, y: *mut Self, incy: i32) {
        reference::axpy(n, alpha, x, incx, y, incy)
    }

    unsafe fn copy(n: i32, x: *const Self, incx: i32, y: *mut Self, incy: i32) {
        reference::copy(n, x, incx, y, incy)
    }

    unsafe fn swap(n: i32, x: *mut Self, incx: i32, y: *mut Self, incy: i32) {
        reference::swap(n, x, incx, y, incy)
    }

    unsafe fn dotu(n: i32, x: *const Self, incx: i32, y: *const Self, incy: i32) -> Self {
        reference::dotu(n, x, incx, y, incy)
    }

    unsafe fn dotc(n: i32, x: *const Self, incx: i32, y: *const Self, incy: i32) -> Self {
        reference::dotc(n, x, incx, y, incy)
    }

    unsafe fn rot(
        n: i32,
        x: *mut Self,
        incx: i32,
        y: *mut Self,
        incy: i32,
        c: Self::Real,
        s: Self,
    ) {
        reference::rot(n, x, incx, y, incy, c, s)
    }

    unsafe fn gemv(
        trans: u8,
        m: i32,
        n: i32,
        alpha: Self,
        a: *const Self,
        lda: i32,
        x: *const Self,
        incx: i32,
        beta: Self,
        y: *mut Self,
        incy: i32,
    ) {
        reference::gemv(trans, m, n, alpha, a, lda, x, incx, beta, y, incy)
    }

    unsafe fn geru(
        m: i32,
        n: i32,
        alpha: Self,
        x: *const Self,
        incx: i32,
        y: *const Self,
        incy: i32,
        a: *mut Self,
        lda: i32,
    ) {
        reference::geru(m, n, alpha, x, incx, y, incy, a, lda)
    }

    unsafe fn gerc(
        m: i32,
        n: i32,
        alpha: Self,
        x: *const Self,
        incx: i32,
        y: *const Self,
        incy: i32,
        a: *mut Self,
        lda: i32,
    ) {
        reference::gerc(m, n, alpha, x, incx, y, incy, a, lda)
    }

    unsafe fn symv(
        uplo: u8,
        n: i32,
        alpha: Self,
        a: *const Self,
        lda: i32,
        x: *const Self,
        incx: i32,
        beta: Self,
        y: *mut Self,
        incy: i32,
    ) {
        reference::symv(uplo, n, alpha, a, lda, x, incx, beta, y, incy)
    }

    unsafe fn hemv(
        uplo: u8,
        n: i32,
        alpha: Self,
        a: *const Self,
        lda: i32,
        x: *const Self,
        incx: i32,
        beta: Self,
        y: *mut Self,
        incy: i32,
    ) {
        reference::hemv(uplo, n, alpha, a, lda, x, incx, beta, y, incy)
    }

    unsafe fn trmv(
        uplo: u8,
        trans: u8,
        diag: u8,
        n: i32,
        a: *const Self,
        lda: i32,
        x: *mut Self,
        incx: i32,
    ) {
        reference::trmv(uplo, trans, diag, n, a, lda, x, incx)
    }

    unsafe fn trsv(
        uplo: u8,
        trans: u8,
        diag: u8,
        n: i32,
        a: *const Self,
        lda: i32,
        x: *mut Self,
        incx: i32,
    ) {
        reference::trsv(uplo, trans, diag, n, a, lda, x, incx)
    }

    unsafe fn syr(
        uplo: u8,
        n: i32,
        alpha: Self,
        x: *const Self,
        incx: i32,
        a: *mut Self,
        lda: i32,
    ) {
        reference::syr(uplo, n, alpha, x, incx, a, lda)
    }

    unsafe fn her(
        uplo: u8,
        n: i32,
        alpha: Self::Real,
        x: *const Self,
        incx: i32,
        a: *mut Self,
        lda: i32,
    ) {
        reference::her(uplo, n, alpha, x, incx, a, lda)
    }

    unsafe fn syr2(
        uplo: u8,
        n: i32,
        alpha: Self,
        x: *const Self,
        incx: i32,
        y: *const Self,
        incy: i32,
        a: *mut Self,
        lda: i32,
    ) {
        reference::syr2(uplo, n, alpha, x, incx, y, incy, a, lda)
    }

    unsafe fn her2(
        uplo: u8,
        n: i32,
        alpha: Self,
        x: *const Self,
        incx: i32,
        y: *const Self,
        incy: i32,
        a: *mut Self,
        lda: i32,
    ) {
        reference::her2(uplo, n, alpha, x, incx, y, incy, a, lda)
    }

    unsafe fn gemm(
        transa: u8,
        transb: u8,
        m: i32,
        n: i32,
        k: i32,
        alpha: Self,
        a: *const Self,
        lda: i32,
        b: *const Self,
        ldb: i32,
        beta: Self,
        c: *mut Self,
        ldc: i32,
    ) {
        reference::gemm(transa, transb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
    }

    unsafe fn symm(
        side: u8,
        uplo: u8,
        m: i32,
        n: i32,
        alpha: Self,
        a: *const Self,
        lda: i32,
        b: *const Self,
        ldb: i32,
        beta: Self,
        c: *mut Self,
        ldc: i32,
    ) {
        reference::symm(side, uplo, m, n, alpha, a, lda, b, ldb, beta, c, ldc)
    }

    unsafe fn hemm(
        side: u8,
        uplo: u8,
        m: i32,
        n: i32,
        alpha: Self,
        a: *const Self,
        lda: i32,
        b: *const Self,
        ldb: i32,
        beta: Self,
        c: *mut Self,
        ldc: i32,
    ) {
        reference::hemm(side, uplo, m, n, alpha, a, lda, b, ldb, beta, c, ldc)
    }

    unsafe fn syrk(
        uplo: u8,
        trans: u8,
        n: i32,
        k: i32,
        alpha: Self,
        a: *const Self,
        lda: i32,
        beta: Self,
        c: *mut Self,
        ldc: i32,
    ) {
        reference::syrk(uplo, trans, n, k, alpha, a, lda, beta, c, ldc)
    }

    unsafe fn herk(
        uplo: u8,
        trans: u8,
        n: i32,
        k: i32,
        alpha: Self::Real,
        a: *const Self,
        lda: i32,
        beta: Self::Real,
        c: *mut Self,
        ldc: i32,
    ) {
        reference::herk(uplo, trans, n, k, alpha, a, lda, beta, c, ldc)
    }

    unsafe fn syr2k(
        uplo: u8,
        trans: u8,
        n: i32,
        k: i32,
        alpha: Self,
        a: *const Self,
        lda: i32,
        b: *const Self,
        ldb: i32,
        beta: Self,
        c: *mut Self,
        ldc: i32,
    ) {
        reference::syr2k(uplo, trans, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
    }

    unsafe fn her2k(
        uplo: u8,
        trans: u8,
        n: i32,
        k: i32,
        alpha: Self,
        a: *const Self,
        lda: i32,
        b: *const Self,
        ldb: i32,
        beta: Self::Real,
        c: *mut Self,
        ldc: i32,
    ) {
        reference::her2k(uplo, trans, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
    }

    unsafe fn trmm(
        side: u8,
        uplo: u8,
        transa: u8,
        diag: u8,
        m: i32,
        n: i32,
        alpha: Self,
        a: *const Self,
        lda: i32,
        b: *mut Self,
        ldb: i32,
    ) {
        reference::trmm(side, uplo, transa, diag, m, n, alpha, a, lda, b, ldb)
    }

    unsafe fn trsm(
        side: u8,
        uplo: u8,
        transa: u8,
        diag: u8,
        m: i32,
        n: i32,
        alpha: Self,
        a: *const Self,
        lda: i32,
        b: *mut Self,
        ldb: i32,
    ) {
        reference::trsm(side, uplo, transa, diag, m, n, alpha, a, lda, b, ldb)
    }
}

#[cfg(not(feature = "blas"))]
mod kinds {
    use super::BlasScalar;
    use num_complex::{Complex32, Complex64};

    impl BlasScalar for f32 {}
    impl BlasScalar for f64 {}
    impl BlasScalar for Complex32 {}
    impl BlasScalar for Complex64 {}
}

#[cfg(feature = "blas")]
mod kinds {
    use super::BlasScalar;
    use cblas_sys::{CBLAS_LAYOUT, CBLAS_TRANSPOSE};
    use num_complex::{Complex32, Complex64};

    fn cblas_trans(flag: u8) -> CBLAS_TRANSPOSE {
        match flag.to_ascii_uppercase() {
            b'N' => CBLAS_TRANSPOSE::CblasNoTrans,
            b'T' => CBLAS_TRANSPOSE::CblasTrans,
            _ => CBLAS_TRANSPOSE::CblasConjTrans,
        }
    }

    macro_rules! impl_blas_real {
        ($t:ty, $dot:ident, $asum:ident, $nrm2:ident, $axpy:ident, $scal:ident, $gemv:ident, $gemm:ident) => {
            impl BlasScalar for $t {
                unsafe fn asum(n: i32, x: *const $t, incx: i32) -> $t {
                    cblas_sys::$asum(n, x, incx)
                }

                unsafe fn nrm2(n: i32, x: *const $t, incx: i32) -> $t {
                    cblas_sys::$nrm2(n, x, incx)
                }

                unsafe fn scal(n: i32, alpha: $t, x: *mut $t, incx: i32) {
                    cblas_sys::$scal(n, alpha, x, incx)
                }

                unsafe fn axpy(n: i32, alpha: $t, x: *const $t, incx: i32, y: *mut $t, incy: i32) {
                    cblas_sys::$axpy(n, alpha, x, incx, y, incy)
                }

                unsafe fn dotu(n: i32, x: *const $t, incx: i32, y: *const $t, incy: i32) -> $t {
                    cblas_sys::$dot(n, x, incx, y, incy)
                }

                unsafe fn dotc(n: i32, x: *const $t, incx: i32, y: *const $t, incy: i32) -> $t {
                    cblas_sys::$dot(n, x, incx, y, incy)
                }

                unsafe fn gemv(
                    trans: u8,
                    m: i32,
                    n: i32,
                    alpha: $t,
                    a: *const $t,
                    lda: i32,
                    x: *const $t,
                    incx: i32,
                    beta: $t,
                    y: *mut $t,
                    incy: i32,
                ) {
                    cblas_sys::$gemv(
                        CBLAS_LAYOUT::CblasColMajor,
                        cblas_trans(trans),
                        m,
                        n,
                        alpha,
                        a,
                        lda,
                        x,
                        incx,
                        beta,
                        y,
                        incy,
                    )
                }

                unsafe fn gemm(
                    transa: u8,
                    transb: u8,
                    m: i32,
                    n: i32,
                    k: i32,
                    alpha: $t,
                    a: *const $t,
                    lda: i32,
                    b: *const $t,
                    ldb: i32,
                    beta: $t,
                    c: *mut $t,
                    ldc: i32,
                ) {
                    cblas_sys::$gemm(
                        CBLAS_LAYOUT::CblasColMajor,
                        cblas_trans(transa),
                        cblas_trans(transb),
                        m,
                        n,
                        k,
                        alpha,
                        a,
                        lda,
                        b,
                        ldb,
                        beta,
                        c,
                        ldc,
                    )
                }
            }
        };
    }

    macro_rules! impl_blas_complex {
        ($t:ty, $r:ty, $dotu:ident, $dotc:ident, $asum:ident, $nrm2:ident, $axpy:ident, $scal:ident, $gemv:ident, $gemm:ident) => {
            impl BlasScalar for $t {
                unsafe fn asum(n: i32, x: *const $t, incx: i32) -> $r {
                    cblas_sys::$asum(n, x as *const _, incx)
                }

                unsafe fn nrm2(n: i32, x: *const $t, incx: i32) -> $r {
                    cblas_sys::$nrm2(n, x as *const _, incx)
                }

                unsafe fn scal(n: i32, alpha: $t, x: *mut $t, incx: i32) {
                    cblas_sys::$scal(n, (&alpha) as *const _ as *const _, x as *mut _, incx)
                }

                unsafe fn axpy(n: i32, alpha: $t, x: *const $t, incx: i32, y: *mut $t, incy: i32) {
                    cblas_sys::$axpy(
                        n,
                        (&alpha) as *const _ as *const _,
                        x as *const _,
                        incx,
                        y as *mut _,
                        incy,
                    )
                }

                unsafe fn dotu(n: i32, x: *const $t, incx: i32, y: *const $t, incy: i32) -> $t {
                    let mut out = <$t>::new(0.0, 0.0);
                    cblas_sys::$dotu(
                        n,
                        x as *const _,
                        incx,
                        y as *const _,
                        incy,
                        (&mut out) as *mut _ as *mut _,
                    );
                    out
                }

                unsafe fn dotc(n: i32, x: *const $t, incx: i32, y: *const $t, incy: i32) -> $t {
                    let mut out = <$t>::new(0.0, 0.0);
                    cblas_sys::$dotc(
                        n,
                        x as *const _,
                        incx,
                        y as *const _,
                        incy,
                        (&mut out) as *mut _ as *mut _,
                    );
                    out
                }

                unsafe fn gemv(
                    trans: u8,
                    m: i32,
                    n: i32,
                    alpha: $t,
                    a: *const $t,
                    lda: i32,
                    x: *const $t,
                    incx: i32,
                    beta: $t,
                    y: *mut $t,
                    incy: i32,
                ) {
                    cblas_sys::$gemv(
                        CBLAS_LAYOUT::CblasColMajor,
                        cblas_trans(trans),
                        m,
                        n,
                        (&alpha) as *const _ as *const _,
                        a as *const _,
                        lda,
                        x as *const _,
                        incx,
                        (&beta) as *const _ as *const _,
                        y as *mut _,
                        incy,
                    )
                }

                unsafe fn gemm(
                    transa: u8,
                    transb: u8,
                    m: i32,
                    n: i32,
                    k: i32,
                    alpha: $t,
                    a: *const $t,
                    lda: i32,
                    b: *const $t,
                    ldb: i32,
                    beta: $t,
                    c: *mut $t,
                    ldc: i32,
                ) {
                    cblas_sys::$gemm(
                        CBLAS_LAYOUT::CblasColMajor,
                        cblas_trans(transa),
                        cblas_trans(transb),
                        m,
                        n,
                        k,
                        (&alpha) as *const _ as *const _,
                        a as *const _,
                        lda,
                        b as *const _,
                        ldb,
                        (&beta) as *const _ as *const _,
                        c as *mut _,
                        ldc,
                    )
                }
            }
        };
    }

    impl_blas_real!(f32, cblas_sdot, cblas_sasum, cblas_snrm2, cblas_saxpy, cblas_sscal, cblas_sgemv, cblas_sgemm);
    impl_blas_real!(f64, cblas_ddot, cblas_dasum, cblas_dnrm2, cblas_daxpy, cblas_dscal, cblas_dgemv, cblas_dgemm);
    impl_blas_complex!(
        Complex32,
        f32,
        cblas_cdotu_sub,
        cblas_cdotc_sub,
        cblas_scasum,
        cblas_scnrm2,
        cblas_caxpy,
        cblas_cscal,
        cblas_cgemv,
        cblas_cgemm
    );
    impl_blas_complex!(
        Complex64,
        f64,
        cblas_zdotu_sub,
        cblas_zdotc_sub,
        cblas_dzasum,
        cblas_dznrm2,
        cblas_zaxpy,
        cblas_zscal,
        cblas_zgemv,
        cblas_zgemm
    );
}
