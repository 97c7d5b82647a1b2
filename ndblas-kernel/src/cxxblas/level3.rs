//! Matrix-matrix routines.
//!
//! The row-major forms transpose the whole equation: `C = op(A) op(B)`
//! becomes `C^T = op(B)^T op(A)^T` over the column-major views, so no data
//! is conjugated or copied at this level.

use super::int;
use super::level2::effective_trans;
use crate::flags::{Diag, Order, Side, Transpose, UpLo};
use crate::BlasScalar;

/// `C = alpha op(A) op(B) + beta C`, `C` of shape `m x n`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemm<T: BlasScalar>(
    order: Order,
    transa: Transpose,
    transb: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    b: *const T,
    ldb: usize,
    beta: T,
    c: *mut T,
    ldc: usize,
) {
    let ta = effective_trans::<T>(transa).to_char();
    let tb = effective_trans::<T>(transb).to_char();
    match order {
        Order::ColMajor => T::gemm(
            ta,
            tb,
            int(m),
            int(n),
            int(k),
            alpha,
            a,
            int(lda),
            b,
            int(ldb),
            beta,
            c,
            int(ldc),
        ),
        Order::RowMajor => T::gemm(
            tb,
            ta,
            int(n),
            int(m),
            int(k),
            alpha,
            b,
            int(ldb),
            a,
            int(lda),
            beta,
            c,
            int(ldc),
        ),
    }
}

/// `(side, uplo, m, n)` as seen by the column-major kernel.
fn sided(order: Order, side: Side, uplo: UpLo, m: usize, n: usize) -> (u8, u8, i32, i32) {
    match order {
        Order::ColMajor => (side.to_char(), uplo.to_char(), int(m), int(n)),
        Order::RowMajor => (side.flip().to_char(), uplo.flip().to_char(), int(n), int(m)),
    }
}

/// `C = alpha A B + beta C` (left) or `alpha B A + beta C` (right) with
/// symmetric `A`; `C` is `m x n`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn symm<T: BlasScalar>(
    order: Order,
    side: Side,
    uplo: UpLo,
    m: usize,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    b: *const T,
    ldb: usize,
    beta: T,
    c: *mut T,
    ldc: usize,
) {
    let (s, u, m, n) = sided(order, side, uplo, m, n);
    T::symm(s, u, m, n, alpha, a, int(lda), b, int(ldb), beta, c, int(ldc))
}

/// As [`symm`] with Hermitian `A`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn hemm<T: BlasScalar>(
    order: Order,
    side: Side,
    uplo: UpLo,
    m: usize,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    b: *const T,
    ldb: usize,
    beta: T,
    c: *mut T,
    ldc: usize,
) {
    let (s, u, m, n) = sided(order, side, uplo, m, n);
    T::hemm(s, u, m, n, alpha, a, int(lda), b, int(ldb), beta, c, int(ldc))
}

/// Symmetric updates only distinguish `NoTrans` from a transpose.
fn symmetric_trans(order: Order, uplo: UpLo, trans: Transpose) -> (u8, u8) {
    let trans = if trans.is_transposed() {
        Transpose::Trans
    } else {
        Transpose::NoTrans
    };
    match order {
        Order::ColMajor => (uplo.to_char(), trans.to_char()),
        Order::RowMajor => (uplo.flip().to_char(), trans.flip().to_char()),
    }
}

/// Hermitian updates only distinguish `NoTrans` from `ConjTrans`.
fn hermitian_trans(order: Order, uplo: UpLo, trans: Transpose) -> (u8, u8) {
    let trans = if trans.is_transposed() {
        Transpose::ConjTrans
    } else {
        Transpose::NoTrans
    };
    match order {
        Order::ColMajor => (uplo.to_char(), trans.to_char()),
        Order::RowMajor => (uplo.flip().to_char(), trans.flip_conj().to_char()),
    }
}

/// `C = alpha op(A) op(A)^T + beta C` on the stored triangle of the `n x n`
/// matrix `C`; `op(A)` is `n x k`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn syrk<T: BlasScalar>(
    order: Order,
    uplo: UpLo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    beta: T,
    c: *mut T,
    ldc: usize,
) {
    let (u, t) = symmetric_trans(order, uplo, trans);
    T::syrk(u, t, int(n), int(k), alpha, a, int(lda), beta, c, int(ldc))
}

/// `C = alpha op(A) op(A)^H + beta C` with real `alpha`, `beta`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn herk<T: BlasScalar>(
    order: Order,
    uplo: UpLo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T::Real,
    a: *const T,
    lda: usize,
    beta: T::Real,
    c: *mut T,
    ldc: usize,
) {
    let (u, t) = hermitian_trans(order, uplo, trans);
    T::herk(u, t, int(n), int(k), alpha, a, int(lda), beta, c, int(ldc))
}

/// `C = alpha (op(A) op(B)^T + op(B) op(A)^T) + beta C`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn syr2k<T: BlasScalar>(
    order: Order,
    uplo: UpLo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    b: *const T,
    ldb: usize,
    beta: T,
    c: *mut T,
    ldc: usize,
) {
    let (u, t) = symmetric_trans(order, uplo, trans);
    T::syr2k(
        u,
        t,
        int(n),
        int(k),
        alpha,
        a,
        int(lda),
        b,
        int(ldb),
        beta,
        c,
        int(ldc),
    )
}

/// `C = alpha op(A) op(B)^H + conj(alpha) op(B) op(A)^H + beta C` with real
/// `beta`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn her2k<T: BlasScalar>(
    order: Order,
    uplo: UpLo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    b: *const T,
    ldb: usize,
    beta: T::Real,
    c: *mut T,
    ldc: usize,
) {
    let (u, t) = hermitian_trans(order, uplo, trans);
    let alpha = match order {
        Order::ColMajor => alpha,
        Order::RowMajor => alpha.conj(),
    };
    T::her2k(
        u,
        t,
        int(n),
        int(k),
        alpha,
        a,
        int(lda),
        b,
        int(ldb),
        beta,
        c,
        int(ldc),
    )
}

/// `B = alpha op(A) B` (left) or `alpha B op(A)` (right) with triangular
/// `A`; `B` is `m x n`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmm<T: BlasScalar>(
    order: Order,
    side: Side,
    uplo: UpLo,
    transa: Transpose,
    diag: Diag,
    m: usize,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    b: *mut T,
    ldb: usize,
) {
    let (s, u, m, n) = sided(order, side, uplo, m, n);
    let t = effective_trans::<T>(transa).to_char();
    T::trmm(s, u, t, diag.to_char(), m, n, alpha, a, int(lda), b, int(ldb))
}

/// Solve `op(A) X = alpha B` (left) or `X op(A) = alpha B` (right) in place.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsm<T: BlasScalar>(
    order: Order,
    side: Side,
    uplo: UpLo,
    transa: Transpose,
    diag: Diag,
    m: usize,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    b: *mut T,
    ldb: usize,
) {
    let (s, u, m, n) = sided(order, side, uplo, m, n);
    let t = effective_trans::<T>(transa).to_char();
    T::trsm(s, u, t, diag.to_char(), m, n, alpha, a, int(lda), b, int(ldb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex64;
    use rand::Rng;

    fn random_complex(len: usize) -> Vec<Complex64> {
        let mut rng = rand::thread_rng();
        (0..len)
            .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect()
    }

    /// Row-major `rows x cols` to column-major.
    fn to_col(x: &[Complex64], rows: usize, cols: usize) -> Vec<Complex64> {
        let mut out = vec![Complex64::new(0.0, 0.0); x.len()];
        for i in 0..rows {
            for j in 0..cols {
                out[i + j * rows] = x[i * cols + j];
            }
        }
        out
    }

    #[test]
    fn test_gemm_row_major_matches_col_major() {
        let (m, n, k) = (3, 4, 5);
        let a = random_complex(k * m); // op(A) = A^H with A of shape k x m
        let b = random_complex(k * n);
        let mut c_row = vec![Complex64::new(0.0, 0.0); m * n];
        let mut c_col = vec![Complex64::new(0.0, 0.0); m * n];
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        unsafe {
            gemm(
                Order::RowMajor,
                Transpose::ConjTrans,
                Transpose::NoTrans,
                m,
                n,
                k,
                one,
                a.as_ptr(),
                m,
                b.as_ptr(),
                n,
                zero,
                c_row.as_mut_ptr(),
                n,
            );
            let (ac, bc) = (to_col(&a, k, m), to_col(&b, k, n));
            gemm(
                Order::ColMajor,
                Transpose::ConjTrans,
                Transpose::NoTrans,
                m,
                n,
                k,
                one,
                ac.as_ptr(),
                k,
                bc.as_ptr(),
                k,
                zero,
                c_col.as_mut_ptr(),
                m,
            );
        }
        let c_row_as_col = to_col(&c_row, m, n);
        for (x, y) in c_row_as_col.iter().zip(c_col.iter()) {
            assert_relative_eq!(x.re, y.re, epsilon = 1e-12);
            assert_relative_eq!(x.im, y.im, epsilon = 1e-12);
        }
        // Spot-check against the definition.
        let mut expected = zero;
        for p in 0..k {
            expected += a[p * m + 1].conj() * b[p * n + 2];
        }
        assert_relative_eq!(c_row[n + 2].re, expected.re, epsilon = 1e-12);
        assert_relative_eq!(c_row[n + 2].im, expected.im, epsilon = 1e-12);
    }

    #[test]
    fn test_herk_row_major_upper() {
        let (n, k) = (3, 2);
        let a = random_complex(n * k);
        let mut c = vec![Complex64::new(0.0, 0.0); n * n];
        unsafe {
            herk(
                Order::RowMajor,
                UpLo::Upper,
                Transpose::NoTrans,
                n,
                k,
                1.0,
                a.as_ptr(),
                k,
                0.0,
                c.as_mut_ptr(),
                n,
            )
        };
        for i in 0..n {
            for j in i..n {
                let mut expected = Complex64::new(0.0, 0.0);
                for p in 0..k {
                    expected += a[i * k + p] * a[j * k + p].conj();
                }
                assert_relative_eq!(c[i * n + j].re, expected.re, epsilon = 1e-12);
                assert_relative_eq!(c[i * n + j].im, expected.im, epsilon = 1e-12);
            }
        }
        // Strictly lower triangle is not written.
        assert_eq!(c[n], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_her2k_row_major_matches_definition() {
        let (n, k) = (2, 3);
        let a = random_complex(n * k);
        let b = random_complex(n * k);
        let alpha = Complex64::new(0.5, -1.5);
        let mut c = vec![Complex64::new(0.0, 0.0); n * n];
        unsafe {
            her2k(
                Order::RowMajor,
                UpLo::Lower,
                Transpose::NoTrans,
                n,
                k,
                alpha,
                a.as_ptr(),
                k,
                b.as_ptr(),
                k,
                0.0,
                c.as_mut_ptr(),
                n,
            )
        };
        for i in 0..n {
            for j in 0..=i {
                let mut expected = Complex64::new(0.0, 0.0);
                for p in 0..k {
                    expected += alpha * a[i * k + p] * b[j * k + p].conj()
                        + alpha.conj() * b[i * k + p] * a[j * k + p].conj();
                }
                assert_relative_eq!(c[i * n + j].re, expected.re, epsilon = 1e-12);
                assert_relative_eq!(c[i * n + j].im, expected.im, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_trsm_row_major_inverts_trmm() {
        let (m, n) = (3, 2);
        // Upper triangular 3x3 row-major with a strong diagonal.
        let mut a = random_complex(m * m);
        for i in 0..m {
            a[i * m + i] += Complex64::new(4.0, 0.0);
        }
        let orig = random_complex(m * n);
        let mut b = orig.clone();
        let one = Complex64::new(1.0, 0.0);
        unsafe {
            trmm(
                Order::RowMajor,
                Side::Left,
                UpLo::Upper,
                Transpose::ConjTrans,
                Diag::NonUnit,
                m,
                n,
                one,
                a.as_ptr(),
                m,
                b.as_mut_ptr(),
                n,
            );
            trsm(
                Order::RowMajor,
                Side::Left,
                UpLo::Upper,
                Transpose::ConjTrans,
                Diag::NonUnit,
                m,
                n,
                one,
                a.as_ptr(),
                m,
                b.as_mut_ptr(),
                n,
            );
        }
        for (x, y) in b.iter().zip(orig.iter()) {
            assert_relative_eq!(x.re, y.re, epsilon = 1e-10);
            assert_relative_eq!(x.im, y.im, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_symm_row_major_right() {
        // S = [[1, 2], [2, 3]] with only the upper triangle meaningful.
        let s = [1.0f64, 2.0, f64::NAN, 3.0];
        let b = [1.0f64, 0.0, 0.0, 1.0, 1.0, 1.0]; // 3x2 row-major
        let mut c = [0.0f64; 6];
        unsafe {
            symm(
                Order::RowMajor,
                Side::Right,
                UpLo::Upper,
                3,
                2,
                1.0,
                s.as_ptr(),
                2,
                b.as_ptr(),
                2,
                0.0,
                c.as_mut_ptr(),
                2,
            )
        };
        assert_eq!(c, [1.0, 2.0, 2.0, 3.0, 3.0, 5.0]);
    }
}
