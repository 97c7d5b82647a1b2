//! Pure-Rust column-major kernels with Fortran calling conventions.
//!
//! These are the default bodies of the [`BlasScalar`](crate::BlasScalar)
//! routine table. Flags are ASCII characters (case-insensitive), matrices
//! are column-major with a leading dimension, and a negative increment walks
//! a vector backwards from its lowest address: element `i` of an `n`-vector
//! with `inc < 0` lives at `(n - 1 - i) * |inc|`.
//!
//! When `beta` is zero the output is overwritten without being read.

use ndblas_traits::Scalar;
use num_traits::{Float, Zero};

#[inline(always)]
fn dim(n: i32) -> usize {
    n.max(0) as usize
}

#[inline(always)]
fn vpos(i: usize, n: usize, inc: i32) -> isize {
    if inc >= 0 {
        i as isize * inc as isize
    } else {
        (n - 1 - i) as isize * -(inc as isize)
    }
}

#[inline(always)]
unsafe fn vget<T: Copy>(x: *const T, i: usize, n: usize, inc: i32) -> T {
    *x.offset(vpos(i, n, inc))
}

#[inline(always)]
unsafe fn vptr<T>(x: *mut T, i: usize, n: usize, inc: i32) -> *mut T {
    x.offset(vpos(i, n, inc))
}

#[inline(always)]
fn flag(c: u8) -> u8 {
    c.to_ascii_uppercase()
}

/// Column-major matrix accessor.
#[derive(Clone, Copy)]
struct Mat<T> {
    ptr: *mut T,
    ld: usize,
}

impl<T: Copy> Mat<T> {
    fn new(ptr: *const T, ld: i32) -> Self {
        Self {
            ptr: ptr as *mut T,
            ld: dim(ld),
        }
    }

    #[inline(always)]
    unsafe fn at(self, i: usize, j: usize) -> *mut T {
        self.ptr.add(i + j * self.ld)
    }

    #[inline(always)]
    unsafe fn get(self, i: usize, j: usize) -> T {
        *self.at(i, j)
    }
}

#[inline(always)]
fn stored(upper: bool, i: usize, j: usize) -> bool {
    if upper {
        i <= j
    } else {
        i >= j
    }
}

/// Symmetric matrix read from one stored triangle.
#[inline(always)]
unsafe fn sym_get<T: Scalar>(a: Mat<T>, upper: bool, i: usize, j: usize) -> T {
    if stored(upper, i, j) {
        a.get(i, j)
    } else {
        a.get(j, i)
    }
}

/// Hermitian matrix read from one stored triangle; the diagonal is real.
#[inline(always)]
unsafe fn herm_get<T: Scalar>(a: Mat<T>, upper: bool, i: usize, j: usize) -> T {
    if i == j {
        T::from_real(a.get(i, i).re())
    } else if stored(upper, i, j) {
        a.get(i, j)
    } else {
        a.get(j, i).conj()
    }
}

/// `op(A)(i, j)` for a general matrix.
#[inline(always)]
unsafe fn op_get<T: Scalar>(a: Mat<T>, trans: u8, i: usize, j: usize) -> T {
    match trans {
        b'N' => a.get(i, j),
        b'T' => a.get(j, i),
        _ => a.get(j, i).conj(),
    }
}

/// Triangular matrix: zero outside the stored triangle, optional unit diagonal.
#[derive(Clone, Copy)]
struct Tri<T> {
    a: Mat<T>,
    upper: bool,
    unit: bool,
}

impl<T: Scalar> Tri<T> {
    fn new(a: *const T, lda: i32, uplo: u8, diag: u8) -> Self {
        Self {
            a: Mat::new(a, lda),
            upper: flag(uplo) == b'U',
            unit: flag(diag) == b'U',
        }
    }

    #[inline(always)]
    unsafe fn get(self, i: usize, j: usize) -> T {
        if i == j {
            if self.unit {
                T::one()
            } else {
                self.a.get(i, i)
            }
        } else if stored(self.upper, i, j) {
            self.a.get(i, j)
        } else {
            T::zero()
        }
    }

    /// `op(A)(i, j)`.
    #[inline(always)]
    unsafe fn op(self, trans: u8, i: usize, j: usize) -> T {
        match trans {
            b'N' => self.get(i, j),
            b'T' => self.get(j, i),
            _ => self.get(j, i).conj(),
        }
    }

    /// Whether `op(A)` is upper triangular.
    fn op_upper(self, trans: u8) -> bool {
        self.upper != (trans != b'N')
    }
}

/// Solve `M z = rhs` in place for a triangular `M` given element-wise.
fn tri_solve<T: Scalar>(n: usize, upper: bool, m: impl Fn(usize, usize) -> T, z: &mut [T]) {
    if upper {
        for i in (0..n).rev() {
            let mut s = z[i];
            for j in i + 1..n {
                s -= m(i, j) * z[j];
            }
            z[i] = s / m(i, i);
        }
    } else {
        for i in 0..n {
            let mut s = z[i];
            for j in 0..i {
                s -= m(i, j) * z[j];
            }
            z[i] = s / m(i, i);
        }
    }
}

/// `*p = alpha * s + beta * *p`, without reading `*p` when `beta == 0`.
#[inline(always)]
unsafe fn update<T: Scalar>(p: *mut T, alpha: T, s: T, beta: T) {
    *p = if beta.is_zero() {
        alpha * s
    } else {
        alpha * s + beta * *p
    };
}

// ============================================================================
// Level 1
// ============================================================================

/// Sum of `|re| + |im|`.
pub unsafe fn asum<T: Scalar>(n: i32, x: *const T, incx: i32) -> T::Real {
    let n = dim(n);
    let mut s = T::Real::zero();
    for i in 0..n {
        let v = vget(x, i, n, incx);
        s = s + v.re().abs() + v.im().abs();
    }
    s
}

/// Euclidean norm.
pub unsafe fn nrm2<T: Scalar>(n: i32, x: *const T, incx: i32) -> T::Real {
    let n = dim(n);
    let mut s = T::Real::zero();
    for i in 0..n {
        let v = vget(x, i, n, incx);
        s = s + v.re() * v.re() + v.im() * v.im();
    }
    s.sqrt()
}

/// Zero-based index of the first element maximizing `|re| + |im|`.
pub unsafe fn iamax<T: Scalar>(n: i32, x: *const T, incx: i32) -> usize {
    let n = dim(n);
    let mut best = 0;
    let mut best_val = T::Real::neg_infinity();
    for i in 0..n {
        let v = vget(x, i, n, incx);
        let mag = v.re().abs() + v.im().abs();
        if mag > best_val {
            best = i;
            best_val = mag;
        }
    }
    best
}

pub unsafe fn scal<T: Scalar>(n: i32, alpha: T, x: *mut T, incx: i32) {
    let n = dim(n);
    for i in 0..n {
        let p = vptr(x, i, n, incx);
        *p = alpha * *p;
    }
}

pub unsafe fn axpy<T: Scalar>(n: i32, alpha: T, x: *const T, incx: i32, y: *mut T, incy: i32) {
    let n = dim(n);
    for i in 0..n {
        let p = vptr(y, i, n, incy);
        *p += alpha * vget(x, i, n, incx);
    }
}

pub unsafe fn copy<T: Scalar>(n: i32, x: *const T, incx: i32, y: *mut T, incy: i32) {
    let n = dim(n);
    for i in 0..n {
        *vptr(y, i, n, incy) = vget(x, i, n, incx);
    }
}

pub unsafe fn swap<T: Scalar>(n: i32, x: *mut T, incx: i32, y: *mut T, incy: i32) {
    let n = dim(n);
    for i in 0..n {
        std::ptr::swap(vptr(x, i, n, incx), vptr(y, i, n, incy));
    }
}

/// `Σ x[i] * y[i]`.
pub unsafe fn dotu<T: Scalar>(n: i32, x: *const T, incx: i32, y: *const T, incy: i32) -> T {
    let n = dim(n);
    let mut s = T::zero();
    for i in 0..n {
        s += vget(x, i, n, incx) * vget(y, i, n, incy);
    }
    s
}

/// `Σ conj(x[i]) * y[i]`.
pub unsafe fn dotc<T: Scalar>(n: i32, x: *const T, incx: i32, y: *const T, incy: i32) -> T {
    let n = dim(n);
    let mut s = T::zero();
    for i in 0..n {
        s += vget(x, i, n, incx).conj() * vget(y, i, n, incy);
    }
    s
}

/// Plane rotation: `x' = c x + s y`, `y' = c y - conj(s) x`.
pub unsafe fn rot<T: Scalar>(
    n: i32,
    x: *mut T,
    incx: i32,
    y: *mut T,
    incy: i32,
    c: T::Real,
    s: T,
) {
    let n = dim(n);
    let c = T::from_real(c);
    for i in 0..n {
        let px = vptr(x, i, n, incx);
        let py = vptr(y, i, n, incy);
        let (xv, yv) = (*px, *py);
        *px = c * xv + s * yv;
        *py = c * yv - s.conj() * xv;
    }
}

// ============================================================================
// Level 2
// ============================================================================

/// `y = alpha op(A) x + beta y` with `A` of shape `m x n`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemv<T: Scalar>(
    trans: u8,
    m: i32,
    n: i32,
    alpha: T,
    a: *const T,
    lda: i32,
    x: *const T,
    incx: i32,
    beta: T,
    y: *mut T,
    incy: i32,
) {
    let trans = flag(trans);
    let (m, n) = (dim(m), dim(n));
    let a = Mat::new(a, lda);
    let (len_x, len_y) = if trans == b'N' { (n, m) } else { (m, n) };
    for i in 0..len_y {
        let mut s = T::zero();
        for p in 0..len_x {
            s += op_get(a, trans, i, p) * vget(x, p, len_x, incx);
        }
        update(vptr(y, i, len_y, incy), alpha, s, beta);
    }
}

/// `A += alpha x y^T`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn geru<T: Scalar>(
    m: i32,
    n: i32,
    alpha: T,
    x: *const T,
    incx: i32,
    y: *const T,
    incy: i32,
    a: *mut T,
    lda: i32,
) {
    let (m, n) = (dim(m), dim(n));
    let a = Mat::new(a, lda);
    for j in 0..n {
        let yj = alpha * vget(y, j, n, incy);
        for i in 0..m {
            *a.at(i, j) += vget(x, i, m, incx) * yj;
        }
    }
}

/// `A += alpha x y^H`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gerc<T: Scalar>(
    m: i32,
    n: i32,
    alpha: T,
    x: *const T,
    incx: i32,
    y: *const T,
    incy: i32,
    a: *mut T,
    lda: i32,
) {
    let (m, n) = (dim(m), dim(n));
    let a = Mat::new(a, lda);
    for j in 0..n {
        let yj = alpha * vget(y, j, n, incy).conj();
        for i in 0..m {
            *a.at(i, j) += vget(x, i, m, incx) * yj;
        }
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn symmetric_mv<T: Scalar>(
    n: i32,
    alpha: T,
    get: impl Fn(usize, usize) -> T,
    x: *const T,
    incx: i32,
    beta: T,
    y: *mut T,
    incy: i32,
) {
    let n = dim(n);
    for i in 0..n {
        let mut s = T::zero();
        for p in 0..n {
            s += get(i, p) * vget(x, p, n, incx);
        }
        update(vptr(y, i, n, incy), alpha, s, beta);
    }
}

/// `y = alpha A x + beta y` with symmetric `A`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn symv<T: Scalar>(
    uplo: u8,
    n: i32,
    alpha: T,
    a: *const T,
    lda: i32,
    x: *const T,
    incx: i32,
    beta: T,
    y: *mut T,
    incy: i32,
) {
    let a = Mat::new(a, lda);
    let upper = flag(uplo) == b'U';
    symmetric_mv(n, alpha, |i, j| sym_get(a, upper, i, j), x, incx, beta, y, incy);
}

/// `y = alpha A x + beta y` with Hermitian `A`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn hemv<T: Scalar>(
    uplo: u8,
    n: i32,
    alpha: T,
    a: *const T,
    lda: i32,
    x: *const T,
    incx: i32,
    beta: T,
    y: *mut T,
    incy: i32,
) {
    let a = Mat::new(a, lda);
    let upper = flag(uplo) == b'U';
    symmetric_mv(n, alpha, |i, j| herm_get(a, upper, i, j), x, incx, beta, y, incy);
}

/// `x = op(A) x` with triangular `A`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmv<T: Scalar>(
    uplo: u8,
    trans: u8,
    diag: u8,
    n: i32,
    a: *const T,
    lda: i32,
    x: *mut T,
    incx: i32,
) {
    let trans = flag(trans);
    let n = dim(n);
    let tri = Tri::new(a, lda, uplo, diag);
    let src: Vec<T> = (0..n).map(|i| vget(x, i, n, incx)).collect();
    for i in 0..n {
        let mut s = T::zero();
        for (p, &v) in src.iter().enumerate() {
            s += tri.op(trans, i, p) * v;
        }
        *vptr(x, i, n, incx) = s;
    }
}

/// Solve `op(A) z = x` in place with triangular `A`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsv<T: Scalar>(
    uplo: u8,
    trans: u8,
    diag: u8,
    n: i32,
    a: *const T,
    lda: i32,
    x: *mut T,
    incx: i32,
) {
    let trans = flag(trans);
    let n = dim(n);
    let tri = Tri::new(a, lda, uplo, diag);
    let mut z: Vec<T> = (0..n).map(|i| vget(x, i, n, incx)).collect();
    tri_solve(n, tri.op_upper(trans), |i, j| unsafe { tri.op(trans, i, j) }, &mut z);
    for (i, v) in z.into_iter().enumerate() {
        *vptr(x, i, n, incx) = v;
    }
}

/// `A += alpha x x^T` on the stored triangle.
#[allow(clippy::too_many_arguments)]
pub unsafe fn syr<T: Scalar>(
    uplo: u8,
    n: i32,
    alpha: T,
    x: *const T,
    incx: i32,
    a: *mut T,
    lda: i32,
) {
    let n = dim(n);
    let upper = flag(uplo) == b'U';
    let a = Mat::new(a, lda);
    for j in 0..n {
        for i in 0..n {
            if stored(upper, i, j) {
                *a.at(i, j) += alpha * vget(x, i, n, incx) * vget(x, j, n, incx);
            }
        }
    }
}

/// `A += alpha x x^H` on the stored triangle, with real `alpha`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn her<T: Scalar>(
    uplo: u8,
    n: i32,
    alpha: T::Real,
    x: *const T,
    incx: i32,
    a: *mut T,
    lda: i32,
) {
    let n = dim(n);
    let upper = flag(uplo) == b'U';
    let a = Mat::new(a, lda);
    let alpha = T::from_real(alpha);
    for j in 0..n {
        for i in 0..n {
            if stored(upper, i, j) {
                let p = a.at(i, j);
                *p += alpha * vget(x, i, n, incx) * vget(x, j, n, incx).conj();
                if i == j {
                    *p = T::from_real((*p).re());
                }
            }
        }
    }
}

/// `A += alpha (x y^T + y x^T)` on the stored triangle.
#[allow(clippy::too_many_arguments)]
pub unsafe fn syr2<T: Scalar>(
    uplo: u8,
    n: i32,
    alpha: T,
    x: *const T,
    incx: i32,
    y: *const T,
    incy: i32,
    a: *mut T,
    lda: i32,
) {
    let n = dim(n);
    let upper = flag(uplo) == b'U';
    let a = Mat::new(a, lda);
    for j in 0..n {
        for i in 0..n {
            if stored(upper, i, j) {
                let (xi, xj) = (vget(x, i, n, incx), vget(x, j, n, incx));
                let (yi, yj) = (vget(y, i, n, incy), vget(y, j, n, incy));
                *a.at(i, j) += alpha * (xi * yj + yi * xj);
            }
        }
    }
}

/// `A += alpha x y^H + conj(alpha) y x^H` on the stored triangle.
#[allow(clippy::too_many_arguments)]
pub unsafe fn her2<T: Scalar>(
    uplo: u8,
    n: i32,
    alpha: T,
    x: *const T,
    incx: i32,
    y: *const T,
    incy: i32,
    a: *mut T,
    lda: i32,
) {
    let n = dim(n);
    let upper = flag(uplo) == b'U';
    let a = Mat::new(a, lda);
    for j in 0..n {
        for i in 0..n {
            if stored(upper, i, j) {
                let (xi, xj) = (vget(x, i, n, incx), vget(x, j, n, incx));
                let (yi, yj) = (vget(y, i, n, incy), vget(y, j, n, incy));
                let p = a.at(i, j);
                *p += alpha * xi * yj.conj() + alpha.conj() * yi * xj.conj();
                if i == j {
                    *p = T::from_real((*p).re());
                }
            }
        }
    }
}

// ============================================================================
// Level 3
// ============================================================================

/// `C = alpha op(A) op(B) + beta C`, `C` of shape `m x n`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemm<T: Scalar>(
    transa: u8,
    transb: u8,
    m: i32,
    n: i32,
    k: i32,
    alpha: T,
    a: *const T,
    lda: i32,
    b: *const T,
    ldb: i32,
    beta: T,
    c: *mut T,
    ldc: i32,
) {
    let (transa, transb) = (flag(transa), flag(transb));
    let (m, n, k) = (dim(m), dim(n), dim(k));
    let (a, b, c) = (Mat::new(a, lda), Mat::new(b, ldb), Mat::new(c, ldc));
    for j in 0..n {
        for i in 0..m {
            let mut s = T::zero();
            for p in 0..k {
                s += op_get(a, transa, i, p) * op_get(b, transb, p, j);
            }
            update(c.at(i, j), alpha, s, beta);
        }
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn symmetric_mm<T: Scalar>(
    side: u8,
    m: usize,
    n: usize,
    alpha: T,
    s: impl Fn(usize, usize) -> T,
    b: Mat<T>,
    beta: T,
    c: Mat<T>,
) {
    let left = flag(side) == b'L';
    let k = if left { m } else { n };
    for j in 0..n {
        for i in 0..m {
            let mut acc = T::zero();
            for p in 0..k {
                acc += if left {
                    s(i, p) * b.get(p, j)
                } else {
                    b.get(i, p) * s(p, j)
                };
            }
            update(c.at(i, j), alpha, acc, beta);
        }
    }
}

/// `C = alpha A B + beta C` (left) or `alpha B A + beta C` (right), `A`
/// symmetric.
#[allow(clippy::too_many_arguments)]
pub unsafe fn symm<T: Scalar>(
    side: u8,
    uplo: u8,
    m: i32,
    n: i32,
    alpha: T,
    a: *const T,
    lda: i32,
    b: *const T,
    ldb: i32,
    beta: T,
    c: *mut T,
    ldc: i32,
) {
    let a = Mat::new(a, lda);
    let upper = flag(uplo) == b'U';
    symmetric_mm(
        side,
        dim(m),
        dim(n),
        alpha,
        |i, j| sym_get(a, upper, i, j),
        Mat::new(b, ldb),
        beta,
        Mat::new(c, ldc),
    );
}

/// As [`symm`] with Hermitian `A`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn hemm<T: Scalar>(
    side: u8,
    uplo: u8,
    m: i32,
    n: i32,
    alpha: T,
    a: *const T,
    lda: i32,
    b: *const T,
    ldb: i32,
    beta: T,
    c: *mut T,
    ldc: i32,
) {
    let a = Mat::new(a, lda);
    let upper = flag(uplo) == b'U';
    symmetric_mm(
        side,
        dim(m),
        dim(n),
        alpha,
        |i, j| herm_get(a, upper, i, j),
        Mat::new(b, ldb),
        beta,
        Mat::new(c, ldc),
    );
}

/// `C = alpha A A^T + beta C` (`N`) or `alpha A^T A + beta C` (`T`), on the
/// stored triangle of the `n x n` matrix `C`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn syrk<T: Scalar>(
    uplo: u8,
    trans: u8,
    n: i32,
    k: i32,
    alpha: T,
    a: *const T,
    lda: i32,
    beta: T,
    c: *mut T,
    ldc: i32,
) {
    let trans = flag(trans);
    let upper = flag(uplo) == b'U';
    let (n, k) = (dim(n), dim(k));
    let (a, c) = (Mat::new(a, lda), Mat::new(c, ldc));
    let u = |i: usize, p: usize| unsafe {
        if trans == b'N' {
            a.get(i, p)
        } else {
            a.get(p, i)
        }
    };
    for j in 0..n {
        for i in 0..n {
            if stored(upper, i, j) {
                let mut s = T::zero();
                for p in 0..k {
                    s += u(i, p) * u(j, p);
                }
                update(c.at(i, j), alpha, s, beta);
            }
        }
    }
}

/// `C = alpha A A^H + beta C` (`N`) or `alpha A^H A + beta C` (`C`), with
/// real `alpha` and `beta`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn herk<T: Scalar>(
    uplo: u8,
    trans: u8,
    n: i32,
    k: i32,
    alpha: T::Real,
    a: *const T,
    lda: i32,
    beta: T::Real,
    c: *mut T,
    ldc: i32,
) {
    let trans = flag(trans);
    let upper = flag(uplo) == b'U';
    let (n, k) = (dim(n), dim(k));
    let (a, c) = (Mat::new(a, lda), Mat::new(c, ldc));
    let (alpha, beta) = (T::from_real(alpha), T::from_real(beta));
    let u = |i: usize, p: usize| unsafe {
        if trans == b'N' {
            a.get(i, p)
        } else {
            a.get(p, i).conj()
        }
    };
    for j in 0..n {
        for i in 0..n {
            if stored(upper, i, j) {
                let mut s = T::zero();
                for p in 0..k {
                    s += u(i, p) * u(j, p).conj();
                }
                let dst = c.at(i, j);
                update(dst, alpha, s, beta);
                if i == j {
                    *dst = T::from_real((*dst).re());
                }
            }
        }
    }
}

/// `C = alpha (A B^T + B A^T) + beta C` (`N`) or
/// `alpha (A^T B + B^T A) + beta C` (`T`).
#[allow(clippy::too_many_arguments)]
pub unsafe fn syr2k<T: Scalar>(
    uplo: u8,
    trans: u8,
    n: i32,
    k: i32,
    alpha: T,
    a: *const T,
    lda: i32,
    b: *const T,
    ldb: i32,
    beta: T,
    c: *mut T,
    ldc: i32,
) {
    let trans = flag(trans);
    let upper = flag(uplo) == b'U';
    let (n, k) = (dim(n), dim(k));
    let (a, b, c) = (Mat::new(a, lda), Mat::new(b, ldb), Mat::new(c, ldc));
    let u = |m: Mat<T>, i: usize, p: usize| unsafe {
        if trans == b'N' {
            m.get(i, p)
        } else {
            m.get(p, i)
        }
    };
    for j in 0..n {
        for i in 0..n {
            if stored(upper, i, j) {
                let mut s = T::zero();
                for p in 0..k {
                    s += u(a, i, p) * u(b, j, p) + u(b, i, p) * u(a, j, p);
                }
                update(c.at(i, j), alpha, s, beta);
            }
        }
    }
}

/// `C = alpha A B^H + conj(alpha) B A^H + beta C` (`N`) or
/// `alpha A^H B + conj(alpha) B^H A + beta C` (`C`), with real `beta`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn her2k<T: Scalar>(
    uplo: u8,
    trans: u8,
    n: i32,
    k: i32,
    alpha: T,
    a: *const T,
    lda: i32,
    b: *const T,
    ldb: i32,
    beta: T::Real,
    c: *mut T,
    ldc: i32,
) {
    let trans = flag(trans);
    let upper = flag(uplo) == b'U';
    let (n, k) = (dim(n), dim(k));
    let (a, b, c) = (Mat::new(a, lda), Mat::new(b, ldb), Mat::new(c, ldc));
    let beta = T::from_real(beta);
    let u = |m: Mat<T>, i: usize, p: usize| unsafe {
        if trans == b'N' {
            m.get(i, p)
        } else {
            m.get(p, i).conj()
        }
    };
    for j in 0..n {
        for i in 0..n {
            if stored(upper, i, j) {
                let mut s = T::zero();
                for p in 0..k {
                    s += alpha * u(a, i, p) * u(b, j, p).conj()
                        + alpha.conj() * u(b, i, p) * u(a, j, p).conj();
                }
                let dst = c.at(i, j);
                update(dst, T::one(), s, beta);
                if i == j {
                    *dst = T::from_real((*dst).re());
                }
            }
        }
    }
}

/// `B = alpha op(A) B` (left) or `alpha B op(A)` (right), `A` triangular.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmm<T: Scalar>(
    side: u8,
    uplo: u8,
    transa: u8,
    diag: u8,
    m: i32,
    n: i32,
    alpha: T,
    a: *const T,
    lda: i32,
    b: *mut T,
    ldb: i32,
) {
    let transa = flag(transa);
    let (m, n) = (dim(m), dim(n));
    let tri = Tri::new(a, lda, uplo, diag);
    let b = Mat::new(b, ldb);
    if flag(side) == b'L' {
        for j in 0..n {
            let col: Vec<T> = (0..m).map(|p| b.get(p, j)).collect();
            for i in 0..m {
                let mut s = T::zero();
                for (p, &v) in col.iter().enumerate() {
                    s += tri.op(transa, i, p) * v;
                }
                *b.at(i, j) = alpha * s;
            }
        }
    } else {
        for i in 0..m {
            let row: Vec<T> = (0..n).map(|p| b.get(i, p)).collect();
            for j in 0..n {
                let mut s = T::zero();
                for (p, &v) in row.iter().enumerate() {
                    s += v * tri.op(transa, p, j);
                }
                *b.at(i, j) = alpha * s;
            }
        }
    }
}

/// Solve `op(A) X = alpha B` (left) or `X op(A) = alpha B` (right) in place.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsm<T: Scalar>(
    side: u8,
    uplo: u8,
    transa: u8,
    diag: u8,
    m: i32,
    n: i32,
    alpha: T,
    a: *const T,
    lda: i32,
    b: *mut T,
    ldb: i32,
) {
    let transa = flag(transa);
    let (m, n) = (dim(m), dim(n));
    let tri = Tri::new(a, lda, uplo, diag);
    let upper = tri.op_upper(transa);
    let b = Mat::new(b, ldb);
    if flag(side) == b'L' {
        for j in 0..n {
            let mut z: Vec<T> = (0..m).map(|p| alpha * b.get(p, j)).collect();
            tri_solve(m, upper, |r, c| unsafe { tri.op(transa, r, c) }, &mut z);
            for (i, v) in z.into_iter().enumerate() {
                *b.at(i, j) = v;
            }
        }
    } else {
        // x op(A) = b  <=>  op(A)^T x^T = b^T
        for i in 0..m {
            let mut z: Vec<T> = (0..n).map(|p| alpha * b.get(i, p)).collect();
            tri_solve(n, !upper, |r, c| unsafe { tri.op(transa, c, r) }, &mut z);
            for (j, v) in z.into_iter().enumerate() {
                *b.at(i, j) = v;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    #[test]
    fn test_negative_increment_reads_backwards() {
        // Logical vector [3, 2, 1] stored reversed from the lowest address.
        let x = [1.0f64, 2.0, 3.0];
        let w = [1.0f64, 10.0, 100.0];
        let d = unsafe { dotu(3, x.as_ptr(), -1, w.as_ptr(), 1) };
        assert_eq!(d, 3.0 + 20.0 + 100.0);
    }

    #[test]
    fn test_iamax_first_maximum() {
        let x = [1.0f64, -4.0, 4.0, 2.0];
        assert_eq!(unsafe { iamax(4, x.as_ptr(), 1) }, 1);
        assert_eq!(unsafe { iamax::<f64>(0, x.as_ptr(), 1) }, 0);
    }

    #[test]
    fn test_complex_asum_nrm2_dotc() {
        let z = [Complex64::new(3.0, -4.0), Complex64::new(0.0, 1.0)];
        assert_eq!(unsafe { asum(2, z.as_ptr(), 1) }, 8.0);
        assert_relative_eq!(unsafe { nrm2(2, z.as_ptr(), 1) }, 26.0f64.sqrt());
        let d = unsafe { dotc(2, z.as_ptr(), 1, z.as_ptr(), 1) };
        assert_eq!(d, Complex64::new(26.0, 0.0));
    }

    #[test]
    fn test_gemm_col_major() {
        // A = [[1, 2], [3, 4]], B = [[5, 6], [7, 8]] in column-major storage.
        let a = [1.0f64, 3.0, 2.0, 4.0];
        let b = [5.0f64, 7.0, 6.0, 8.0];
        let mut c = [f64::NAN; 4];
        unsafe {
            gemm(
                b'N', b'N', 2, 2, 2, 1.0, a.as_ptr(), 2, b.as_ptr(), 2, 0.0, c.as_mut_ptr(), 2,
            )
        };
        assert_eq!(c, [19.0, 43.0, 22.0, 50.0]);
    }

    #[test]
    fn test_trsv_inverts_trmv() {
        // Upper triangular 3x3, column-major.
        let a = [2.0f64, 0.0, 0.0, 1.0, 3.0, 0.0, -1.0, 0.5, 4.0];
        for trans in [b'N', b'T'] {
            let mut x = [1.0f64, -2.0, 0.5];
            unsafe {
                trmv(b'U', trans, b'N', 3, a.as_ptr(), 3, x.as_mut_ptr(), 1);
                trsv(b'U', trans, b'N', 3, a.as_ptr(), 3, x.as_mut_ptr(), 1);
            }
            assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
            assert_relative_eq!(x[1], -2.0, epsilon = 1e-12);
            assert_relative_eq!(x[2], 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_trsm_right_inverts_trmm() {
        let a = [2.0f64, 1.0, 0.0, 3.0];
        let orig = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut b = orig;
        unsafe {
            trmm(b'R', b'L', b'T', b'N', 3, 2, 1.0, a.as_ptr(), 2, b.as_mut_ptr(), 3);
            trsm(b'R', b'L', b'T', b'N', 3, 2, 1.0, a.as_ptr(), 2, b.as_mut_ptr(), 3);
        }
        for (x, y) in b.iter().zip(orig.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_her_keeps_diagonal_real() {
        let x = [Complex64::new(1.0, 2.0), Complex64::new(0.0, -1.0)];
        let mut a = [Complex64::new(0.0, 0.0); 4];
        unsafe { her(b'L', 2, 1.0, x.as_ptr(), 1, a.as_mut_ptr(), 2) };
        assert_eq!(a[0], Complex64::new(5.0, 0.0));
        // a[1] = A(1, 0) = x1 * conj(x0)
        assert_eq!(a[1], x[1] * x[0].conj());
        // Upper triangle untouched.
        assert_eq!(a[2], Complex64::new(0.0, 0.0));
    }
}
