//! Matrix-vector routines.
//!
//! Row-major operands are passed to the kernel as their column-major
//! transpose. Row-major `ConjTrans` and the Hermitian routines conjugate a
//! scratch copy of the input vector (and the output in place) instead.

use super::{conj_copy, conj_in_place, inc32, int, lowest, lowest_mut};
use crate::flags::{Diag, Order, Transpose, UpLo};
use crate::BlasScalar;

/// `ConjTrans` is `Trans` for real kinds.
#[inline]
pub(crate) fn effective_trans<T: BlasScalar>(trans: Transpose) -> Transpose {
    if !T::IS_COMPLEX && trans == Transpose::ConjTrans {
        Transpose::Trans
    } else {
        trans
    }
}

/// `y = alpha op(A) x + beta y` with `A` of shape `m x n`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemv<T: BlasScalar>(
    order: Order,
    trans: Transpose,
    m: usize,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    x: *const T,
    incx: isize,
    beta: T,
    y: *mut T,
    incy: isize,
) {
    let trans = effective_trans::<T>(trans);
    let (len_x, len_y) = if trans.is_transposed() { (m, n) } else { (n, m) };
    let yl = lowest_mut(y, len_y, incy);
    match (order, trans) {
        (Order::ColMajor, _) => T::gemv(
            trans.to_char(),
            int(m),
            int(n),
            alpha,
            a,
            int(lda),
            lowest(x, len_x, incx),
            inc32(incx),
            beta,
            yl,
            inc32(incy),
        ),
        (Order::RowMajor, Transpose::ConjTrans) => {
            log::debug!("gemv: emulating row-major ConjTrans with a scratch conjugate");
            let xs = conj_copy(len_x, x, incx);
            conj_in_place(len_y, y, incy);
            T::gemv(
                b'N',
                int(n),
                int(m),
                alpha.conj(),
                a,
                int(lda),
                xs.as_ptr(),
                1,
                beta.conj(),
                yl,
                inc32(incy),
            );
            conj_in_place(len_y, y, incy);
        }
        (Order::RowMajor, _) => T::gemv(
            trans.flip().to_char(),
            int(n),
            int(m),
            alpha,
            a,
            int(lda),
            lowest(x, len_x, incx),
            inc32(incx),
            beta,
            yl,
            inc32(incy),
        ),
    }
}

/// `A += alpha x y^T`; alias of [`geru`].
#[allow(clippy::too_many_arguments)]
pub unsafe fn ger<T: BlasScalar>(
    order: Order,
    m: usize,
    n: usize,
    alpha: T,
    x: *const T,
    incx: isize,
    y: *const T,
    incy: isize,
    a: *mut T,
    lda: usize,
) {
    geru(order, m, n, alpha, x, incx, y, incy, a, lda)
}

/// `A += alpha x y^T` with `A` of shape `m x n`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn geru<T: BlasScalar>(
    order: Order,
    m: usize,
    n: usize,
    alpha: T,
    x: *const T,
    incx: isize,
    y: *const T,
    incy: isize,
    a: *mut T,
    lda: usize,
) {
    let xl = lowest(x, m, incx);
    let yl = lowest(y, n, incy);
    match order {
        Order::ColMajor => T::geru(
            int(m),
            int(n),
            alpha,
            xl,
            inc32(incx),
            yl,
            inc32(incy),
            a,
            int(lda),
        ),
        Order::RowMajor => T::geru(
            int(n),
            int(m),
            alpha,
            yl,
            inc32(incy),
            xl,
            inc32(incx),
            a,
            int(lda),
        ),
    }
}

/// `A += alpha x y^H` with `A` of shape `m x n`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gerc<T: BlasScalar>(
    order: Order,
    m: usize,
    n: usize,
    alpha: T,
    x: *const T,
    incx: isize,
    y: *const T,
    incy: isize,
    a: *mut T,
    lda: usize,
) {
    match order {
        Order::ColMajor => T::gerc(
            int(m),
            int(n),
            alpha,
            lowest(x, m, incx),
            inc32(incx),
            lowest(y, n, incy),
            inc32(incy),
            a,
            int(lda),
        ),
        Order::RowMajor if !T::IS_COMPLEX => geru(order, m, n, alpha, x, incx, y, incy, a, lda),
        Order::RowMajor => {
            log::debug!("gerc: emulating row-major conjugation with a scratch conjugate");
            let ys = conj_copy(n, y, incy);
            T::geru(
                int(n),
                int(m),
                alpha,
                ys.as_ptr(),
                1,
                lowest(x, m, incx),
                inc32(incx),
                a,
                int(lda),
            )
        }
    }
}

/// `y = alpha A x + beta y` with symmetric `A`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn symv<T: BlasScalar>(
    order: Order,
    uplo: UpLo,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    x: *const T,
    incx: isize,
    beta: T,
    y: *mut T,
    incy: isize,
) {
    let uplo = match order {
        Order::ColMajor => uplo,
        Order::RowMajor => uplo.flip(),
    };
    T::symv(
        uplo.to_char(),
        int(n),
        alpha,
        a,
        int(lda),
        lowest(x, n, incx),
        inc32(incx),
        beta,
        lowest_mut(y, n, incy),
        inc32(incy),
    )
}

/// `y = alpha A x + beta y` with Hermitian `A`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn hemv<T: BlasScalar>(
    order: Order,
    uplo: UpLo,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    x: *const T,
    incx: isize,
    beta: T,
    y: *mut T,
    incy: isize,
) {
    let yl = lowest_mut(y, n, incy);
    if order == Order::ColMajor || !T::IS_COMPLEX {
        let uplo = if order == Order::ColMajor {
            uplo
        } else {
            uplo.flip()
        };
        return T::hemv(
            uplo.to_char(),
            int(n),
            alpha,
            a,
            int(lda),
            lowest(x, n, incx),
            inc32(incx),
            beta,
            yl,
            inc32(incy),
        );
    }
    // The transposed storage of a Hermitian matrix is its conjugate.
    log::debug!("hemv: emulating row-major conjugation with a scratch conjugate");
    let xs = conj_copy(n, x, incx);
    conj_in_place(n, y, incy);
    T::hemv(
        uplo.flip().to_char(),
        int(n),
        alpha.conj(),
        a,
        int(lda),
        xs.as_ptr(),
        1,
        beta.conj(),
        yl,
        inc32(incy),
    );
    conj_in_place(n, y, incy);
}

#[derive(Clone, Copy)]
enum Triangular {
    Multiply,
    Solve,
}

#[allow(clippy::too_many_arguments)]
unsafe fn triangular<T: BlasScalar>(
    kind: Triangular,
    order: Order,
    uplo: UpLo,
    trans: Transpose,
    diag: Diag,
    n: usize,
    a: *const T,
    lda: usize,
    x: *mut T,
    incx: isize,
) {
    let call = |uplo: UpLo, trans: Transpose| {
        let xl = lowest_mut(x, n, incx);
        let (u, t, d) = (uplo.to_char(), trans.to_char(), diag.to_char());
        match kind {
            Triangular::Multiply => T::trmv(u, t, d, int(n), a, int(lda), xl, inc32(incx)),
            Triangular::Solve => T::trsv(u, t, d, int(n), a, int(lda), xl, inc32(incx)),
        }
    };
    let trans = effective_trans::<T>(trans);
    match (order, trans) {
        (Order::ColMajor, _) => call(uplo, trans),
        (Order::RowMajor, Transpose::ConjTrans) => {
            log::debug!("trmv/trsv: emulating row-major ConjTrans with a scratch conjugate");
            conj_in_place(n, x, incx);
            call(uplo.flip(), Transpose::NoTrans);
            conj_in_place(n, x, incx);
        }
        (Order::RowMajor, _) => call(uplo.flip(), trans.flip()),
    }
}

/// `x = op(A) x` with triangular `A`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmv<T: BlasScalar>(
    order: Order,
    uplo: UpLo,
    trans: Transpose,
    diag: Diag,
    n: usize,
    a: *const T,
    lda: usize,
    x: *mut T,
    incx: isize,
) {
    triangular(Triangular::Multiply, order, uplo, trans, diag, n, a, lda, x, incx)
}

/// Solve `op(A) z = x` in place with triangular `A`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsv<T: BlasScalar>(
    order: Order,
    uplo: UpLo,
    trans: Transpose,
    diag: Diag,
    n: usize,
    a: *const T,
    lda: usize,
    x: *mut T,
    incx: isize,
) {
    triangular(Triangular::Solve, order, uplo, trans, diag, n, a, lda, x, incx)
}

fn storage_uplo(order: Order, uplo: UpLo) -> UpLo {
    match order {
        Order::ColMajor => uplo,
        Order::RowMajor => uplo.flip(),
    }
}

/// `A += alpha x x^T` on the stored triangle.
#[allow(clippy::too_many_arguments)]
pub unsafe fn syr<T: BlasScalar>(
    order: Order,
    uplo: UpLo,
    n: usize,
    alpha: T,
    x: *const T,
    incx: isize,
    a: *mut T,
    lda: usize,
) {
    T::syr(
        storage_uplo(order, uplo).to_char(),
        int(n),
        alpha,
        lowest(x, n, incx),
        inc32(incx),
        a,
        int(lda),
    )
}

/// `A += alpha x x^H` on the stored triangle, with real `alpha`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn her<T: BlasScalar>(
    order: Order,
    uplo: UpLo,
    n: usize,
    alpha: T::Real,
    x: *const T,
    incx: isize,
    a: *mut T,
    lda: usize,
) {
    let u = storage_uplo(order, uplo).to_char();
    if order == Order::RowMajor && T::IS_COMPLEX {
        log::debug!("her: emulating row-major conjugation with a scratch conjugate");
        let xs = conj_copy(n, x, incx);
        T::her(u, int(n), alpha, xs.as_ptr(), 1, a, int(lda))
    } else {
        T::her(u, int(n), alpha, lowest(x, n, incx), inc32(incx), a, int(lda))
    }
}

/// `A += alpha (x y^T + y x^T)` on the stored triangle.
#[allow(clippy::too_many_arguments)]
pub unsafe fn syr2<T: BlasScalar>(
    order: Order,
    uplo: UpLo,
    n: usize,
    alpha: T,
    x: *const T,
    incx: isize,
    y: *const T,
    incy: isize,
    a: *mut T,
    lda: usize,
) {
    T::syr2(
        storage_uplo(order, uplo).to_char(),
        int(n),
        alpha,
        lowest(x, n, incx),
        inc32(incx),
        lowest(y, n, incy),
        inc32(incy),
        a,
        int(lda),
    )
}

/// `A += alpha x y^H + conj(alpha) y x^H` on the stored triangle.
#[allow(clippy::too_many_arguments)]
pub unsafe fn her2<T: BlasScalar>(
    order: Order,
    uplo: UpLo,
    n: usize,
    alpha: T,
    x: *const T,
    incx: isize,
    y: *const T,
    incy: isize,
    a: *mut T,
    lda: usize,
) {
    let u = storage_uplo(order, uplo).to_char();
    if order == Order::RowMajor && T::IS_COMPLEX {
        // A^T += alpha conj(y) conj(x)^H + conj(alpha) conj(x) conj(y)^H
        log::debug!("her2: emulating row-major conjugation with a scratch conjugate");
        let xs = conj_copy(n, x, incx);
        let ys = conj_copy(n, y, incy);
        T::her2(u, int(n), alpha, ys.as_ptr(), 1, xs.as_ptr(), 1, a, int(lda))
    } else {
        T::her2(
            u,
            int(n),
            alpha,
            lowest(x, n, incx),
            inc32(incx),
            lowest(y, n, incy),
            inc32(incy),
            a,
            int(lda),
        )
    }
}
