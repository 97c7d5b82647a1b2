//! Level 2: matrix-vector operations on the trailing dimensions.
//!
//! Matrix operands use their last two dimensions, vector operands their last
//! one; everything before is batch.

use ndblas_kernel::{cxxblas, BlasScalar, Diag, KernelOptions, Order, Transpose, UpLo};
use ndblas_view::{Allocator, Tensor};

use crate::batch::{batch_strides, expect_vector, matrix, shape, square, vector, Plan};
use crate::level1::inc;
use crate::operand::{MatrixInput, MatrixOutput};
use crate::{Linalg, Result};

type SymmetricMv<T> =
    unsafe fn(Order, UpLo, usize, T, *const T, usize, *const T, isize, T, *mut T, isize);
type TriangularMv<T> =
    unsafe fn(Order, UpLo, Transpose, Diag, usize, *const T, usize, *mut T, isize);
type RankOne<T> =
    unsafe fn(Order, usize, usize, T, *const T, isize, *const T, isize, *mut T, usize);
type SymmetricRankTwo<T> =
    unsafe fn(Order, UpLo, usize, T, *const T, isize, *const T, isize, *mut T, usize);

impl<T: BlasScalar, A: Allocator> Linalg<T, A> {
    /// `alpha * op(A) x` as a new tensor.
    pub fn gemv(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
    ) -> Result<Tensor<T, A>> {
        let (batch, m, n) = matrix("gemv", "a", a)?;
        let len = if opts.trans.is_transposed() { n } else { m };
        let mut y = self.alloc_zeros(&shape(batch, &[len]));
        self.gemv_into(opts, alpha, a, x, T::zero(), &mut y)?;
        Ok(y)
    }

    /// `y = alpha * op(A) x + beta * y` with `op` from `opts.trans`.
    pub fn gemv_into(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
        beta: T,
        y: &mut Tensor<T, A>,
    ) -> Result<()> {
        const OP: &str = "gemv";
        let (batch, m, n) = matrix(OP, "a", a)?;
        let (lx, ly) = if opts.trans.is_transposed() { (m, n) } else { (n, m) };
        expect_vector(OP, "x", x, batch, lx)?;
        expect_vector(OP, "y", y, batch, ly)?;

        let am = MatrixInput::new(OP, a, opts.trans, false);
        let plan = Plan::new(
            OP,
            batch,
            vec![am.batch_strides(), batch_strides(x, 1), batch_strides(y, 1)],
        );
        let (xp, incx) = (x.as_ptr(), inc(x));
        let (yp, incy) = (y.as_mut_ptr(), inc(y));
        // SAFETY: offsets address operands of the validated extents.
        plan.for_each(|o| unsafe {
            cxxblas::gemv(
                Order::RowMajor,
                am.trans(),
                m,
                n,
                alpha,
                am.ptr().wrapping_offset(o[0]),
                am.ld(),
                xp.wrapping_offset(o[1]),
                incx,
                beta,
                yp.wrapping_offset(o[2]),
                incy,
            )
        });
        Ok(())
    }

    pub fn gemv_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
        beta: T,
        y: &mut [T],
    ) -> Result<()> {
        let (batch, m, n) = matrix("gemv", "a", a)?;
        let len = if opts.trans.is_transposed() { n } else { m };
        let mut y = self.adopt_slice(y, &shape(batch, &[len]))?;
        self.gemv_into(opts, alpha, a, x, beta, &mut y)
    }

    #[allow(clippy::too_many_arguments)]
    fn symmetric_mv(
        &self,
        op: &'static str,
        f: SymmetricMv<T>,
        uplo: UpLo,
        alpha: T,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
        beta: T,
        y: &Tensor<T, A>,
    ) -> Result<()> {
        let (batch, n) = square(op, "a", a)?;
        expect_vector(op, "x", x, batch, n)?;
        expect_vector(op, "y", y, batch, n)?;

        let am = MatrixInput::new(op, a, Transpose::NoTrans, false);
        let plan = Plan::new(
            op,
            batch,
            vec![am.batch_strides(), batch_strides(x, 1), batch_strides(y, 1)],
        );
        let (xp, incx) = (x.as_ptr(), inc(x));
        let (yp, incy) = (y.as_mut_ptr(), inc(y));
        // SAFETY: offsets address operands of the validated extents.
        plan.for_each(|o| unsafe {
            f(
                Order::RowMajor,
                uplo,
                n,
                alpha,
                am.ptr().wrapping_offset(o[0]),
                am.ld(),
                xp.wrapping_offset(o[1]),
                incx,
                beta,
                yp.wrapping_offset(o[2]),
                incy,
            )
        });
        Ok(())
    }

    /// `alpha * A x` with symmetric `A` stored in `opts.uplo`.
    pub fn symv(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
    ) -> Result<Tensor<T, A>> {
        let (batch, n) = square("symv", "a", a)?;
        let y = self.alloc_zeros(&shape(batch, &[n]));
        self.symmetric_mv("symv", cxxblas::symv::<T>, opts.uplo, alpha, a, x, T::zero(), &y)?;
        Ok(y)
    }

    /// `y = alpha * A x + beta * y` with symmetric `A`.
    pub fn symv_into(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
        beta: T,
        y: &mut Tensor<T, A>,
    ) -> Result<()> {
        self.symmetric_mv("symv", cxxblas::symv::<T>, opts.uplo, alpha, a, x, beta, y)
    }

    pub fn symv_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
        beta: T,
        y: &mut [T],
    ) -> Result<()> {
        let (batch, n) = square("symv", "a", a)?;
        let y = self.adopt_slice(y, &shape(batch, &[n]))?;
        self.symmetric_mv("symv", cxxblas::symv::<T>, opts.uplo, alpha, a, x, beta, &y)
    }

    /// `alpha * A x` with Hermitian `A` stored in `opts.uplo`.
    pub fn hemv(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
    ) -> Result<Tensor<T, A>> {
        let (batch, n) = square("hemv", "a", a)?;
        let y = self.alloc_zeros(&shape(batch, &[n]));
        self.symmetric_mv("hemv", cxxblas::hemv::<T>, opts.uplo, alpha, a, x, T::zero(), &y)?;
        Ok(y)
    }

    pub fn hemv_into(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
        beta: T,
        y: &mut Tensor<T, A>,
    ) -> Result<()> {
        self.symmetric_mv("hemv", cxxblas::hemv::<T>, opts.uplo, alpha, a, x, beta, y)
    }

    pub fn hemv_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
        beta: T,
        y: &mut [T],
    ) -> Result<()> {
        let (batch, n) = square("hemv", "a", a)?;
        let y = self.adopt_slice(y, &shape(batch, &[n]))?;
        self.symmetric_mv("hemv", cxxblas::hemv::<T>, opts.uplo, alpha, a, x, beta, &y)
    }

    fn triangular_mv(
        &self,
        op: &'static str,
        f: TriangularMv<T>,
        opts: KernelOptions,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
    ) -> Result<()> {
        let (batch, n) = square(op, "a", a)?;
        expect_vector(op, "x", x, batch, n)?;

        let am = MatrixInput::new(op, a, opts.trans, false);
        let plan = Plan::new(op, batch, vec![am.batch_strides(), batch_strides(x, 1)]);
        let (xp, incx) = (x.as_mut_ptr(), inc(x));
        // SAFETY: offsets address operands of the validated extents.
        plan.for_each(|o| unsafe {
            f(
                Order::RowMajor,
                opts.uplo,
                am.trans(),
                opts.diag,
                n,
                am.ptr().wrapping_offset(o[0]),
                am.ld(),
                xp.wrapping_offset(o[1]),
                incx,
            )
        });
        Ok(())
    }

    /// `op(A) x` with triangular `A`, as a new tensor.
    pub fn trmv(&self, opts: KernelOptions, a: &Tensor<T, A>, x: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let mut out = self.copy(x)?;
        self.trmv_into(opts, a, &mut out)?;
        Ok(out)
    }

    /// `x = op(A) x` in place.
    pub fn trmv_into(&self, opts: KernelOptions, a: &Tensor<T, A>, x: &mut Tensor<T, A>) -> Result<()> {
        self.triangular_mv("trmv", cxxblas::trmv::<T>, opts, a, x)
    }

    /// Write `op(A) x` to a dense row-major slice shaped like `x`.
    pub fn trmv_slice(
        &self,
        opts: KernelOptions,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
        out: &mut [T],
    ) -> Result<()> {
        let (batch, n) = square("trmv", "a", a)?;
        expect_vector("trmv", "x", x, batch, n)?;
        let mut out = self.adopt_slice(out, x.size())?;
        self.copy_into(x, &mut out)?;
        self.trmv_into(opts, a, &mut out)
    }

    /// Solution of `op(A) z = x` with triangular `A`, as a new tensor.
    pub fn trsv(&self, opts: KernelOptions, a: &Tensor<T, A>, x: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let mut out = self.copy(x)?;
        self.trsv_into(opts, a, &mut out)?;
        Ok(out)
    }

    /// Overwrite `x` with the solution of `op(A) z = x`.
    pub fn trsv_into(&self, opts: KernelOptions, a: &Tensor<T, A>, x: &mut Tensor<T, A>) -> Result<()> {
        self.triangular_mv("trsv", cxxblas::trsv::<T>, opts, a, x)
    }

    pub fn trsv_slice(
        &self,
        opts: KernelOptions,
        a: &Tensor<T, A>,
        x: &Tensor<T, A>,
        out: &mut [T],
    ) -> Result<()> {
        let (batch, n) = square("trsv", "a", a)?;
        expect_vector("trsv", "x", x, batch, n)?;
        let mut out = self.adopt_slice(out, x.size())?;
        self.copy_into(x, &mut out)?;
        self.trsv_into(opts, a, &mut out)
    }

    fn rank_one(
        &self,
        op: &'static str,
        f: RankOne<T>,
        alpha: T,
        x: &Tensor<T, A>,
        y: &Tensor<T, A>,
        a: &Tensor<T, A>,
    ) -> Result<()> {
        let (batch, m, n) = matrix(op, "a", a)?;
        expect_vector(op, "x", x, batch, m)?;
        expect_vector(op, "y", y, batch, n)?;

        let out = MatrixOutput::new(op, a);
        let plan = Plan::new(
            op,
            batch,
            vec![batch_strides(x, 1), batch_strides(y, 1), out.batch_strides()],
        );
        let (xp, incx) = (x.as_ptr(), inc(x));
        let (yp, incy) = (y.as_ptr(), inc(y));
        // SAFETY: offsets address operands of the validated extents.
        plan.for_each(|o| unsafe {
            f(
                Order::RowMajor,
                m,
                n,
                alpha,
                xp.wrapping_offset(o[0]),
                incx,
                yp.wrapping_offset(o[1]),
                incy,
                out.ptr().wrapping_offset(o[2]),
                out.ld(),
            )
        });
        out.finish()
    }

    fn outer_shape(&self, op: &'static str, x: &Tensor<T, A>, y: &Tensor<T, A>) -> Result<Vec<usize>> {
        let (batch, m) = vector(op, "x", x)?;
        let (_, n) = vector(op, "y", y)?;
        Ok(shape(batch, &[m, n]))
    }

    /// `alpha * x y^T` as a new tensor.
    pub fn ger(&self, alpha: T, x: &Tensor<T, A>, y: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let a = self.alloc_zeros(&self.outer_shape("ger", x, y)?);
        self.rank_one("ger", cxxblas::ger::<T>, alpha, x, y, &a)?;
        Ok(a)
    }

    /// `A += alpha * x y^T`.
    pub fn ger_into(&self, alpha: T, x: &Tensor<T, A>, y: &Tensor<T, A>, a: &mut Tensor<T, A>) -> Result<()> {
        self.rank_one("ger", cxxblas::ger::<T>, alpha, x, y, a)
    }

    pub fn ger_slice(&self, alpha: T, x: &Tensor<T, A>, y: &Tensor<T, A>, a: &mut [T]) -> Result<()> {
        let a = self.adopt_slice(a, &self.outer_shape("ger", x, y)?)?;
        self.rank_one("ger", cxxblas::ger::<T>, alpha, x, y, &a)
    }

    /// `alpha * x y^H` as a new tensor.
    pub fn gerc(&self, alpha: T, x: &Tensor<T, A>, y: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let a = self.alloc_zeros(&self.outer_shape("gerc", x, y)?);
        self.rank_one("gerc", cxxblas::gerc::<T>, alpha, x, y, &a)?;
        Ok(a)
    }

    /// `A += alpha * x y^H`.
    pub fn gerc_into(&self, alpha: T, x: &Tensor<T, A>, y: &Tensor<T, A>, a: &mut Tensor<T, A>) -> Result<()> {
        self.rank_one("gerc", cxxblas::gerc::<T>, alpha, x, y, a)
    }

    pub fn gerc_slice(&self, alpha: T, x: &Tensor<T, A>, y: &Tensor<T, A>, a: &mut [T]) -> Result<()> {
        let a = self.adopt_slice(a, &self.outer_shape("gerc", x, y)?)?;
        self.rank_one("gerc", cxxblas::gerc::<T>, alpha, x, y, &a)
    }

    fn square_shape(&self, op: &'static str, x: &Tensor<T, A>) -> Result<Vec<usize>> {
        let (batch, n) = vector(op, "x", x)?;
        Ok(shape(batch, &[n, n]))
    }

    /// Symmetric and Hermitian rank-1 updates share everything but the
    /// kernel and the scalar type; `call` issues one kernel call.
    fn symmetric_update(
        &self,
        op: &'static str,
        x: &Tensor<T, A>,
        y: Option<&Tensor<T, A>>,
        a: &Tensor<T, A>,
        mut call: impl FnMut(usize, *const T, isize, *const T, isize, *mut T, usize),
    ) -> Result<()> {
        let (batch, n) = square(op, "a", a)?;
        expect_vector(op, "x", x, batch, n)?;
        let y = y.unwrap_or(x);
        expect_vector(op, "y", y, batch, n)?;

        let out = MatrixOutput::new(op, a);
        let plan = Plan::new(
            op,
            batch,
            vec![batch_strides(x, 1), batch_strides(y, 1), out.batch_strides()],
        );
        let (xp, incx) = (x.as_ptr(), inc(x));
        let (yp, incy) = (y.as_ptr(), inc(y));
        plan.for_each(|o| {
            call(
                n,
                xp.wrapping_offset(o[0]),
                incx,
                yp.wrapping_offset(o[1]),
                incy,
                out.ptr().wrapping_offset(o[2]),
                out.ld(),
            )
        });
        out.finish()
    }

    /// `alpha * x x^T` in the `opts.uplo` triangle, as a new tensor.
    pub fn syr(&self, opts: KernelOptions, alpha: T, x: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let mut a = self.alloc_zeros(&self.square_shape("syr", x)?);
        self.syr_into(opts, alpha, x, &mut a)?;
        Ok(a)
    }

    /// `A += alpha * x x^T` on the `opts.uplo` triangle.
    pub fn syr_into(&self, opts: KernelOptions, alpha: T, x: &Tensor<T, A>, a: &mut Tensor<T, A>) -> Result<()> {
        // SAFETY: the dispatcher passes operands of the validated extents.
        self.symmetric_update("syr", x, None, a, |n, x, incx, _, _, a, lda| unsafe {
            cxxblas::syr(Order::RowMajor, opts.uplo, n, alpha, x, incx, a, lda)
        })
    }

    pub fn syr_slice(&self, opts: KernelOptions, alpha: T, x: &Tensor<T, A>, a: &mut [T]) -> Result<()> {
        let mut a = self.adopt_slice(a, &self.square_shape("syr", x)?)?;
        self.syr_into(opts, alpha, x, &mut a)
    }

    /// `alpha * x x^H` in the `opts.uplo` triangle, as a new tensor.
    pub fn her(&self, opts: KernelOptions, alpha: T::Real, x: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let mut a = self.alloc_zeros(&self.square_shape("her", x)?);
        self.her_into(opts, alpha, x, &mut a)?;
        Ok(a)
    }

    /// `A += alpha * x x^H` on the `opts.uplo` triangle.
    pub fn her_into(
        &self,
        opts: KernelOptions,
        alpha: T::Real,
        x: &Tensor<T, A>,
        a: &mut Tensor<T, A>,
    ) -> Result<()> {
        // SAFETY: the dispatcher passes operands of the validated extents.
        self.symmetric_update("her", x, None, a, |n, x, incx, _, _, a, lda| unsafe {
            cxxblas::her(Order::RowMajor, opts.uplo, n, alpha, x, incx, a, lda)
        })
    }

    pub fn her_slice(&self, opts: KernelOptions, alpha: T::Real, x: &Tensor<T, A>, a: &mut [T]) -> Result<()> {
        let mut a = self.adopt_slice(a, &self.square_shape("her", x)?)?;
        self.her_into(opts, alpha, x, &mut a)
    }

    #[allow(clippy::too_many_arguments)]
    fn rank_two(
        &self,
        op: &'static str,
        f: SymmetricRankTwo<T>,
        uplo: UpLo,
        alpha: T,
        x: &Tensor<T, A>,
        y: &Tensor<T, A>,
        a: &Tensor<T, A>,
    ) -> Result<()> {
        // SAFETY: the dispatcher passes operands of the validated extents.
        self.symmetric_update(op, x, Some(y), a, |n, x, incx, y, incy, a, lda| unsafe {
            f(Order::RowMajor, uplo, n, alpha, x, incx, y, incy, a, lda)
        })
    }

    /// `alpha * (x y^T + y x^T)` in the `opts.uplo` triangle, as a new tensor.
    pub fn syr2(&self, opts: KernelOptions, alpha: T, x: &Tensor<T, A>, y: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let a = self.alloc_zeros(&self.square_shape("syr2", x)?);
        self.rank_two("syr2", cxxblas::syr2::<T>, opts.uplo, alpha, x, y, &a)?;
        Ok(a)
    }

    pub fn syr2_into(
        &self,
        opts: KernelOptions,
        alpha: T,
        x: &Tensor<T, A>,
        y: &Tensor<T, A>,
        a: &mut Tensor<T, A>,
    ) -> Result<()> {
        self.rank_two("syr2", cxxblas::syr2::<T>, opts.uplo, alpha, x, y, a)
    }

    pub fn syr2_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        x: &Tensor<T, A>,
        y: &Tensor<T, A>,
        a: &mut [T],
    ) -> Result<()> {
        let a = self.adopt_slice(a, &self.square_shape("syr2", x)?)?;
        self.rank_two("syr2", cxxblas::syr2::<T>, opts.uplo, alpha, x, y, &a)
    }

    /// `alpha x y^H + conj(alpha) y x^H` in the `opts.uplo` triangle, as a
    /// new tensor.
    pub fn her2(&self, opts: KernelOptions, alpha: T, x: &Tensor<T, A>, y: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let a = self.alloc_zeros(&self.square_shape("her2", x)?);
        self.rank_two("her2", cxxblas::her2::<T>, opts.uplo, alpha, x, y, &a)?;
        Ok(a)
    }

    pub fn her2_into(
        &self,
        opts: KernelOptions,
        alpha: T,
        x: &Tensor<T, A>,
        y: &Tensor<T, A>,
        a: &mut Tensor<T, A>,
    ) -> Result<()> {
        self.rank_two("her2", cxxblas::her2::<T>, opts.uplo, alpha, x, y, a)
    }

    pub fn her2_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        x: &Tensor<T, A>,
        y: &Tensor<T, A>,
        a: &mut [T],
    ) -> Result<()> {
        let a = self.adopt_slice(a, &self.square_shape("her2", x)?)?;
        self.rank_two("her2", cxxblas::her2::<T>, opts.uplo, alpha, x, y, &a)
    }
}
