//! Level 3: matrix-matrix operations on the trailing two dimensions.

use ndblas_kernel::{cxxblas, BlasScalar, Diag, KernelOptions, Order, Side, Transpose, UpLo};
use ndblas_view::{Allocator, Tensor};
use num_traits::Zero;

use crate::batch::{expect_matrix, matrix, same_batch, same_extent, shape, square, Plan};
use crate::operand::{MatrixInput, MatrixOutput};
use crate::{Linalg, Result};

type SymmetricMm<T> =
    unsafe fn(Order, Side, UpLo, usize, usize, T, *const T, usize, *const T, usize, T, *mut T, usize);
type TriangularMm<T> =
    unsafe fn(Order, Side, UpLo, Transpose, Diag, usize, usize, T, *const T, usize, *mut T, usize);

/// `(rows, cols)` of `op(X)` for an `r x c` matrix `X`.
#[inline]
fn op_shape(trans: Transpose, r: usize, c: usize) -> (usize, usize) {
    if trans.is_transposed() {
        (c, r)
    } else {
        (r, c)
    }
}

/// Batch and `(n, k)` of a rank-k update whose `A` is `n x k` untransposed.
fn rank_k_dims<'a, T, A: Allocator>(
    op: &'static str,
    trans: Transpose,
    a: &'a Tensor<T, A>,
) -> Result<(&'a [usize], usize, usize)> {
    let (batch, r, c) = matrix(op, "a", a)?;
    let (n, k) = op_shape(trans, r, c);
    Ok((batch, n, k))
}

impl<T: BlasScalar, A: Allocator> Linalg<T, A> {
    fn gemm_dims<'a>(
        &self,
        opts: KernelOptions,
        a: &'a Tensor<T, A>,
        b: &Tensor<T, A>,
    ) -> Result<(&'a [usize], usize, usize, usize)> {
        let (batch, ra, ca) = matrix("gemm", "a", a)?;
        let (bb, rb, cb) = matrix("gemm", "b", b)?;
        same_batch("gemm", "b", batch, bb)?;
        let (m, k) = op_shape(opts.trans, ra, ca);
        let (k2, n) = op_shape(opts.trans_b, rb, cb);
        same_extent("gemm", "b", k, k2)?;
        Ok((batch, m, n, k))
    }

    /// `alpha * op(A) op(B)` as a new tensor.
    pub fn gemm(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
    ) -> Result<Tensor<T, A>> {
        let (batch, m, n, _) = self.gemm_dims(opts, a, b)?;
        let mut c = self.alloc_zeros(&shape(batch, &[m, n]));
        self.gemm_into(opts, alpha, a, b, T::zero(), &mut c)?;
        Ok(c)
    }

    /// `C = alpha * op(A) op(B) + beta * C` with `op` from `opts.trans` and
    /// `opts.trans_b`.
    pub fn gemm_into(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        beta: T,
        c: &mut Tensor<T, A>,
    ) -> Result<()> {
        const OP: &str = "gemm";
        let (batch, m, n, k) = self.gemm_dims(opts, a, b)?;
        expect_matrix(OP, "c", c, batch, m, n)?;

        let am = MatrixInput::new(OP, a, opts.trans, true);
        let bm = MatrixInput::new(OP, b, opts.trans_b, true);
        let cm = MatrixOutput::new(OP, c);
        let plan = Plan::new(
            OP,
            batch,
            vec![am.batch_strides(), bm.batch_strides(), cm.batch_strides()],
        );
        // SAFETY: offsets address matrices of the validated extents.
        plan.for_each(|o| unsafe {
            cxxblas::gemm(
                Order::RowMajor,
                am.trans(),
                bm.trans(),
                m,
                n,
                k,
                alpha,
                am.ptr().wrapping_offset(o[0]),
                am.ld(),
                bm.ptr().wrapping_offset(o[1]),
                bm.ld(),
                beta,
                cm.ptr().wrapping_offset(o[2]),
                cm.ld(),
            )
        });
        cm.finish()
    }

    pub fn gemm_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        beta: T,
        c: &mut [T],
    ) -> Result<()> {
        let (batch, m, n, _) = self.gemm_dims(opts, a, b)?;
        let mut c = self.adopt_slice(c, &shape(batch, &[m, n]))?;
        self.gemm_into(opts, alpha, a, b, beta, &mut c)
    }

    #[allow(clippy::too_many_arguments)]
    fn symmetric_mm(
        &self,
        op: &'static str,
        f: SymmetricMm<T>,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        beta: T,
        c: &Tensor<T, A>,
    ) -> Result<()> {
        let (batch, m, n) = matrix(op, "b", b)?;
        let (ab, s) = square(op, "a", a)?;
        same_batch(op, "a", batch, ab)?;
        same_extent(op, "a", if opts.side == Side::Left { m } else { n }, s)?;
        expect_matrix(op, "c", c, batch, m, n)?;

        let am = MatrixInput::new(op, a, Transpose::NoTrans, false);
        let bm = MatrixInput::new(op, b, Transpose::NoTrans, false);
        let cm = MatrixOutput::new(op, c);
        let plan = Plan::new(
            op,
            batch,
            vec![am.batch_strides(), bm.batch_strides(), cm.batch_strides()],
        );
        // SAFETY: offsets address matrices of the validated extents.
        plan.for_each(|o| unsafe {
            f(
                Order::RowMajor,
                opts.side,
                opts.uplo,
                m,
                n,
                alpha,
                am.ptr().wrapping_offset(o[0]),
                am.ld(),
                bm.ptr().wrapping_offset(o[1]),
                bm.ld(),
                beta,
                cm.ptr().wrapping_offset(o[2]),
                cm.ld(),
            )
        });
        cm.finish()
    }

    fn like_b(&self, op: &'static str, b: &Tensor<T, A>) -> Result<Vec<usize>> {
        let (batch, m, n) = matrix(op, "b", b)?;
        Ok(shape(batch, &[m, n]))
    }

    /// `alpha * A B` (left) or `alpha * B A` (right) with symmetric `A`, as a
    /// new tensor.
    pub fn symm(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
    ) -> Result<Tensor<T, A>> {
        let c = self.alloc_zeros(&self.like_b("symm", b)?);
        self.symmetric_mm("symm", cxxblas::symm::<T>, opts, alpha, a, b, T::zero(), &c)?;
        Ok(c)
    }

    pub fn symm_into(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        beta: T,
        c: &mut Tensor<T, A>,
    ) -> Result<()> {
        self.symmetric_mm("symm", cxxblas::symm::<T>, opts, alpha, a, b, beta, c)
    }

    pub fn symm_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        beta: T,
        c: &mut [T],
    ) -> Result<()> {
        let c = self.adopt_slice(c, &self.like_b("symm", b)?)?;
        self.symmetric_mm("symm", cxxblas::symm::<T>, opts, alpha, a, b, beta, &c)
    }

    /// As [`symm`](Self::symm) with Hermitian `A`.
    pub fn hemm(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
    ) -> Result<Tensor<T, A>> {
        let c = self.alloc_zeros(&self.like_b("hemm", b)?);
        self.symmetric_mm("hemm", cxxblas::hemm::<T>, opts, alpha, a, b, T::zero(), &c)?;
        Ok(c)
    }

    pub fn hemm_into(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        beta: T,
        c: &mut Tensor<T, A>,
    ) -> Result<()> {
        self.symmetric_mm("hemm", cxxblas::hemm::<T>, opts, alpha, a, b, beta, c)
    }

    pub fn hemm_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        beta: T,
        c: &mut [T],
    ) -> Result<()> {
        let c = self.adopt_slice(c, &self.like_b("hemm", b)?)?;
        self.symmetric_mm("hemm", cxxblas::hemm::<T>, opts, alpha, a, b, beta, &c)
    }

    /// Shared driver of the rank-k and rank-2k updates. `call` receives
    /// `(n, k, a, lda, b, ldb, c, ldc)`; `b` repeats `a` for rank-k.
    fn rank_k(
        &self,
        op: &'static str,
        trans: Transpose,
        a: &Tensor<T, A>,
        b: Option<&Tensor<T, A>>,
        c: &Tensor<T, A>,
        mut call: impl FnMut(usize, usize, *const T, usize, *const T, usize, *mut T, usize),
    ) -> Result<()> {
        let (batch, n, k) = rank_k_dims(op, trans, a)?;
        let b = b.unwrap_or(a);
        let (ra, ca) = op_shape(trans, n, k);
        expect_matrix(op, "b", b, batch, ra, ca)?;
        let (cb, cn) = square(op, "c", c)?;
        same_batch(op, "c", batch, cb)?;
        same_extent(op, "c", n, cn)?;

        let am = MatrixInput::new(op, a, trans, false);
        let bm = MatrixInput::new(op, b, trans, false);
        let cm = MatrixOutput::new(op, c);
        let plan = Plan::new(
            op,
            batch,
            vec![am.batch_strides(), bm.batch_strides(), cm.batch_strides()],
        );
        plan.for_each(|o| {
            call(
                n,
                k,
                am.ptr().wrapping_offset(o[0]),
                am.ld(),
                bm.ptr().wrapping_offset(o[1]),
                bm.ld(),
                cm.ptr().wrapping_offset(o[2]),
                cm.ld(),
            )
        });
        cm.finish()
    }

    fn rank_k_shape(&self, op: &'static str, trans: Transpose, a: &Tensor<T, A>) -> Result<Vec<usize>> {
        let (batch, n, _) = rank_k_dims(op, trans, a)?;
        Ok(shape(batch, &[n, n]))
    }

    /// `alpha * op(A) op(A)^T` in the `opts.uplo` triangle, as a new tensor.
    pub fn syrk(&self, opts: KernelOptions, alpha: T, a: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let mut c = self.alloc_zeros(&self.rank_k_shape("syrk", opts.trans, a)?);
        self.syrk_into(opts, alpha, a, T::zero(), &mut c)?;
        Ok(c)
    }

    /// `C = alpha * op(A) op(A)^T + beta * C` on the `opts.uplo` triangle.
    /// `op(A)` is `n x k`.
    pub fn syrk_into(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        beta: T,
        c: &mut Tensor<T, A>,
    ) -> Result<()> {
        // SAFETY: the driver passes matrices of the validated extents.
        self.rank_k("syrk", opts.trans, a, None, c, |n, k, a, lda, _, _, c, ldc| unsafe {
            cxxblas::syrk(Order::RowMajor, opts.uplo, opts.trans, n, k, alpha, a, lda, beta, c, ldc)
        })
    }

    pub fn syrk_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        beta: T,
        c: &mut [T],
    ) -> Result<()> {
        let mut c = self.adopt_slice(c, &self.rank_k_shape("syrk", opts.trans, a)?)?;
        self.syrk_into(opts, alpha, a, beta, &mut c)
    }

    /// `alpha * op(A) op(A)^H` in the `opts.uplo` triangle, as a new tensor.
    pub fn herk(&self, opts: KernelOptions, alpha: T::Real, a: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let mut c = self.alloc_zeros(&self.rank_k_shape("herk", opts.trans, a)?);
        self.herk_into(opts, alpha, a, T::Real::zero(), &mut c)?;
        Ok(c)
    }

    /// `C = alpha * op(A) op(A)^H + beta * C` on the `opts.uplo` triangle.
    pub fn herk_into(
        &self,
        opts: KernelOptions,
        alpha: T::Real,
        a: &Tensor<T, A>,
        beta: T::Real,
        c: &mut Tensor<T, A>,
    ) -> Result<()> {
        // SAFETY: the driver passes matrices of the validated extents.
        self.rank_k("herk", opts.trans, a, None, c, |n, k, a, lda, _, _, c, ldc| unsafe {
            cxxblas::herk(Order::RowMajor, opts.uplo, opts.trans, n, k, alpha, a, lda, beta, c, ldc)
        })
    }

    pub fn herk_slice(
        &self,
        opts: KernelOptions,
        alpha: T::Real,
        a: &Tensor<T, A>,
        beta: T::Real,
        c: &mut [T],
    ) -> Result<()> {
        let mut c = self.adopt_slice(c, &self.rank_k_shape("herk", opts.trans, a)?)?;
        self.herk_into(opts, alpha, a, beta, &mut c)
    }

    /// `alpha * (op(A) op(B)^T + op(B) op(A)^T)` in the `opts.uplo` triangle,
    /// as a new tensor.
    pub fn syr2k(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
    ) -> Result<Tensor<T, A>> {
        let mut c = self.alloc_zeros(&self.rank_k_shape("syr2k", opts.trans, a)?);
        self.syr2k_into(opts, alpha, a, b, T::zero(), &mut c)?;
        Ok(c)
    }

    pub fn syr2k_into(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        beta: T,
        c: &mut Tensor<T, A>,
    ) -> Result<()> {
        // SAFETY: the driver passes matrices of the validated extents.
        self.rank_k("syr2k", opts.trans, a, Some(b), c, |n, k, a, lda, b, ldb, c, ldc| unsafe {
            cxxblas::syr2k(
                Order::RowMajor,
                opts.uplo,
                opts.trans,
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
        })
    }

    pub fn syr2k_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        beta: T,
        c: &mut [T],
    ) -> Result<()> {
        let mut c = self.adopt_slice(c, &self.rank_k_shape("syr2k", opts.trans, a)?)?;
        self.syr2k_into(opts, alpha, a, b, beta, &mut c)
    }

    /// `alpha op(A) op(B)^H + conj(alpha) op(B) op(A)^H` in the `opts.uplo`
    /// triangle, as a new tensor.
    pub fn her2k(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
    ) -> Result<Tensor<T, A>> {
        let mut c = self.alloc_zeros(&self.rank_k_shape("her2k", opts.trans, a)?);
        self.her2k_into(opts, alpha, a, b, T::Real::zero(), &mut c)?;
        Ok(c)
    }

    pub fn her2k_into(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        beta: T::Real,
        c: &mut Tensor<T, A>,
    ) -> Result<()> {
        // SAFETY: the driver passes matrices of the validated extents.
        self.rank_k("her2k", opts.trans, a, Some(b), c, |n, k, a, lda, b, ldb, c, ldc| unsafe {
            cxxblas::her2k(
                Order::RowMajor,
                opts.uplo,
                opts.trans,
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
        })
    }

    pub fn her2k_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        beta: T::Real,
        c: &mut [T],
    ) -> Result<()> {
        let mut c = self.adopt_slice(c, &self.rank_k_shape("her2k", opts.trans, a)?)?;
        self.her2k_into(opts, alpha, a, b, beta, &mut c)
    }

    /// Validate a triangular `a` against `b`; returns `b`'s batch, rows and cols.
    fn triangular_dims<'b>(
        &self,
        op: &'static str,
        opts: KernelOptions,
        a: &Tensor<T, A>,
        b: &'b Tensor<T, A>,
    ) -> Result<(&'b [usize], usize, usize)> {
        let (batch, m, n) = matrix(op, "b", b)?;
        let (ab, s) = square(op, "a", a)?;
        same_batch(op, "a", batch, ab)?;
        same_extent(op, "a", if opts.side == Side::Left { m } else { n }, s)?;
        Ok((batch, m, n))
    }

    fn triangular_mm(
        &self,
        op: &'static str,
        f: TriangularMm<T>,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
    ) -> Result<()> {
        let (batch, m, n) = self.triangular_dims(op, opts, a, b)?;

        let am = MatrixInput::new(op, a, opts.trans, false);
        let bm = MatrixOutput::new(op, b);
        let plan = Plan::new(op, batch, vec![am.batch_strides(), bm.batch_strides()]);
        // SAFETY: offsets address matrices of the validated extents.
        plan.for_each(|o| unsafe {
            f(
                Order::RowMajor,
                opts.side,
                opts.uplo,
                am.trans(),
                opts.diag,
                m,
                n,
                alpha,
                am.ptr().wrapping_offset(o[0]),
                am.ld(),
                bm.ptr().wrapping_offset(o[1]),
                bm.ld(),
            )
        });
        bm.finish()
    }

    /// `alpha * op(A) B` (left) or `alpha * B op(A)` (right) with triangular
    /// `A`, as a new tensor.
    pub fn trmm(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
    ) -> Result<Tensor<T, A>> {
        self.triangular_dims("trmm", opts, a, b)?;
        let mut out = self.copy(b)?;
        self.trmm_into(opts, alpha, a, &mut out)?;
        Ok(out)
    }

    /// `B = alpha * op(A) B` (left) or `alpha * B op(A)` (right) in place.
    pub fn trmm_into(&self, opts: KernelOptions, alpha: T, a: &Tensor<T, A>, b: &mut Tensor<T, A>) -> Result<()> {
        self.triangular_mm("trmm", cxxblas::trmm::<T>, opts, alpha, a, b)
    }

    /// Write the `trmm` product to a dense row-major slice shaped like `b`.
    pub fn trmm_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        out: &mut [T],
    ) -> Result<()> {
        let (batch, m, n) = self.triangular_dims("trmm", opts, a, b)?;
        let mut out = self.adopt_slice(out, &shape(batch, &[m, n]))?;
        self.copy_into(b, &mut out)?;
        self.trmm_into(opts, alpha, a, &mut out)
    }

    /// Solution `X` of `op(A) X = alpha B` (left) or `X op(A) = alpha B`
    /// (right), as a new tensor.
    pub fn trsm(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
    ) -> Result<Tensor<T, A>> {
        self.triangular_dims("trsm", opts, a, b)?;
        let mut out = self.copy(b)?;
        self.trsm_into(opts, alpha, a, &mut out)?;
        Ok(out)
    }

    /// Overwrite `B` with the `trsm` solution.
    pub fn trsm_into(&self, opts: KernelOptions, alpha: T, a: &Tensor<T, A>, b: &mut Tensor<T, A>) -> Result<()> {
        self.triangular_mm("trsm", cxxblas::trsm::<T>, opts, alpha, a, b)
    }

    pub fn trsm_slice(
        &self,
        opts: KernelOptions,
        alpha: T,
        a: &Tensor<T, A>,
        b: &Tensor<T, A>,
        out: &mut [T],
    ) -> Result<()> {
        let (batch, m, n) = self.triangular_dims("trsm", opts, a, b)?;
        let mut out = self.adopt_slice(out, &shape(batch, &[m, n]))?;
        self.copy_into(b, &mut out)?;
        self.trsm_into(opts, alpha, a, &mut out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinalgError;
    use approx::assert_relative_eq;
    use num_complex::Complex64;
    use rand::Rng;

    fn random(size: &[usize]) -> Tensor<f64> {
        let mut rng = rand::thread_rng();
        Tensor::from_fn(size, |_| rng.gen_range(-1.0..1.0))
    }

    fn random_complex(size: &[usize]) -> Tensor<Complex64> {
        let mut rng = rand::thread_rng();
        Tensor::from_fn(size, |_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
    }

    fn naive_gemm(a: &Tensor<f64>, b: &Tensor<f64>) -> Vec<f64> {
        let (m, k, n) = (a.size()[0], a.size()[1], b.size()[1]);
        let mut out = vec![0.0; m * n];
        for i in 0..m {
            for j in 0..n {
                out[i * n + j] = (0..k).map(|p| a.get(&[i, p]).unwrap() * b.get(&[p, j]).unwrap()).sum();
            }
        }
        out
    }

    #[test]
    fn test_gemm_column_major_inputs_use_flag() {
        let la = Linalg::<f64>::new();
        let a = random(&[5, 3]).transpose(0, 1).unwrap(); // 3x5, column-major
        let b = random(&[4, 5]).transpose(0, 1).unwrap(); // 5x4, column-major
        let c = la.gemm(KernelOptions::new(), 1.0, &a, &b).unwrap();
        let expected = naive_gemm(&a, &b);
        for (p, q) in c.iter().zip(expected) {
            assert_relative_eq!(p, q, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gemm_into_with_beta_and_strided_output() {
        let la = Linalg::<f64>::new();
        let a = random(&[2, 3]);
        let b = random(&[3, 2]);
        let base = Tensor::full(&[2, 2], 1.0);
        let mut c = base.transpose(0, 1).unwrap();
        la.gemm_into(KernelOptions::new(), 2.0, &a, &b, 3.0, &mut c).unwrap();
        let ab = naive_gemm(&a, &b);
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(c.get(&[i, j]).unwrap(), 2.0 * ab[i * 2 + j] + 3.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_gemm_shape_errors() {
        let la = Linalg::<f64>::new();
        let a = random(&[2, 3, 4]);
        let b = random(&[2, 5, 6]);
        assert!(matches!(
            la.gemm(KernelOptions::new(), 1.0, &a, &b),
            Err(LinalgError::DimensionMismatch { expected: 4, actual: 5, .. })
        ));
        let b = random(&[3, 4, 6]);
        assert!(matches!(
            la.gemm(KernelOptions::new(), 1.0, &a, &b),
            Err(LinalgError::BatchMismatch { .. })
        ));
        let b = random(&[2, 4, 6]);
        let mut c = vec![5.0; 2 * 3 * 6];
        assert!(la
            .gemm_slice(KernelOptions::new().trans_b(Transpose::Trans), 1.0, &a, &b, 0.0, &mut c)
            .is_err());
        assert!(c.iter().all(|&v| v == 5.0));
    }

    #[test]
    fn test_syrk_trans_matches_gemm() {
        let la = Linalg::<f64>::new();
        let a = random(&[4, 3]);
        let opts = KernelOptions::new().trans(Transpose::Trans).uplo(UpLo::Lower);
        let c = la.syrk(opts, 1.0, &a).unwrap();
        let full = la
            .gemm(KernelOptions::new().trans(Transpose::Trans), 1.0, &a, &a)
            .unwrap();
        for i in 0..3 {
            for j in 0..=i {
                assert_relative_eq!(c.get(&[i, j]).unwrap(), full.get(&[i, j]).unwrap(), epsilon = 1e-12);
            }
        }
        assert_eq!(c.get(&[0, 2]).unwrap(), 0.0);
    }

    #[test]
    fn test_herk_diagonal_is_real() {
        let la = Linalg::<Complex64>::new();
        let a = random_complex(&[2, 3, 4]);
        let c = la.herk(KernelOptions::new(), 1.0, &a).unwrap();
        assert_eq!(c.size(), &[2, 3, 3]);
        for b in 0..2 {
            for i in 0..3 {
                let expected: f64 = (0..4).map(|p| a.get(&[b, i, p]).unwrap().norm_sqr()).sum();
                let d = c.get(&[b, i, i]).unwrap();
                assert_relative_eq!(d.re, expected, epsilon = 1e-12);
                assert_eq!(d.im, 0.0);
            }
        }
    }

    #[test]
    fn test_symm_right_matches_gemm() {
        let la = Linalg::<f64>::new();
        let s = random(&[3, 3]);
        let sym = Tensor::from_fn(&[3, 3], |i| {
            let (r, c) = if i[0] <= i[1] { (i[0], i[1]) } else { (i[1], i[0]) };
            s.get(&[r, c]).unwrap()
        });
        let b = random(&[2, 3]);
        let opts = KernelOptions::new().side(Side::Right);
        let c = la.symm(opts, 1.0, &s, &b).unwrap();
        let expected = naive_gemm(&b, &sym);
        for (p, q) in c.iter().zip(expected) {
            assert_relative_eq!(p, q, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_trsm_inverts_trmm() {
        let la = Linalg::<f64>::new();
        let mut rng = rand::thread_rng();
        let a = Tensor::from_fn(&[2, 3, 3], |i| if i[1] == i[2] { 3.0 } else { rng.gen_range(-1.0..1.0) });
        let b = random(&[2, 3, 4]);
        for side in [Side::Left, Side::Right] {
            let b = if side == Side::Left { b.clone() } else { b.transpose(1, 2).unwrap() };
            for trans in [Transpose::NoTrans, Transpose::Trans] {
                let opts = KernelOptions::new().side(side).trans(trans).uplo(UpLo::Lower);
                let ab = la.trmm(opts, 2.0, &a, &b).unwrap();
                let mut back = vec![0.0; b.len()];
                la.trsm_slice(opts, 0.5, &a, &ab, &mut back).unwrap();
                for (p, q) in back.iter().zip(b.iter()) {
                    assert_relative_eq!(*p, q, epsilon = 1e-10);
                }
            }
        }
    }
}
