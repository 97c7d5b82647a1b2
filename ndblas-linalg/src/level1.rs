//! Level 1: vector operations over the last dimension, batched over the rest.

use ndblas_kernel::{cxxblas, BlasScalar};
use ndblas_view::{Allocator, Tensor};

use crate::batch::{batch_strides, expect_scalar, expect_vector, vector, Plan};
use crate::{Linalg, Result};

type Reduction<T, U> = unsafe fn(usize, *const T, isize) -> U;
type Product<T> = unsafe fn(usize, *const T, isize, *const T, isize) -> T;

/// Increment of the active (last) dimension.
#[inline]
pub(crate) fn inc<T, A: Allocator>(t: &Tensor<T, A>) -> isize {
    t.stride()[t.dimension() - 1]
}

impl<T: BlasScalar, A: Allocator> Linalg<T, A> {
    fn reduce<U: Copy>(
        &self,
        op: &'static str,
        f: Reduction<T, U>,
        x: &Tensor<T, A>,
        out: &Tensor<U, A>,
    ) -> Result<()> {
        let (batch, n) = vector(op, "x", x)?;
        expect_scalar(op, "out", out, batch)?;
        let plan = Plan::new(op, batch, vec![batch_strides(x, 1), out.stride().to_vec()]);
        let (xp, incx, outp) = (x.as_ptr(), inc(x), out.as_mut_ptr());
        // SAFETY: each offset addresses a length-`n` vector of `x` and one
        // element of `out`, both validated views.
        plan.for_each(|o| unsafe {
            outp.wrapping_offset(o[1])
                .write(f(n, xp.wrapping_offset(o[0]), incx))
        });
        Ok(())
    }

    fn inner(
        &self,
        op: &'static str,
        f: Product<T>,
        x: &Tensor<T, A>,
        y: &Tensor<T, A>,
        out: &Tensor<T, A>,
    ) -> Result<()> {
        let (batch, n) = vector(op, "x", x)?;
        expect_vector(op, "y", y, batch, n)?;
        expect_scalar(op, "out", out, batch)?;
        let plan = Plan::new(
            op,
            batch,
            vec![batch_strides(x, 1), batch_strides(y, 1), out.stride().to_vec()],
        );
        let (xp, incx) = (x.as_ptr(), inc(x));
        let (yp, incy) = (y.as_ptr(), inc(y));
        let outp = out.as_mut_ptr();
        // SAFETY: as in `reduce`.
        plan.for_each(|o| unsafe {
            let v = f(
                n,
                xp.wrapping_offset(o[0]),
                incx,
                yp.wrapping_offset(o[1]),
                incy,
            );
            outp.wrapping_offset(o[2]).write(v)
        });
        Ok(())
    }

    /// Sum of `|re| + |im|` of each vector.
    pub fn asum(&self, x: &Tensor<T, A>) -> Result<Tensor<T::Real, A>> {
        let (batch, _) = vector("asum", "x", x)?;
        let out = self.alloc_zeros(batch);
        self.reduce("asum", cxxblas::asum::<T>, x, &out)?;
        Ok(out)
    }

    pub fn asum_into(&self, x: &Tensor<T, A>, out: &mut Tensor<T::Real, A>) -> Result<()> {
        self.reduce("asum", cxxblas::asum::<T>, x, out)
    }

    pub fn asum_slice(&self, x: &Tensor<T, A>, out: &mut [T::Real]) -> Result<()> {
        let (batch, _) = vector("asum", "x", x)?;
        let out = self.adopt_slice(out, batch)?;
        self.reduce("asum", cxxblas::asum::<T>, x, &out)
    }

    /// Euclidean norm of each vector.
    pub fn nrm2(&self, x: &Tensor<T, A>) -> Result<Tensor<T::Real, A>> {
        let (batch, _) = vector("nrm2", "x", x)?;
        let out = self.alloc_zeros(batch);
        self.reduce("nrm2", cxxblas::nrm2::<T>, x, &out)?;
        Ok(out)
    }

    pub fn nrm2_into(&self, x: &Tensor<T, A>, out: &mut Tensor<T::Real, A>) -> Result<()> {
        self.reduce("nrm2", cxxblas::nrm2::<T>, x, out)
    }

    pub fn nrm2_slice(&self, x: &Tensor<T, A>, out: &mut [T::Real]) -> Result<()> {
        let (batch, _) = vector("nrm2", "x", x)?;
        let out = self.adopt_slice(out, batch)?;
        self.reduce("nrm2", cxxblas::nrm2::<T>, x, &out)
    }

    /// Zero-based position of the first element with the largest
    /// `|re| + |im|`. An empty vector yields 0.
    pub fn iamax(&self, x: &Tensor<T, A>) -> Result<Tensor<usize, A>> {
        let (batch, _) = vector("iamax", "x", x)?;
        let out = self.alloc_zeros(batch);
        self.reduce("iamax", cxxblas::iamax::<T>, x, &out)?;
        Ok(out)
    }

    pub fn iamax_into(&self, x: &Tensor<T, A>, out: &mut Tensor<usize, A>) -> Result<()> {
        self.reduce("iamax", cxxblas::iamax::<T>, x, out)
    }

    pub fn iamax_slice(&self, x: &Tensor<T, A>, out: &mut [usize]) -> Result<()> {
        let (batch, _) = vector("iamax", "x", x)?;
        let out = self.adopt_slice(out, batch)?;
        self.reduce("iamax", cxxblas::iamax::<T>, x, &out)
    }

    /// Unconjugated inner product `Σ x_i y_i`.
    pub fn dot(&self, x: &Tensor<T, A>, y: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let (batch, _) = vector("dot", "x", x)?;
        let out = self.alloc_zeros(batch);
        self.inner("dot", cxxblas::dot::<T>, x, y, &out)?;
        Ok(out)
    }

    pub fn dot_into(&self, x: &Tensor<T, A>, y: &Tensor<T, A>, out: &mut Tensor<T, A>) -> Result<()> {
        self.inner("dot", cxxblas::dot::<T>, x, y, out)
    }

    pub fn dot_slice(&self, x: &Tensor<T, A>, y: &Tensor<T, A>, out: &mut [T]) -> Result<()> {
        let (batch, _) = vector("dot", "x", x)?;
        let out = self.adopt_slice(out, batch)?;
        self.inner("dot", cxxblas::dot::<T>, x, y, &out)
    }

    /// Conjugated inner product `Σ conj(x_i) y_i`.
    pub fn dotc(&self, x: &Tensor<T, A>, y: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let (batch, _) = vector("dotc", "x", x)?;
        let out = self.alloc_zeros(batch);
        self.inner("dotc", cxxblas::dotc::<T>, x, y, &out)?;
        Ok(out)
    }

    pub fn dotc_into(&self, x: &Tensor<T, A>, y: &Tensor<T, A>, out: &mut Tensor<T, A>) -> Result<()> {
        self.inner("dotc", cxxblas::dotc::<T>, x, y, out)
    }

    pub fn dotc_slice(&self, x: &Tensor<T, A>, y: &Tensor<T, A>, out: &mut [T]) -> Result<()> {
        let (batch, _) = vector("dotc", "x", x)?;
        let out = self.adopt_slice(out, batch)?;
        self.inner("dotc", cxxblas::dotc::<T>, x, y, &out)
    }

    /// `alpha * x + y` as a new tensor.
    pub fn axpy(&self, alpha: T, x: &Tensor<T, A>, y: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let (batch, n) = vector("axpy", "x", x)?;
        expect_vector("axpy", "y", y, batch, n)?;
        let mut out = self.copy(y)?;
        self.axpy_into(alpha, x, &mut out)?;
        Ok(out)
    }

    /// `y += alpha * x`.
    pub fn axpy_into(&self, alpha: T, x: &Tensor<T, A>, y: &mut Tensor<T, A>) -> Result<()> {
        let (batch, n) = vector("axpy", "x", x)?;
        expect_vector("axpy", "y", y, batch, n)?;
        let plan = Plan::new("axpy", batch, vec![batch_strides(x, 1), batch_strides(y, 1)]);
        let (xp, incx) = (x.as_ptr(), inc(x));
        let (yp, incy) = (y.as_mut_ptr(), inc(y));
        // SAFETY: offsets address length-`n` vectors of validated views.
        plan.for_each(|o| unsafe {
            cxxblas::axpy(
                n,
                alpha,
                xp.wrapping_offset(o[0]),
                incx,
                yp.wrapping_offset(o[1]),
                incy,
            )
        });
        Ok(())
    }

    /// `y += alpha * x` with `y` a dense row-major slice shaped like `x`.
    pub fn axpy_slice(&self, alpha: T, x: &Tensor<T, A>, y: &mut [T]) -> Result<()> {
        let mut y = self.adopt_slice(y, x.size())?;
        self.axpy_into(alpha, x, &mut y)
    }

    /// `alpha * x` as a new tensor.
    pub fn scal(&self, alpha: T, x: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        let mut out = self.copy(x)?;
        self.scal_into(alpha, &mut out)?;
        Ok(out)
    }

    /// `x *= alpha` in place.
    pub fn scal_into(&self, alpha: T, x: &mut Tensor<T, A>) -> Result<()> {
        let (batch, n) = vector("scal", "x", x)?;
        let plan = Plan::new("scal", batch, vec![batch_strides(x, 1)]);
        let (xp, incx) = (x.as_mut_ptr(), inc(x));
        // SAFETY: offsets address length-`n` vectors of a validated view.
        plan.for_each(|o| unsafe { cxxblas::scal(n, alpha, xp.wrapping_offset(o[0]), incx) });
        Ok(())
    }

    /// Write `alpha * x` to a dense row-major slice shaped like `x`.
    pub fn scal_slice(&self, alpha: T, x: &Tensor<T, A>, out: &mut [T]) -> Result<()> {
        let mut out = self.adopt_slice(out, x.size())?;
        self.copy_into(x, &mut out)?;
        self.scal_into(alpha, &mut out)
    }

    /// Dense row-major copy of `x`, allocated through the dispatcher.
    pub fn copy(&self, x: &Tensor<T, A>) -> Result<Tensor<T, A>> {
        vector("copy", "x", x)?;
        let mut out = self.alloc_zeros(x.size());
        self.copy_into(x, &mut out)?;
        Ok(out)
    }

    /// `y = x`.
    pub fn copy_into(&self, x: &Tensor<T, A>, y: &mut Tensor<T, A>) -> Result<()> {
        let (batch, n) = vector("copy", "x", x)?;
        expect_vector("copy", "y", y, batch, n)?;
        let plan = Plan::new("copy", batch, vec![batch_strides(x, 1), batch_strides(y, 1)]);
        let (xp, incx) = (x.as_ptr(), inc(x));
        let (yp, incy) = (y.as_mut_ptr(), inc(y));
        // SAFETY: offsets address length-`n` vectors of validated views.
        plan.for_each(|o| unsafe {
            cxxblas::copy(n, xp.wrapping_offset(o[0]), incx, yp.wrapping_offset(o[1]), incy)
        });
        Ok(())
    }

    pub fn copy_slice(&self, x: &Tensor<T, A>, y: &mut [T]) -> Result<()> {
        let mut y = self.adopt_slice(y, x.size())?;
        self.copy_into(x, &mut y)
    }

    /// Exchange the contents of `x` and `y`.
    pub fn swap(&self, x: &mut Tensor<T, A>, y: &mut Tensor<T, A>) -> Result<()> {
        let (batch, n) = vector("swap", "x", x)?;
        expect_vector("swap", "y", y, batch, n)?;
        let plan = Plan::new("swap", batch, vec![batch_strides(x, 1), batch_strides(y, 1)]);
        let (xp, incx) = (x.as_mut_ptr(), inc(x));
        let (yp, incy) = (y.as_mut_ptr(), inc(y));
        // SAFETY: offsets address length-`n` vectors of validated views.
        plan.for_each(|o| unsafe {
            cxxblas::swap(n, xp.wrapping_offset(o[0]), incx, yp.wrapping_offset(o[1]), incy)
        });
        Ok(())
    }

    /// Plane rotation in place: `x' = c x + s y`, `y' = c y - conj(s) x`.
    pub fn rot(
        &self,
        x: &mut Tensor<T, A>,
        y: &mut Tensor<T, A>,
        c: T::Real,
        s: T,
    ) -> Result<()> {
        let (batch, n) = vector("rot", "x", x)?;
        expect_vector("rot", "y", y, batch, n)?;
        let plan = Plan::new("rot", batch, vec![batch_strides(x, 1), batch_strides(y, 1)]);
        let (xp, incx) = (x.as_mut_ptr(), inc(x));
        let (yp, incy) = (y.as_mut_ptr(), inc(y));
        // SAFETY: offsets address length-`n` vectors of validated views.
        plan.for_each(|o| unsafe {
            cxxblas::rot(
                n,
                xp.wrapping_offset(o[0]),
                incx,
                yp.wrapping_offset(o[1]),
                incy,
                c,
                s,
            )
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinalgError;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    #[test]
    fn test_batched_dot() {
        let la = Linalg::<f64>::new();
        let x = Tensor::from_fn(&[3, 4], |i| (i[0] * 4 + i[1]) as f64);
        let y = Tensor::full(&[3, 4], 2.0);
        let d = la.dot(&x, &y).unwrap();
        assert_eq!(d.size(), &[3]);
        assert_eq!(d.to_vec(), vec![12.0, 44.0, 76.0]);
    }

    #[test]
    fn test_dotc_conjugates_x() {
        let la = Linalg::<Complex64>::new();
        let x = Tensor::from_vec(vec![Complex64::new(0.0, 1.0)], &[1]).unwrap();
        let y = Tensor::from_vec(vec![Complex64::new(0.0, 1.0)], &[1]).unwrap();
        assert_eq!(la.dotc(&x, &y).unwrap().item().unwrap(), Complex64::new(1.0, 0.0));
        assert_eq!(la.dot(&x, &y).unwrap().item().unwrap(), Complex64::new(-1.0, 0.0));
    }

    #[test]
    fn test_reductions_on_reversed_view() {
        let la = Linalg::<f64>::new();
        let x = Tensor::from_vec(vec![1.0, -5.0, 3.0, 4.0], &[4]).unwrap();
        let rev = x.view(&[4], Some(&[-1]), Some(3)).unwrap();
        assert_eq!(la.iamax(&rev).unwrap().item().unwrap(), 2);
        assert_eq!(la.asum(&rev).unwrap().item().unwrap(), 13.0);
        assert_relative_eq!(la.nrm2(&rev).unwrap().item().unwrap(), 51f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_axpy_conventions_agree() {
        let la = Linalg::<f64>::new();
        let x = Tensor::from_fn(&[2, 3], |i| (i[0] + i[1]) as f64);
        let y = Tensor::full(&[2, 3], 1.0);

        let fresh = la.axpy(2.0, &x, &y).unwrap();
        let mut into = y.deep_clone();
        la.axpy_into(2.0, &x, &mut into).unwrap();
        let mut buf = vec![1.0; 6];
        la.axpy_slice(2.0, &x, &mut buf).unwrap();

        assert_eq!(fresh.to_vec(), vec![1.0, 3.0, 5.0, 3.0, 5.0, 7.0]);
        assert_eq!(into.to_vec(), fresh.to_vec());
        assert_eq!(buf, fresh.to_vec());
        // The constructive form leaves `y` alone.
        assert_eq!(y.to_vec(), vec![1.0; 6]);
    }

    #[test]
    fn test_scal_and_copy() {
        let la = Linalg::<f64>::new();
        let x = Tensor::from_fn(&[2, 3], |i| (i[0] * 3 + i[1]) as f64);
        let t = x.transpose(0, 1).unwrap();
        let mut buf = vec![0.0; 6];
        la.scal_slice(10.0, &t, &mut buf).unwrap();
        assert_eq!(buf, vec![0.0, 30.0, 10.0, 40.0, 20.0, 50.0]);

        let c = la.copy(&t).unwrap();
        assert!(c.is_contiguous());
        assert_eq!(c.to_vec(), t.to_vec());

        let mut x2 = x.clone();
        la.scal_into(-1.0, &mut x2).unwrap();
        assert_eq!(x.get(&[1, 2]).unwrap(), -5.0);
    }

    #[test]
    fn test_swap_and_rot() {
        let la = Linalg::<f64>::new();
        let mut x = Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        let mut y = Tensor::from_vec(vec![3.0, 4.0], &[2]).unwrap();
        la.swap(&mut x, &mut y).unwrap();
        assert_eq!(x.to_vec(), vec![3.0, 4.0]);
        assert_eq!(y.to_vec(), vec![1.0, 2.0]);

        la.rot(&mut x, &mut y, 0.0, 1.0).unwrap();
        assert_eq!(x.to_vec(), vec![1.0, 2.0]);
        assert_eq!(y.to_vec(), vec![-3.0, -4.0]);
    }

    #[test]
    fn test_mismatch_leaves_output_untouched() {
        let la = Linalg::<f64>::new();
        let x = Tensor::full(&[2, 3], 1.0);
        let mut y = Tensor::full(&[2, 4], 7.0);
        let err = la.axpy_into(1.0, &x, &mut y).unwrap_err();
        assert!(matches!(err, LinalgError::DimensionMismatch { .. }));
        assert!(y.iter().all(|v| v == 7.0));

        let mut out = vec![9.0; 1];
        let err = la.dot_slice(&x, &x, &mut out).unwrap_err();
        assert!(matches!(err, LinalgError::Tensor(_)));
        assert_eq!(out, vec![9.0]);
    }

    #[test]
    fn test_rank_zero_rejected() {
        let la = Linalg::<f64>::new();
        let x = Tensor::scalar(1.0);
        assert!(matches!(
            la.asum(&x),
            Err(LinalgError::OperandRank { min: 1, rank: 0, .. })
        ));
    }
}
