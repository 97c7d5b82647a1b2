//! Pointwise math and reductions on tensors.
//!
//! Results are fresh row-major tensors allocated from the first operand's
//! allocator. Binary and ternary operations require identical shapes; there
//! is no broadcasting. Operations that need an ordering (`floor`, `maximum`,
//! `max`, `clamp`, ...) are rejected for complex element kinds with
//! [`TensorError::Undefined`].

use num_complex::Complex;
use num_traits::Float;

use crate::index::IndexIter;
use crate::storage::Allocator;
use crate::tensor::Tensor;
use crate::{Result, Scalar, TensorError};

pub(crate) fn ensure_same_shape(a: &[usize], b: &[usize]) -> Result<()> {
    if a.len() != b.len() {
        return Err(TensorError::RankMismatch(a.len(), b.len()));
    }
    if a != b {
        return Err(TensorError::ShapeMismatch(a.to_vec(), b.to_vec()));
    }
    Ok(())
}

fn require_real<T: Scalar>(op: &'static str) -> Result<()> {
    if T::IS_COMPLEX {
        return Err(TensorError::Undefined { op, kind: T::KIND });
    }
    Ok(())
}

// ============================================================================
// Generic maps
// ============================================================================

/// `out[i] = f(a[i])`.
pub fn map<T: Copy, U: Copy, A: Allocator>(a: &Tensor<T, A>, f: impl FnMut(T) -> U) -> Tensor<U, A> {
    let values: Vec<U> = a.iter().map(f).collect();
    Tensor::from_values_in(&values, a.size(), a.allocator().clone())
}

/// `out[i] = f(a[i], b[i])`.
pub fn zip_map2<T: Copy, U: Copy, V: Copy, A: Allocator, B: Allocator>(
    a: &Tensor<T, A>,
    b: &Tensor<U, B>,
    mut f: impl FnMut(T, U) -> V,
) -> Result<Tensor<V, A>> {
    ensure_same_shape(a.size(), b.size())?;
    let values: Vec<V> = a.iter().zip(b.iter()).map(|(x, y)| f(x, y)).collect();
    Ok(Tensor::from_values_in(&values, a.size(), a.allocator().clone()))
}

/// `out[i] = f(a[i], b[i], c[i])`.
pub fn zip_map3<T: Copy, V: Copy, A: Allocator>(
    a: &Tensor<T, A>,
    b: &Tensor<T, A>,
    c: &Tensor<T, A>,
    mut f: impl FnMut(T, T, T) -> V,
) -> Result<Tensor<V, A>> {
    ensure_same_shape(a.size(), b.size())?;
    ensure_same_shape(a.size(), c.size())?;
    let values: Vec<V> = a
        .iter()
        .zip(b.iter())
        .zip(c.iter())
        .map(|((x, y), z)| f(x, y, z))
        .collect();
    Ok(Tensor::from_values_in(&values, a.size(), a.allocator().clone()))
}

// ============================================================================
// Unary
// ============================================================================

pub fn neg<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Tensor<T, A> {
    map(a, |x| -x)
}

pub fn conj<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Tensor<T, A> {
    map(a, |x| x.conj())
}

/// Magnitude; real-valued for every kind.
pub fn abs<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Tensor<T::Real, A> {
    map(a, |x| x.abs())
}

pub fn real<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Tensor<T::Real, A> {
    map(a, |x| x.re())
}

pub fn imag<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Tensor<T::Real, A> {
    map(a, |x| x.im())
}

/// Phase angle; `0` or `π` for real kinds.
pub fn arg<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Tensor<T::Real, A> {
    map(a, |x| x.arg())
}

pub fn sqrt<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Tensor<T, A> {
    map(a, |x| x.sqrt())
}

pub fn exp<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Tensor<T, A> {
    map(a, |x| x.exp())
}

pub fn ln<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Tensor<T, A> {
    map(a, |x| x.ln())
}

pub fn sin<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Tensor<T, A> {
    map(a, |x| x.sin())
}

pub fn cos<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Tensor<T, A> {
    map(a, |x| x.cos())
}

pub fn tanh<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Tensor<T, A> {
    map(a, |x| x.tanh())
}

pub fn powf<T: Scalar, A: Allocator>(a: &Tensor<T, A>, exponent: T::Real) -> Tensor<T, A> {
    map(a, |x| x.powf(exponent))
}

fn round_with<T: Scalar, A: Allocator>(
    a: &Tensor<T, A>,
    op: &'static str,
    f: impl Fn(T::Real) -> T::Real,
) -> Result<Tensor<T, A>> {
    require_real::<T>(op)?;
    Ok(map(a, |x| T::from_real(f(x.re()))))
}

pub fn floor<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Result<Tensor<T, A>> {
    round_with(a, "floor", |x| x.floor())
}

pub fn ceil<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Result<Tensor<T, A>> {
    round_with(a, "ceil", |x| x.ceil())
}

pub fn round<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Result<Tensor<T, A>> {
    round_with(a, "round", |x| x.round())
}

pub fn trunc<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Result<Tensor<T, A>> {
    round_with(a, "trunc", |x| x.trunc())
}

// ============================================================================
// Binary and ternary
// ============================================================================

pub fn add<T: Scalar, A: Allocator>(a: &Tensor<T, A>, b: &Tensor<T, A>) -> Result<Tensor<T, A>> {
    zip_map2(a, b, |x, y| x + y)
}

pub fn sub<T: Scalar, A: Allocator>(a: &Tensor<T, A>, b: &Tensor<T, A>) -> Result<Tensor<T, A>> {
    zip_map2(a, b, |x, y| x - y)
}

pub fn mul<T: Scalar, A: Allocator>(a: &Tensor<T, A>, b: &Tensor<T, A>) -> Result<Tensor<T, A>> {
    zip_map2(a, b, |x, y| x * y)
}

pub fn div<T: Scalar, A: Allocator>(a: &Tensor<T, A>, b: &Tensor<T, A>) -> Result<Tensor<T, A>> {
    zip_map2(a, b, |x, y| x / y)
}

/// Element-wise maximum. NaN loses to a number.
pub fn maximum<T: Scalar, A: Allocator>(
    a: &Tensor<T, A>,
    b: &Tensor<T, A>,
) -> Result<Tensor<T, A>> {
    require_real::<T>("maximum")?;
    zip_map2(a, b, |x, y| T::from_real(x.re().max(y.re())))
}

/// Element-wise minimum. NaN loses to a number.
pub fn minimum<T: Scalar, A: Allocator>(
    a: &Tensor<T, A>,
    b: &Tensor<T, A>,
) -> Result<Tensor<T, A>> {
    require_real::<T>("minimum")?;
    zip_map2(a, b, |x, y| T::from_real(x.re().min(y.re())))
}

pub fn add_scalar<T: Scalar, A: Allocator>(a: &Tensor<T, A>, value: T) -> Tensor<T, A> {
    map(a, |x| x + value)
}

pub fn mul_scalar<T: Scalar, A: Allocator>(a: &Tensor<T, A>, value: T) -> Tensor<T, A> {
    map(a, |x| x * value)
}

/// `a * b + c`.
pub fn fma<T: Scalar, A: Allocator>(
    a: &Tensor<T, A>,
    b: &Tensor<T, A>,
    c: &Tensor<T, A>,
) -> Result<Tensor<T, A>> {
    zip_map3(a, b, c, |x, y, z| x * y + z)
}

pub fn clamp<T: Scalar, A: Allocator>(
    a: &Tensor<T, A>,
    lo: T::Real,
    hi: T::Real,
) -> Result<Tensor<T, A>> {
    require_real::<T>("clamp")?;
    if lo > hi {
        return Err(TensorError::InvalidArgument(
            "clamp lower bound exceeds upper bound".into(),
        ));
    }
    Ok(map(a, |x| T::from_real(x.re().max(lo).min(hi))))
}

/// Complex tensor from magnitudes and phases.
pub fn polar<R, A>(abs: &Tensor<R, A>, arg: &Tensor<R, A>) -> Result<Tensor<Complex<R>, A>>
where
    R: Float,
    A: Allocator,
{
    zip_map2(abs, arg, |r, theta| Complex::from_polar(r, theta))
}

// ============================================================================
// Reductions
// ============================================================================

pub fn sum<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> T {
    a.iter().fold(T::zero(), |acc, x| acc + x)
}

pub fn prod<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> T {
    a.iter().fold(T::one(), |acc, x| acc * x)
}

pub fn mean<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Result<T> {
    if a.is_empty() {
        return Err(TensorError::Empty { op: "mean" });
    }
    let n: T::Real = num_traits::cast(a.len())
        .ok_or_else(|| TensorError::InvalidArgument(format!("count {} not representable", a.len())))?;
    Ok(sum(a) / T::from_real(n))
}

fn extremum<T: Scalar, A: Allocator>(
    a: &Tensor<T, A>,
    op: &'static str,
    pick: impl Fn(T::Real, T::Real) -> T::Real,
) -> Result<T> {
    require_real::<T>(op)?;
    let mut values = a.iter().map(|x| x.re());
    let first = values.next().ok_or(TensorError::Empty { op })?;
    Ok(T::from_real(values.fold(first, pick)))
}

pub fn max<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Result<T> {
    extremum(a, "max", |x, y| x.max(y))
}

pub fn min<T: Scalar, A: Allocator>(a: &Tensor<T, A>) -> Result<T> {
    extremum(a, "min", |x, y| x.min(y))
}

/// Sum over dimension `dim`, removing it.
pub fn sum_dim<T: Scalar, A: Allocator>(a: &Tensor<T, A>, dim: usize) -> Result<Tensor<T, A>> {
    let rank = a.dimension();
    if dim >= rank {
        return Err(TensorError::InvalidAxis { axis: dim, rank });
    }
    // Move `dim` innermost, then reduce each trailing line.
    let mut perm: Vec<usize> = (0..rank).filter(|&d| d != dim).collect();
    perm.push(dim);
    let moved = a.permute(&perm)?;
    let outer = &moved.size()[..rank - 1];
    let mut values = Vec::with_capacity(outer.iter().product());
    for coord in IndexIter::begin(outer) {
        let line = moved.select_coord(&coord)?;
        values.push(line.iter().fold(T::zero(), |acc, x| acc + x));
    }
    Ok(Tensor::from_values_in(&values, outer, a.allocator().clone()))
}

impl<T: Scalar, A: Allocator> Tensor<T, A> {
    /// Whether every element is zero.
    pub fn is_zero(&self) -> bool {
        self.iter().all(|x| x.is_zero())
    }
}
