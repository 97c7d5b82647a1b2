//! Numeric element kinds.
//!
//! The kernel library provides one routine per {operation, precision,
//! real/complex}. [`Scalar`] is the static dispatch key for that table: every
//! routine in `ndblas-kernel` is selected by the element type's `Scalar`
//! implementation, never by a runtime branch.

use std::fmt;
use std::iter::{Product, Sum};
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use num_complex::{Complex, Complex32, Complex64, ComplexFloat};

use crate::pod::{PodComplexF32, PodComplexF64};

/// Runtime tag for the four element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Real32,
    Real64,
    Complex32,
    Complex64,
}

impl ElementKind {
    /// Short name used by the text serialization format.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Real32 => "f32",
            ElementKind::Real64 => "f64",
            ElementKind::Complex32 => "c32",
            ElementKind::Complex64 => "c64",
        }
    }

    /// Inverse of [`ElementKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "f32" => Some(ElementKind::Real32),
            "f64" => Some(ElementKind::Real64),
            "c32" => Some(ElementKind::Complex32),
            "c64" => Some(ElementKind::Complex64),
            _ => None,
        }
    }

    /// One-byte tag used by the binary serialization format.
    pub fn tag(self) -> u8 {
        match self {
            ElementKind::Real32 => 0,
            ElementKind::Real64 => 1,
            ElementKind::Complex32 => 2,
            ElementKind::Complex64 => 3,
        }
    }

    /// Inverse of [`ElementKind::tag`].
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ElementKind::Real32),
            1 => Some(ElementKind::Real64),
            2 => Some(ElementKind::Complex32),
            3 => Some(ElementKind::Complex64),
            _ => None,
        }
    }

    #[inline]
    pub fn is_complex(self) -> bool {
        matches!(self, ElementKind::Complex32 | ElementKind::Complex64)
    }

    /// Size in bytes of one element.
    pub fn size_of(self) -> usize {
        match self {
            ElementKind::Real32 => 4,
            ElementKind::Real64 | ElementKind::Complex32 => 8,
            ElementKind::Complex64 => 16,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element types storable in a tensor and accepted by the kernel library.
///
/// Implemented for `f32`, `f64`, `Complex32` and `Complex64`. The arithmetic
/// and transcendental surface comes from [`ComplexFloat`], so generic code can
/// call `conj`, `re`, `im`, `abs`, `sqrt`, ... uniformly; for real kinds
/// `conj` is the identity and `im` is zero.
pub trait Scalar:
    ComplexFloat
    + Default
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Sum
    + Product
    + 'static
{
    /// Runtime tag of this kind.
    const KIND: ElementKind;

    /// Whether conjugation is a non-trivial operation for this kind.
    const IS_COMPLEX: bool;

    /// Plain-old-data representation used for binary encoding.
    type Pod: bytemuck::Pod;

    /// Embed a real value (`im = 0` for complex kinds).
    fn from_real(re: Self::Real) -> Self;

    /// Build from real and imaginary parts. Real kinds drop `im`.
    fn from_parts(re: Self::Real, im: Self::Real) -> Self;

    fn to_pod(self) -> Self::Pod;

    fn from_pod(pod: Self::Pod) -> Self;

    /// Exact text form: the shortest round-trip decimal of each component,
    /// `"re im"` for complex kinds.
    fn to_text(self) -> String;

    /// Inverse of [`Scalar::to_text`].
    fn from_text(text: &str) -> Option<Self>;
}

macro_rules! impl_scalar_real {
    ($t:ty, $kind:expr) => {
        impl Scalar for $t {
            const KIND: ElementKind = $kind;
            const IS_COMPLEX: bool = false;
            type Pod = $t;

            #[inline(always)]
            fn from_real(re: $t) -> Self {
                re
            }

            #[inline(always)]
            fn from_parts(re: $t, _im: $t) -> Self {
                re
            }

            #[inline(always)]
            fn to_pod(self) -> $t {
                self
            }

            #[inline(always)]
            fn from_pod(pod: $t) -> Self {
                pod
            }

            fn to_text(self) -> String {
                self.to_string()
            }

            fn from_text(text: &str) -> Option<Self> {
                text.trim().parse::<$t>().ok()
            }
        }
    };
}

macro_rules! impl_scalar_complex {
    ($t:ty, $r:ty, $pod:ty, $kind:expr) => {
        impl Scalar for $t {
            const KIND: ElementKind = $kind;
            const IS_COMPLEX: bool = true;
            type Pod = $pod;

            #[inline(always)]
            fn from_real(re: $r) -> Self {
                Complex::new(re, 0.0)
            }

            #[inline(always)]
            fn from_parts(re: $r, im: $r) -> Self {
                Complex::new(re, im)
            }

            #[inline(always)]
            fn to_pod(self) -> $pod {
                <$pod>::from(self)
            }

            #[inline(always)]
            fn from_pod(pod: $pod) -> Self {
                <$t>::from(pod)
            }

            fn to_text(self) -> String {
                format!("{} {}", self.re, self.im)
            }

            fn from_text(text: &str) -> Option<Self> {
                let mut parts = text.split_whitespace();
                let re = parts.next()?.parse::<$r>().ok()?;
                let im = parts.next()?.parse::<$r>().ok()?;
                if parts.next().is_some() {
                    return None;
                }
                Some(Complex::new(re, im))
            }
        }
    };
}

impl_scalar_real!(f32, ElementKind::Real32);
impl_scalar_real!(f64, ElementKind::Real64);
impl_scalar_complex!(Complex32, f32, PodComplexF32, ElementKind::Complex32);
impl_scalar_complex!(Complex64, f64, PodComplexF64, ElementKind::Complex64);
