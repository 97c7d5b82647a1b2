//! Element-wise conversion between element kinds.
//!
//! Used by `Storage::copy_from` and `Tensor::copy_from`, which assign from a
//! buffer of a possibly different kind. Real to complex sets `im = 0`;
//! complex to real keeps the real part.

use num_complex::{Complex32, Complex64};

/// Value conversion from `U`, possibly lossy.
pub trait CastFrom<U>: Sized {
    fn cast_from(value: U) -> Self;
}

macro_rules! impl_cast_real_real {
    ($($src:ty => $dst:ty),* $(,)?) => {
        $(impl CastFrom<$src> for $dst {
            #[inline(always)]
            fn cast_from(value: $src) -> Self {
                value as $dst
            }
        })*
    };
}

macro_rules! impl_cast_real_complex {
    ($($src:ty => $dst:ty, $r:ty);* $(;)?) => {
        $(impl CastFrom<$src> for $dst {
            #[inline(always)]
            fn cast_from(value: $src) -> Self {
                <$dst>::new(value as $r, 0.0)
            }
        })*
    };
}

macro_rules! impl_cast_complex_real {
    ($($src:ty => $dst:ty),* $(,)?) => {
        $(impl CastFrom<$src> for $dst {
            #[inline(always)]
            fn cast_from(value: $src) -> Self {
                value.re as $dst
            }
        })*
    };
}

macro_rules! impl_cast_complex_complex {
    ($($src:ty => $dst:ty, $r:ty);* $(;)?) => {
        $(impl CastFrom<$src> for $dst {
            #[inline(always)]
            fn cast_from(value: $src) -> Self {
                <$dst>::new(value.re as $r, value.im as $r)
            }
        })*
    };
}

impl_cast_real_real!(f32 => f32, f32 => f64, f64 => f32, f64 => f64);
impl_cast_real_complex!(
    f32 => Complex32, f32;
    f32 => Complex64, f64;
    f64 => Complex32, f32;
    f64 => Complex64, f64;
);
impl_cast_complex_real!(Complex32 => f32, Complex32 => f64, Complex64 => f32, Complex64 => f64);
impl_cast_complex_complex!(
    Complex32 => Complex32, f32;
    Complex32 => Complex64, f64;
    Complex64 => Complex32, f32;
    Complex64 => Complex64, f64;
);
