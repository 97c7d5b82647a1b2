//! Plain-old-data mirrors of the complex element kinds.
//!
//! `num_complex::Complex<T>` is `repr(C)` but does not implement
//! `bytemuck::Pod` without an extra feature, so binary encoders go through
//! these `[re, im]` structs instead.

use bytemuck::{Pod, Zeroable};
use num_complex::Complex;

/// POD representation of `Complex<f64>`: `[re, im]` with `repr(C)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Zeroable, Pod)]
pub struct PodComplexF64 {
    pub re: f64,
    pub im: f64,
}

/// POD representation of `Complex<f32>`: `[re, im]` with `repr(C)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Zeroable, Pod)]
pub struct PodComplexF32 {
    pub re: f32,
    pub im: f32,
}

impl From<Complex<f64>> for PodComplexF64 {
    fn from(c: Complex<f64>) -> Self {
        PodComplexF64 { re: c.re, im: c.im }
    }
}

impl From<PodComplexF64> for Complex<f64> {
    fn from(p: PodComplexF64) -> Self {
        Complex { re: p.re, im: p.im }
    }
}

impl From<Complex<f32>> for PodComplexF32 {
    fn from(c: Complex<f32>) -> Self {
        PodComplexF32 { re: c.re, im: c.im }
    }
}

impl From<PodComplexF32> for Complex<f32> {
    fn from(p: PodComplexF32) -> Self {
        Complex { re: p.re, im: p.im }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_complex() {
        assert_eq!(
            std::mem::size_of::<PodComplexF64>(),
            std::mem::size_of::<Complex<f64>>()
        );
        assert_eq!(
            std::mem::size_of::<PodComplexF32>(),
            std::mem::size_of::<Complex<f32>>()
        );
    }

    #[test]
    fn test_bytes_are_re_then_im() {
        let pod = PodComplexF64::from(Complex::new(1.0, -2.0));
        let words: &[f64] = bytemuck::cast_slice(bytemuck::bytes_of(&pod));
        assert_eq!(words, &[1.0, -2.0]);
    }
}
