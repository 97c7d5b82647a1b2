//! Kernel-ready matrix operands.
//!
//! The adapter consumes row-major matrices with unit column stride and a
//! leading dimension of at least the column count. A batched operand whose
//! trailing strides do not fit is handled in one of three ways:
//!
//! - a `gemm` input stored column-major (unit row stride) is passed as its
//!   row-major transpose with the transpose flag flipped;
//! - any other input is copied to a dense row-major temporary;
//! - an output is computed in a dense temporary and written back afterwards.
//!
//! The decision is made once per operand: trailing strides are shared by
//! every batch element.

use ndblas_kernel::Transpose;
use ndblas_view::{Allocator, IndexIter, Tensor};

use crate::batch::batch_strides;
use crate::Result;

/// Leading dimension of a row-major `rows x cols` matrix with strides
/// `(rs, cs)`, or `None` when the layout does not fit.
pub fn row_major_ld(rows: usize, cols: usize, rs: isize, cs: isize) -> Option<usize> {
    if rows == 0 || cols == 0 {
        return Some(cols.max(1));
    }
    if cols > 1 && cs != 1 {
        return None;
    }
    if rows == 1 {
        return Some(cols);
    }
    if rs < cols as isize {
        return None;
    }
    Some(rs as usize)
}

fn trailing<T, A: Allocator>(t: &Tensor<T, A>) -> (usize, usize, isize, isize) {
    let r = t.dimension();
    (t.size()[r - 2], t.size()[r - 1], t.stride()[r - 2], t.stride()[r - 1])
}

/// Input matrix as seen by the adapter.
pub struct MatrixInput<T, A: Allocator> {
    tensor: Tensor<T, A>,
    ld: usize,
    trans: Transpose,
}

impl<T: Copy, A: Allocator> MatrixInput<T, A> {
    /// Prepare `t` for a kernel that applies `trans` to it. `allow_flip`
    /// enables the column-major shortcut (the `gemm` inputs).
    pub fn new(op: &str, t: &Tensor<T, A>, trans: Transpose, allow_flip: bool) -> Self {
        let (rows, cols, rs, cs) = trailing(t);
        if let Some(ld) = row_major_ld(rows, cols, rs, cs) {
            return Self {
                tensor: t.clone(),
                ld,
                trans,
            };
        }
        // A column-major matrix is the row-major storage of its transpose.
        // conj(A) is not an op() of A^T, so ConjTrans still copies.
        if allow_flip && trans != Transpose::ConjTrans {
            if let Some(ld) = row_major_ld(cols, rows, cs, rs) {
                log::debug!("{op}: using column-major operand as its transpose");
                return Self {
                    tensor: t.clone(),
                    ld,
                    trans: trans.flip(),
                };
            }
        }
        log::debug!("{op}: copying {rows}x{cols} operand with strides ({rs}, {cs}) to a dense temporary");
        Self {
            tensor: t.deep_clone(),
            ld: cols.max(1),
            trans,
        }
    }

    #[inline]
    pub fn ptr(&self) -> *const T {
        self.tensor.as_ptr()
    }

    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    /// Transpose flag to pass for this operand.
    #[inline]
    pub fn trans(&self) -> Transpose {
        self.trans
    }

    pub fn batch_strides(&self) -> Vec<isize> {
        batch_strides(&self.tensor, 2)
    }

    /// Whether a dense temporary was made.
    pub fn is_copy(&self, original: &Tensor<T, A>) -> bool {
        !self.tensor.storage().ptr_eq(original.storage())
    }
}

/// Output (or in/out) matrix as seen by the adapter.
pub struct MatrixOutput<T, A: Allocator> {
    target: Tensor<T, A>,
    work: Tensor<T, A>,
    ld: usize,
    writeback: bool,
}

impl<T: Copy, A: Allocator> MatrixOutput<T, A> {
    pub fn new(op: &str, t: &Tensor<T, A>) -> Self {
        let (rows, cols, rs, cs) = trailing(t);
        match row_major_ld(rows, cols, rs, cs) {
            Some(ld) => Self {
                target: t.clone(),
                work: t.clone(),
                ld,
                writeback: false,
            },
            None => {
                log::debug!("{op}: computing {rows}x{cols} output with strides ({rs}, {cs}) in a dense temporary");
                Self {
                    target: t.clone(),
                    work: t.deep_clone(),
                    ld: cols.max(1),
                    writeback: true,
                }
            }
        }
    }

    #[inline]
    pub fn ptr(&self) -> *mut T {
        self.work.as_mut_ptr()
    }

    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    pub fn batch_strides(&self) -> Vec<isize> {
        batch_strides(&self.work, 2)
    }

    #[inline]
    pub fn needs_writeback(&self) -> bool {
        self.writeback
    }

    /// Copy the temporary back into the caller's view, if one was made.
    pub fn finish(self) -> Result<()> {
        if self.writeback {
            for (coord, value) in IndexIter::begin(self.work.size()).zip(self.work.iter()) {
                self.target.set(&coord, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_ld() {
        assert_eq!(row_major_ld(3, 4, 4, 1), Some(4));
        assert_eq!(row_major_ld(3, 4, 6, 1), Some(6));
        assert_eq!(row_major_ld(3, 4, 1, 3), None);
        assert_eq!(row_major_ld(3, 4, 3, 1), None);
        assert_eq!(row_major_ld(3, 1, 2, 9), Some(2));
        assert_eq!(row_major_ld(1, 4, 0, 1), Some(4));
        assert_eq!(row_major_ld(0, 4, 0, 1), Some(4));
        assert_eq!(row_major_ld(3, 0, 0, 1), Some(1));
        assert_eq!(row_major_ld(3, 4, -4, 1), None);
    }

    #[test]
    fn test_input_in_place() {
        let a = Tensor::<f64>::zeros(&[2, 3, 4]);
        let op = MatrixInput::new("gemm", &a, Transpose::NoTrans, true);
        assert!(!op.is_copy(&a));
        assert_eq!(op.ld(), 4);
        assert_eq!(op.trans(), Transpose::NoTrans);
        assert_eq!(op.batch_strides(), vec![12]);
    }

    #[test]
    fn test_input_flipped_for_column_major() {
        let a = Tensor::<f64>::zeros(&[2, 4, 3]);
        let t = a.transpose(1, 2).unwrap(); // (2, 3, 4) with strides (12, 1, 3)
        let op = MatrixInput::new("gemm", &t, Transpose::NoTrans, true);
        assert!(!op.is_copy(&t));
        assert_eq!(op.ld(), 3);
        assert_eq!(op.trans(), Transpose::Trans);

        let op = MatrixInput::new("gemm", &t, Transpose::ConjTrans, true);
        assert!(op.is_copy(&t));
        let op = MatrixInput::new("symm", &t, Transpose::NoTrans, false);
        assert!(op.is_copy(&t));
        assert_eq!(op.ld(), 4);
    }

    #[test]
    fn test_output_writeback() {
        let c = Tensor::<f64>::zeros(&[3, 2]);
        let view = c.transpose(0, 1).unwrap();
        let out = MatrixOutput::new("gemm", &view);
        assert!(out.needs_writeback());
        unsafe { *out.ptr().add(1) = 7.0 };
        // Untouched until finished.
        assert_eq!(c.get(&[1, 0]).unwrap(), 0.0);
        out.finish().unwrap();
        assert_eq!(c.get(&[1, 0]).unwrap(), 7.0);
    }
}
