//! Dynamic-rank strided tensors over shared storage.

use std::fmt;

use ndblas_traits::CastFrom;
use num_traits::Zero;

use crate::index::IndexIter;
use crate::storage::{Allocator, Global, Storage};
use crate::{row_major_strides, validate_bounds, Result, TensorError};

/// A size/stride/offset view over a [`Storage`].
///
/// Element `idx` lives at `offset + Σ idx[i] * stride[i]`. Every view is
/// bounds-checked against its storage when constructed, so element access
/// through a valid multi-index never leaves the buffer.
///
/// `Clone` is shallow: the clone aliases the same storage. Use
/// [`Tensor::deep_clone`] for an independent dense copy.
pub struct Tensor<T, A: Allocator = Global> {
    storage: Storage<T, A>,
    size: Vec<usize>,
    stride: Vec<isize>,
    offset: usize,
}

impl<T, A: Allocator> Clone for Tensor<T, A> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            size: self.size.clone(),
            stride: self.stride.clone(),
            offset: self.offset,
        }
    }
}

impl<T: Copy + fmt::Debug, A: Allocator> fmt::Debug for Tensor<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("size", &self.size)
            .field("stride", &self.stride)
            .field("offset", &self.offset)
            .field("values", &self.to_vec())
            .finish()
    }
}

impl<T, A: Allocator> Tensor<T, A> {
    /// Rank.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.size.len()
    }

    #[inline]
    pub fn size(&self) -> &[usize] {
        &self.size
    }

    pub fn size_at(&self, dim: usize) -> Result<usize> {
        self.check_axis(dim)?;
        Ok(self.size[dim])
    }

    #[inline]
    pub fn stride(&self) -> &[isize] {
        &self.stride
    }

    pub fn stride_at(&self, dim: usize) -> Result<isize> {
        self.check_axis(dim)?;
        Ok(self.stride[dim])
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of logical elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.size.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn storage(&self) -> &Storage<T, A> {
        &self.storage
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        self.storage.allocator()
    }

    /// Pointer to the element at `offset`.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr().wrapping_add(self.offset)
    }

    /// Mutable pointer to the element at `offset`.
    #[inline]
    pub fn as_mut_ptr(&self) -> *mut T {
        self.storage.as_mut_ptr().wrapping_add(self.offset)
    }

    /// Whether the strides are the canonical row-major strides. Dimensions of
    /// extent 1 may carry any stride.
    pub fn is_contiguous(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        dense_block(&self.size, &self.stride)
    }

    /// Whether dimensions `a..=b` form a dense row-major block with unit
    /// innermost stride. Unlike [`Tensor::is_contiguous`], `stride[b]` must be
    /// 1 even when `size[b]` is 1.
    pub fn partial_contiguity(&self, a: usize, b: usize) -> Result<bool> {
        let rank = self.dimension();
        if b >= rank {
            return Err(TensorError::InvalidAxis { axis: b, rank });
        }
        if a > b {
            return Err(TensorError::InvalidAxis { axis: a, rank });
        }
        Ok(self.stride[b] == 1 && dense_block(&self.size[a..=b], &self.stride[a..=b]))
    }

    fn check_axis(&self, dim: usize) -> Result<()> {
        let rank = self.dimension();
        if dim >= rank {
            return Err(TensorError::InvalidAxis { axis: dim, rank });
        }
        Ok(())
    }
}

impl<T: Copy> Tensor<T> {
    /// Row-major tensor of zeros.
    pub fn zeros(size: &[usize]) -> Self
    where
        T: Zero,
    {
        Self::zeros_in(size, Global)
    }

    pub fn full(size: &[usize], value: T) -> Self {
        Self::full_in(size, value, Global)
    }

    /// Row-major tensor over `data`; fails unless `data.len()` matches the shape.
    pub fn from_vec(data: Vec<T>, size: &[usize]) -> Result<Self> {
        Self::from_vec_in(data, size, Global)
    }

    /// Row-major tensor with `f(idx)` at every index.
    pub fn from_fn(size: &[usize], f: impl FnMut(&[usize]) -> T) -> Self {
        Self::from_fn_in(size, f, Global)
    }

    /// Rank-0 tensor holding `value`.
    pub fn scalar(value: T) -> Self {
        Self::full_in(&[], value, Global)
    }
}

impl<T: Copy, A: Allocator> Tensor<T, A> {
    pub fn zeros_in(size: &[usize], alloc: A) -> Self
    where
        T: Zero,
    {
        Self::full_in(size, T::zero(), alloc)
    }

    pub fn full_in(size: &[usize], value: T, alloc: A) -> Self {
        let len = size.iter().product();
        Self::dense(Storage::from_elem_in(len, value, alloc), size)
    }

    pub fn from_vec_in(data: Vec<T>, size: &[usize], alloc: A) -> Result<Self> {
        let len: usize = size.iter().product();
        if data.len() != len {
            return Err(TensorError::ShapeMismatch(vec![data.len()], size.to_vec()));
        }
        Ok(Self::dense(Storage::from_vec_in(data, alloc), size))
    }

    pub fn from_fn_in(size: &[usize], mut f: impl FnMut(&[usize]) -> T, alloc: A) -> Self {
        let values: Vec<T> = IndexIter::begin(size).map(|idx| f(&idx)).collect();
        Self::dense(Storage::from_slice_in(&values, alloc), size)
    }

    /// View `storage` with explicit layout. Fails if any valid index would
    /// address outside the buffer.
    pub fn from_storage(
        storage: Storage<T, A>,
        size: &[usize],
        stride: &[isize],
        offset: usize,
    ) -> Result<Self> {
        validate_bounds(storage.len(), size, stride, offset)?;
        Ok(Self {
            storage,
            size: size.to_vec(),
            stride: stride.to_vec(),
            offset,
        })
    }

    /// Row-major tensor holding `values`, allocated through `alloc`.
    pub(crate) fn from_values_in(values: &[T], size: &[usize], alloc: A) -> Self {
        debug_assert_eq!(values.len(), size.iter().product::<usize>());
        Self::dense(Storage::from_slice_in(values, alloc), size)
    }

    fn dense(storage: Storage<T, A>, size: &[usize]) -> Self {
        Self {
            storage,
            size: size.to_vec(),
            stride: row_major_strides(size),
            offset: 0,
        }
    }

    /// Drop dimension `dim`, fixing it at `pos`.
    pub fn select(&self, dim: usize, pos: usize) -> Result<Self> {
        self.check_axis(dim)?;
        if pos >= self.size[dim] {
            return Err(TensorError::IndexOutOfRange {
                dim,
                index: pos,
                size: self.size[dim],
            });
        }
        let mut size = self.size.clone();
        let mut stride = self.stride.clone();
        size.remove(dim);
        let s = stride.remove(dim);
        Ok(Self {
            storage: self.storage.clone(),
            size,
            stride,
            offset: shift(self.offset, pos, s),
        })
    }

    /// `select(0, pos)`.
    #[inline]
    pub fn at(&self, pos: usize) -> Result<Self> {
        self.select(0, pos)
    }

    /// Fix the leading `coord.len()` dimensions.
    pub fn select_coord(&self, coord: &[usize]) -> Result<Self> {
        if coord.len() > self.dimension() {
            return Err(TensorError::RankMismatch(coord.len(), self.dimension()));
        }
        let mut view = self.clone();
        for &c in coord {
            view = view.select(0, c)?;
        }
        Ok(view)
    }

    /// Restrict dimension `dim` to `pos..pos + len`.
    pub fn narrow(&self, dim: usize, pos: usize, len: usize) -> Result<Self> {
        self.check_axis(dim)?;
        let end = pos.checked_add(len).ok_or(TensorError::OffsetOverflow)?;
        if end > self.size[dim] {
            return Err(TensorError::IndexOutOfRange {
                dim,
                index: end,
                size: self.size[dim],
            });
        }
        let mut view = self.clone();
        view.size[dim] = len;
        if len > 0 {
            view.offset = shift(self.offset, pos, self.stride[dim]);
        }
        Ok(view)
    }

    /// Swap two dimensions.
    pub fn transpose(&self, d0: usize, d1: usize) -> Result<Self> {
        self.check_axis(d0)?;
        self.check_axis(d1)?;
        let mut view = self.clone();
        view.size.swap(d0, d1);
        view.stride.swap(d0, d1);
        Ok(view)
    }

    /// Reorder dimensions: result dimension `i` is source dimension `perm[i]`.
    pub fn permute(&self, perm: &[usize]) -> Result<Self> {
        let rank = self.dimension();
        if perm.len() != rank {
            return Err(TensorError::RankMismatch(perm.len(), rank));
        }
        let mut seen = vec![false; rank];
        for &p in perm {
            if p >= rank || seen[p] {
                return Err(TensorError::InvalidAxis { axis: p, rank });
            }
            seen[p] = true;
        }
        Ok(Self {
            storage: self.storage.clone(),
            size: perm.iter().map(|&p| self.size[p]).collect(),
            stride: perm.iter().map(|&p| self.stride[p]).collect(),
            offset: self.offset,
        })
    }

    /// Reinterpret the same storage with a new layout. Missing strides default
    /// to row-major, a missing offset keeps the current one.
    pub fn view(
        &self,
        size: &[usize],
        stride: Option<&[isize]>,
        offset: Option<usize>,
    ) -> Result<Self> {
        let stride = match stride {
            Some(s) => s.to_vec(),
            None => row_major_strides(size),
        };
        let offset = offset.unwrap_or(self.offset);
        validate_bounds(self.storage.len(), size, &stride, offset)?;
        Ok(Self {
            storage: self.storage.clone(),
            size: size.to_vec(),
            stride,
            offset,
        })
    }

    /// Alias with a new shape. Requires a contiguous tensor.
    pub fn reshape(&self, size: &[usize]) -> Result<Self> {
        let len: usize = size.iter().product();
        if len != self.len() {
            return Err(TensorError::ShapeMismatch(self.size.clone(), size.to_vec()));
        }
        if !self.is_contiguous() {
            return Err(TensorError::NonContiguousReshape {
                size: self.size.clone(),
                stride: self.stride.clone(),
                target: size.to_vec(),
            });
        }
        Ok(Self {
            storage: self.storage.clone(),
            size: size.to_vec(),
            stride: row_major_strides(size),
            offset: self.offset,
        })
    }

    /// [`Tensor::reshape`], copying first if the tensor is not contiguous.
    pub fn reshape_or_copy(&self, size: &[usize]) -> Result<Self> {
        if self.is_contiguous() {
            self.reshape(size)
        } else {
            log::debug!("reshape_or_copy: copying non-contiguous {:?} to reshape", self.size);
            self.deep_clone().reshape(size)
        }
    }

    /// Dense row-major copy into fresh storage from the same allocator.
    pub fn deep_clone(&self) -> Self {
        let values = self.to_vec();
        let storage = Storage::from_slice_in(&values, self.allocator().clone());
        Self::dense(storage, &self.size)
    }

    /// Element-wise converting assignment from a tensor of identical shape.
    pub fn copy_from<U: Copy, B: Allocator>(&self, other: &Tensor<U, B>) -> Result<()>
    where
        T: CastFrom<U>,
    {
        if self.dimension() != other.dimension() {
            return Err(TensorError::RankMismatch(self.dimension(), other.dimension()));
        }
        if self.size != other.size {
            return Err(TensorError::ShapeMismatch(
                self.size.clone(),
                other.size.clone(),
            ));
        }
        let mut it = IndexIter::begin(&self.size);
        while !it.is_end() {
            let dst = self.offset_of(&it);
            let src = other.offset_of(&it);
            // SAFETY: both views were bounds-checked at construction.
            unsafe { self.storage.write(dst, T::cast_from(other.storage.read(src))) };
            it.advance();
        }
        Ok(())
    }

    pub fn get(&self, idx: &[usize]) -> Result<T> {
        let pos = self.checked_offset(idx)?;
        // SAFETY: in-bounds index of a validated view.
        Ok(unsafe { self.storage.read(pos) })
    }

    pub fn set(&self, idx: &[usize], value: T) -> Result<()> {
        let pos = self.checked_offset(idx)?;
        // SAFETY: in-bounds index of a validated view.
        unsafe { self.storage.write(pos, value) };
        Ok(())
    }

    /// The only element of a one-element tensor.
    pub fn item(&self) -> Result<T> {
        if self.len() != 1 {
            return Err(TensorError::ShapeMismatch(self.size.clone(), vec![]));
        }
        // SAFETY: every index is 0, so the element sits at `offset`.
        Ok(unsafe { self.storage.read(self.offset) })
    }

    pub fn fill(&self, value: T) {
        let mut it = IndexIter::begin(&self.size);
        while !it.is_end() {
            // SAFETY: in-bounds index of a validated view.
            unsafe { self.storage.write(self.offset_of(&it), value) };
            it.advance();
        }
    }

    /// Values in row-major index order.
    pub fn iter(&self) -> TensorIter<'_, T, A> {
        TensorIter {
            tensor: self,
            index: IndexIter::begin(&self.size),
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Storage position of the iterator's current coordinate.
    #[inline]
    pub(crate) fn offset_of(&self, it: &IndexIter) -> usize {
        (self.offset as isize + it.offset(&self.stride)) as usize
    }

    fn checked_offset(&self, idx: &[usize]) -> Result<usize> {
        if idx.len() != self.dimension() {
            return Err(TensorError::RankMismatch(idx.len(), self.dimension()));
        }
        let mut pos = self.offset as isize;
        for (dim, ((&i, &n), &s)) in idx
            .iter()
            .zip(self.size.iter())
            .zip(self.stride.iter())
            .enumerate()
        {
            if i >= n {
                return Err(TensorError::IndexOutOfRange {
                    dim,
                    index: i,
                    size: n,
                });
            }
            pos += i as isize * s;
        }
        Ok(pos as usize)
    }
}

/// Offset after stepping `pos` elements of stride `stride`. Valid for
/// positions inside a bounds-checked view.
#[inline]
fn shift(offset: usize, pos: usize, stride: isize) -> usize {
    (offset as isize + pos as isize * stride) as usize
}

/// Row-major density of a block of dimensions, ignoring extents of 1.
fn dense_block(size: &[usize], stride: &[isize]) -> bool {
    let mut expected = 1isize;
    for (&n, &s) in size.iter().zip(stride.iter()).rev() {
        if n > 1 && s != expected {
            return false;
        }
        expected *= n as isize;
    }
    true
}

/// Iterator over a tensor's values in row-major index order.
pub struct TensorIter<'a, T, A: Allocator = Global> {
    tensor: &'a Tensor<T, A>,
    index: IndexIter,
}

impl<T: Copy, A: Allocator> Iterator for TensorIter<'_, T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.index.is_end() {
            return None;
        }
        let pos = self.tensor.offset_of(&self.index);
        self.index.advance();
        // SAFETY: in-bounds index of a validated view.
        Some(unsafe { self.tensor.storage.read(pos) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.index.size_hint()
    }
}

impl<T: Copy, A: Allocator> ExactSizeIterator for TensorIter<'_, T, A> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TrackingAllocator;
    use num_complex::Complex64;

    fn iota(size: &[usize]) -> Tensor<f64> {
        let mut k = 0.0;
        Tensor::from_fn(size, |_| {
            k += 1.0;
            k - 1.0
        })
    }

    #[test]
    fn test_contiguous_3x4() {
        let a = Tensor::<f64>::zeros(&[3, 4]);
        assert_eq!(a.stride(), &[4, 1]);
        assert!(a.is_contiguous());
        assert!(a.partial_contiguity(0, 1).unwrap());
    }

    #[test]
    fn test_transposed_not_contiguous() {
        let a = iota(&[3, 4]);
        let t = a.transpose(0, 1).unwrap();
        assert_eq!(t.size(), &[4, 3]);
        assert_eq!(t.stride(), &[1, 4]);
        assert!(!t.is_contiguous());
        assert!(!t.partial_contiguity(0, 1).unwrap());
        assert!(!t.partial_contiguity(1, 1).unwrap());
        assert_eq!(t.get(&[1, 2]).unwrap(), a.get(&[2, 1]).unwrap());
    }

    #[test]
    fn test_partial_contiguity_inner_block() {
        // Rows of a wider buffer: the inner dimension is dense, the pair is not.
        let base = iota(&[4, 6]);
        let sub = base.narrow(1, 1, 3).unwrap();
        assert!(!sub.is_contiguous());
        assert!(sub.partial_contiguity(1, 1).unwrap());
        assert!(!sub.partial_contiguity(0, 1).unwrap());
        assert!(sub.partial_contiguity(1, 0).is_err());
        assert!(sub.partial_contiguity(0, 2).is_err());
    }

    #[test]
    fn test_unit_extent_ignored() {
        let a = Tensor::from_storage(Storage::<f64>::new(4), &[1, 4], &[99, 1], 0).unwrap();
        assert!(a.is_contiguous());
    }

    fn layout<T, A: Allocator>(t: &Tensor<T, A>) -> (usize, Vec<usize>, Vec<isize>, bool) {
        (t.dimension(), t.size().to_vec(), t.stride().to_vec(), t.is_contiguous())
    }

    #[test]
    fn test_layout_accessors_for_any_element() {
        let a = iota(&[2, 3]).transpose(0, 1).unwrap();
        assert_eq!(layout(&a), (2, vec![3, 2], vec![1, 3], false));
    }

    #[test]
    fn test_partial_contiguity_needs_unit_inner_stride() {
        let a = Tensor::from_storage(Storage::<f64>::new(8), &[4, 1], &[1, 2], 0).unwrap();
        assert!(!a.partial_contiguity(0, 1).unwrap());
        assert!(!a.partial_contiguity(1, 1).unwrap());
        assert!(a.partial_contiguity(0, 0).unwrap());
    }

    #[test]
    fn test_select_and_at() {
        let a = iota(&[2, 3, 4]);
        let s = a.select(1, 2).unwrap();
        assert_eq!(s.size(), &[2, 4]);
        assert_eq!(s.get(&[1, 3]).unwrap(), a.get(&[1, 2, 3]).unwrap());
        let row = a.at(1).unwrap();
        assert_eq!(row.offset(), 12);
        assert!(a.select(3, 0).is_err());
        assert!(matches!(
            a.select(1, 3),
            Err(TensorError::IndexOutOfRange { dim: 1, index: 3, size: 3 })
        ));
    }

    #[test]
    fn test_select_coord() {
        let a = iota(&[2, 3, 4]);
        let m = a.select_coord(&[1, 2]).unwrap();
        assert_eq!(m.size(), &[4]);
        assert_eq!(m.to_vec(), vec![20.0, 21.0, 22.0, 23.0]);
        assert!(a.select_coord(&[0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_narrow() {
        let a = iota(&[5]);
        let n = a.narrow(0, 1, 3).unwrap();
        assert_eq!(n.to_vec(), vec![1.0, 2.0, 3.0]);
        assert!(a.narrow(0, 3, 3).is_err());
        assert!(a.narrow(0, 5, 0).unwrap().is_empty());
    }

    #[test]
    fn test_permute() {
        let a = iota(&[2, 3, 4]);
        let p = a.permute(&[2, 0, 1]).unwrap();
        assert_eq!(p.size(), &[4, 2, 3]);
        assert_eq!(p.stride(), &[1, 12, 4]);
        assert_eq!(p.get(&[3, 1, 2]).unwrap(), a.get(&[1, 2, 3]).unwrap());
        assert!(a.permute(&[0, 0, 1]).is_err());
        assert!(a.permute(&[0, 1]).is_err());
    }

    #[test]
    fn test_view_bounds_checked() {
        let a = iota(&[6]);
        let v = a.view(&[2, 2], Some(&[1, 2]), Some(1)).unwrap();
        assert_eq!(v.to_vec(), vec![1.0, 3.0, 2.0, 4.0]);
        assert!(matches!(
            a.view(&[2, 4], None, None),
            Err(TensorError::StorageBounds { .. })
        ));
    }

    #[test]
    fn test_reshape() {
        let a = iota(&[2, 6]);
        let r = a.reshape(&[3, 4]).unwrap();
        assert!(r.storage().ptr_eq(a.storage()));
        assert_eq!(r.get(&[2, 1]).unwrap(), 9.0);
        assert!(matches!(
            a.reshape(&[5]),
            Err(TensorError::ShapeMismatch(..))
        ));

        let t = a.transpose(0, 1).unwrap();
        let err = t.reshape(&[12]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Domain);
        let copied = t.reshape_or_copy(&[12]).unwrap();
        assert!(!copied.storage().ptr_eq(a.storage()));
        assert_eq!(copied.to_vec(), t.to_vec());
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let a = iota(&[3, 4]);
        let t = a.transpose(0, 1).unwrap();
        let c = t.deep_clone();
        assert!(c.is_contiguous());
        assert_eq!(c.size(), t.size());
        assert_eq!(c.to_vec(), t.to_vec());
        c.set(&[0, 0], 100.0).unwrap();
        assert_eq!(a.get(&[0, 0]).unwrap(), 0.0);
    }

    #[test]
    fn test_aliases_share_writes() {
        let a = iota(&[2, 2]);
        let b = a.clone();
        b.set(&[1, 0], -5.0).unwrap();
        assert_eq!(a.get(&[1, 0]).unwrap(), -5.0);
    }

    #[test]
    fn test_copy_from_converts() {
        let src = Tensor::from_vec(vec![1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let dst = Tensor::<Complex64>::zeros(&[2, 2]);
        dst.transpose(0, 1)
            .unwrap()
            .copy_from(&src)
            .unwrap();
        assert_eq!(dst.get(&[0, 1]).unwrap(), Complex64::new(3.0, 0.0));
        assert!(matches!(
            dst.copy_from(&Tensor::<f32>::zeros(&[4])),
            Err(TensorError::RankMismatch(2, 1))
        ));
        assert!(matches!(
            dst.copy_from(&Tensor::<f32>::zeros(&[2, 3])),
            Err(TensorError::ShapeMismatch(..))
        ));
    }

    #[test]
    fn test_get_set_checks() {
        let a = Tensor::<f64>::zeros(&[2, 3]);
        assert!(matches!(a.get(&[0]), Err(TensorError::RankMismatch(1, 2))));
        assert!(matches!(
            a.set(&[0, 3], 1.0),
            Err(TensorError::IndexOutOfRange { dim: 1, .. })
        ));
    }

    #[test]
    fn test_item_and_scalar() {
        let s = Tensor::scalar(4.5f64);
        assert_eq!(s.dimension(), 0);
        assert_eq!(s.len(), 1);
        assert_eq!(s.item().unwrap(), 4.5);
        assert_eq!(s.to_vec(), vec![4.5]);
        assert!(iota(&[2]).item().is_err());
        assert_eq!(iota(&[1, 1]).item().unwrap(), 0.0);
    }

    #[test]
    fn test_fill_through_view() {
        let a = Tensor::<f64>::zeros(&[3, 3]);
        a.select(1, 1).unwrap().fill(7.0);
        assert_eq!(
            a.to_vec(),
            vec![0.0, 7.0, 0.0, 0.0, 7.0, 0.0, 0.0, 7.0, 0.0]
        );
    }

    #[test]
    fn test_from_vec_length_check() {
        assert!(Tensor::from_vec(vec![1.0f64; 5], &[2, 3]).is_err());
    }

    #[test]
    fn test_tracking_allocator_through_views() {
        let alloc = TrackingAllocator::new();
        {
            let a = Tensor::<f64, _>::zeros_in(&[4, 4], alloc.clone());
            let v = a.transpose(0, 1).unwrap();
            let c = v.deep_clone();
            assert_eq!(alloc.stats().live_buffers, 2);
            drop(a);
            assert_eq!(alloc.stats().live_buffers, 2);
            drop(v);
            assert_eq!(alloc.stats().live_buffers, 1);
            drop(c);
        }
        assert_eq!(alloc.stats().live_buffers, 0);
    }

    #[test]
    fn test_negative_stride_view() {
        let a = iota(&[4]);
        let rev = a.view(&[4], Some(&[-1]), Some(3)).unwrap();
        assert_eq!(rev.to_vec(), vec![3.0, 2.0, 1.0, 0.0]);
        assert_eq!(rev.select(0, 3).unwrap().item().unwrap(), 0.0);
    }
}
