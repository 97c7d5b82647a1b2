//! Flat, reference-counted element buffers.
//!
//! A [`Storage`] is a contiguous run of elements shared by every tensor that
//! views it. Cloning a storage creates another alias of the same buffer; the
//! buffer is released through its [`Allocator`] when the last alias drops.
//!
//! Element access goes through raw pointers with `T: Copy`, in the manner of
//! `Cell`: a shared handle may read and write, and no reference into the
//! buffer outlives a single call.

use std::cell::Cell;
use std::fmt;
use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};
use std::rc::Rc;

use ndblas_traits::CastFrom;
use num_traits::Zero;

use crate::{Result, TensorError};

/// Minimal allocator interface used by [`Storage`].
pub trait Allocator: Clone + Default + fmt::Debug + 'static {
    /// Allocate `len` elements initialized to `fill`.
    fn allocate<T: Clone>(&self, len: usize, fill: T) -> Vec<T>;

    /// Release a buffer previously returned by [`Allocator::allocate`].
    fn deallocate<T>(&self, buffer: Vec<T>);
}

/// The system heap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

impl Allocator for Global {
    #[inline]
    fn allocate<T: Clone>(&self, len: usize, fill: T) -> Vec<T> {
        vec![fill; len]
    }

    #[inline]
    fn deallocate<T>(&self, buffer: Vec<T>) {
        drop(buffer);
    }
}

/// Counters recorded by [`TrackingAllocator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    pub allocations: usize,
    pub deallocations: usize,
    pub live_buffers: usize,
    pub live_elements: usize,
}

/// Heap allocator that counts live buffers.
///
/// Clones share one set of counters, so a test can keep a handle and watch
/// storages allocated through its clones.
#[derive(Debug, Clone, Default)]
pub struct TrackingAllocator {
    stats: Rc<Cell<AllocStats>>,
}

impl TrackingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> AllocStats {
        self.stats.get()
    }

    fn update(&self, f: impl FnOnce(&mut AllocStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

impl Allocator for TrackingAllocator {
    fn allocate<T: Clone>(&self, len: usize, fill: T) -> Vec<T> {
        self.update(|s| {
            s.allocations += 1;
            s.live_buffers += 1;
            s.live_elements += len;
        });
        vec![fill; len]
    }

    fn deallocate<T>(&self, buffer: Vec<T>) {
        let len = buffer.len();
        self.update(|s| {
            s.deallocations += 1;
            s.live_buffers = s.live_buffers.saturating_sub(1);
            s.live_elements = s.live_elements.saturating_sub(len);
        });
        drop(buffer);
    }
}

/// Who releases the buffer when the last alias drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ownership {
    /// Returned by the allocator; handed back to it.
    Allocated { capacity: usize },
    /// A caller's `Vec`; dropped normally.
    Adopted { capacity: usize },
    /// Borrowed memory (or the empty buffer); never freed.
    Foreign,
}

struct Inner<T, A: Allocator> {
    ptr: NonNull<T>,
    len: usize,
    ownership: Ownership,
    alloc: A,
}

impl<T, A: Allocator> Inner<T, A> {
    fn from_vec(data: Vec<T>, alloc: A, allocated: bool) -> Self {
        let mut data = ManuallyDrop::new(data);
        let len = data.len();
        let capacity = data.capacity();
        // SAFETY: Vec's buffer pointer is never null (dangling when empty).
        let ptr = unsafe { NonNull::new_unchecked(data.as_mut_ptr()) };
        let ownership = if allocated {
            Ownership::Allocated { capacity }
        } else {
            Ownership::Adopted { capacity }
        };
        Self {
            ptr,
            len,
            ownership,
            alloc,
        }
    }

    fn empty(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            ownership: Ownership::Foreign,
            alloc,
        }
    }
}

impl<T, A: Allocator> Drop for Inner<T, A> {
    fn drop(&mut self) {
        match self.ownership {
            Ownership::Foreign => {}
            Ownership::Allocated { capacity } => {
                // SAFETY: ptr/len/capacity came from a Vec in `Inner::from_vec`.
                let buffer = unsafe { Vec::from_raw_parts(self.ptr.as_ptr(), self.len, capacity) };
                self.alloc.deallocate(buffer);
            }
            Ownership::Adopted { capacity } => {
                // SAFETY: as above.
                drop(unsafe { Vec::from_raw_parts(self.ptr.as_ptr(), self.len, capacity) });
            }
        }
    }
}

/// Reference-counted flat buffer of `T`.
///
/// `Clone` creates an alias: both handles address the same elements.
pub struct Storage<T, A: Allocator = Global> {
    inner: Rc<Inner<T, A>>,
}

impl<T, A: Allocator> Clone for Storage<T, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, A: Allocator> Storage<T, A> {
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        &self.inner.alloc
    }

    /// Pointer to the first element, or null for an empty buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        if self.is_empty() {
            ptr::null()
        } else {
            self.inner.ptr.as_ptr()
        }
    }

    /// Mutable pointer to the first element, or null for an empty buffer.
    #[inline]
    pub fn as_mut_ptr(&self) -> *mut T {
        if self.is_empty() {
            ptr::null_mut()
        } else {
            self.inner.ptr.as_ptr()
        }
    }

    /// Whether the buffer is released when the last alias drops.
    pub fn owns_memory(&self) -> bool {
        self.inner.ownership != Ownership::Foreign
    }

    /// Number of live aliases of this buffer.
    pub fn alias_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Whether both handles alias the same buffer.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Copy> Storage<T> {
    /// Zero-filled buffer of `len` elements on the global heap.
    pub fn new(len: usize) -> Self
    where
        T: Zero,
    {
        Self::new_in(len, Global)
    }

    pub fn from_elem(len: usize, value: T) -> Self {
        Self::from_elem_in(len, value, Global)
    }

    pub fn from_vec(data: Vec<T>) -> Self {
        Self::from_vec_in(data, Global)
    }

    /// Adopt a buffer owned by someone else. It is never freed by the storage.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `len` elements for as long
    /// as any alias of the returned storage (or a view of it) is alive, and
    /// must not be accessed through other references in the meantime.
    pub unsafe fn from_raw_parts(ptr: *mut T, len: usize) -> Self {
        Self::from_raw_parts_in(ptr, len, Global)
    }
}

impl<T: Copy, A: Allocator> Storage<T, A> {
    pub fn new_in(len: usize, alloc: A) -> Self
    where
        T: Zero,
    {
        Self::from_elem_in(len, T::zero(), alloc)
    }

    pub fn from_elem_in(len: usize, value: T, alloc: A) -> Self {
        if len == 0 {
            return Self {
                inner: Rc::new(Inner::empty(alloc)),
            };
        }
        let data = alloc.allocate(len, value);
        Self {
            inner: Rc::new(Inner::from_vec(data, alloc, true)),
        }
    }

    /// Copy `values` into a buffer obtained from `alloc`.
    pub fn from_slice_in(values: &[T], alloc: A) -> Self {
        match values.first() {
            Some(&first) => {
                let storage = Self::from_elem_in(values.len(), first, alloc);
                // SAFETY: the buffer holds values.len() elements and no
                // other alias exists yet.
                unsafe {
                    ptr::copy_nonoverlapping(values.as_ptr(), storage.as_mut_ptr(), values.len());
                }
                storage
            }
            None => Self {
                inner: Rc::new(Inner::empty(alloc)),
            },
        }
    }

    /// Take ownership of `data`. The vector is dropped normally, not returned
    /// to `alloc`, when the last alias goes away.
    pub fn from_vec_in(data: Vec<T>, alloc: A) -> Self {
        Self {
            inner: Rc::new(Inner::from_vec(data, alloc, false)),
        }
    }

    /// # Safety
    ///
    /// See [`Storage::from_raw_parts`].
    pub unsafe fn from_raw_parts_in(ptr: *mut T, len: usize, alloc: A) -> Self {
        let inner = match NonNull::new(ptr) {
            Some(ptr) if len > 0 => Inner {
                ptr,
                len,
                ownership: Ownership::Foreign,
                alloc,
            },
            _ => Inner::empty(alloc),
        };
        Self {
            inner: Rc::new(inner),
        }
    }

    pub fn get(&self, index: usize) -> Result<T> {
        self.check(index)?;
        // SAFETY: bounds-checked.
        Ok(unsafe { self.read(index) })
    }

    pub fn set(&self, index: usize, value: T) -> Result<()> {
        self.check(index)?;
        // SAFETY: bounds-checked.
        unsafe { self.write(index, value) };
        Ok(())
    }

    /// # Safety
    ///
    /// `index < self.len()`.
    #[inline(always)]
    pub unsafe fn read(&self, index: usize) -> T {
        debug_assert!(index < self.len());
        *self.inner.ptr.as_ptr().add(index)
    }

    /// # Safety
    ///
    /// `index < self.len()`.
    #[inline(always)]
    pub unsafe fn write(&self, index: usize, value: T) {
        debug_assert!(index < self.len());
        *self.inner.ptr.as_ptr().add(index) = value;
    }

    pub fn to_vec(&self) -> Vec<T> {
        (0..self.len()).map(|i| unsafe { self.read(i) }).collect()
    }

    pub fn fill(&self, value: T) {
        for i in 0..self.len() {
            // SAFETY: i < len.
            unsafe { self.write(i, value) };
        }
    }

    /// Replace this handle's buffer with `len` zeros. Other aliases keep the
    /// old buffer.
    pub fn resize(&mut self, len: usize)
    where
        T: Zero,
    {
        self.resize_with(len, T::zero());
    }

    /// Replace this handle's buffer with `len` copies of `value`.
    pub fn resize_with(&mut self, len: usize, value: T) {
        let alloc = self.allocator().clone();
        *self = Self::from_elem_in(len, value, alloc);
    }

    /// Element-wise converting copy of the first `min(len, other.len)`
    /// elements.
    pub fn copy_from<U: Copy, B: Allocator>(&self, other: &Storage<U, B>)
    where
        T: CastFrom<U>,
    {
        let n = self.len().min(other.len());
        for i in 0..n {
            // SAFETY: i < min(len, other.len).
            unsafe { self.write(i, T::cast_from(other.read(i))) };
        }
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(TensorError::IndexOutOfRange {
                dim: 0,
                index,
                size: self.len(),
            });
        }
        Ok(())
    }
}

impl<T, A: Allocator> fmt::Debug for Storage<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("len", &self.inner.len)
            .field("ownership", &self.inner.ownership)
            .field("aliases", &Rc::strong_count(&self.inner))
            .finish()
    }
}
