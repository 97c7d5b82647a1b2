//! Reference-counted storage and dynamic-rank strided tensor views.
//!
//! # Core Types
//!
//! - [`Storage`]: a flat, reference-counted element buffer with an [`Allocator`]
//! - [`Tensor`]: a size/stride/offset view over a shared [`Storage`]
//! - [`IndexIter`]: row-major multi-index traversal with a canonical end sentinel
//!
//! Many tensors may alias one storage: sub-views, transposes and batch slices
//! share the buffer and differ only in `size`, `stride` and `offset`. Writes
//! through one alias are visible through every other. Both types are
//! `!Send`/`!Sync`, so aliased mutation cannot cross threads; use
//! [`Tensor::deep_clone`] to obtain an independent copy.
//!
//! # Example
//!
//! ```rust
//! use ndblas_view::Tensor;
//!
//! let a = Tensor::<f64>::from_fn(&[3, 4], |idx| (idx[0] * 4 + idx[1]) as f64);
//! assert!(a.is_contiguous());
//!
//! // Zero-copy transpose and row selection share the same storage.
//! let t = a.transpose(0, 1).unwrap();
//! assert!(!t.is_contiguous());
//! let row = a.at(2).unwrap();
//! assert_eq!(row.to_vec(), vec![8.0, 9.0, 10.0, 11.0]);
//!
//! // Writes are visible through every alias.
//! row.set(&[0], -1.0).unwrap();
//! assert_eq!(t.get(&[0, 2]).unwrap(), -1.0);
//! ```

pub mod create;
pub mod index;
pub mod math;
pub mod serialize;
pub mod storage;
pub mod tensor;

pub use index::IndexIter;
pub use storage::{AllocStats, Allocator, Global, Storage, TrackingAllocator};
pub use tensor::{TensorIter, Tensor};

pub use ndblas_traits::{CastFrom, ElementKind, Scalar};

/// Errors that can occur during storage and view operations.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// Position past the extent of a dimension (or storage length).
    #[error("index {index} out of range for dimension {dim} of size {size}")]
    IndexOutOfRange {
        dim: usize,
        index: usize,
        size: usize,
    },

    /// Invalid axis index for the given rank.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// Ranks do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Shapes are incompatible for the operation.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Stride array length doesn't match the size array.
    #[error("stride and size length mismatch: {sizes} sizes, {strides} strides")]
    StrideLengthMismatch { sizes: usize, strides: usize },

    /// The view would address elements outside its storage.
    #[error("view addresses [{min}, {max}] outside storage of length {len}")]
    StorageBounds { min: isize, max: isize, len: usize },

    /// Integer overflow while computing a view's extent.
    #[error("offset overflow while computing view extent")]
    OffsetOverflow,

    /// A reduction with no identity was applied to an empty tensor.
    #[error("`{op}` on an empty tensor")]
    Empty { op: &'static str },

    /// The operation has no meaning for this element kind.
    #[error("`{op}` is undefined for {kind} elements")]
    Undefined { op: &'static str, kind: ElementKind },

    /// Reshape cannot alias the storage of a non-contiguous view.
    #[error("cannot reshape non-contiguous view {size:?} (strides {stride:?}) to {target:?} without a copy")]
    NonContiguousReshape {
        size: Vec<usize>,
        stride: Vec<isize>,
        target: Vec<usize>,
    },

    /// Structurally invalid input, independent of sizes.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A serialized stream could not be decoded.
    #[error("malformed tensor stream: {0}")]
    Format(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Error taxonomy shared by every ndblas crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Shape, size or index mismatch detected before mutation.
    OutOfRange,
    /// Operation undefined for the operand's element kind or layout.
    Domain,
    /// Structurally nonsensical input.
    InvalidArgument,
    /// Failure of the underlying byte stream.
    Io,
}

impl TensorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TensorError::IndexOutOfRange { .. }
            | TensorError::InvalidAxis { .. }
            | TensorError::RankMismatch(..)
            | TensorError::ShapeMismatch(..)
            | TensorError::StrideLengthMismatch { .. }
            | TensorError::StorageBounds { .. }
            | TensorError::OffsetOverflow
            | TensorError::Empty { .. } => ErrorKind::OutOfRange,
            TensorError::Undefined { .. }
            | TensorError::NonContiguousReshape { .. }
            | TensorError::Format(_) => ErrorKind::Domain,
            TensorError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            TensorError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type for storage and view operations.
pub type Result<T> = std::result::Result<T, TensorError>;

/// Compute row-major strides (C default: last index varies fastest).
pub fn row_major_strides(size: &[usize]) -> Vec<isize> {
    let rank = size.len();
    if rank == 0 {
        return vec![];
    }
    let mut strides = vec![1isize; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * size[i + 1] as isize;
    }
    strides
}

/// Validate that all accessed offsets stay within `[0, len)`.
pub(crate) fn validate_bounds(
    len: usize,
    size: &[usize],
    stride: &[isize],
    offset: usize,
) -> Result<()> {
    if size.len() != stride.len() {
        return Err(TensorError::StrideLengthMismatch {
            sizes: size.len(),
            strides: stride.len(),
        });
    }
    // Empty view - no access needed
    if size.iter().any(|&d| d == 0) {
        return Ok(());
    }
    let (min_offset, max_offset) = extent(size, stride, offset)?;
    if min_offset < 0 || max_offset as usize >= len {
        return Err(TensorError::StorageBounds {
            min: min_offset,
            max: max_offset,
            len,
        });
    }
    Ok(())
}

/// Lowest and highest storage offsets addressed by a non-empty view.
pub(crate) fn extent(size: &[usize], stride: &[isize], offset: usize) -> Result<(isize, isize)> {
    let base = isize::try_from(offset).map_err(|_| TensorError::OffsetOverflow)?;
    let mut min_offset = base;
    let mut max_offset = base;
    for (&dim, &s) in size.iter().zip(stride.iter()) {
        if dim > 1 {
            let end = s
                .checked_mul(dim as isize - 1)
                .ok_or(TensorError::OffsetOverflow)?;
            if end >= 0 {
                max_offset = max_offset
                    .checked_add(end)
                    .ok_or(TensorError::OffsetOverflow)?;
            } else {
                min_offset = min_offset
                    .checked_add(end)
                    .ok_or(TensorError::OffsetOverflow)?;
            }
        }
    }
    Ok((min_offset, max_offset))
}
