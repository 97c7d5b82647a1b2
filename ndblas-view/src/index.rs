//! Row-major multi-index traversal.

use crate::{Result, TensorError};

/// Mixed-radix counter over a shape, last dimension varying fastest.
///
/// The sequence ends at a canonical sentinel: `coord[0] == size[0]` and every
/// other component is zero. Any zero extent makes [`IndexIter::begin`] equal
/// to [`IndexIter::end`]. A rank-0 shape yields one empty coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexIter {
    size: Vec<usize>,
    coord: Vec<usize>,
    exhausted: bool,
}

impl IndexIter {
    /// First coordinate of `size` (all zeros), or `end` if the shape is empty.
    pub fn begin(size: &[usize]) -> Self {
        if size.iter().any(|&d| d == 0) {
            return Self::end(size);
        }
        Self {
            size: size.to_vec(),
            coord: vec![0; size.len()],
            exhausted: false,
        }
    }

    /// One-past-the-last sentinel.
    pub fn end(size: &[usize]) -> Self {
        let mut coord = vec![0; size.len()];
        if let Some(first) = coord.first_mut() {
            *first = size[0];
        }
        Self {
            size: size.to_vec(),
            coord,
            exhausted: true,
        }
    }

    /// Decode a row-major linear index. Indices past the last element give
    /// `end`.
    pub fn from_offset(size: &[usize], linear: usize) -> Self {
        let total: usize = size.iter().product();
        if linear >= total {
            return Self::end(size);
        }
        let mut coord = vec![0; size.len()];
        let mut rest = linear;
        for i in (0..size.len()).rev() {
            coord[i] = rest % size[i];
            rest /= size[i];
        }
        Self {
            size: size.to_vec(),
            coord,
            exhausted: false,
        }
    }

    /// Start at an explicit coordinate, which must lie inside `size`.
    pub fn from_coord(size: &[usize], coord: &[usize]) -> Result<Self> {
        if coord.len() != size.len() {
            return Err(TensorError::RankMismatch(coord.len(), size.len()));
        }
        for (dim, (&c, &n)) in coord.iter().zip(size.iter()).enumerate() {
            if c >= n {
                return Err(TensorError::IndexOutOfRange {
                    dim,
                    index: c,
                    size: n,
                });
            }
        }
        Ok(Self {
            size: size.to_vec(),
            coord: coord.to_vec(),
            exhausted: false,
        })
    }

    #[inline]
    pub fn size(&self) -> &[usize] {
        &self.size
    }

    #[inline]
    pub fn coord(&self) -> &[usize] {
        &self.coord
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.exhausted
    }

    /// Step to the next coordinate. Overflow of dimension 0 produces `end`;
    /// advancing `end` is a no-op.
    pub fn advance(&mut self) {
        if self.exhausted {
            return;
        }
        for i in (0..self.size.len()).rev() {
            self.coord[i] += 1;
            if self.coord[i] < self.size[i] {
                return;
            }
            if i == 0 {
                break;
            }
            self.coord[i] = 0;
        }
        // Carried out of dimension 0 (or rank 0): park at the sentinel.
        self.exhausted = true;
    }

    /// Element offset of the current coordinate for the given strides.
    #[inline]
    pub fn offset(&self, strides: &[isize]) -> isize {
        self.coord
            .iter()
            .zip(strides.iter())
            .map(|(&i, &s)| i as isize * s)
            .sum()
    }

    /// Row-major linear position; equals the element count at `end`.
    pub fn linear_index(&self) -> usize {
        if self.exhausted {
            return self.size.iter().product();
        }
        self.coord
            .iter()
            .zip(self.size.iter())
            .fold(0, |acc, (&c, &n)| acc * n + c)
    }
}

impl Iterator for IndexIter {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.exhausted {
            return None;
        }
        let current = self.coord.clone();
        self.advance();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total: usize = self.size.iter().product();
        let remaining = total - self.linear_index();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for IndexIter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_2d() {
        let coords: Vec<_> = IndexIter::begin(&[2, 3]).collect();
        assert_eq!(
            coords,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2],
            ]
        );
    }

    #[test]
    fn test_advance_reaches_end() {
        let size = [2, 4, 5];
        let mut it = IndexIter::begin(&size);
        assert_eq!(it.coord(), &[0, 0, 0]);
        for _ in 0..39 {
            it.advance();
        }
        assert_eq!(it.coord(), &[1, 3, 4]);
        it.advance();
        assert_eq!(it, IndexIter::end(&size));
        assert_eq!(it.coord(), &[2, 0, 0]);
    }

    #[test]
    fn test_zero_extent_is_empty() {
        assert_eq!(IndexIter::begin(&[3, 0, 2]), IndexIter::end(&[3, 0, 2]));
        assert_eq!(IndexIter::begin(&[0]).count(), 0);
    }

    #[test]
    fn test_rank_zero() {
        let mut it = IndexIter::begin(&[]);
        assert_ne!(it, IndexIter::end(&[]));
        assert_eq!(it.next(), Some(vec![]));
        assert_eq!(it.next(), None);
        assert_eq!(it, IndexIter::end(&[]));
    }

    #[test]
    fn test_from_offset() {
        let it = IndexIter::from_offset(&[2, 3, 4], 17);
        assert_eq!(it.coord(), &[1, 1, 1]);
        assert_eq!(it.linear_index(), 17);
        assert!(IndexIter::from_offset(&[2, 3], 6).is_end());
    }

    #[test]
    fn test_from_coord_validates() {
        assert!(IndexIter::from_coord(&[2, 3], &[1, 2]).is_ok());
        assert!(matches!(
            IndexIter::from_coord(&[2, 3], &[1, 3]),
            Err(TensorError::IndexOutOfRange { dim: 1, .. })
        ));
        assert!(matches!(
            IndexIter::from_coord(&[2, 3], &[1]),
            Err(TensorError::RankMismatch(1, 2))
        ));
    }

    #[test]
    fn test_offset() {
        let strides = [1, 2];
        let offsets: Vec<isize> = {
            let mut it = IndexIter::begin(&[2, 3]);
            let mut out = vec![];
            while !it.is_end() {
                out.push(it.offset(&strides));
                it.advance();
            }
            out
        };
        assert_eq!(offsets, vec![0, 2, 4, 1, 3, 5]);
    }

    #[test]
    fn test_equality_compares_size() {
        assert_ne!(IndexIter::begin(&[2, 3]), IndexIter::begin(&[3, 2]));
    }

    #[test]
    fn test_completeness() {
        let size = [3, 1, 4, 2];
        let coords: Vec<_> = IndexIter::begin(&size).collect();
        assert_eq!(coords.len(), 24);
        let linear: Vec<usize> = coords
            .iter()
            .map(|c| IndexIter::from_coord(&size, c).unwrap().linear_index())
            .collect();
        assert_eq!(linear, (0..24).collect::<Vec<_>>());
    }

    #[test]
    fn test_exact_size() {
        let mut it = IndexIter::begin(&[2, 5]);
        assert_eq!(it.len(), 10);
        it.next();
        it.next();
        assert_eq!(it.len(), 8);
    }
}
