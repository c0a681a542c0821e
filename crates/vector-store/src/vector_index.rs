use crate::error::{Result, VectorStoreError};

/// Exact nearest-neighbor index over fixed-dimension vectors.
///
/// Vectors are stored contiguously in insertion order; the position of a
/// vector is its identifier. Search is a brute-force scan by Euclidean
/// distance.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Rebuild an index from a flat buffer of `len * dimension` floats.
    pub(crate) fn from_flat(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 || data.len() % dimension != 0 {
            return Err(VectorStoreError::CorruptSnapshot(format!(
                "{} floats cannot hold vectors of dimension {dimension}",
                data.len()
            )));
        }
        Ok(Self { dimension, data })
    }

    pub(crate) fn as_flat(&self) -> &[f32] {
        &self.data
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Validate a vector against the index dimension without touching state.
    pub fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Append a vector; its position is the previous size.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        self.check_dimension(vector)?;
        let position = self.len();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    /// Search for the k nearest vectors.
    /// Returns (position, distance) sorted by distance ascending, ties by position.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        self.check_dimension(query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut distances: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| (position, euclidean_distance(query, vector)))
            .collect();

        distances.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        distances.truncate(k);

        Ok(distances)
    }

    /// Vector stored at `position`, if any
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.data.get(start..end)
    }

    /// Get number of vectors in index
    #[must_use]
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    /// Check if index is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_search() {
        let mut index = VectorIndex::new(3);

        assert_eq!(index.add(&[1.0, 0.0, 0.0]).unwrap(), 0);
        assert_eq!(index.add(&[0.9, 0.1, 0.0]).unwrap(), 1);
        assert_eq!(index.add(&[0.0, 1.0, 0.0]).unwrap(), 2);

        assert_eq!(index.len(), 3);

        let results = index.search(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);

        // Exact match first, at distance zero
        assert_eq!(results[0], (0, 0.0));

        assert_eq!(results[1].0, 1);
        assert!((results[1].1 - 0.02_f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = VectorIndex::new(3);
        let result = index.add(&[1.0, 0.0]);
        assert!(matches!(
            result,
            Err(VectorStoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(index.is_empty());

        index.add(&[1.0, 0.0, 0.0]).unwrap();
        assert!(index.search(&[1.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_empty_index_returns_nothing() {
        let index = VectorIndex::new(2);
        assert!(index.search(&[0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_k_larger_than_len_returns_all_ordered() {
        let mut index = VectorIndex::new(1);
        for x in [5.0, 1.0, 3.0] {
            index.add(&[x]).unwrap();
        }
        let results = index.search(&[0.0], 10).unwrap();
        let positions: Vec<usize> = results.iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![1, 2, 0]);
    }

    #[test]
    fn test_ties_broken_by_position() {
        let mut index = VectorIndex::new(2);
        index.add(&[0.0, 1.0]).unwrap();
        index.add(&[1.0, 0.0]).unwrap();
        index.add(&[0.0, -1.0]).unwrap();
        index.add(&[0.0, 1.0]).unwrap();

        let results = index.search(&[0.0, 0.0], 4).unwrap();
        let positions: Vec<usize> = results.iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_zero_k() {
        let mut index = VectorIndex::new(1);
        index.add(&[1.0]).unwrap();
        assert!(index.search(&[1.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_from_flat_rejects_ragged_buffer() {
        assert!(VectorIndex::from_flat(3, vec![0.0; 7]).is_err());
        let index = VectorIndex::from_flat(3, vec![0.0; 6]).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(1), Some(&[0.0, 0.0, 0.0][..]));
        assert_eq!(index.get(2), None);
    }

    #[test]
    fn test_get_far_out_of_range() {
        let index = VectorIndex::from_flat(3, vec![0.0; 6]).unwrap();
        // position * 3 fits in usize, the end of the slice does not.
        assert_eq!(index.get(usize::MAX / 3), None);
        assert_eq!(index.get(usize::MAX), None);
    }
}
