use crate::capped_max_heap::CappedMaxHeap;
use crate::{euclidean_distance, validate_points, NeighborsError};
use ndarray::prelude::*;

/// A brute-force neighbor index: every query scans every indexed point through a capped max-heap.
pub struct BruteForceIndex {
	points: Array2<f64>,
}

impl BruteForceIndex {
	pub fn new(points: Array2<f64>) -> Result<BruteForceIndex, NeighborsError> {
		validate_points(&points)?;
		Ok(BruteForceIndex { points })
	}

	pub fn n_points(&self) -> usize {
		self.points.nrows()
	}

	/// Find the k nearest indexed points to the query point, returning their euclidean distances and row indexes in ascending distance order.
	pub fn query(
		&self,
		point: ArrayView1<f64>,
		k: usize,
	) -> Result<(Vec<f64>, Vec<usize>), NeighborsError> {
		if point.len() != self.points.ncols() {
			return Err(NeighborsError::DimensionMismatch {
				expected: self.points.ncols(),
				actual: point.len(),
			});
		}
		if k == 0 || k > self.points.nrows() {
			return Err(NeighborsError::InvalidNeighborCount {
				k,
				n_points: self.points.nrows(),
			});
		}
		let mut heap = CappedMaxHeap::new(k);
		for (sample_index, candidate) in self.points.axis_iter(Axis(0)).enumerate() {
			heap.add(euclidean_distance(point, candidate), sample_index);
		}
		heap.sort();
		Ok((heap.keys().to_vec(), heap.vals().to_vec()))
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_query_finds_nearest_points() {
		let points =
			Array2::from_shape_vec((4, 2), vec![0.0, 0.0, 1.0, 0.0, 0.0, 3.0, 5.0, 5.0]).unwrap();
		let index = BruteForceIndex::new(points).unwrap();
		let query = ndarray::arr1(&[0.0, 0.0]);
		let (distances, indexes) = index.query(query.view(), 2).unwrap();
		assert_eq!(indexes, vec![0, 1]);
		assert!((distances[0] - 0.0).abs() < 1e-12);
		assert!((distances[1] - 1.0).abs() < 1e-12);
	}

	#[test]
	fn test_query_rejects_malformed_input() {
		let points = Array2::from_shape_vec((2, 2), vec![0.0, 0.0, 1.0, 1.0]).unwrap();
		let index = BruteForceIndex::new(points).unwrap();
		let query = ndarray::arr1(&[0.0, 0.0, 0.0]);
		assert!(matches!(
			index.query(query.view(), 1),
			Err(NeighborsError::DimensionMismatch { expected: 2, actual: 3 })
		));
		let query = ndarray::arr1(&[0.0, 0.0]);
		assert!(matches!(
			index.query(query.view(), 3),
			Err(NeighborsError::InvalidNeighborCount { k: 3, n_points: 2 })
		));
	}

	#[test]
	fn test_rejects_non_finite_points() {
		let points = Array2::from_shape_vec((2, 1), vec![0.0, f64::NAN]).unwrap();
		assert!(matches!(
			BruteForceIndex::new(points),
			Err(NeighborsError::NonFinitePoint)
		));
	}
}
