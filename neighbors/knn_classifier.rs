use crate::{BruteForceIndex, KdTree, NeighborsError};
use ndarray::prelude::*;

/// The search structure backing a k-nearest-neighbor classifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchAlgorithm {
	BruteForce,
	KdTree,
}

enum NeighborIndex {
	BruteForce(BruteForceIndex),
	KdTree(KdTree),
}

impl NeighborIndex {
	fn query(
		&self,
		point: ArrayView1<f64>,
		k: usize,
	) -> Result<(Vec<f64>, Vec<usize>), NeighborsError> {
		match self {
			NeighborIndex::BruteForce(index) => index.query(point, k),
			NeighborIndex::KdTree(index) => index.query(point, k),
		}
	}
}

/// A k-nearest-neighbor classifier: each query point is assigned the majority label among its k nearest training points.
pub struct KnnClassifier {
	index: NeighborIndex,
	labels: Vec<usize>,
	n_classes: usize,
	k: usize,
}

impl KnnClassifier {
	pub fn train(
		points: Array2<f64>,
		labels: &[usize],
		k: usize,
		algorithm: SearchAlgorithm,
	) -> Result<KnnClassifier, NeighborsError> {
		if labels.len() != points.nrows() {
			return Err(NeighborsError::LabelCountMismatch);
		}
		if k == 0 || k > points.nrows() {
			return Err(NeighborsError::InvalidNeighborCount {
				k,
				n_points: points.nrows(),
			});
		}
		let n_classes = labels.iter().max().map(|label| label + 1).unwrap_or(0);
		let index = match algorithm {
			SearchAlgorithm::BruteForce => NeighborIndex::BruteForce(BruteForceIndex::new(points)?),
			SearchAlgorithm::KdTree => NeighborIndex::KdTree(KdTree::new(points)?),
		};
		Ok(KnnClassifier {
			index,
			labels: labels.to_vec(),
			n_classes,
			k,
		})
	}

	pub fn predict(&self, points: ArrayView2<f64>) -> Result<Vec<usize>, NeighborsError> {
		let mut predictions = Vec::with_capacity(points.nrows());
		let mut votes = vec![0usize; self.n_classes];
		for point in points.axis_iter(Axis(0)) {
			let (_, neighbor_indexes) = self.index.query(point, self.k)?;
			for vote in votes.iter_mut() {
				*vote = 0;
			}
			for neighbor_index in neighbor_indexes {
				votes[self.labels[neighbor_index]] += 1;
			}
			// Ties go to the lowest class.
			let mut prediction = 0;
			let mut max_votes = 0;
			for (class_index, n_votes) in votes.iter().enumerate() {
				if *n_votes > max_votes {
					max_votes = *n_votes;
					prediction = class_index;
				}
			}
			predictions.push(prediction);
		}
		Ok(predictions)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn two_clusters() -> (Array2<f64>, Vec<usize>) {
		let mut values = Vec::new();
		let mut labels = Vec::new();
		for i in 0..20 {
			let offset = (i % 5) as f64 * 0.1;
			if i < 10 {
				values.extend_from_slice(&[offset, offset * 0.5]);
				labels.push(0);
			} else {
				values.extend_from_slice(&[10.0 + offset, 10.0 - offset]);
				labels.push(1);
			}
		}
		(Array2::from_shape_vec((20, 2), values).unwrap(), labels)
	}

	#[test]
	fn test_classifies_clusters_with_both_algorithms() {
		let (points, labels) = two_clusters();
		let queries = Array2::from_shape_vec((2, 2), vec![0.2, 0.2, 9.8, 9.9]).unwrap();
		for algorithm in [SearchAlgorithm::BruteForce, SearchAlgorithm::KdTree].iter() {
			let classifier = KnnClassifier::train(points.clone(), &labels, 3, *algorithm).unwrap();
			let predictions = classifier.predict(queries.view()).unwrap();
			assert_eq!(predictions, vec![0, 1]);
		}
	}

	#[test]
	fn test_training_set_accuracy() {
		let (points, labels) = two_clusters();
		let classifier =
			KnnClassifier::train(points.clone(), &labels, 1, SearchAlgorithm::KdTree).unwrap();
		let predictions = classifier.predict(points.view()).unwrap();
		let accuracy = quercus_metrics::accuracy(predictions.as_slice(), labels.as_slice());
		assert_eq!(accuracy, 1.0);
	}

	#[test]
	fn test_rejects_malformed_input() {
		let (points, labels) = two_clusters();
		assert!(matches!(
			KnnClassifier::train(points.clone(), &labels[..10], 3, SearchAlgorithm::BruteForce),
			Err(NeighborsError::LabelCountMismatch)
		));
		assert!(matches!(
			KnnClassifier::train(points.clone(), &labels, 21, SearchAlgorithm::BruteForce),
			Err(NeighborsError::InvalidNeighborCount { k: 21, n_points: 20 })
		));
		assert!(matches!(
			KnnClassifier::train(points, &labels, 0, SearchAlgorithm::KdTree),
			Err(NeighborsError::InvalidNeighborCount { k: 0, n_points: 20 })
		));
	}
}
