/*!
This crate implements bounded k-nearest-neighbor search over dense point sets: a size-capped max-heap that retains the k smallest keys ever added to it, a brute-force index that scans every point through the heap, a k-d tree index that prunes whole subtrees against the heap's current maximum, and a thin classifier that predicts by majority vote among a query's neighbors.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod brute_force;
mod capped_max_heap;
mod kd_tree;
mod knn_classifier;

pub use brute_force::BruteForceIndex;
pub use capped_max_heap::CappedMaxHeap;
pub use kd_tree::KdTree;
pub use knn_classifier::{KnnClassifier, SearchAlgorithm};

use ndarray::prelude::*;
use thiserror::Error;

/// These are the errors raised when a neighbor index or classifier is given malformed input.
#[derive(Debug, Error)]
pub enum NeighborsError {
	#[error("the point set must contain at least one row and one column")]
	EmptyPointSet,
	#[error("the point set must contain finite non-NaN numbers")]
	NonFinitePoint,
	#[error("the query point has {actual} dimensions but the index was built with {expected}")]
	DimensionMismatch { expected: usize, actual: usize },
	#[error("the neighbor count {k} must be between 1 and the number of indexed points {n_points}")]
	InvalidNeighborCount { k: usize, n_points: usize },
	#[error("the number of labels must equal the number of rows in the point set")]
	LabelCountMismatch,
}

pub(crate) fn validate_points(points: &Array2<f64>) -> Result<(), NeighborsError> {
	if points.nrows() == 0 || points.ncols() == 0 {
		return Err(NeighborsError::EmptyPointSet);
	}
	if !points.iter().all(|value| value.is_finite()) {
		return Err(NeighborsError::NonFinitePoint);
	}
	Ok(())
}

pub(crate) fn euclidean_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
	let mut sum = 0.0;
	for (a, b) in a.iter().zip(b.iter()) {
		let difference = a - b;
		sum += difference * difference;
	}
	sum.sqrt()
}
