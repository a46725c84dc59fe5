use crate::capped_max_heap::CappedMaxHeap;
use crate::{euclidean_distance, validate_points, NeighborsError};
use ndarray::prelude::*;
use std::ops::Range;

/// Subtrees stop splitting once they hold this many points or fewer.
const LEAF_SIZE: usize = 16;

/// A k-d tree neighbor index. Nodes are stored in a flat `Vec` and refer to their children by index, and leaves refer to buckets of the reordered point-index array, so the structure has no cyclic references.
pub struct KdTree {
	points: Array2<f64>,
	/// A permutation of `0..n_points`, reordered during construction so every node's bucket is contiguous.
	indices: Vec<usize>,
	nodes: Vec<KdTreeNode>,
}

enum KdTreeNode {
	Branch {
		split_dimension: usize,
		/// Points with value <= split_value along the split dimension are in the left subtree.
		split_value: f64,
		left_child_index: usize,
		right_child_index: usize,
	},
	Leaf {
		range: Range<usize>,
	},
}

impl KdTree {
	/// Build a tree over the point set by cycling the split dimension with depth and splitting each subtree at the median.
	pub fn new(points: Array2<f64>) -> Result<KdTree, NeighborsError> {
		validate_points(&points)?;
		let mut indices: Vec<usize> = (0..points.nrows()).collect();
		let mut nodes = Vec::new();
		build_subtree(&points, &mut indices, &mut nodes, 0..points.nrows(), 0);
		Ok(KdTree {
			points,
			indices,
			nodes,
		})
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
		self.visit(0, point, &mut heap);
		heap.sort();
		Ok((heap.keys().to_vec(), heap.vals().to_vec()))
	}

	fn visit(&self, node_index: usize, point: ArrayView1<f64>, heap: &mut CappedMaxHeap) {
		match &self.nodes[node_index] {
			KdTreeNode::Leaf { range } => {
				for &sample_index in self.indices[range.clone()].iter() {
					heap.add(
						euclidean_distance(point, self.points.row(sample_index)),
						sample_index,
					);
				}
			}
			KdTreeNode::Branch {
				split_dimension,
				split_value,
				left_child_index,
				right_child_index,
			} => {
				let difference = point[*split_dimension] - split_value;
				let (near_child, far_child) = if difference <= 0.0 {
					(*left_child_index, *right_child_index)
				} else {
					(*right_child_index, *left_child_index)
				};
				self.visit(near_child, point, heap);
				// The far subtree can only contain a closer point if the splitting plane is closer than the current k-th best distance. While the heap is not full its max key is infinity, so the far side is always explored.
				if difference.abs() < heap.max_key() {
					self.visit(far_child, point, heap);
				}
			}
		}
	}
}

fn build_subtree(
	points: &Array2<f64>,
	indices: &mut Vec<usize>,
	nodes: &mut Vec<KdTreeNode>,
	range: Range<usize>,
	depth: usize,
) -> usize {
	if range.len() <= LEAF_SIZE {
		nodes.push(KdTreeNode::Leaf { range });
		return nodes.len() - 1;
	}
	let split_dimension = depth % points.ncols();
	indices[range.clone()].sort_unstable_by(|&a, &b| {
		points[[a, split_dimension]]
			.partial_cmp(&points[[b, split_dimension]])
			.unwrap()
	});
	let median = range.start + range.len() / 2;
	let split_value = points[[indices[median - 1], split_dimension]];
	let node_index = nodes.len();
	nodes.push(KdTreeNode::Branch {
		split_dimension,
		split_value,
		left_child_index: 0,
		right_child_index: 0,
	});
	let left = build_subtree(points, indices, nodes, range.start..median, depth + 1);
	let right = build_subtree(points, indices, nodes, median..range.end, depth + 1);
	if let KdTreeNode::Branch {
		left_child_index,
		right_child_index,
		..
	} = &mut nodes[node_index]
	{
		*left_child_index = left;
		*right_child_index = right;
	}
	node_index
}

#[cfg(test)]
mod test {
	use super::*;

	fn grid_points(n: usize) -> Array2<f64> {
		let values: Vec<f64> = (0..n)
			.flat_map(|i| vec![(i % 10) as f64 * 1.3, (i / 10) as f64 * 0.7])
			.collect();
		Array2::from_shape_vec((n, 2), values).unwrap()
	}

	#[test]
	fn test_query_matches_brute_force() {
		let points = grid_points(60);
		let kd_tree = KdTree::new(points.clone()).unwrap();
		let brute_force = crate::BruteForceIndex::new(points).unwrap();
		let queries = vec![[0.31, 0.77], [6.4, 2.1], [-1.0, 5.0], [13.0, -0.3]];
		for query in queries.iter() {
			let query = ndarray::arr1(query);
			let (kd_distances, kd_indexes) = kd_tree.query(query.view(), 5).unwrap();
			let (bf_distances, bf_indexes) = brute_force.query(query.view(), 5).unwrap();
			assert_eq!(kd_indexes, bf_indexes);
			for (kd_distance, bf_distance) in kd_distances.iter().zip(bf_distances.iter()) {
				assert!((kd_distance - bf_distance).abs() < 1e-12);
			}
		}
	}

	#[test]
	fn test_single_leaf_tree() {
		let points = grid_points(8);
		let kd_tree = KdTree::new(points).unwrap();
		let query = ndarray::arr1(&[0.0, 0.0]);
		let (distances, indexes) = kd_tree.query(query.view(), 1).unwrap();
		assert_eq!(indexes, vec![0]);
		assert!((distances[0] - 0.0).abs() < 1e-12);
	}

	#[test]
	fn test_query_rejects_excessive_k() {
		let points = grid_points(8);
		let kd_tree = KdTree::new(points).unwrap();
		let query = ndarray::arr1(&[0.0, 0.0]);
		assert!(matches!(
			kd_tree.query(query.view(), 9),
			Err(NeighborsError::InvalidNeighborCount { k: 9, n_points: 8 })
		));
	}
}
