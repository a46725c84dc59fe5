use crate::criterion::Criterion;
use crate::splitter::Splitter;
use crate::{Node, TrainOptions, Tree};
use ndarray::prelude::*;

/// A pending node awaiting split evaluation. Records live only on the builder's stack and are destroyed once converted into persisted nodes.
struct NodeRecord {
	start: usize,
	end: usize,
	depth: usize,
	parent_id: Option<usize>,
	is_left: bool,
	impurity: f64,
}

/// Grow a tree by repeatedly popping a pending node record, deciding leaf vs. split, and pushing the two child records. An explicit stack is used instead of recursion so the call depth is bounded by the tree depth, and so the depth-first order of the node array is reproducible.
pub fn train_tree<'a>(
	features: ArrayView2<'a, f64>,
	criterion: Criterion<'a>,
	options: &TrainOptions,
) -> Tree {
	let max_features = options.max_features.resolve(features.ncols());
	let mut splitter = Splitter::new(
		features,
		criterion,
		options.min_samples_leaf,
		max_features,
		&[],
		options.seed,
	);
	let mut nodes: Vec<Node> = Vec::new();
	let mut stack: Vec<NodeRecord> = vec![NodeRecord {
		start: 0,
		end: splitter.n_samples(),
		depth: 0,
		parent_id: None,
		is_left: false,
		impurity: 0.0,
	}];
	let mut is_root = true;
	while let Some(mut record) = stack.pop() {
		splitter.reset_sample_range(record.start, record.end);
		// The root's impurity is computed here. Every other record already carries the impurity computed by its parent's split.
		if is_root {
			record.impurity = splitter.node_impurity();
			is_root = false;
		}
		let n_samples = record.end - record.start;
		// Check the cheap stopping rules before attempting a split.
		let mut is_leaf = options
			.max_depth
			.map(|max_depth| record.depth >= max_depth)
			.unwrap_or(false)
			|| n_samples < options.min_samples_split
			|| n_samples < 2 * options.min_samples_leaf;
		let mut split = None;
		if !is_leaf {
			split = splitter.split_node();
			// A node also becomes a leaf when no admissible split exists, or when its own impurity is already at or below the threshold.
			is_leaf = split.is_none() || record.impurity <= options.min_impurity_decrease;
		}
		let node_id = nodes.len();
		let mut node = Node {
			parent_id: record.parent_id,
			left_child_id: None,
			right_child_id: None,
			is_left: record.is_left,
			is_leaf,
			impurity: record.impurity,
			split_feature: None,
			threshold: None,
			n_samples,
			value: splitter.node_value(),
		};
		if !is_leaf {
			let split = split.unwrap();
			node.split_feature = Some(split.feature);
			node.threshold = Some(split.threshold);
			// Push the right child first so that the left child is popped and appended to the node array first.
			stack.push(NodeRecord {
				start: split.pos,
				end: record.end,
				depth: record.depth + 1,
				parent_id: Some(node_id),
				is_left: false,
				impurity: split.impurity_right,
			});
			stack.push(NodeRecord {
				start: record.start,
				end: split.pos,
				depth: record.depth + 1,
				parent_id: Some(node_id),
				is_left: true,
				impurity: split.impurity_left,
			});
		}
		nodes.push(node);
	}
	populate_child_ids(&mut nodes);
	Tree { nodes }
}

/// Children are appended after their parents, so the parent's forward references are back-filled in a single pass once all nodes exist.
fn populate_child_ids(nodes: &mut [Node]) {
	for node_id in 1..nodes.len() {
		let parent_id = nodes[node_id].parent_id.unwrap();
		if nodes[node_id].is_left {
			nodes[parent_id].left_child_id = Some(node_id);
		} else {
			nodes[parent_id].right_child_id = Some(node_id);
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::ImpurityMeasure;

	fn two_class_features() -> Array2<f64> {
		Array2::from_shape_vec(
			(6, 2),
			vec![
				-2.0, -1.0, //
				-1.0, -1.0, //
				-1.0, -2.0, //
				1.0, 1.0, //
				1.0, 2.0, //
				2.0, 1.0, //
			],
		)
		.unwrap()
	}

	fn train_two_class_tree(labels: &[usize], options: &TrainOptions) -> Tree {
		let features = two_class_features();
		let criterion = Criterion::classification(labels, 2, ImpurityMeasure::Gini);
		train_tree(features.view(), criterion, options)
	}

	#[test]
	fn test_perfect_separation_yields_single_split() {
		let labels = vec![0, 0, 0, 1, 1, 1];
		let tree = train_two_class_tree(labels.as_slice(), &TrainOptions::default());
		assert_eq!(tree.nodes.len(), 3);
		let root = &tree.nodes[0];
		assert!(!root.is_leaf);
		assert_eq!(root.split_feature, Some(0));
		assert!((root.threshold.unwrap() - 0.0).abs() < 1e-12);
		assert!((root.impurity - 0.5).abs() < 1e-12);
		assert_eq!(root.left_child_id, Some(1));
		assert_eq!(root.right_child_id, Some(2));
		// The left child is appended before the right child.
		assert!(tree.nodes[1].is_left && tree.nodes[1].is_leaf);
		assert!(!tree.nodes[2].is_left && tree.nodes[2].is_leaf);
		assert_eq!(tree.nodes[1].value, vec![3.0, 0.0]);
		assert_eq!(tree.nodes[2].value, vec![0.0, 3.0]);
		assert_eq!(tree.n_leaves(), 2);
	}

	#[test]
	fn test_mislabeled_point_tie_break() {
		// Sample 2 is mislabeled. Feature 0 cannot isolate it, but its feature 1 value of -2 is unique, so the best split is on feature 1 between -2 and -1.
		let labels = vec![1, 1, 0, 1, 1, 1];
		let tree = train_two_class_tree(labels.as_slice(), &TrainOptions::default());
		let root = &tree.nodes[0];
		assert_eq!(root.split_feature, Some(1));
		assert!((root.threshold.unwrap() - -1.5).abs() < 1e-12);
		assert_eq!(tree.nodes[1].n_samples, 1);
		assert_eq!(tree.nodes[2].n_samples, 5);
		assert_eq!(tree.n_leaves(), 2);
	}

	#[test]
	fn test_high_impurity_threshold_makes_root_a_leaf() {
		// The root's gini impurity is 0.5, at or below the threshold, so it is not split even though a perfect split exists.
		let labels = vec![0, 0, 0, 1, 1, 1];
		let options = TrainOptions {
			min_impurity_decrease: 0.6,
			..Default::default()
		};
		let tree = train_two_class_tree(labels.as_slice(), &options);
		assert_eq!(tree.nodes.len(), 1);
		assert!(tree.nodes[0].is_leaf);
		assert_eq!(tree.nodes[0].value, vec![3.0, 3.0]);
	}

	#[test]
	fn test_max_depth_limits_tree() {
		let values: Vec<f64> = (0..8).map(|i| i as f64).collect();
		let features = Array2::from_shape_vec((8, 1), values).unwrap();
		let labels = vec![0, 1, 0, 1, 0, 1, 0, 1];
		let options = TrainOptions {
			max_depth: Some(1),
			..Default::default()
		};
		let criterion = Criterion::classification(labels.as_slice(), 2, ImpurityMeasure::Gini);
		let tree = train_tree(features.view(), criterion, &options);
		assert_eq!(tree.nodes.len(), 3);
		assert!(tree.nodes[1].is_leaf);
		assert!(tree.nodes[2].is_leaf);
	}

	#[test]
	fn test_every_split_respects_min_samples_leaf() {
		let values: Vec<f64> = (0..16).map(|i| (i * 7 % 16) as f64).collect();
		let features = Array2::from_shape_vec((16, 1), values).unwrap();
		let labels: Vec<usize> = (0..16).map(|i| i % 2).collect();
		let options = TrainOptions {
			min_samples_leaf: 3,
			..Default::default()
		};
		let criterion = Criterion::classification(labels.as_slice(), 2, ImpurityMeasure::Gini);
		let tree = train_tree(features.view(), criterion, &options);
		for node in tree.nodes.iter() {
			if !node.is_leaf {
				let left = &tree.nodes[node.left_child_id.unwrap()];
				let right = &tree.nodes[node.right_child_id.unwrap()];
				assert!(left.n_samples >= 3);
				assert!(right.n_samples >= 3);
				assert_eq!(left.n_samples + right.n_samples, node.n_samples);
			}
		}
	}
}
