/*!
This crate implements decision tree models for regression and classification trained with the CART algorithm: recursive binary partitioning of a dense feature matrix, choosing at each node the split that most reduces impurity. Tie-breaking between candidate splits and the impurity bookkeeping used to score them are deterministic and documented, so trained trees are reproducible given the same options and seed.

Trees are stored as a flat `Vec` of `Node`s indexed by `usize` rather than as a linked structure, so they are cheap to traverse and trivially serializable. Training uses an explicit stack of pending node records instead of call-stack recursion, which bounds stack depth by tree depth and makes the order of the node array reproducible.

For an example of training and evaluating models on synthetic data, see `benchmarks/synthetic.rs`.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod classifier;
mod criterion;
mod regressor;
mod splitter;
mod train;

pub use classifier::TreeClassifier;
pub use regressor::TreeRegressor;

use ndarray::prelude::*;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// These are the options passed to `TreeClassifier::train` and `TreeRegressor::train`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainOptions {
	/// The impurity measure used to score candidate splits. `None` selects the default for the task: gini for classification and squared error for regression.
	pub criterion: Option<ImpurityMeasure>,
	/// The depth of the tree will never exceed this value. `None` means the depth is unbounded.
	pub max_depth: Option<usize>,
	/// A node will only be considered for splitting if it has at least this many samples.
	pub min_samples_split: usize,
	/// A split will only be considered valid if each of the resulting children receives at least this many samples.
	pub min_samples_leaf: usize,
	/// The number of candidate features to consider in each split search.
	pub max_features: MaxFeatures,
	/// A node will not be split if its impurity is less than or equal to this value.
	pub min_impurity_decrease: f64,
	/// The seed for the rng used to sample candidate features when `max_features` selects fewer features than the total.
	pub seed: u64,
}

impl Default for TrainOptions {
	fn default() -> Self {
		Self {
			criterion: None,
			max_depth: None,
			min_samples_split: 2,
			min_samples_leaf: 1,
			max_features: MaxFeatures::All,
			min_impurity_decrease: 0.0,
			seed: 42,
		}
	}
}

/// The impurity measure used to score the quality of a split. `Gini` and `Entropy` apply to classification, `SquaredError` to regression.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ImpurityMeasure {
	Gini,
	Entropy,
	SquaredError,
}

/// This enum controls how many candidate features are scanned in each split search. Scanning fewer than all features implements the random-subspace method used by bagged ensembles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
	/// Scan every feature.
	All,
	/// Alias for `Sqrt`.
	Auto,
	/// Scan `floor(sqrt(n_features))` features.
	Sqrt,
	/// Scan `floor(log2(n_features))` features.
	Log2,
	/// Scan exactly this many features, clamped to `[1, n_features]`.
	Count(usize),
}

impl MaxFeatures {
	pub fn resolve(&self, n_features: usize) -> usize {
		match self {
			MaxFeatures::All => n_features,
			MaxFeatures::Auto | MaxFeatures::Sqrt => n_features
				.to_f64()
				.unwrap()
				.sqrt()
				.floor()
				.to_usize()
				.unwrap()
				.max(1),
			MaxFeatures::Log2 => n_features
				.to_f64()
				.unwrap()
				.log2()
				.floor()
				.to_usize()
				.unwrap()
				.max(1),
			MaxFeatures::Count(count) => (*count).max(1).min(n_features),
		}
	}
}

/// These are the errors raised when training is given malformed input. They are all detected at the boundary, before the tree construction algorithm runs.
#[derive(Debug, Error)]
pub enum TrainError {
	#[error("the feature matrix must contain at least one row and one column")]
	EmptyFeatureMatrix,
	#[error("the feature matrix must contain finite non-NaN numbers")]
	NonFiniteFeature,
	#[error("the targets must contain finite non-NaN numbers")]
	NonFiniteTarget,
	#[error("the number of labels must equal the number of rows in the feature matrix")]
	LabelCountMismatch,
	#[error("the criterion {0:?} cannot be used for this task")]
	InvalidCriterion(ImpurityMeasure),
}

/// A tree is a flat vector of nodes. Node 0 is always the root, and each branch refers to its children by their indexes in the vector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tree {
	pub nodes: Vec<Node>,
}

/// A single node in a trained tree. Branches and leaves share this representation: a leaf is a node whose `is_leaf` flag is set and whose split fields are `None`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
	/// The index of this node's parent in the tree's node vector. `None` for the root.
	pub parent_id: Option<usize>,
	/// The index of this node's left child, back-filled after construction.
	pub left_child_id: Option<usize>,
	/// The index of this node's right child, back-filled after construction.
	pub right_child_id: Option<usize>,
	/// Whether this node is the left child of its parent.
	pub is_left: bool,
	pub is_leaf: bool,
	/// The impurity of the training samples that reached this node.
	pub impurity: f64,
	/// The feature this node splits on. `None` for leaves.
	pub split_feature: Option<usize>,
	/// Samples whose split feature value is <= this threshold go to the left child, the rest go to the right.
	pub threshold: Option<f64>,
	/// The number of training samples that reached this node.
	pub n_samples: usize,
	/// The label histogram for classification, or `[mean]` for regression.
	pub value: Vec<f64>,
}

impl Tree {
	/// Walk the tree from the root to the leaf this example is sent to.
	pub fn predict(&self, features: ArrayView1<f64>) -> &Node {
		let mut node_index = 0;
		loop {
			let node = &self.nodes[node_index];
			if node.is_leaf {
				return node;
			}
			let split_feature = node.split_feature.unwrap();
			let threshold = node.threshold.unwrap();
			node_index = if features[split_feature] <= threshold {
				node.left_child_id.unwrap()
			} else {
				node.right_child_id.unwrap()
			};
		}
	}

	/// The number of leaf nodes in this tree.
	pub fn n_leaves(&self) -> usize {
		self.nodes.iter().filter(|node| node.is_leaf).count()
	}
}

pub(crate) fn validate_features(features: ArrayView2<f64>) -> Result<(), TrainError> {
	if features.nrows() == 0 || features.ncols() == 0 {
		return Err(TrainError::EmptyFeatureMatrix);
	}
	if !features.iter().all(|value| value.is_finite()) {
		return Err(TrainError::NonFiniteFeature);
	}
	Ok(())
}

#[test]
fn test_max_features_resolution() {
	assert_eq!(MaxFeatures::All.resolve(10), 10);
	assert_eq!(MaxFeatures::Auto.resolve(10), 3);
	assert_eq!(MaxFeatures::Sqrt.resolve(10), 3);
	assert_eq!(MaxFeatures::Log2.resolve(10), 3);
	assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
	assert_eq!(MaxFeatures::Log2.resolve(1), 1);
	assert_eq!(MaxFeatures::Count(0).resolve(10), 1);
	assert_eq!(MaxFeatures::Count(4).resolve(10), 4);
	assert_eq!(MaxFeatures::Count(100).resolve(10), 10);
}
