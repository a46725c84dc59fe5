use crate::criterion::Criterion;
use crate::train::train_tree;
use crate::{validate_features, ImpurityMeasure, TrainError, TrainOptions, Tree};
use itertools::izip;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

/// A decision tree classifier. The model is the trained tree plus the hyperparameters used to train it, which together fully describe it for serialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreeClassifier {
	pub tree: Tree,
	pub n_classes: usize,
	pub options: TrainOptions,
}

impl TreeClassifier {
	/// Train a classifier on a dense feature matrix and integer-encoded labels in `0..n_classes`. All input validation happens here, before the construction algorithm runs.
	pub fn train<'a>(
		features: ArrayView2<'a, f64>,
		labels: &'a [usize],
		options: TrainOptions,
	) -> Result<TreeClassifier, TrainError> {
		validate_features(features)?;
		if labels.len() != features.nrows() {
			return Err(TrainError::LabelCountMismatch);
		}
		let measure = match options.criterion {
			None => ImpurityMeasure::Gini,
			Some(measure @ ImpurityMeasure::Gini) | Some(measure @ ImpurityMeasure::Entropy) => {
				measure
			}
			Some(measure) => return Err(TrainError::InvalidCriterion(measure)),
		};
		let n_classes = labels.iter().max().unwrap() + 1;
		let criterion = Criterion::classification(labels, n_classes, measure);
		let tree = train_tree(features, criterion, &options);
		Ok(TreeClassifier {
			tree,
			n_classes,
			options,
		})
	}

	/// Predict the class of each example as the argmax of its leaf's label histogram.
	pub fn predict(&self, features: ArrayView2<f64>) -> Vec<usize> {
		features
			.axis_iter(Axis(0))
			.map(|row| argmax(&self.tree.predict(row).value))
			.collect()
	}

	/// Predict class probabilities as each leaf's label histogram normalized by its sample count.
	pub fn predict_proba(&self, features: ArrayView2<f64>) -> Array2<f64> {
		let mut probabilities = Array2::zeros((features.nrows(), self.n_classes));
		for (row, mut probabilities_row) in izip!(
			features.axis_iter(Axis(0)),
			probabilities.axis_iter_mut(Axis(0)),
		) {
			let node = self.tree.predict(row);
			let total: f64 = node.value.iter().sum();
			for (probability, freq) in izip!(probabilities_row.iter_mut(), node.value.iter()) {
				*probability = freq / total;
			}
		}
		probabilities
	}
}

/// The index of the first maximal value.
fn argmax(values: &[f64]) -> usize {
	let mut best = 0;
	for (index, value) in values.iter().enumerate() {
		if *value > values[best] {
			best = index;
		}
	}
	best
}
