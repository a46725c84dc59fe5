use crate::criterion::Criterion;
use crate::train::train_tree;
use crate::{validate_features, ImpurityMeasure, TrainError, TrainOptions, Tree};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

/// A decision tree regressor. Each leaf stores the mean of the training targets that reached it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreeRegressor {
	pub tree: Tree,
	pub options: TrainOptions,
}

impl TreeRegressor {
	/// Train a regressor on a dense feature matrix and numeric targets. All input validation happens here, before the construction algorithm runs.
	pub fn train<'a>(
		features: ArrayView2<'a, f64>,
		targets: &'a [f64],
		options: TrainOptions,
	) -> Result<TreeRegressor, TrainError> {
		validate_features(features)?;
		if targets.len() != features.nrows() {
			return Err(TrainError::LabelCountMismatch);
		}
		if !targets.iter().all(|target| target.is_finite()) {
			return Err(TrainError::NonFiniteTarget);
		}
		match options.criterion {
			None | Some(ImpurityMeasure::SquaredError) => {}
			Some(measure) => return Err(TrainError::InvalidCriterion(measure)),
		}
		let criterion = Criterion::regression(targets);
		let tree = train_tree(features, criterion, &options);
		Ok(TreeRegressor { tree, options })
	}

	/// Predict the target of each example as its leaf's stored mean.
	pub fn predict(&self, features: ArrayView2<f64>) -> Vec<f64> {
		features
			.axis_iter(Axis(0))
			.map(|row| self.tree.predict(row).value[0])
			.collect()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_step_function() {
		// A step function is recovered exactly: one split at the step, each leaf the mean of its side.
		let values: Vec<f64> = (0..8).map(|i| i as f64).collect();
		let features = Array2::from_shape_vec((8, 1), values).unwrap();
		let targets = vec![1.0, 1.0, 1.0, 1.0, 5.0, 5.0, 5.0, 5.0];
		let options = TrainOptions {
			max_depth: Some(1),
			..Default::default()
		};
		let model = TreeRegressor::train(features.view(), targets.as_slice(), options).unwrap();
		let root = tree_root(&model);
		assert_eq!(root.split_feature, Some(0));
		assert!((root.threshold.unwrap() - 3.5).abs() < 1e-12);
		let predictions = model.predict(features.view());
		assert_eq!(predictions, targets);
	}

	#[test]
	fn test_fully_grown_tree_fits_training_targets() {
		let values: Vec<f64> = (0..16).map(|i| (i * 5 % 16) as f64).collect();
		let features = Array2::from_shape_vec((16, 1), values.clone()).unwrap();
		let targets: Vec<f64> = values.iter().map(|value| 2.0 * value - 3.0).collect();
		let model =
			TreeRegressor::train(features.view(), targets.as_slice(), TrainOptions::default())
				.unwrap();
		let predictions = model.predict(features.view());
		let mse = quercus_metrics::mean_squared_error(predictions.as_slice(), targets.as_slice());
		assert!(mse < 1e-12);
	}

	#[test]
	fn test_rejects_malformed_input() {
		let features = Array2::from_shape_vec((2, 1), vec![0.0, 1.0]).unwrap();
		assert!(matches!(
			TreeRegressor::train(features.view(), &[1.0, f64::INFINITY], TrainOptions::default()),
			Err(TrainError::NonFiniteTarget)
		));
		let options = TrainOptions {
			criterion: Some(ImpurityMeasure::Gini),
			..Default::default()
		};
		assert!(matches!(
			TreeRegressor::train(features.view(), &[1.0, 2.0], options),
			Err(TrainError::InvalidCriterion(ImpurityMeasure::Gini))
		));
	}

	fn tree_root(model: &TreeRegressor) -> &crate::Node {
		&model.tree.nodes[0]
	}
}
