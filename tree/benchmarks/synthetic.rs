use ndarray::prelude::*;
use quercus_tree::{TrainOptions, TreeClassifier, TreeRegressor};
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use std::time::Instant;

fn main() {
	let n_rows_train = 2000;
	let n_rows_test = 500;
	let n_rows = n_rows_train + n_rows_test;
	let mut rng = Xoshiro256Plus::seed_from_u64(42);

	// Generate a two-class dataset separated by the line x0 + x1 = 1, with 5% of the labels flipped.
	let mut features = Array2::zeros((n_rows, 2));
	let mut labels = Vec::with_capacity(n_rows);
	let mut targets = Vec::with_capacity(n_rows);
	for mut row in features.axis_iter_mut(Axis(0)) {
		let x0: f64 = rng.gen();
		let x1: f64 = rng.gen();
		row[0] = x0;
		row[1] = x1;
		let mut label = if x0 + x1 > 1.0 { 1 } else { 0 };
		if rng.gen::<f64>() < 0.05 {
			label = 1 - label;
		}
		labels.push(label);
		targets.push(3.0 * x0 - 2.0 * x1 + 0.1 * (rng.gen::<f64>() - 0.5));
	}
	let (features_train, features_test) = features.view().split_at(Axis(0), n_rows_train);
	let (labels_train, labels_test) = labels.split_at(n_rows_train);
	let (targets_train, targets_test) = targets.split_at(n_rows_train);

	// Train and evaluate the classifier.
	let options = TrainOptions {
		max_depth: Some(8),
		..Default::default()
	};
	let start = Instant::now();
	let classifier =
		TreeClassifier::train(features_train, labels_train, options.clone()).unwrap();
	let classifier_duration = start.elapsed();
	let predictions = classifier.predict(features_test);
	let accuracy = quercus_metrics::accuracy(predictions.as_slice(), labels_test);
	println!("classifier duration: {:?}", classifier_duration);
	println!("classifier n_leaves: {}", classifier.tree.n_leaves());
	println!("classifier accuracy: {}", accuracy);

	// Train and evaluate the regressor.
	let start = Instant::now();
	let regressor = TreeRegressor::train(features_train, targets_train, options).unwrap();
	let regressor_duration = start.elapsed();
	let predictions = regressor.predict(features_test);
	let mse = quercus_metrics::mean_squared_error(predictions.as_slice(), targets_test);
	println!("regressor duration: {:?}", regressor_duration);
	println!("regressor n_leaves: {}", regressor.tree.n_leaves());
	println!("regressor mse: {}", mse);
}
