use super::{mean::Mean, StreamingMetric};
use itertools::izip;

/// The mean squared error is the mean of squared differences between the predicted value and the label.
#[derive(Clone, Debug, Default)]
pub struct MeanSquaredError(Mean);

impl MeanSquaredError {
	pub fn new() -> Self {
		Self::default()
	}
}

impl StreamingMetric for MeanSquaredError {
	type Input = (f64, f64);
	type Output = Option<f64>;

	fn update(&mut self, value: Self::Input) {
		self.0.update((value.1 - value.0).powi(2))
	}

	fn merge(&mut self, other: Self) {
		self.0.merge(other.0)
	}

	fn finalize(self) -> Self::Output {
		self.0.finalize()
	}
}

/// Compute the mean squared error of predictions against labels in one pass.
pub fn mean_squared_error(predictions: &[f64], labels: &[f64]) -> f64 {
	let mut metric = MeanSquaredError::new();
	izip!(predictions, labels).for_each(|(prediction, label)| metric.update((*prediction, *label)));
	metric.finalize().unwrap()
}

#[test]
fn test_mean_squared_error() {
	let predictions = vec![1.0, 2.0, 3.0];
	let labels = vec![1.0, 2.0, 6.0];
	assert!((mean_squared_error(predictions.as_slice(), labels.as_slice()) - 3.0).abs() < 1e-12);
}
