use super::{mean::Mean, StreamingMetric};
use itertools::izip;

/// The accuracy is the proportion of examples where predicted == label.
#[derive(Clone, Debug, Default)]
pub struct Accuracy(Mean);

impl Accuracy {
	pub fn new() -> Self {
		Self::default()
	}
}

impl StreamingMetric for Accuracy {
	type Input = (usize, usize);
	type Output = Option<f64>;

	fn update(&mut self, value: Self::Input) {
		self.0.update(if value.0 == value.1 { 1.0 } else { 0.0 })
	}

	fn merge(&mut self, other: Self) {
		self.0.merge(other.0)
	}

	fn finalize(self) -> Self::Output {
		self.0.finalize()
	}
}

/// Compute the accuracy of predictions against labels in one pass.
pub fn accuracy(predictions: &[usize], labels: &[usize]) -> f64 {
	let mut metric = Accuracy::new();
	izip!(predictions, labels).for_each(|(prediction, label)| metric.update((*prediction, *label)));
	metric.finalize().unwrap()
}

#[test]
fn test_accuracy() {
	let predictions = vec![0, 1, 1, 2];
	let labels = vec![0, 1, 2, 2];
	assert!((accuracy(predictions.as_slice(), labels.as_slice()) - 0.75).abs() < f64::EPSILON);
}
