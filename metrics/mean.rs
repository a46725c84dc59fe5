use super::StreamingMetric;
use num_traits::ToPrimitive;

/// The streaming mean of all the values passed to `update`.
#[derive(Clone, Debug, Default)]
pub struct Mean {
	n: u64,
	sum: f64,
}

impl Mean {
	pub fn new() -> Self {
		Self::default()
	}
}

impl StreamingMetric for Mean {
	type Input = f64;
	type Output = Option<f64>;

	fn update(&mut self, input: Self::Input) {
		self.n += 1;
		self.sum += input;
	}

	fn merge(&mut self, other: Self) {
		self.n += other.n;
		self.sum += other.sum;
	}

	fn finalize(self) -> Self::Output {
		if self.n == 0 {
			None
		} else {
			Some(self.sum / self.n.to_f64().unwrap())
		}
	}
}

#[test]
fn test_mean() {
	let mut mean = Mean::new();
	assert_eq!(mean.clone().finalize(), None);
	mean.update(1.0);
	mean.update(2.0);
	let mut other = Mean::new();
	other.update(6.0);
	mean.merge(other);
	assert_eq!(mean.finalize(), Some(3.0));
}
