use crate::splitter::SampleIndexEntry;
use crate::ImpurityMeasure;
use itertools::izip;
use num_traits::ToPrimitive;

/*
The criterion maintains streaming impurity statistics over the samples referenced by a contiguous range `[start, end)` of the splitter's sample index. `init` accumulates the totals for the range, and as the split cursor `pos` slides right, `update` moves samples into the left partial accumulators and derives the right ones by subtraction from the totals. This lets the splitter score every candidate split position in a single left-to-right scan.
*/

/// The impurity bookkeeping for one tree build, holding either a label histogram (classification) or sum and sum-of-squares accumulators (regression).
pub enum Criterion<'a> {
	Classification(ClassificationCriterion<'a>),
	Regression(RegressionCriterion<'a>),
}

pub struct ClassificationCriterion<'a> {
	/// One label id per row of the feature matrix, each in `0..n_classes`.
	labels: &'a [usize],
	measure: ImpurityMeasure,
	start: usize,
	end: usize,
	pos: usize,
	label_freqs_total: Vec<usize>,
	label_freqs_left: Vec<usize>,
	label_freqs_right: Vec<usize>,
}

pub struct RegressionCriterion<'a> {
	/// One target value per row of the feature matrix.
	targets: &'a [f64],
	start: usize,
	end: usize,
	pos: usize,
	sum_total: f64,
	squared_sum_total: f64,
	sum_left: f64,
	squared_sum_left: f64,
	sum_right: f64,
	squared_sum_right: f64,
}

impl<'a> Criterion<'a> {
	pub fn classification(labels: &'a [usize], n_classes: usize, measure: ImpurityMeasure) -> Self {
		Criterion::Classification(ClassificationCriterion {
			labels,
			measure,
			start: 0,
			end: 0,
			pos: 0,
			label_freqs_total: vec![0; n_classes],
			label_freqs_left: vec![0; n_classes],
			label_freqs_right: vec![0; n_classes],
		})
	}

	pub fn regression(targets: &'a [f64]) -> Self {
		Criterion::Regression(RegressionCriterion {
			targets,
			start: 0,
			end: 0,
			pos: 0,
			sum_total: 0.0,
			squared_sum_total: 0.0,
			sum_left: 0.0,
			squared_sum_left: 0.0,
			sum_right: 0.0,
			squared_sum_right: 0.0,
		})
	}

	/// Establish the active range `[start, end)` and accumulate the total statistics for it. Must be called before `reset` or `update`.
	pub fn init(&mut self, start: usize, end: usize, sample_index: &[SampleIndexEntry]) {
		match self {
			Criterion::Classification(criterion) => {
				criterion.start = start;
				criterion.end = end;
				criterion.pos = start;
				criterion.label_freqs_total.iter_mut().for_each(|f| *f = 0);
				criterion.label_freqs_left.iter_mut().for_each(|f| *f = 0);
				criterion.label_freqs_right.iter_mut().for_each(|f| *f = 0);
				for entry in sample_index[start..end].iter() {
					criterion.label_freqs_total[criterion.labels[entry.sample_number]] += 1;
				}
			}
			Criterion::Regression(criterion) => {
				criterion.start = start;
				criterion.end = end;
				criterion.pos = start;
				criterion.sum_total = 0.0;
				criterion.squared_sum_total = 0.0;
				criterion.sum_left = 0.0;
				criterion.squared_sum_left = 0.0;
				criterion.sum_right = 0.0;
				criterion.squared_sum_right = 0.0;
				for entry in sample_index[start..end].iter() {
					let target = criterion.targets[entry.sample_number];
					criterion.sum_total += target;
					criterion.squared_sum_total += target * target;
				}
			}
		}
	}

	/// Rewind the split cursor to `start` and zero the left/right partial accumulators, keeping the totals. Used when re-scanning split candidates for a new feature.
	pub fn reset(&mut self) {
		match self {
			Criterion::Classification(criterion) => {
				criterion.pos = criterion.start;
				criterion.label_freqs_left.iter_mut().for_each(|f| *f = 0);
				criterion.label_freqs_right.iter_mut().for_each(|f| *f = 0);
			}
			Criterion::Regression(criterion) => {
				criterion.pos = criterion.start;
				criterion.sum_left = 0.0;
				criterion.squared_sum_left = 0.0;
				criterion.sum_right = 0.0;
				criterion.squared_sum_right = 0.0;
			}
		}
	}

	/// Slide the split cursor to `new_pos`, moving the samples in `[pos, new_pos)` into the left accumulators and deriving the right accumulators from the totals. `new_pos` must be non-decreasing between resets.
	pub fn update(&mut self, new_pos: usize, sample_index: &[SampleIndexEntry]) {
		match self {
			Criterion::Classification(criterion) => {
				for entry in sample_index[criterion.pos..new_pos].iter() {
					criterion.label_freqs_left[criterion.labels[entry.sample_number]] += 1;
				}
				izip!(
					criterion.label_freqs_right.iter_mut(),
					criterion.label_freqs_total.iter(),
					criterion.label_freqs_left.iter(),
				)
				.for_each(|(right, total, left)| *right = total - left);
				criterion.pos = new_pos;
			}
			Criterion::Regression(criterion) => {
				for entry in sample_index[criterion.pos..new_pos].iter() {
					let target = criterion.targets[entry.sample_number];
					criterion.sum_left += target;
					criterion.squared_sum_left += target * target;
				}
				criterion.sum_right = criterion.sum_total - criterion.sum_left;
				criterion.squared_sum_right = criterion.squared_sum_total - criterion.squared_sum_left;
				criterion.pos = new_pos;
			}
		}
	}

	/// The impurities of the left and right partitions at the current split cursor.
	pub fn children_impurities(&self) -> (f64, f64) {
		let (n_left, n_right) = self.n_children();
		match self {
			Criterion::Classification(criterion) => (
				classification_impurity(criterion.measure, &criterion.label_freqs_left, n_left),
				classification_impurity(criterion.measure, &criterion.label_freqs_right, n_right),
			),
			Criterion::Regression(criterion) => (
				squared_error_impurity(criterion.sum_left, criterion.squared_sum_left, n_left),
				squared_error_impurity(criterion.sum_right, criterion.squared_sum_right, n_right),
			),
		}
	}

	/// Score the current split position. This is the unnormalized quantity `-n_left * impurity_left - n_right * impurity_right`, which is only meaningful for comparing candidate splits of the same node, where the parent impurity is a shared constant. It is not an absolute gain.
	pub fn impurity_improvement(&self) -> f64 {
		let (n_left, n_right) = self.n_children();
		let (impurity_left, impurity_right) = self.children_impurities();
		-n_left.to_f64().unwrap() * impurity_left - n_right.to_f64().unwrap() * impurity_right
	}

	/// The impurity of the full `[start, end)` range.
	pub fn node_impurity(&self) -> f64 {
		match self {
			Criterion::Classification(criterion) => classification_impurity(
				criterion.measure,
				&criterion.label_freqs_total,
				criterion.end - criterion.start,
			),
			Criterion::Regression(criterion) => squared_error_impurity(
				criterion.sum_total,
				criterion.squared_sum_total,
				criterion.end - criterion.start,
			),
		}
	}

	/// The value stored into the node: the label histogram for classification, `[mean]` for regression.
	pub fn node_value(&self) -> Vec<f64> {
		match self {
			Criterion::Classification(criterion) => criterion
				.label_freqs_total
				.iter()
				.map(|freq| freq.to_f64().unwrap())
				.collect(),
			Criterion::Regression(criterion) => {
				let n_samples = criterion.end - criterion.start;
				if n_samples == 0 {
					vec![0.0]
				} else {
					vec![criterion.sum_total / n_samples.to_f64().unwrap()]
				}
			}
		}
	}

	pub fn sample_range(&self) -> (usize, usize) {
		match self {
			Criterion::Classification(criterion) => (criterion.start, criterion.end),
			Criterion::Regression(criterion) => (criterion.start, criterion.end),
		}
	}

	fn n_children(&self) -> (usize, usize) {
		match self {
			Criterion::Classification(criterion) => {
				(criterion.pos - criterion.start, criterion.end - criterion.pos)
			}
			Criterion::Regression(criterion) => {
				(criterion.pos - criterion.start, criterion.end - criterion.pos)
			}
		}
	}
}

fn classification_impurity(measure: ImpurityMeasure, label_freqs: &[usize], n_samples: usize) -> f64 {
	match measure {
		ImpurityMeasure::Gini => gini_impurity(label_freqs, n_samples),
		ImpurityMeasure::Entropy => entropy(label_freqs, n_samples),
		ImpurityMeasure::SquaredError => unreachable!(),
	}
}

/// The gini impurity `1 - Σ (f_i / n)²` of a label histogram. A partition with zero samples has impurity 0.
pub fn gini_impurity(label_freqs: &[usize], n_samples: usize) -> f64 {
	if n_samples == 0 {
		return 0.0;
	}
	let n = n_samples.to_f64().unwrap();
	let freq_squares: f64 = label_freqs
		.iter()
		.map(|freq| {
			let freq = freq.to_f64().unwrap();
			freq * freq
		})
		.sum();
	1.0 - freq_squares / (n * n)
}

/// The entropy `-Σ (f_i / n) * log2(f_i / n)` of a label histogram, where zero-frequency labels contribute 0. A partition with zero samples has impurity 0.
pub fn entropy(label_freqs: &[usize], n_samples: usize) -> f64 {
	if n_samples == 0 {
		return 0.0;
	}
	let n = n_samples.to_f64().unwrap();
	label_freqs
		.iter()
		.filter(|freq| **freq > 0)
		.map(|freq| {
			let p = freq.to_f64().unwrap() / n;
			-p * p.log2()
		})
		.sum()
}

/// The population variance `Σx²/n - (Σx/n)²` of a partition given its sum and sum of squares. This is deliberately the biased estimator, not Bessel-corrected. A partition with zero samples has impurity 0.
pub fn squared_error_impurity(sum: f64, squared_sum: f64, n_samples: usize) -> f64 {
	if n_samples == 0 {
		return 0.0;
	}
	let n = n_samples.to_f64().unwrap();
	let mean = sum / n;
	squared_sum / n - mean * mean
}

#[cfg(test)]
fn sample_index_for_test(n_samples: usize) -> Vec<SampleIndexEntry> {
	(0..n_samples)
		.map(|sample_number| SampleIndexEntry {
			sample_number,
			current_feature_value: 0.0,
		})
		.collect()
}

#[test]
fn test_gini_impurity() {
	assert!((gini_impurity(&[20, 80], 100) - 0.32).abs() < 1e-12);
	assert!((gini_impurity(&[50, 50], 100) - 0.5).abs() < 1e-12);
	assert_eq!(gini_impurity(&[100, 0], 100), 0.0);
}

#[test]
fn test_entropy() {
	assert!((entropy(&[20, 80], 100) - 0.7219280948873623).abs() < 1e-12);
	assert!((entropy(&[50, 50], 100) - 1.0).abs() < 1e-12);
	assert_eq!(entropy(&[100, 0], 100), 0.0);
}

#[test]
fn test_squared_error_impurity() {
	// values [1, 2, 3, 4]: mean 2.5, population variance 1.25
	assert!((squared_error_impurity(10.0, 30.0, 4) - 1.25).abs() < 1e-12);
	assert_eq!(squared_error_impurity(4.0, 16.0, 1), 0.0);
}

#[test]
fn test_zero_sample_impurity_is_zero() {
	assert_eq!(gini_impurity(&[0, 0], 0), 0.0);
	assert_eq!(entropy(&[0, 0], 0), 0.0);
	assert_eq!(squared_error_impurity(0.0, 0.0, 0), 0.0);
}

#[test]
fn test_histogram_conservation() {
	let labels = vec![0, 1, 1, 2, 0, 1, 2, 2];
	let sample_index = sample_index_for_test(labels.len());
	let mut criterion = Criterion::classification(labels.as_slice(), 3, ImpurityMeasure::Gini);
	criterion.init(0, labels.len(), sample_index.as_slice());
	for pos in 1..labels.len() {
		criterion.reset();
		criterion.update(pos, sample_index.as_slice());
		if let Criterion::Classification(criterion) = &criterion {
			let mut n_total = 0;
			izip!(
				criterion.label_freqs_left.iter(),
				criterion.label_freqs_right.iter(),
				criterion.label_freqs_total.iter(),
			)
			.for_each(|(left, right, total)| {
				assert_eq!(left + right, *total);
				n_total += total;
			});
			assert_eq!(n_total, labels.len());
		}
	}
}

#[test]
fn test_regression_update_is_streaming() {
	let targets = vec![1.0, 2.0, 3.0, 4.0];
	let sample_index = sample_index_for_test(targets.len());
	let mut criterion = Criterion::regression(targets.as_slice());
	criterion.init(0, targets.len(), sample_index.as_slice());
	assert!((criterion.node_impurity() - 1.25).abs() < 1e-12);
	criterion.reset();
	criterion.update(1, sample_index.as_slice());
	criterion.update(2, sample_index.as_slice());
	let (impurity_left, impurity_right) = criterion.children_impurities();
	// left [1, 2] has variance 0.25, right [3, 4] has variance 0.25
	assert!((impurity_left - 0.25).abs() < 1e-12);
	assert!((impurity_right - 0.25).abs() < 1e-12);
	assert!((criterion.impurity_improvement() - -1.0).abs() < 1e-12);
}
