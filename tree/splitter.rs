use crate::criterion::Criterion;
use ndarray::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

/// Two feature values closer than this are considered equal, so no split boundary is placed between them.
const FEATURE_THRESHOLD: f64 = 1e-8;

/// One entry per training sample. The index array is a permutation of the initial entries: entries are reordered in place during splitting but never created or destroyed.
pub struct SampleIndexEntry {
	/// The row this entry refers to in the feature matrix. Stable across reordering.
	pub sample_number: usize,
	/// Scratch storage for the value of the feature currently being scanned, reused across features.
	pub current_feature_value: f64,
}

/// The best split found for a node. `pos` indexes into the global sample index array, marking the boundary between the left and right partitions after reordering.
#[derive(Clone, Debug)]
pub struct Split {
	pub feature: usize,
	/// The midpoint between the two feature values bracketing the split. Samples with value <= threshold go left.
	pub threshold: f64,
	pub pos: usize,
	pub impurity_left: f64,
	pub impurity_right: f64,
}

/// The splitter searches for the best split of a node's sample range and partitions the sample index in place. One splitter is allocated per tree build and mutated across all nodes.
pub struct Splitter<'a> {
	features: ArrayView2<'a, f64>,
	criterion: Criterion<'a>,
	min_samples_leaf: usize,
	max_features: usize,
	feature_order: Vec<usize>,
	sample_index: Vec<SampleIndexEntry>,
	rng: Xoshiro256Plus,
}

impl<'a> Splitter<'a> {
	/// `samples_subset` selects the rows this splitter operates over; an empty subset means all rows. This lets the same splitter train on a bootstrap sample by indirection.
	pub fn new(
		features: ArrayView2<'a, f64>,
		criterion: Criterion<'a>,
		min_samples_leaf: usize,
		max_features: usize,
		samples_subset: &[usize],
		seed: u64,
	) -> Splitter<'a> {
		let sample_index = if samples_subset.is_empty() {
			(0..features.nrows())
				.map(|sample_number| SampleIndexEntry {
					sample_number,
					current_feature_value: 0.0,
				})
				.collect()
		} else {
			samples_subset
				.iter()
				.map(|&sample_number| SampleIndexEntry {
					sample_number,
					current_feature_value: 0.0,
				})
				.collect()
		};
		let feature_order = (0..features.ncols()).collect();
		Splitter {
			features,
			criterion,
			min_samples_leaf,
			max_features,
			feature_order,
			sample_index,
			rng: Xoshiro256Plus::seed_from_u64(seed),
		}
	}

	pub fn n_samples(&self) -> usize {
		self.sample_index.len()
	}

	/// Establish the active node's range by initializing the criterion's totals over it.
	pub fn reset_sample_range(&mut self, start: usize, end: usize) {
		self.criterion.init(start, end, &self.sample_index);
	}

	pub fn node_impurity(&self) -> f64 {
		self.criterion.node_impurity()
	}

	pub fn node_value(&self) -> Vec<f64> {
		self.criterion.node_value()
	}

	/// Search every candidate feature for the split of the active range with the greatest impurity improvement, then partition the sample index around it. Returns `None` if no admissible split exists: every candidate feature is constant across the range, or every boundary violates `min_samples_leaf`.
	pub fn split_node(&mut self) -> Option<Split> {
		let (start, end) = self.criterion.sample_range();
		// When only a subset of features is scanned, shuffle the feature order once per call to emulate random-subspace selection.
		if self.max_features < self.feature_order.len() {
			self.feature_order.shuffle(&mut self.rng);
		}
		let mut best: Option<Split> = None;
		let mut best_improvement = f64::NEG_INFINITY;
		let mut last_sorted_feature = None;
		for candidate_index in 0..self.max_features {
			let feature = self.feature_order[candidate_index];
			// Copy this feature's value for every sample in the range into the scratch field.
			for entry in self.sample_index[start..end].iter_mut() {
				entry.current_feature_value = self.features[[entry.sample_number, feature]];
			}
			self.criterion.reset();
			// Sort the active sub-range by the scratch field. Equal values end up contiguous, which the boundary scan below relies on.
			self.sample_index[start..end].sort_unstable_by(|a, b| {
				a.current_feature_value
					.partial_cmp(&b.current_feature_value)
					.unwrap()
			});
			// The sort reorders the range even when the feature turns out to be constant, so the already-partitioned check below must account for it.
			last_sorted_feature = Some(feature);
			// A constant feature cannot produce a split.
			if self.sample_index[end - 1].current_feature_value
				<= self.sample_index[start].current_feature_value + FEATURE_THRESHOLD
			{
				continue;
			}
			for pos in start + 1..end {
				let value = self.sample_index[pos].current_feature_value;
				let previous_value = self.sample_index[pos - 1].current_feature_value;
				// Splits may only occur at a genuine value boundary.
				if value <= previous_value + FEATURE_THRESHOLD {
					continue;
				}
				if pos - start < self.min_samples_leaf || end - pos < self.min_samples_leaf {
					continue;
				}
				self.criterion.update(pos, &self.sample_index);
				let improvement = self.criterion.impurity_improvement();
				// Strict comparison: the first split seen with the maximal improvement wins.
				if improvement > best_improvement {
					best_improvement = improvement;
					best = Some(Split {
						feature,
						threshold: (previous_value + value) / 2.0,
						pos,
						impurity_left: 0.0,
						impurity_right: 0.0,
					});
				}
			}
		}
		let mut best = best?;
		// The sample index is already partitioned by the best feature if it was the last one sorted. Otherwise reorder it in place with a two-pointer swap scan.
		if last_sorted_feature != Some(best.feature) {
			let mut left = start;
			let mut right = end;
			while left < right {
				if self.features[[self.sample_index[left].sample_number, best.feature]]
					<= best.threshold
				{
					left += 1;
				} else {
					right -= 1;
					self.sample_index.swap(left, right);
				}
			}
		}
		// Recompute the children impurities at the chosen position.
		self.criterion.reset();
		self.criterion.update(best.pos, &self.sample_index);
		let (impurity_left, impurity_right) = self.criterion.children_impurities();
		best.impurity_left = impurity_left;
		best.impurity_right = impurity_right;
		Some(best)
	}
}
