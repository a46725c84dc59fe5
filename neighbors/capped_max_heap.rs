/// A fixed-capacity binary max-heap over parallel key/value arrays. Once every slot is filled, a new entry is only accepted if its key is smaller than the current maximum, which it then evicts. The heap therefore retains exactly the k smallest keys ever added to it, which is the correctness property bounded k-nearest-neighbor search depends on.
pub struct CappedMaxHeap {
	keys: Vec<f64>,
	vals: Vec<usize>,
	/// The next slot to fill. Slots are filled from the end of the array backward, so the subtrees below every filled slot are always complete heaps.
	pos: usize,
}

impl CappedMaxHeap {
	pub fn new(capacity: usize) -> CappedMaxHeap {
		CappedMaxHeap {
			keys: vec![f64::INFINITY; capacity],
			vals: vec![0; capacity],
			pos: capacity,
		}
	}

	pub fn is_full(&self) -> bool {
		self.pos == 0
	}

	/// The largest retained key. Until the heap is full this is infinity, meaning no bound has been established yet.
	pub fn max_key(&self) -> f64 {
		self.keys[0]
	}

	pub fn keys(&self) -> &[f64] {
		&self.keys
	}

	pub fn vals(&self) -> &[usize] {
		&self.vals
	}

	/// Add an entry. While filling, the entry is placed in the next free slot and sifted down into its subtree. Once full, the entry replaces the current maximum only if its key is smaller.
	pub fn add(&mut self, key: f64, val: usize) {
		if self.pos > 0 {
			self.pos -= 1;
			self.keys[self.pos] = key;
			self.vals[self.pos] = val;
			self.sift_down(self.pos);
		} else if key < self.keys[0] {
			self.keys[0] = key;
			self.vals[0] = val;
			self.sift_down(0);
		}
	}

	/// Destructively sort the entries ascending by key. Must only be called once the heap is full.
	pub fn sort(&mut self) {
		debug_assert!(self.is_full());
		let mut entries: Vec<(f64, usize)> = self
			.keys
			.iter()
			.copied()
			.zip(self.vals.iter().copied())
			.collect();
		entries.sort_unstable_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
		for (slot, (key, val)) in entries.into_iter().enumerate() {
			self.keys[slot] = key;
			self.vals[slot] = val;
		}
	}

	fn sift_down(&mut self, slot: usize) {
		let mut slot = slot;
		loop {
			let left = 2 * slot + 1;
			let right = 2 * slot + 2;
			let mut largest = slot;
			if left < self.keys.len() && self.keys[left] > self.keys[largest] {
				largest = left;
			}
			if right < self.keys.len() && self.keys[right] > self.keys[largest] {
				largest = right;
			}
			if largest == slot {
				break;
			}
			self.keys.swap(slot, largest);
			self.vals.swap(slot, largest);
			slot = largest;
		}
	}
}

#[test]
fn test_retains_k_smallest_keys() {
	let mut heap = CappedMaxHeap::new(3);
	for (val, key) in [5.0, 1.0, 9.0, 2.0, 7.0, 0.0].iter().enumerate() {
		heap.add(*key, val);
	}
	assert!(heap.is_full());
	heap.sort();
	assert_eq!(heap.keys(), &[0.0, 1.0, 2.0]);
	assert_eq!(heap.vals(), &[5, 1, 3]);
}

#[test]
fn test_max_key_tracks_largest_retained_entry() {
	let mut heap = CappedMaxHeap::new(2);
	assert_eq!(heap.max_key(), f64::INFINITY);
	heap.add(3.0, 0);
	heap.add(1.0, 1);
	assert_eq!(heap.max_key(), 3.0);
	// A key larger than the current max is rejected.
	heap.add(10.0, 2);
	assert_eq!(heap.max_key(), 3.0);
	// A smaller key evicts the max.
	heap.add(2.0, 3);
	assert_eq!(heap.max_key(), 2.0);
	heap.sort();
	assert_eq!(heap.keys(), &[1.0, 2.0]);
	assert_eq!(heap.vals(), &[1, 3]);
}
