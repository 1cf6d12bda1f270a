#![allow(clippy::tabs_in_doc_comments)]

use std::sync::{
	atomic::{AtomicU64, Ordering},
	Arc,
};

/**
A `ProgressCounter` tracks how much of a task has completed when the work is spread over many threads, for example how many trees of a forest have finished training.

Every clone of a `ProgressCounter` shares the same underlying count. Counting is done with a relaxed atomic add rather than a mutex, so tasks that finish at the same time never wait on each other:

```
use arbor_progress::ProgressCounter;

let progress_counter = ProgressCounter::new(4);
std::thread::scope(|scope| {
	for _ in 0..4 {
		let progress_counter = progress_counter.clone();
		scope.spawn(move || progress_counter.inc(1));
	}
});
assert!(progress_counter.is_complete());
```
*/
#[derive(Clone, Debug)]
pub struct ProgressCounter {
	current: Arc<AtomicU64>,
	total: u64,
}

impl ProgressCounter {
	/// Create a new `ProgressCounter` that will count from 0 up to the specified `total`.
	pub fn new(total: u64) -> Self {
		Self {
			current: Arc::new(AtomicU64::new(0)),
			total,
		}
	}
	/// Retrieve the total value this `ProgressCounter` counts up to.
	pub fn total(&self) -> u64 {
		self.total
	}
	/// Retrieve the current progress value.
	pub fn get(&self) -> u64 {
		self.current.load(Ordering::Relaxed)
	}
	/// Set the current progress value.
	pub fn set(&self, value: u64) {
		self.current.store(value, Ordering::Relaxed);
	}
	/// Increment the progress value by `amount`.
	pub fn inc(&self, amount: u64) {
		self.current.fetch_add(amount, Ordering::Relaxed);
	}
	/// Returns true once the current value has reached the total.
	pub fn is_complete(&self) -> bool {
		self.get() >= self.total
	}
}

#[test]
fn test_clones_share_progress() {
	let progress_counter = ProgressCounter::new(3);
	let clone = progress_counter.clone();
	clone.inc(2);
	assert_eq!(progress_counter.get(), 2);
	assert!(!progress_counter.is_complete());
	progress_counter.inc(1);
	assert!(clone.is_complete());
	clone.set(0);
	assert_eq!(progress_counter.get(), 0);
	assert_eq!(progress_counter.total(), 3);
}
