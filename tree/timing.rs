use num_traits::ToPrimitive;
use std::{
	sync::atomic::{AtomicU64, Ordering},
	time::{Duration, Instant},
};

/// Wall time spent in each phase of growing a tree. Phases that run on several threads at once add up the time of every thread.
#[derive(Debug, Default)]
pub struct Timing {
	pub choose_best_split: PhaseDuration,
	pub rearrange_examples_index: PhaseDuration,
	pub flatten: PhaseDuration,
}

#[derive(Default)]
pub struct PhaseDuration(AtomicU64);

impl PhaseDuration {
	pub fn get(&self) -> Duration {
		Duration::from_nanos(self.0.load(Ordering::Relaxed))
	}

	/// Run `f` and add the time it took to this phase.
	pub fn measure<T>(&self, f: impl FnOnce() -> T) -> T {
		let start = Instant::now();
		let output = f();
		let nanos = start.elapsed().as_nanos().to_u64().unwrap_or(std::u64::MAX);
		self.0.fetch_add(nanos, Ordering::Relaxed);
		output
	}
}

impl std::fmt::Debug for PhaseDuration {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.get())
	}
}
