use super::StreamingMetric;
use num_traits::ToPrimitive;

/// The arithmetic mean of the inputs. The mean of no inputs is 0.
#[derive(Clone, Debug, Default)]
pub struct Mean {
	n: u64,
	sum: f64,
}

impl Mean {
	pub fn new() -> Mean {
		Mean::default()
	}

	pub fn n(&self) -> u64 {
		self.n
	}
}

impl StreamingMetric<'_> for Mean {
	type Input = f32;
	type Output = f32;

	fn update(&mut self, value: f32) {
		self.n += 1;
		self.sum += value.to_f64().unwrap();
	}

	fn merge(&mut self, other: Self) {
		self.n += other.n;
		self.sum += other.sum;
	}

	fn finalize(self) -> f32 {
		if self.n == 0 {
			return 0.0;
		}
		(self.sum / self.n.to_f64().unwrap()).to_f32().unwrap()
	}
}

#[test]
fn test_mean() {
	assert_eq!(Mean::new().finalize(), 0.0);
	let mut a = Mean::new();
	a.update(1.0);
	a.update(2.0);
	let mut b = Mean::new();
	b.update(6.0);
	a.merge(b);
	assert_eq!(a.n(), 3);
	assert_eq!(a.finalize(), 3.0);
	let mut c = Mean::new();
	c.merge(Mean::new());
	assert_eq!(c.finalize(), 0.0);
}
