use std::num::NonZeroUsize;

use crate::edges::EdgeConfig;

use super::ConfigError;

/// Thread counts run by default. Every count appears twice so the second run
/// shows timings after the first has warmed up caches.
pub const DEFAULT_THREAD_COUNTS: [usize; 14] = [1, 1, 2, 2, 4, 4, 8, 8, 16, 16, 32, 32, 64, 64];

/// Configuration for a [Sweep](super::Sweep)
#[derive(Clone, Debug, PartialEq)]
pub struct SweepConfig {
	/// Worker counts, one sweep entry each, run in order
	pub thread_counts: Vec<usize>,

	/// Per-band edge pipeline
	pub edge: EdgeConfig,
}

impl Default for SweepConfig {
	fn default() -> Self {
		Self {
			thread_counts: DEFAULT_THREAD_COUNTS.to_vec(),
			edge: EdgeConfig::default(),
		}
	}
}

impl SweepConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.thread_counts.is_empty() {
			return Err(ConfigError::NoThreadCounts);
		}
		if let Some(index) = self.thread_counts.iter().position(|n| *n == 0) {
			return Err(ConfigError::ZeroThreads { index });
		}
		self.edge.validate()
	}

	/// Thread counts, once validated
	pub(crate) fn entries(&self) -> impl Iterator<Item = NonZeroUsize> + '_ {
		self.thread_counts
			.iter()
			.filter_map(|n| NonZeroUsize::new(*n))
	}
}

#[cfg(test)]
mod test {
	use crate::sweep::ConfigError;

	use super::SweepConfig;

	#[test]
	fn default_sweep() {
		let config = SweepConfig::default();
		config.validate().unwrap();
		assert_eq!(config.thread_counts.len(), 14);
		assert_eq!(config.entries().map(|n| n.get()).max(), Some(64));
	}

	#[test]
	fn rejects_empty_sweep() {
		let config = SweepConfig { thread_counts: vec![], ..Default::default() };
		assert_eq!(config.validate(), Err(ConfigError::NoThreadCounts));
	}

	#[test]
	fn rejects_zero_threads() {
		let config = SweepConfig { thread_counts: vec![1, 2, 0, 4], ..Default::default() };
		assert_eq!(config.validate(), Err(ConfigError::ZeroThreads { index: 2 }));
	}
}
