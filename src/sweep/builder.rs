use crate::edges::{NormalizationScope, UnsharpMask, VerticalSupport};

use super::{Sweep, SweepConfig, SweepError};

#[derive(Clone, Debug, Default)]
pub struct SweepBuilder {
	/// Configuration parameters
	pub config: SweepConfig,
}

impl From<Sweep> for SweepBuilder {
	fn from(value: Sweep) -> Self {
		Self {
			config: value.config,
		}
	}
}

impl SweepBuilder {
	/// Replace the thread counts to sweep over
	pub fn with_thread_counts(mut self, counts: impl IntoIterator<Item = usize>) -> Self {
		self.config.thread_counts = counts.into_iter().collect();
		self
	}

	pub fn sensitivity(&self) -> f32 {
		self.config.edge.sensitivity
	}

	pub fn set_sensitivity(&mut self, sensitivity: f32) {
		self.config.edge.sensitivity = sensitivity;
	}

	pub fn set_vertical_support(&mut self, support: VerticalSupport) {
		self.config.edge.vertical = support;
	}

	pub fn set_normalization(&mut self, scope: NormalizationScope) {
		self.config.edge.normalization = scope;
	}

	pub fn set_equalize(&mut self, equalize: bool) {
		self.config.edge.equalize = equalize;
	}

	/// Set the sharpening pass (`None` disables it)
	pub fn set_unsharp(&mut self, mask: Option<UnsharpMask>) {
		self.config.edge.unsharp = mask;
	}

	/// Build a sweep with these options
	pub fn build(self) -> Result<Sweep, SweepError> {
		Sweep::new(self.config)
	}
}
