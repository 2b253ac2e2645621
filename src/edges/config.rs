use std::{fs::File, io, path::PathBuf};

use log::warn;

use crate::{sweep::ConfigError, util::image::gaussian_kernel_size};

/// Default gradient scale factor, applied to both Sobel responses.
///
/// This is only the factor applied after the operator; the Sobel kernels themselves are
/// unscaled. Min-max normalization cancels any uniform factor.
pub const DEFAULT_SENSITIVITY: f32 = 3.0;

/// Where the Sobel operator finds the rows above and below the current row
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalSupport {
	/// Every row is its own 1-row image. Both vertical neighbours reflect onto the
	/// row itself, so the vertical gradient is always zero.
	#[default]
	Row,
	/// Neighbours come from the same band, reflected at the band's first and last rows.
	Band,
	/// Neighbours come from the whole input image, crossing band boundaries.
	Image,
}

/// Range used for min-max normalization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NormalizationScope {
	/// Each band uses its own min/max. Outputs may show seams between bands.
	#[default]
	Band,
	/// All bands share the image-wide min/max. Adds a barrier between gradient
	/// computation and quantization.
	Global,
}

/// Sharpening applied after quantization:
/// `out = original_weight * img + blurred_weight * blur(img, sigma)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnsharpMask {
	/// Standard deviation of the gaussian blur, in pixels
	pub sigma: f32,
	pub original_weight: f32,
	pub blurred_weight: f32,
}

impl Default for UnsharpMask {
	fn default() -> Self {
		Self {
			sigma: 5.0,
			original_weight: 1.5,
			blurred_weight: -0.5,
		}
	}
}

impl UnsharpMask {
	/// Blur kernel size derived from sigma
	pub fn kernel_size(&self) -> usize {
		gaussian_kernel_size(self.sigma)
	}
}

/// Configuration for [EdgeProcessor](super::EdgeProcessor)
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeConfig {
	/// Both gradient components are multiplied by this before computing the magnitude.
	///
	/// With per-band min-max normalization the scale cancels out, except for the
	/// rounding it causes.
	pub sensitivity: f32,

	/// Vertical neighbourhood for the Sobel operator
	pub vertical: VerticalSupport,

	pub normalization: NormalizationScope,

	/// Apply histogram equalization to each band after quantization.
	/// The equalized band feeds the sharpening pass.
	pub equalize: bool,

	/// Sharpening pass (disabled when `None`)
	pub unsharp: Option<UnsharpMask>,

	/// When set, every band writes its intermediate images here (slow).
	pub debug_path: Option<PathBuf>,
}

impl Default for EdgeConfig {
	fn default() -> Self {
		Self {
			sensitivity: DEFAULT_SENSITIVITY,
			vertical: VerticalSupport::default(),
			normalization: NormalizationScope::default(),
			equalize: false,
			unsharp: Some(UnsharpMask::default()),
			debug_path: None,
		}
	}
}

impl EdgeConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !(self.sensitivity.is_finite() && self.sensitivity > 0.) {
			return Err(ConfigError::Sensitivity(self.sensitivity));
		}
		if let Some(mask) = &self.unsharp {
			if !(mask.sigma.is_finite() && mask.sigma >= 0.) {
				return Err(ConfigError::BlurSigma(mask.sigma));
			}
			if !(mask.original_weight.is_finite() && mask.blurred_weight.is_finite()) {
				return Err(ConfigError::BlendWeights {
					original: mask.original_weight,
					blurred: mask.blurred_weight,
				});
			}
		}
		Ok(())
	}

	/// Write a debug image named `name` into [EdgeConfig::debug_path], if set.
	///
	/// Failures are logged and otherwise ignored.
	pub(crate) fn debug_image(&self, name: &str, callback: impl FnOnce(File) -> io::Result<()>) {
		let Some(dir) = &self.debug_path else {
			return;
		};
		let path = dir.join(name);
		let result = File::create(&path)
			.and_then(callback);
		if let Err(e) = result {
			warn!("Unable to write debug image {}: {e}", path.display());
		}
	}
}
