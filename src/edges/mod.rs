//! Gradient-magnitude edge intensities, computed one band at a time.
mod config;
mod gradient;
mod post;

pub use config::{EdgeConfig, NormalizationScope, UnsharpMask, VerticalSupport, DEFAULT_SENSITIVITY};
pub use gradient::BandGradients;
pub use post::{quantize, ValueRange};

use crate::{
    dbg::debug_images,
    partition::Band,
    util::image::{HasDimensions, ImageBuffer, ImageF32, ImageWritePNM, Luma, Luminance, RowsMut},
};

/// Runs the edge pipeline on bands of an input image.
///
/// The pipeline is split in two halves so that the normalization range can be
/// computed either per band or across the whole image:
///  1. [EdgeProcessor::band_magnitude]: luminance, Sobel derivatives, magnitude
///  2. [EdgeProcessor::render_band]: quantization, equalization, sharpening
#[derive(Clone, Debug)]
pub struct EdgeProcessor {
    config: EdgeConfig,
}

impl EdgeProcessor {
    pub fn new(config: EdgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Gradient magnitude for every row of `band`, which is clamped to the image
    pub fn band_magnitude<P: Luminance>(&self, input: &ImageBuffer<P>, band: &Band) -> ImageF32 {
        let band = band.clamped(input.height());
        BandGradients::compute(input, &band, self.config.vertical, self.config.sensitivity)
            .magnitude()
    }

    /// Quantize `magnitude` with `range` and post-process it into `out`.
    ///
    /// `out` must have the same size as `magnitude`.
    pub fn render_band(&self, band: &Band, magnitude: &ImageF32, range: Option<ValueRange>, out: &mut RowsMut<'_, Luma<u8>>) {
        debug_assert_eq!((magnitude.width(), magnitude.height()), (out.width(), out.height()));
        if out.is_empty() {
            return;
        }

        let mut img = quantize(magnitude, range);
        self.config.debug_image(&debug_images::band_file(debug_images::QUANTIZED, band.index), |mut f| img.write_pnm(&mut f));

        if self.config.equalize {
            img.equalize_histogram();
            self.config.debug_image(&debug_images::band_file(debug_images::EQUALIZED, band.index), |mut f| img.write_pnm(&mut f));
        }

        if let Some(mask) = &self.config.unsharp {
            post::unsharp(&mut img, mask);
            self.config.debug_image(&debug_images::band_file(debug_images::SHARPENED, band.index), |mut f| img.write_pnm(&mut f));
        }

        out.copy_from(&img);
    }

    /// Whole pipeline for one band, normalized by the band's own range
    pub fn process_band<P: Luminance>(&self, input: &ImageBuffer<P>, band: &Band, out: &mut RowsMut<'_, Luma<u8>>) {
        let magnitude = self.band_magnitude(input, band);
        let range = ValueRange::of(&magnitude);
        self.render_band(band, &magnitude, range, out);
    }
}
