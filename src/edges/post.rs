use crate::util::image::{HasDimensions, ImageF32, ImageY8};

use super::UnsharpMask;

/// Smallest span treated as a usable normalization range
const MIN_SPAN: f32 = f32::EPSILON;

/// Closed range of values seen in a magnitude image
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// Min and max of every pixel, or `None` for an empty image
    pub fn of(img: &ImageF32) -> Option<Self> {
        img.rows()
            .flat_map(|(_, row)| row.iter().copied())
            .fold(None, |acc: Option<Self>, v| Some(match acc {
                Some(range) => range.include(v),
                None => Self { min: v, max: v },
            }))
    }

    fn include(self, v: f32) -> Self {
        Self {
            min: self.min.min(v),
            max: self.max.max(v),
        }
    }

    /// Smallest range covering both
    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Merge optional ranges, skipping missing ones
    pub fn merge_all(ranges: impl IntoIterator<Item = Option<Self>>) -> Option<Self> {
        ranges.into_iter()
            .flatten()
            .reduce(Self::merge)
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

/// Min-max normalize `img` to `0..=255` and round to 8 bits.
///
/// A degenerate range (no pixels, or `max == min`) yields an all-zero image.
pub fn quantize(img: &ImageF32, range: Option<ValueRange>) -> ImageY8 {
    let mut result = ImageY8::zeroed(img.width(), img.height());
    let Some(range) = range else {
        return result;
    };
    if !(range.span() > MIN_SPAN) {
        return result;
    }

    let scale = 255. / range.span();
    for (y, row) in img.rows() {
        for (dst, v) in result.row_mut(y).iter_mut().zip(row) {
            *dst = ((v - range.min) * scale).round().clamp(0., 255.) as u8;
        }
    }
    result
}

/// Sharpen by subtracting a weighted blurred copy
pub fn unsharp(img: &mut ImageY8, mask: &UnsharpMask) {
    if img.is_empty() {
        return;
    }
    let blurred = img.gaussian_blur(mask.sigma, mask.kernel_size());
    img.add_weighted(mask.original_weight, &blurred, mask.blurred_weight, 0.);
}
