use std::path::{Path, PathBuf};

use ::image::{DynamicImage, GrayImage, RgbImage};
use thiserror::Error;

use super::{HasDimensions, ImageBuffer, ImageRGB8, ImageY8, Luma, Pixel, Rgb};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("Unable to decode {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },
    #[error("Image {} has no pixels ({width}x{height})", path.display())]
    Empty {
        path: PathBuf,
        width: usize,
        height: usize,
    },
}

/// Source image for the sweep, in its native channel layout
#[derive(Clone, Debug)]
pub enum InputImage {
    Gray(ImageY8),
    Rgb(ImageRGB8),
}

impl InputImage {
    pub fn width(&self) -> usize {
        match self {
            Self::Gray(img) => img.width(),
            Self::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Self::Gray(img) => img.height(),
            Self::Rgb(img) => img.height(),
        }
    }

    pub const fn channels(&self) -> usize {
        match self {
            Self::Gray(_) => Luma::<u8>::CHANNEL_COUNT,
            Self::Rgb(_) => Rgb::<u8>::CHANNEL_COUNT,
        }
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        match self {
            Self::Gray(img) => DynamicImage::ImageLuma8(img.into()),
            Self::Rgb(img) => DynamicImage::ImageRgb8(img.into()),
        }
    }
}

impl From<DynamicImage> for InputImage {
    fn from(value: DynamicImage) -> Self {
        if value.color().has_color() {
            Self::Rgb(value.into_rgb8().into())
        } else {
            Self::Gray(value.into_luma8().into())
        }
    }
}

/// Decode an image file. Grayscale files stay single-channel; everything else
/// is converted to 8-bit RGB (alpha is dropped).
pub fn load_image(path: &Path) -> Result<InputImage, LoadError> {
    let decoded = ::image::open(path)
        .map_err(|source| LoadError::Decode { path: path.to_owned(), source })?;

    let image = InputImage::from(decoded);
    if image.width() == 0 || image.height() == 0 {
        return Err(LoadError::Empty {
            path: path.to_owned(),
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(image)
}

impl From<GrayImage> for ImageY8 {
    fn from(value: GrayImage) -> Self {
        let (width, height) = value.dimensions();
        let mut result = Self::zeroed(width as usize, height as usize);
        result.buf.copy_from_slice(value.as_raw());
        result
    }
}

impl From<RgbImage> for ImageRGB8 {
    fn from(value: RgbImage) -> Self {
        let (width, height) = value.dimensions();
        let mut result = Self::zeroed(width as usize, height as usize);
        result.buf.copy_from_slice(value.as_raw());
        result
    }
}

impl From<&ImageBuffer<Luma<u8>>> for GrayImage {
    fn from(value: &ImageBuffer<Luma<u8>>) -> Self {
        GrayImage::from_fn(value.width() as u32, value.height() as u32, |x, y| {
            ::image::Luma([value[(x as usize, y as usize)]])
        })
    }
}

impl From<&ImageBuffer<Rgb<u8>>> for RgbImage {
    fn from(value: &ImageBuffer<Rgb<u8>>) -> Self {
        RgbImage::from_fn(value.width() as u32, value.height() as u32, |x, y| {
            ::image::Rgb(value[(x as usize, y as usize)])
        })
    }
}
