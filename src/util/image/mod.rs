mod border;
mod io;
mod luma;
mod pixel;
mod rgb;
mod rows;

use std::{io::{self as stdio}, ops::{Index, IndexMut, Range}};

pub use border::reflect_101;
pub use io::{load_image, InputImage, LoadError};
pub use luma::gaussian_kernel_size;
pub use pixel::{Luma, Luminance, Pixel, Primitive, Rgb};
pub use rows::{RowRangeError, RowsMut};

pub type SubpixelArray<P> = [<P as Pixel>::Subpixel];

/// 8-bit grayscale image
pub type ImageY8 = ImageBuffer<Luma<u8>>;
/// 8-bit RGB image
pub type ImageRGB8 = ImageBuffer<Rgb<u8>>;
/// Single-channel float image
pub type ImageF32 = ImageBuffer<Luma<f32>>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ImageDimensions {
	/// Image width (in pixels)
	pub width: usize,
	/// Image height (in pixels)
	pub height: usize,
	/// Image stride (in pixels)
	pub stride: usize,
}

impl ImageDimensions {
    const fn stride_subpixels<P: Pixel>(&self) -> usize {
        self.stride * P::CHANNEL_COUNT
    }

    const fn width_subpixels<P: Pixel>(&self) -> usize {
        self.width * P::CHANNEL_COUNT
    }
}

pub trait HasDimensions {
    fn dimensions(&self) -> &ImageDimensions;

    #[inline]
    fn width(&self) -> usize {
        self.dimensions().width
    }

    #[inline]
    fn height(&self) -> usize {
        self.dimensions().height
    }

    #[inline]
    fn stride(&self) -> usize {
        self.dimensions().stride
    }

    /// Does this image contain no pixels?
    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Flat, row-major image buffer
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer<P: Pixel> {
    pub(crate) dims: ImageDimensions,
    pub(crate) buf: Box<SubpixelArray<P>>,
}

impl<P: Pixel> HasDimensions for ImageBuffer<P> {
	#[inline(always)]
    fn dimensions(&self) -> &ImageDimensions {
        &self.dims
    }
}

impl<P: Pixel> ImageBuffer<P> {
    /// Create a zeroed image with no row padding
    pub fn zeroed(width: usize, height: usize) -> Self {
        Self::zeroed_with_stride(width, height, width)
    }

    pub fn zeroed_with_stride(width: usize, height: usize, stride: usize) -> Self {
        assert!(stride >= width, "Stride {stride} is smaller than width {width}");
        let buf = vec![P::Subpixel::default(); height * stride * P::CHANNEL_COUNT].into_boxed_slice();
        Self {
            dims: ImageDimensions { width, height, stride },
            buf,
        }
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> P) -> Self {
        let mut result = Self::zeroed(width, height);
        for y in 0..height {
            let row = result.row_mut(y);
            for (x, dst) in row.chunks_exact_mut(P::CHANNEL_COUNT).enumerate() {
                dst.copy_from_slice(f(x, y).channels());
            }
        }
        result
    }

    #[inline]
    fn row_idxs(&self, y: usize) -> Range<usize> {
        assert!(y < self.dims.height, "Row {y} out of bounds (height: {})", self.dims.height);
        let start = y * self.dims.stride_subpixels::<P>();
        start..(start + self.dims.width_subpixels::<P>())
    }

    #[inline(always)]
    fn pixel_idxs(&self, x: usize, y: usize) -> Range<usize> {
        if x >= self.dims.width || y >= self.dims.height {
            panic!("Image index {:?} out of bounds {:?}", (x, y), self.dims);
        }
        let start = y * self.dims.stride_subpixels::<P>() + x * P::CHANNEL_COUNT;
        start..(start + P::CHANNEL_COUNT)
    }

    /// Subpixels of row `y` (without padding)
    #[inline]
    pub fn row(&self, y: usize) -> &SubpixelArray<P> {
        &self.buf[self.row_idxs(y)]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut SubpixelArray<P> {
        let idxs = self.row_idxs(y);
        &mut self.buf[idxs]
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = (usize, &SubpixelArray<P>)> + '_ {
        (0..self.dims.height).map(move |y| (y, self.row(y)))
    }

    pub fn pixel(&self, x: usize, y: usize) -> P {
        P::from_channels(&self.buf[self.pixel_idxs(x, y)])
    }

    /// Copy pixels into a packed `Vec`, dropping row padding
    pub fn to_packed_vec(&self) -> Vec<P::Subpixel> {
        let mut result = Vec::with_capacity(self.dims.width_subpixels::<P>() * self.dims.height);
        for (_, row) in self.rows() {
            result.extend_from_slice(row);
        }
        result
    }
}

impl<P: Pixel> Index<(usize, usize)> for ImageBuffer<P> {
	type Output = P::Value;

	fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
		let slice = &self.buf[self.pixel_idxs(x, y)];
		<P as Pixel>::slice_to_value(slice)
	}
}

/// Get a pixel
impl<P: Pixel> IndexMut<(usize, usize)> for ImageBuffer<P> {
	fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
		let idxs = self.pixel_idxs(x, y);
		<P as Pixel>::slice_to_value_mut(&mut self.buf[idxs])
	}
}

pub trait ImageWritePNM {
    fn write_pnm(&self, f: &mut impl stdio::Write) -> stdio::Result<()>;
}
