pub trait Primitive: Copy + Default + PartialOrd + std::fmt::Debug + Send + Sync + 'static {}

impl Primitive for u8 {}

impl Primitive for f32 {}

pub trait Pixel: Copy + Send + Sync + 'static {
    type Subpixel: Primitive;

    type Value;

    /// Number of subpixels per pixel
    const CHANNEL_COUNT: usize;

    fn channels(&self) -> &[Self::Subpixel];

    fn from_channels(slice: &[Self::Subpixel]) -> Self;

    fn slice_to_value<'a>(slice: &'a [Self::Subpixel]) -> &'a Self::Value;

    fn slice_to_value_mut<'a>(slice: &'a mut [Self::Subpixel]) -> &'a mut Self::Value;
}

/// Pixels that can produce an 8-bit luminance sample.
pub trait Luminance: Pixel<Subpixel = u8> {
    /// Convert one row of packed subpixels into luminance values.
    ///
    /// `out` must hold exactly one value per pixel in `row`.
    fn luma_row(row: &[u8], out: &mut [u8]);
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct Luma<T>(pub [T; 1]);

impl<T: Primitive> Pixel for Luma<T> {
    type Subpixel = T;
    type Value = T;

    const CHANNEL_COUNT: usize = 1;

    fn channels(&self) -> &[Self::Subpixel] {
        &self.0
    }

    #[inline(always)]
    fn from_channels(slice: &[Self::Subpixel]) -> Self {
        Self([slice[0]])
    }

    #[inline(always)]
    fn slice_to_value<'a>(slice: &'a [Self::Subpixel]) -> &'a Self::Value {
        &slice[0]
    }

    #[inline(always)]
    fn slice_to_value_mut<'a>(slice: &'a mut [Self::Subpixel]) -> &'a mut Self::Value {
        &mut slice[0]
    }
}

impl Luminance for Luma<u8> {
    #[inline]
    fn luma_row(row: &[u8], out: &mut [u8]) {
        out.copy_from_slice(row);
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct Rgb<T>(pub [T; 3]);

impl<T: Primitive> Pixel for Rgb<T> {
    type Subpixel = T;
    type Value = [T; 3];

    const CHANNEL_COUNT: usize = 3;

    fn channels(&self) -> &[Self::Subpixel] {
        &self.0
    }

    #[inline(always)]
    fn from_channels(slice: &[Self::Subpixel]) -> Self {
        Self([slice[0], slice[1], slice[2]])
    }

    fn slice_to_value<'a>(slice: &'a [Self::Subpixel]) -> &'a Self::Value {
        match slice.first_chunk::<3>() {
            Some(value) => value,
            None => panic!("RGB pixel needs 3 subpixels, got {}", slice.len()),
        }
    }

    fn slice_to_value_mut<'a>(slice: &'a mut [Self::Subpixel]) -> &'a mut Self::Value {
        let len = slice.len();
        match slice.first_chunk_mut::<3>() {
            Some(value) => value,
            None => panic!("RGB pixel needs 3 subpixels, got {len}"),
        }
    }
}
