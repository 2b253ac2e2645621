use std::ops::Range;

use thiserror::Error;

use super::{ImageBuffer, ImageDimensions, Pixel, SubpixelArray};

/// Error returned when row ranges can't be split into disjoint views
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RowRangeError {
    #[error("Row range {start}..{end} does not start at row {expected}")]
    NotContiguous {
        start: usize,
        end: usize,
        expected: usize,
    },
    #[error("Row range {start}..{end} is inverted")]
    Inverted {
        start: usize,
        end: usize,
    },
    #[error("Row range {start}..{end} exceeds image height {height}")]
    OutOfBounds {
        start: usize,
        end: usize,
        height: usize,
    },
}

/// Mutable view over a contiguous run of image rows.
///
/// Row indices passed to [RowsMut::row_mut] are local to the view; [RowsMut::first_row]
/// maps them back to image coordinates.
#[derive(Debug)]
pub struct RowsMut<'a, P: Pixel> {
    first_row: usize,
    dims: ImageDimensions,
    buf: &'a mut SubpixelArray<P>,
}

impl<'a, P: Pixel> RowsMut<'a, P> {
    /// Image row of local row 0
    pub const fn first_row(&self) -> usize {
        self.first_row
    }

    /// Image rows covered by this view
    pub const fn image_rows(&self) -> Range<usize> {
        self.first_row..(self.first_row + self.dims.height)
    }

    pub const fn width(&self) -> usize {
        self.dims.width
    }

    /// Number of rows in this view
    pub const fn height(&self) -> usize {
        self.dims.height
    }

    pub const fn is_empty(&self) -> bool {
        self.dims.height == 0 || self.dims.width == 0
    }

    pub fn row_mut(&mut self, y: usize) -> &mut SubpixelArray<P> {
        assert!(y < self.dims.height, "Row {y} out of bounds (rows: {})", self.dims.height);
        let start = y * self.dims.stride_subpixels::<P>();
        let end = start + self.dims.width_subpixels::<P>();
        &mut self.buf[start..end]
    }

    pub fn row(&self, y: usize) -> &SubpixelArray<P> {
        assert!(y < self.dims.height, "Row {y} out of bounds (rows: {})", self.dims.height);
        let start = y * self.dims.stride_subpixels::<P>();
        let end = start + self.dims.width_subpixels::<P>();
        &self.buf[start..end]
    }

    /// Overwrite every row of this view with the rows of a packed image of the same size
    pub fn copy_from(&mut self, src: &ImageBuffer<P>) {
        assert_eq!((src.dims.width, src.dims.height), (self.dims.width, self.dims.height));
        for (y, row) in src.rows() {
            self.row_mut(y).copy_from_slice(row);
        }
    }
}

impl<P: Pixel> ImageBuffer<P> {
    /// Split the image into disjoint mutable views, one per range.
    ///
    /// Ranges must be in ascending order with each one starting where the previous
    /// ended (the first starts at row 0). Empty ranges produce empty views. Rows after
    /// the last range are not borrowed.
    pub fn split_rows_mut<'a>(&'a mut self, ranges: impl IntoIterator<Item = Range<usize>>) -> Result<Vec<RowsMut<'a, P>>, RowRangeError> {
        let dims = self.dims;
        let row_len = dims.stride_subpixels::<P>();
        let mut remaining: &'a mut SubpixelArray<P> = &mut self.buf;
        let mut cursor = 0;
        let mut result = Vec::new();

        for Range { start, end } in ranges {
            if start != cursor {
                return Err(RowRangeError::NotContiguous { start, end, expected: cursor });
            }
            if end < start {
                return Err(RowRangeError::Inverted { start, end });
            }
            if end > dims.height {
                return Err(RowRangeError::OutOfBounds { start, end, height: dims.height });
            }

            let (head, tail) = std::mem::take(&mut remaining).split_at_mut((end - start) * row_len);
            remaining = tail;
            cursor = end;

            result.push(RowsMut {
                first_row: start,
                dims: ImageDimensions {
                    width: dims.width,
                    height: end - start,
                    stride: dims.stride,
                },
                buf: head,
            });
        }
        Ok(result)
    }
}
