use std::ops::Range;

use crate::{partition::Band, util::image::{reflect_101, HasDimensions, ImageBuffer, ImageF32, Luminance}};

use super::VerticalSupport;

/// Luminance of a run of input rows
struct LumaWindow {
    rows: Range<usize>,
    width: usize,
    data: Vec<u8>,
}

impl LumaWindow {
    fn load<P: Luminance>(input: &ImageBuffer<P>, rows: Range<usize>) -> Self {
        let width = input.width();
        let mut data = vec![0u8; rows.len() * width];
        for (dst, y) in data.chunks_exact_mut(width.max(1)).zip(rows.clone()) {
            P::luma_row(input.row(y), dst);
        }
        Self { rows, width, data }
    }

    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        debug_assert!(self.rows.contains(&y));
        let start = (y - self.rows.start) * self.width;
        &self.data[start..start + self.width]
    }
}

/// Rows above, at and below `y` for the chosen vertical support
fn vertical_neighbours(y: usize, band: &Band, height: usize, support: VerticalSupport) -> [usize; 3] {
    let y_i = y as isize;
    match support {
        VerticalSupport::Row => [y, y, y],
        VerticalSupport::Band => {
            let local = (y - band.start) as isize;
            [
                band.start + reflect_101(local - 1, band.len()),
                y,
                band.start + reflect_101(local + 1, band.len()),
            ]
        },
        VerticalSupport::Image => [
            reflect_101(y_i - 1, height),
            y,
            reflect_101(y_i + 1, height),
        ],
    }
}

/// Horizontal and vertical Sobel responses for one band, already scaled by the sensitivity factor
pub struct BandGradients {
    pub gx: ImageF32,
    pub gy: ImageF32,
}

impl BandGradients {
    /// Compute 3x3 Sobel derivatives for every row of `band`.
    ///
    /// `band` must lie within the image.
    pub fn compute<P: Luminance>(input: &ImageBuffer<P>, band: &Band, support: VerticalSupport, sensitivity: f32) -> Self {
        let width = input.width();
        let height = input.height();
        let mut gx = ImageF32::zeroed(width, band.len());
        let mut gy = ImageF32::zeroed(width, band.len());
        let Some(last) = band.last_row() else {
            return Self { gx, gy };
        };
        debug_assert!(last < height);

        // Neighbours of interior rows stay inside the band, so the first and last
        // rows bound everything we need to convert.
        let window = {
            let first = vertical_neighbours(band.start, band, height, support);
            let last = vertical_neighbours(last, band, height, support);
            let lo = first.iter().chain(last.iter()).copied().min().unwrap_or(band.start);
            let hi = first.iter().chain(last.iter()).copied().max().unwrap_or(last[1]);
            LumaWindow::load(input, lo..(hi + 1))
        };

        for y in band.rows() {
            let [ya, yc, yb] = vertical_neighbours(y, band, height, support);
            let (above, center, below) = (window.row(ya), window.row(yc), window.row(yb));
            let dst_y = y - band.start;

            for x in 0..width {
                let xl = reflect_101(x as isize - 1, width);
                let xr = reflect_101(x as isize + 1, width);

                // derivative [-1 0 1] along x, smoothing [1 2 1] along y
                let dx = |row: &[u8]| row[xr] as f32 - row[xl] as f32;
                let vx = dx(above) + 2. * dx(center) + dx(below);

                // smoothing along x, derivative along y
                let sx = |row: &[u8]| row[xl] as f32 + 2. * row[x] as f32 + row[xr] as f32;
                let vy = sx(below) - sx(above);

                gx[(x, dst_y)] = vx * sensitivity;
                gy[(x, dst_y)] = vy * sensitivity;
            }
        }

        Self { gx, gy }
    }

    /// `sqrt(gx² + gy²)` per pixel
    pub fn magnitude(&self) -> ImageF32 {
        let mut result = ImageF32::zeroed(self.gx.width(), self.gx.height());
        for y in 0..result.height() {
            let (gx, gy) = (self.gx.row(y), self.gy.row(y));
            for ((dst, vx), vy) in result.row_mut(y).iter_mut().zip(gx).zip(gy) {
                *dst = vx.hypot(*vy);
            }
        }
        result
    }
}
