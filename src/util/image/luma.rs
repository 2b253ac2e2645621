use std::io::{self, Write};

use super::{border::reflect_101, HasDimensions, ImageBuffer, ImageWritePNM, ImageY8, Luma};

/// Pick an odd kernel size that reaches 3 standard deviations in each direction.
pub fn gaussian_kernel_size(sigma: f32) -> usize {
    let size = (sigma * 6. + 1.).round().max(1.) as usize;
    size | 1
}

/// Normalized 1-d gaussian kernel
fn gaussian_kernel(sigma: f32, kernel_size: usize) -> Vec<f32> {
    assert_eq!(kernel_size % 2, 1, "kernel_size must be odd");
    let center = (kernel_size / 2) as isize;
    let mut dk = (0..kernel_size)
        .map(|i| {
            let x_sig = (i as isize - center) as f32 / sigma;
            f32::exp(-0.5 * x_sig * x_sig)
        })
        .collect::<Vec<_>>();

    // normalize
    let acc = dk.iter().sum::<f32>();
    for v in dk.iter_mut() {
        *v /= acc;
    }
    dk
}

/// 1-d convolution with reflected borders
fn convolve(x: &[f32], y: &mut [f32], k: &[f32]) {
    assert_eq!(x.len(), y.len());
    let half = (k.len() / 2) as isize;
    for (i, dst) in y.iter_mut().enumerate() {
        let mut acc = 0.;
        for (j, kv) in k.iter().enumerate() {
            let src = reflect_101(i as isize + j as isize - half, x.len());
            acc += kv * x[src];
        }
        *dst = acc;
    }
}

#[inline(always)]
fn saturate_u8(v: f32) -> u8 {
    v.round().clamp(0., 255.) as u8
}

/// Grayscale image
impl ImageBuffer<Luma<u8>> {
    /// Count of each intensity
    pub fn histogram(&self) -> [u32; 256] {
        let mut hist = [0u32; 256];
        for (_, row) in self.rows() {
            for v in row {
                hist[*v as usize] += 1;
            }
        }
        hist
    }

    /// Separable gaussian blur (reflected borders). Returns a new image.
    pub fn gaussian_blur(&self, sigma: f32, kernel_size: usize) -> Self {
        let mut result = Self::zeroed(self.width(), self.height());
        if self.is_empty() {
            return result;
        }
        if sigma <= 0. || kernel_size <= 1 {
            for (y, row) in self.rows() {
                result.row_mut(y).copy_from_slice(row);
            }
            return result;
        }

        let kernel = gaussian_kernel(sigma, kernel_size);
        let width = self.width();
        let height = self.height();

        // Convolve horizontally
        let mut tmp = vec![0f32; width * height];
        {
            let mut row_buf = vec![0f32; width];
            for (y, row) in self.rows() {
                for (dst, src) in row_buf.iter_mut().zip(row) {
                    *dst = *src as f32;
                }
                convolve(&row_buf, &mut tmp[y * width..(y + 1) * width], &kernel);
            }
        }

        // Convolve vertically
        {
            let mut xb = vec![0f32; height];
            let mut yb = vec![0f32; height];
            for x in 0..width {
                for y in 0..height {
                    xb[y] = tmp[y * width + x];
                }

                convolve(&xb, &mut yb, &kernel);

                for y in 0..height {
                    result[(x, y)] = saturate_u8(yb[y]);
                }
            }
        }
        result
    }

    /// Spread intensities so the cumulative histogram is roughly linear.
    ///
    /// An image with a single intensity is left unchanged.
    pub fn equalize_histogram(&mut self) {
        let total = (self.width() * self.height()) as u32;
        if total == 0 {
            return;
        }
        let hist = self.histogram();

        let lut = {
            let mut lut = [0u8; 256];
            let first = hist.iter().position(|&h| h > 0).unwrap_or(0);
            if hist[first] == total {
                lut.fill(first as u8);
            } else {
                let scale = 255. / (total - hist[first]) as f32;
                let mut sum = 0u32;
                for i in (first + 1)..256 {
                    sum += hist[i];
                    lut[i] = saturate_u8(sum as f32 * scale);
                }
            }
            lut
        };

        for y in 0..self.height() {
            for v in self.row_mut(y) {
                *v = lut[*v as usize];
            }
        }
    }

    /// `self = saturate(alpha * self + beta * other + gamma)`
    pub fn add_weighted(&mut self, alpha: f32, other: &Self, beta: f32, gamma: f32) {
        assert_eq!((self.width(), self.height()), (other.width(), other.height()));
        for y in 0..self.height() {
            let src = other.row(y);
            for (dst, b) in self.row_mut(y).iter_mut().zip(src) {
                *dst = saturate_u8(alpha * (*dst as f32) + beta * (*b as f32) + gamma);
            }
        }
    }
}

impl ImageWritePNM for ImageY8 {
    fn write_pnm(&self, f: &mut impl Write) -> io::Result<()> {
        writeln!(f, "P5")?;
        writeln!(f, "{} {}", self.width(), self.height())?;
        writeln!(f, "255")?;
        for (_, row) in self.rows() {
            f.write_all(row)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::util::image::{ImageWritePNM, ImageY8, Luma};

    use super::{gaussian_kernel, gaussian_kernel_size};

    #[test]
    fn kernel_size_from_sigma() {
        assert_eq!(gaussian_kernel_size(5.), 31);
        assert_eq!(gaussian_kernel_size(1.), 7);
        assert_eq!(gaussian_kernel_size(0.), 1);
    }

    #[test]
    fn kernel_is_normalized() {
        let k = gaussian_kernel(5., 31);
        assert!((k.iter().sum::<f32>() - 1.).abs() < 1e-5);
        assert_eq!(k[0], k[30]);
        assert!(k[15] > k[14]);
    }

    #[test]
    fn blur_constant_image() {
        let img = ImageY8::from_fn(7, 5, |_, _| Luma([90]));
        let blurred = img.gaussian_blur(5., 31);
        assert!(blurred.to_packed_vec().iter().all(|v| *v == 90));
    }

    #[test]
    fn blur_spreads_impulse() {
        let mut img = ImageY8::zeroed(9, 9);
        img[(4, 4)] = 255;
        let blurred = img.gaussian_blur(1., 7);
        assert!(blurred[(4, 4)] < 255);
        assert!(blurred[(4, 4)] > blurred[(3, 4)]);
        assert_eq!(blurred[(3, 4)], blurred[(5, 4)]);
        assert_eq!(blurred[(4, 3)], blurred[(4, 5)]);
    }

    #[test]
    fn equalize_stretches_range() {
        let mut img = ImageY8::from_fn(4, 1, |x, _| Luma([100 + x as u8]));
        img.equalize_histogram();
        assert_eq!(img.row(0), &[0, 85, 170, 255]);
    }

    #[test]
    fn equalize_constant_is_identity() {
        let mut img = ImageY8::from_fn(4, 4, |_, _| Luma([42]));
        img.equalize_histogram();
        assert!(img.to_packed_vec().iter().all(|v| *v == 42));
    }

    #[test]
    fn add_weighted_saturates() {
        let mut a = ImageY8::from_fn(2, 1, |x, _| Luma([if x == 0 { 200 } else { 10 }]));
        let b = ImageY8::from_fn(2, 1, |_, _| Luma([100]));
        a.add_weighted(1.5, &b, -0.5, 0.);
        assert_eq!(a.row(0), &[250, 0]);
    }

    #[test]
    fn write_pnm_header() {
        let img = ImageY8::from_fn(2, 1, |x, _| Luma([x as u8]));
        let mut out = Vec::new();
        img.write_pnm(&mut out).unwrap();
        assert_eq!(out, b"P5\n2 1\n255\n\x00\x01");
    }
}
