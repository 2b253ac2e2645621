use super::{pixel::Luminance, Rgb};

/// Fixed-point precision of the luma weights
const LUMA_SHIFT: u32 = 14;
/// 0.299 << 14
const R2Y: u32 = 4899;
/// 0.587 << 14
const G2Y: u32 = 9617;
/// 0.114 << 14
const B2Y: u32 = 1868;

/// Y component of YUV for a single RGB triple (chroma is discarded).
#[inline(always)]
pub(crate) const fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    let acc = (r as u32) * R2Y + (g as u32) * G2Y + (b as u32) * B2Y;
    ((acc + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

impl Luminance for Rgb<u8> {
    fn luma_row(row: &[u8], out: &mut [u8]) {
        assert_eq!(row.len(), out.len() * 3);
        for (dst, [r, g, b]) in out.iter_mut().zip(row.chunks_exact(3).map(|c| [c[0], c[1], c[2]])) {
            *dst = rgb_to_luma(r, g, b);
        }
    }
}
