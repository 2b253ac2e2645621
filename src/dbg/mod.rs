//! Debug helpers
mod timeprofile;

pub use timeprofile::{SampleSummary, TimeProfile, TimeProfileStatistics};

/// File names for per-band debug images
pub(crate) mod debug_images {
    /// Band after min-max normalization
    pub(crate) const QUANTIZED: &str = "01_debug_quantized";
    /// Band after histogram equalization
    pub(crate) const EQUALIZED: &str = "02_debug_equalized";
    /// Band after the unsharp mask
    pub(crate) const SHARPENED: &str = "03_debug_sharpened";

    /// File name for `stage` of band `index`
    pub(crate) fn band_file(stage: &str, index: usize) -> String {
        format!("{stage}_band{index:03}.pnm")
    }
}

#[cfg(test)]
mod test {
    use super::debug_images::{band_file, EQUALIZED, QUANTIZED, SHARPENED};

    #[test]
    fn band_files_sort_by_stage() {
        let mut names = [SHARPENED, QUANTIZED, EQUALIZED].map(|stage| band_file(stage, 7));
        names.sort();
        assert_eq!(names[0], "01_debug_quantized_band007.pnm");
        assert_eq!(names[2], "03_debug_sharpened_band007.pnm");
    }
}
