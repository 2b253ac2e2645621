use rayon::ThreadPoolBuildError;
use thiserror::Error;

use crate::{partition::PartitionError, util::image::RowRangeError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ImageDimensionError {
    #[error("Width too small (actual: {actual}, minimum: {minimum})")]
    WidthTooSmall {
        actual: usize,
        minimum: usize,
    },
    #[error("Height too small (actual: {actual}, minimum: {minimum})")]
    HeightTooSmall {
        actual: usize,
        minimum: usize,
    },
}

impl ImageDimensionError {
    /// Check that an image has at least one pixel
    pub(crate) fn check_non_empty(width: usize, height: usize) -> Result<(), Self> {
        if width == 0 {
            return Err(Self::WidthTooSmall { actual: width, minimum: 1 });
        }
        if height == 0 {
            return Err(Self::HeightTooSmall { actual: height, minimum: 1 });
        }
        Ok(())
    }
}

/// Error generated when [building](crate::SweepBuilder::build) a [Sweep](crate::Sweep)
#[derive(Copy, Clone, Debug, PartialEq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("No thread counts were provided (minimum: 1)")]
    NoThreadCounts,
    #[error("Thread count #{index} is zero")]
    ZeroThreads {
        index: usize,
    },
    #[error("Sensitivity must be finite and positive (actual: {0})")]
    Sensitivity(f32),
    #[error("Blur sigma must be finite and non-negative (actual: {0})")]
    BlurSigma(f32),
    #[error("Blend weights must be finite (original: {original}, blurred: {blurred})")]
    BlendWeights {
        original: f32,
        blurred: f32,
    },
}

/// Error generated when running a sweep entry
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SweepError {
    #[error("Input image was the wrong size")]
    InvalidImage(#[source] ImageDimensionError),
    #[error("Output image is {actual:?}, but the input is {expected:?}")]
    OutputMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("Invalid configuration")]
    Config(#[from] ConfigError),
    #[error("Invalid partition")]
    Partition(#[from] PartitionError),
    #[error("Unable to split output rows")]
    RowRange(#[from] RowRangeError),
    #[error("There was an error when creating the thread pool")]
    WorkerSpawn(#[from] ThreadPoolBuildError),
    #[error("A worker panicked while processing a band ({threads} threads)")]
    WorkerJoin {
        threads: usize,
    },
}

impl SweepError {
    /// Process exit code reported by the command line tool
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => -1,
            Self::InvalidImage(_) => -2,
            Self::WorkerSpawn(_) => -3,
            Self::WorkerJoin { .. }
            | Self::OutputMismatch { .. }
            | Self::Partition(_)
            | Self::RowRange(_) => -4,
        }
    }
}

impl PartialEq for SweepError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::WorkerSpawn(_), Self::WorkerSpawn(_)) => false, // ThreadPoolBuildError is not comparable
            (Self::InvalidImage(l0), Self::InvalidImage(r0)) => l0 == r0,
            (Self::OutputMismatch { expected: le, actual: la }, Self::OutputMismatch { expected: re, actual: ra }) => le == re && la == ra,
            (Self::Config(l0), Self::Config(r0)) => l0 == r0,
            (Self::Partition(l0), Self::Partition(r0)) => l0 == r0,
            (Self::RowRange(l0), Self::RowRange(r0)) => l0 == r0,
            (Self::WorkerJoin { threads: l0 }, Self::WorkerJoin { threads: r0 }) => l0 == r0,
            _ => false,
        }
    }
}
