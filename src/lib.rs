//! Sobel edge detection over horizontal bands of an image, timed across a sweep
//! of worker thread counts.

pub mod util;
pub mod partition;
pub mod edges;
pub mod display;
mod sweep;
mod dbg;

pub use partition::{Band, Partition, PartitionError};
pub use edges::{EdgeConfig, EdgeProcessor, NormalizationScope, UnsharpMask, VerticalSupport};
pub use sweep::{
    ConfigError,
    ImageDimensionError,
    Sweep,
    SweepBuilder,
    SweepConfig,
    SweepError,
    SweepMeasurement,
    SweepReport,
    DEFAULT_THREAD_COUNTS,
};
pub use dbg::{SampleSummary, TimeProfile, TimeProfileStatistics};
pub use util::image::{load_image, InputImage, LoadError};
