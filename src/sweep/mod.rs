//! Runs the banded edge pipeline once per thread count and times each run.
mod builder;
mod config;
mod error;

use std::{num::NonZeroUsize, panic::{self, AssertUnwindSafe}, time::{Duration, Instant}};

use cpu_time::ProcessTime;
use log::{debug, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};

pub use builder::SweepBuilder;
pub use config::{SweepConfig, DEFAULT_THREAD_COUNTS};
pub use error::{ConfigError, ImageDimensionError, SweepError};

use crate::{
    dbg::TimeProfile,
    edges::{EdgeProcessor, NormalizationScope, ValueRange},
    partition::{Band, Partition},
    util::image::{HasDimensions, ImageBuffer, ImageF32, ImageY8, InputImage, Luminance},
};

/// Timing of one sweep entry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepMeasurement {
    /// Worker threads in the pool
    pub threads: usize,
    /// Bands in the partition (always `threads`)
    pub bands: usize,
    /// Bands with at least one row
    pub active_bands: usize,
    /// Wall time for pool creation, dispatch and join
    pub elapsed: Duration,
    /// CPU time used by the whole process during the entry, if the platform reports it
    pub cpu: Option<Duration>,
}

/// Results of [Sweep::run]
#[derive(Clone, Debug)]
pub struct SweepReport {
    /// One measurement per entry, in sweep order
    pub measurements: Vec<SweepMeasurement>,
    /// One stamp per entry
    pub profile: TimeProfile,
}

#[derive(Clone, Debug)]
pub struct Sweep {
    pub(crate) config: SweepConfig,
    processor: EdgeProcessor,
}

/// Run `work` once per task on `pool`, blocking until every task has finished.
///
/// A panic in any task is reported as [SweepError::WorkerJoin] once all tasks are done.
fn dispatch<T, F>(pool: &ThreadPool, tasks: Vec<T>, work: F) -> Result<(), SweepError>
where
    T: Send,
    F: Fn(T) + Sync,
{
    let work = &work;
    panic::catch_unwind(AssertUnwindSafe(|| pool.scope(|scope| {
        for task in tasks {
            scope.spawn(move |_| work(task));
        }
    })))
    .map_err(|_| SweepError::WorkerJoin { threads: pool.current_num_threads() })
}

impl Sweep {
    /// Create a new builder
    pub fn builder() -> SweepBuilder {
        SweepBuilder::default()
    }

    pub(crate) fn new(config: SweepConfig) -> Result<Self, SweepError> {
        config.validate()?;
        let processor = EdgeProcessor::new(config.edge.clone());
        Ok(Self {
            config,
            processor,
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Allocate an output buffer matching `input`
    pub fn output_for(input: &InputImage) -> ImageY8 {
        ImageY8::zeroed(input.width(), input.height())
    }

    fn check_images(input: &InputImage, output: &ImageY8) -> Result<(), SweepError> {
        ImageDimensionError::check_non_empty(input.width(), input.height())
            .map_err(SweepError::InvalidImage)?;
        let expected = (input.width(), input.height());
        let actual = (output.width(), output.height());
        if expected != actual {
            return Err(SweepError::OutputMismatch { expected, actual });
        }
        Ok(())
    }

    /// Process `input` into `output` with a fresh pool of `threads` workers
    pub fn run_entry(&self, input: &InputImage, output: &mut ImageY8, threads: usize) -> Result<SweepMeasurement, SweepError> {
        let workers = NonZeroUsize::new(threads)
            .ok_or(ConfigError::ZeroThreads { index: 0 })?;
        Self::check_images(input, output)?;

        let partition = Partition::new(input.height(), workers);
        partition.validate_for(workers)?;
        let active_bands = partition.non_empty().count();
        debug!("{threads} threads: {} bands, {active_bands} with rows", partition.len());

        let cpu_start = ProcessTime::try_now()
            .map_err(|e| warn!("Process CPU time unavailable: {e}"))
            .ok();
        let start = Instant::now();

        // Every pool thread is joined before build_scoped returns
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(move |i| format!("sobel-{threads}-{i}"))
            .build_scoped(
                |thread| thread.run(),
                |pool| match input {
                    InputImage::Gray(img) => self.process_bands(pool, img, output, &partition),
                    InputImage::Rgb(img) => self.process_bands(pool, img, output, &partition),
                },
            )??;

        let elapsed = start.elapsed();
        let cpu = cpu_start.and_then(|t| t.try_elapsed().ok());

        Ok(SweepMeasurement {
            threads,
            bands: partition.len(),
            active_bands,
            elapsed,
            cpu,
        })
    }

    fn process_bands<P: Luminance>(&self, pool: &ThreadPool, input: &ImageBuffer<P>, output: &mut ImageY8, partition: &Partition) -> Result<(), SweepError> {
        let processor = &self.processor;
        let views = output.split_rows_mut(partition.bands().iter().map(Band::rows))?;

        match self.config.edge.normalization {
            NormalizationScope::Band => {
                let tasks = partition.bands()
                    .iter()
                    .zip(views)
                    .filter(|(band, _)| !band.is_empty())
                    .collect::<Vec<_>>();

                dispatch(pool, tasks, |(band, mut view)| processor.process_band(input, band, &mut view))
            },
            NormalizationScope::Global => {
                let mut magnitudes: Vec<Option<ImageF32>> = vec![None; partition.len()];
                {
                    let tasks = partition.bands()
                        .iter()
                        .zip(magnitudes.iter_mut())
                        .filter(|(band, _)| !band.is_empty())
                        .collect::<Vec<_>>();

                    dispatch(pool, tasks, |(band, slot)| *slot = Some(processor.band_magnitude(input, band)))?;
                }

                let range = ValueRange::merge_all(magnitudes.iter().map(|m| m.as_ref().and_then(ValueRange::of)));
                debug!("Global magnitude range: {range:?}");

                let tasks = partition.bands()
                    .iter()
                    .zip(magnitudes.iter())
                    .zip(views)
                    .filter_map(|((band, magnitude), view)| Some((band, magnitude.as_ref()?, view)))
                    .collect::<Vec<_>>();

                dispatch(pool, tasks, |(band, magnitude, mut view)| processor.render_band(band, magnitude, range, &mut view))
            },
        }
    }

    /// Run every entry of the sweep in order, calling `observer` after each one.
    ///
    /// `output` holds the result of the last entry.
    pub fn run(&self, input: &InputImage, output: &mut ImageY8, mut observer: impl FnMut(&SweepMeasurement)) -> Result<SweepReport, SweepError> {
        let mut profile = TimeProfile::default();
        let mut measurements = Vec::with_capacity(self.config.thread_counts.len());

        for (i, workers) in self.config.entries().enumerate() {
            let measurement = self.run_entry(input, output, workers.get())?;
            profile.stamp(format!("#{i:02} {:3} threads", workers.get()));
            observer(&measurement);
            measurements.push(measurement);
        }

        Ok(SweepReport {
            measurements,
            profile,
        })
    }
}

#[cfg(test)]
mod test {
    use rayon::ThreadPoolBuilder;

    use crate::{edges::NormalizationScope, util::image::{ImageRGB8, ImageY8, InputImage, Luma, Rgb}};

    use super::{dispatch, ConfigError, ImageDimensionError, Sweep, SweepError};

    fn gradient_input(width: usize, height: usize) -> InputImage {
        InputImage::Gray(ImageY8::from_fn(width, height, |x, y| Luma([((x * 7 + y * y) % 256) as u8])))
    }

    #[test]
    fn entry_measurement() {
        let sweep = Sweep::builder().build().unwrap();
        let input = gradient_input(20, 10);
        let mut output = Sweep::output_for(&input);
        let m = sweep.run_entry(&input, &mut output, 4).unwrap();
        assert_eq!(m.threads, 4);
        assert_eq!(m.bands, 4);
        assert_eq!(m.active_bands, 4);
    }

    #[test]
    fn more_threads_than_rows() {
        let sweep = Sweep::builder().build().unwrap();
        let input = gradient_input(8, 3);
        let mut expected = Sweep::output_for(&input);
        sweep.run_entry(&input, &mut expected, 1).unwrap();

        let mut output = ImageY8::from_fn(8, 3, |_, _| Luma([77]));
        let m = sweep.run_entry(&input, &mut output, 8).unwrap();
        assert_eq!(m.bands, 8);
        assert_eq!(m.active_bands, 1);
        assert_eq!(output, expected);
    }

    #[test]
    fn run_all_entries() {
        let sweep = Sweep::builder()
            .with_thread_counts([1, 2, 3])
            .build()
            .unwrap();
        let input = gradient_input(16, 9);
        let mut output = Sweep::output_for(&input);
        let mut seen = Vec::new();
        let report = sweep.run(&input, &mut output, |m| seen.push(m.threads)).unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(report.measurements.len(), 3);
        assert_eq!(report.profile.entries().len(), 3);
    }

    #[test]
    fn rgb_input_matches_gray() {
        let sweep = Sweep::builder().build().unwrap();
        let gray = ImageY8::from_fn(12, 6, |x, y| Luma([(x * 20 + y) as u8]));
        let rgb = ImageRGB8::from_fn(12, 6, |x, y| {
            let v = gray[(x, y)];
            Rgb([v, v, v])
        });
        let gray = InputImage::Gray(gray);
        let rgb = InputImage::Rgb(rgb);

        let mut a = Sweep::output_for(&gray);
        let mut b = Sweep::output_for(&rgb);
        sweep.run_entry(&gray, &mut a, 2).unwrap();
        sweep.run_entry(&rgb, &mut b, 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn global_normalization_runs() {
        let mut builder = Sweep::builder();
        builder.set_normalization(NormalizationScope::Global);
        let sweep = builder.build().unwrap();
        let input = gradient_input(10, 5);
        let mut output = Sweep::output_for(&input);
        let m = sweep.run_entry(&input, &mut output, 16).unwrap();
        assert_eq!(m.active_bands, 1);
    }

    #[test]
    fn rejects_empty_image() {
        let sweep = Sweep::builder().build().unwrap();
        let input = InputImage::Gray(ImageY8::zeroed(0, 4));
        let mut output = Sweep::output_for(&input);
        assert_eq!(
            sweep.run_entry(&input, &mut output, 1),
            Err(SweepError::InvalidImage(ImageDimensionError::WidthTooSmall { actual: 0, minimum: 1 })),
        );
    }

    #[test]
    fn rejects_mismatched_output() {
        let sweep = Sweep::builder().build().unwrap();
        let input = gradient_input(4, 4);
        let mut output = ImageY8::zeroed(4, 5);
        assert_eq!(
            sweep.run_entry(&input, &mut output, 1),
            Err(SweepError::OutputMismatch { expected: (4, 4), actual: (4, 5) }),
        );
    }

    #[test]
    fn rejects_zero_threads() {
        let sweep = Sweep::builder().build().unwrap();
        let input = gradient_input(4, 4);
        let mut output = Sweep::output_for(&input);
        assert_eq!(
            sweep.run_entry(&input, &mut output, 0),
            Err(SweepError::Config(ConfigError::ZeroThreads { index: 0 })),
        );
    }

    #[test]
    fn panicking_worker_is_join_error() {
        let pool = ThreadPoolBuilder::new().num_threads(3).build().unwrap();
        let result = dispatch(&pool, vec![0, 1, 2], |i| {
            if i == 1 {
                panic!("worker {i} failed");
            }
        });
        assert_eq!(result, Err(SweepError::WorkerJoin { threads: 3 }));
    }

    #[test]
    fn dispatch_runs_every_task() {
        let pool = ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let mut slots = vec![0usize; 5];
        let tasks = slots.iter_mut().enumerate().collect::<Vec<_>>();
        dispatch(&pool, tasks, |(i, slot)| *slot = i * 2).unwrap();
        assert_eq!(slots, vec![0, 2, 4, 6, 8]);
    }
}
