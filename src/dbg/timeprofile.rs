use std::{borrow::Cow, collections::{hash_map::Entry, HashMap}, fmt::Display, time::{Duration, Instant}};

/// Summary of one named entry across many samples
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleSummary {
    pub count: usize,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
    pub stddev: Duration,
}

impl SampleSummary {
    fn of(samples: &[Duration]) -> Option<Self> {
        let min = samples.iter().copied().min()?;
        let max = samples.iter().copied().max()?;
        let count = samples.len();

        let mean = samples.iter().map(Duration::as_secs_f64).sum::<f64>() / count as f64;
        let variance = samples.iter()
            .map(|d| {
                let delta = d.as_secs_f64() - mean;
                delta * delta
            })
            .sum::<f64>() / count as f64;

        Some(Self {
            count,
            mean: Duration::from_secs_f64(mean),
            min,
            max,
            stddev: Duration::from_secs_f64(variance.sqrt()),
        })
    }
}

/// Tracks statistics of multiple time profiles
#[derive(Clone, Debug, Default)]
pub struct TimeProfileStatistics {
    /// Entry information
    values: HashMap<String, Vec<Duration>>,
    /// Entry keys, in order
    keys: Vec<String>,
}

impl TimeProfileStatistics {
    /// Add the duration between consecutive stamps of `tp`
    pub fn add(&mut self, tp: &TimeProfile) {
        let mut last_time = tp.start();
        for stamp in tp.entries() {
            self.add_sample(stamp.name(), stamp.timestamp - last_time);
            last_time = stamp.timestamp;
        }
    }

    /// Record one duration for `name`
    pub fn add_sample(&mut self, name: &str, duration: Duration) {
        match self.values.entry(name.into()) {
            Entry::Occupied(mut e) => e.get_mut().push(duration),
            Entry::Vacant(e) => {
                e.insert(Vec::new()).push(duration);
                self.keys.push(name.into());
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Summaries in insertion order
    pub fn summaries(&self) -> impl Iterator<Item = (&str, SampleSummary)> + '_ {
        self.keys
            .iter()
            .filter_map(|key| {
                let samples = self.values.get(key)?;
                Some((key.as_str(), SampleSummary::of(samples)?))
            })
    }
}

impl Display for TimeProfileStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let max_name = self.keys
            .iter()
            .map(|stamp| stamp.len())
            .max()
            .unwrap_or(0);

        writeln!(f, " # {:width$} {:>15} {:>15} {:>15} {:>15}", "Name", "Average", "Min", "Max", "Std.dev", width=max_name)?;

        for (i, (key, summary)) in self.summaries().enumerate() {
            writeln!(f, "{:2} {:width$} {:12.6} ms {:12.6} ms {:12.6} ms {:12.6} ms",
                i,
                key,
                summary.mean.as_secs_f64() * 1e3,
                summary.min.as_secs_f64() * 1e3,
                summary.max.as_secs_f64() * 1e3,
                summary.stddev.as_secs_f64() * 1e3,
                width=max_name
            )?;
        }

        Ok(())
    }
}

/// Named timestamps, recorded in order
#[derive(Clone, Debug)]
pub struct TimeProfile {
    /// Start timestamp
    now: Instant,
    /// Named timestamps
    stamps: Vec<TimeProfileEntry>,
}

impl Default for TimeProfile {
    fn default() -> Self {
        Self {
            now: Instant::now(),
            stamps: Default::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct TimeProfileEntry {
    /// Entry name
    name: Cow<'static, str>,
    /// Entry timestamp
    timestamp: Instant,
}

impl TimeProfileEntry {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

impl TimeProfile {
    /// Get start time
    pub(crate) fn start(&self) -> Instant {
        self.now
    }

    /// Record a timestamp right now
    #[inline]
    pub fn stamp(&mut self, name: impl Into<Cow<'static, str>>) {
        self.stamp_at(name, Instant::now());
    }

    /// Mark a specific time
    pub fn stamp_at(&mut self, name: impl Into<Cow<'static, str>>, timestamp: Instant) {
        self.stamps.push(TimeProfileEntry {
            name: name.into(),
            timestamp,
        });
    }

    /// Duration from the start to the last recorded timestamp
    pub fn total_duration(&self) -> Duration {
        match self.stamps.last() {
            Some(last) => last.timestamp - self.now,
            None => Duration::ZERO,
        }
    }

    pub(crate) fn entries(&self) -> &[TimeProfileEntry] {
        &self.stamps
    }
}

impl Display for TimeProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stamps = &self.stamps;

        // Find maximums for scaling output
        let max_name_length = stamps.iter()
            .map(|stamp| stamp.name.len())
            .max()
            .unwrap_or(0)
            .max(1);

        let total_time = self.total_duration().as_secs_f64();

        let mut last_time = self.now;
        for (i, stamp) in stamps.iter().enumerate() {
            let cumtime = stamp.timestamp - self.now;
            let parttime = stamp.timestamp - last_time;
            let percent = if total_time > 0. { 100. * parttime.as_secs_f64() / total_time } else { 0. };

            writeln!(f, "{:2} {:width$} {:12.6} ms {:12.6} ms {:3.0}%",
                i,
                stamp.name,
                parttime.as_secs_f64() * 1000.,
                cumtime.as_secs_f64() * 1000.,
                percent,
                width=max_name_length
            )?;

            last_time = stamp.timestamp;
        }
        Ok(())
    }
}
