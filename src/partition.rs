//! Splitting an image's rows into contiguous bands, one per worker.
use std::{num::NonZeroUsize, ops::Range};

use thiserror::Error;

/// Error produced when a set of bands does not tile the row range exactly once
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PartitionError {
    #[error("Band {index} ({start}..{end}) does not start at row {expected}")]
    Gap {
        index: usize,
        start: usize,
        end: usize,
        expected: usize,
    },
    #[error("Band {index} is inverted ({start}..{end})")]
    Inverted {
        index: usize,
        start: usize,
        end: usize,
    },
    #[error("Bands cover rows 0..{covered}, but the image has {rows} rows")]
    Coverage {
        covered: usize,
        rows: usize,
    },
    #[error("Expected {expected} bands, found {actual}")]
    BandCount {
        expected: usize,
        actual: usize,
    },
}

/// Contiguous run of rows assigned to one worker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Band {
    /// Worker index
    pub index: usize,
    /// First row (inclusive)
    pub start: usize,
    /// End row (exclusive)
    pub end: usize,
}

impl Band {
    pub const fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Last row of the band, if any
    pub const fn last_row(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.end - 1)
        }
    }

    /// Clamp to `0..height`
    pub fn clamped(&self, height: usize) -> Self {
        let end = self.end.min(height);
        Self {
            index: self.index,
            start: self.start.min(end),
            end,
        }
    }
}

/// Bands for one sweep entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    rows: usize,
    bands: Vec<Band>,
}

impl Partition {
    /// Split `rows` rows between `workers` workers.
    ///
    /// Every worker gets `rows / workers` rows and the last one also takes the
    /// remainder. With more workers than rows, all but the last band are empty.
    pub fn new(rows: usize, workers: NonZeroUsize) -> Self {
        let workers = workers.get();
        let base = rows / workers;

        let bands = (0..workers)
            .map(|index| {
                let start = index * base;
                let end = if index == workers - 1 { rows } else { start + base };
                Band { index, start, end }
            })
            .collect();

        Self { rows, bands }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Number of bands (always equal to the worker count)
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Bands with at least one row
    pub fn non_empty(&self) -> impl Iterator<Item = &Band> + '_ {
        self.bands.iter().filter(|band| !band.is_empty())
    }

    /// Check that the bands tile `0..rows` in order, with no gaps or overlaps
    pub fn validate(&self) -> Result<(), PartitionError> {
        let mut cursor = 0;
        for (i, band) in self.bands.iter().enumerate() {
            if band.end < band.start {
                return Err(PartitionError::Inverted { index: i, start: band.start, end: band.end });
            }
            if band.start != cursor {
                return Err(PartitionError::Gap { index: i, start: band.start, end: band.end, expected: cursor });
            }
            cursor = band.end;
        }
        if cursor != self.rows {
            return Err(PartitionError::Coverage { covered: cursor, rows: self.rows });
        }
        Ok(())
    }

    /// Like [Partition::validate], also checking the band count
    pub fn validate_for(&self, workers: NonZeroUsize) -> Result<(), PartitionError> {
        if self.bands.len() != workers.get() {
            return Err(PartitionError::BandCount { expected: workers.get(), actual: self.bands.len() });
        }
        self.validate()
    }
}

#[cfg(test)]
mod test {
    use std::num::NonZeroUsize;

    use rand::Rng;

    use super::{Band, Partition, PartitionError};

    fn nz(v: usize) -> NonZeroUsize {
        NonZeroUsize::new(v).unwrap()
    }

    fn assert_exact_cover(part: &Partition) {
        let mut hits = vec![0usize; part.rows()];
        for band in part.bands() {
            for y in band.rows() {
                hits[y] += 1;
            }
        }
        assert!(hits.iter().all(|h| *h == 1), "rows covered {hits:?}");
    }

    #[test]
    fn even_split() {
        let part = Partition::new(8, nz(4));
        let rows = part.bands().iter().map(|b| b.rows()).collect::<Vec<_>>();
        assert_eq!(rows, vec![0..2, 2..4, 4..6, 6..8]);
        part.validate().unwrap();
    }

    #[test]
    fn remainder_goes_to_last() {
        let part = Partition::new(10, nz(4));
        let rows = part.bands().iter().map(|b| b.rows()).collect::<Vec<_>>();
        assert_eq!(rows, vec![0..2, 2..4, 4..6, 6..10]);
        assert_eq!(part.bands()[3].last_row(), Some(9));
    }

    #[test]
    fn exhaustive_small() {
        for rows in 1..=64 {
            for workers in 1..=rows {
                let part = Partition::new(rows, nz(workers));
                assert_eq!(part.len(), workers);
                part.validate_for(nz(workers)).unwrap();
                assert_exact_cover(&part);
                assert_eq!(part.non_empty().count(), workers);
            }
        }
    }

    #[test]
    fn random_large() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let rows = rng.gen_range(1..5000);
            let workers = rng.gen_range(1..=rows.min(128));
            let part = Partition::new(rows, nz(workers));
            part.validate_for(nz(workers)).unwrap();
            assert_exact_cover(&part);
        }
    }

    #[test]
    fn more_workers_than_rows() {
        let part = Partition::new(3, nz(8));
        assert_eq!(part.len(), 8);
        part.validate().unwrap();
        assert_exact_cover(&part);

        let non_empty = part.non_empty().collect::<Vec<_>>();
        assert_eq!(non_empty.len(), 1);
        assert_eq!(non_empty[0], &Band { index: 7, start: 0, end: 3 });
        assert!(part.bands()[..7].iter().all(|b| b.is_empty() && b.last_row().is_none()));
    }

    #[test]
    fn zero_rows() {
        let part = Partition::new(0, nz(2));
        part.validate().unwrap();
        assert_eq!(part.non_empty().count(), 0);
    }

    #[test]
    fn validate_rejects_gap() {
        let part = Partition {
            rows: 6,
            bands: vec![
                Band { index: 0, start: 0, end: 2 },
                Band { index: 1, start: 3, end: 6 },
            ],
        };
        assert_eq!(part.validate(), Err(PartitionError::Gap { index: 1, start: 3, end: 6, expected: 2 }));
    }

    #[test]
    fn validate_rejects_overlap() {
        let part = Partition {
            rows: 6,
            bands: vec![
                Band { index: 0, start: 0, end: 4 },
                Band { index: 1, start: 3, end: 6 },
            ],
        };
        assert!(matches!(part.validate(), Err(PartitionError::Gap { .. })));
    }

    #[test]
    fn validate_rejects_short_cover() {
        let part = Partition {
            rows: 6,
            bands: vec![Band { index: 0, start: 0, end: 5 }],
        };
        assert_eq!(part.validate(), Err(PartitionError::Coverage { covered: 5, rows: 6 }));
    }

    #[test]
    fn validate_band_count() {
        let part = Partition::new(6, nz(2));
        assert_eq!(part.validate_for(nz(3)), Err(PartitionError::BandCount { expected: 3, actual: 2 }));
    }

    #[test]
    fn clamp_band() {
        let band = Band { index: 0, start: 4, end: 9 };
        assert_eq!(band.clamped(6).rows(), 4..6);
        assert!(band.clamped(2).is_empty());
    }
}
