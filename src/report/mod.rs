//! Distribution self-test report
//!
//! Verifies a loaded distribution end to end: lists the parsed rows and their
//! probabilities, the table built from them, and an empirical histogram of
//! sampled lengths compared against the configured probabilities.
//!
//! This is a diagnostic, not part of the sampling path.
//!
//! # Example
//!
//! ```
//! use pktdist::distribution::DistributionLoader;
//! use pktdist::random::EntropySource;
//! use pktdist::report::DistributionReport;
//!
//! let dist = DistributionLoader::new()
//!     .load_reader("frequency,length\n1,100\n3,1400\n".as_bytes())
//!     .unwrap();
//! let report = DistributionReport::run(&dist, EntropySource::pseudo_random(1), 10_000);
//!
//! assert_eq!(report.histogram.len(), 10_000);
//! assert!(report.max_abs_error() < 0.05);
//! ```

pub mod json;
pub mod text;

use crate::distribution::{FrequencyEntry, TrafficDistribution};
use crate::random::RandomSource;
use hdrhistogram::Histogram;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Histogram of sampled packet lengths
///
/// Backed by HdrHistogram with 5 significant digits, which keeps every `u16`
/// value in its own bucket, so per-length counts are exact.
#[derive(Debug, Clone)]
pub struct LengthHistogram {
    histogram: Histogram<u64>,
}

impl LengthHistogram {
    pub fn new() -> Self {
        let histogram = Histogram::new_with_bounds(1, u64::from(u16::MAX), 5)
            .expect("Failed to create histogram with valid bounds");

        Self { histogram }
    }

    #[inline]
    pub fn record(&mut self, length: u16) {
        self.histogram.saturating_record(u64::from(length));
    }

    /// Number of samples with exactly this length
    pub fn count(&self, length: u16) -> u64 {
        self.histogram.count_at(u64::from(length))
    }

    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    pub fn mean(&self) -> f64 {
        self.histogram.mean()
    }

    pub fn min(&self) -> u64 {
        self.histogram.min()
    }

    pub fn max(&self) -> u64 {
        self.histogram.max()
    }

    /// Length at a percentile (0.0 - 100.0)
    pub fn percentile(&self, percentile: f64) -> u64 {
        self.histogram.value_at_percentile(percentile)
    }

    /// Every sampled length with its count, ascending
    pub fn recorded(&self) -> Vec<(u16, u64)> {
        self.histogram
            .iter_recorded()
            .map(|v| (v.value_iterated_to() as u16, v.count_at_value()))
            .collect()
    }
}

impl Default for LengthHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Expected versus observed share of one configured length
#[derive(Debug, Clone, PartialEq)]
pub struct LengthAccuracy {
    pub length: u16,
    /// Sum of probabilities of all rows with this length
    pub expected: f64,
    /// Populated slots holding this length
    pub slots: usize,
    /// `slots / used_size`: what the sampler can actually deliver
    pub table_share: f64,
    /// Observed share of the sampled lengths
    pub observed: f64,
}

impl LengthAccuracy {
    /// Observed minus expected share
    pub fn error(&self) -> f64 {
        self.observed - self.expected
    }

    /// Observed minus table share; free of quantization loss
    pub fn table_error(&self) -> f64 {
        self.observed - self.table_share
    }
}

/// Result of a self-test run
#[derive(Debug, Clone)]
pub struct DistributionReport {
    pub source: Option<PathBuf>,
    pub entries: Vec<FrequencyEntry>,
    pub total_frequency: u64,
    pub total_probability: f64,
    pub used_size: u16,
    pub capacity: usize,
    pub longest_length: u16,
    /// Populated table slots in layout order
    pub table: Vec<u16>,
    pub histogram: LengthHistogram,
    pub accuracy: Vec<LengthAccuracy>,
    pub elapsed: Duration,
}

impl DistributionReport {
    /// Sample `draws` lengths from `dist` and compare against its rows
    ///
    /// A disabled distribution is reported without sampling.
    pub fn run<R: RandomSource>(dist: &TrafficDistribution, source: R, draws: u64) -> Self {
        let table = dist.table();
        let mut histogram = LengthHistogram::new();
        let mut elapsed = Duration::ZERO;

        if table.is_enabled() {
            let mut sampler = dist.sampler(source);
            let start = Instant::now();
            for _ in 0..draws {
                histogram.record(sampler.next_length());
            }
            elapsed = start.elapsed();
        }

        let accuracy = accuracy_by_length(dist, &histogram);

        Self {
            source: dist.source().map(|p| p.to_path_buf()),
            entries: dist.entries().to_vec(),
            total_frequency: dist.total_frequency(),
            total_probability: dist.total_probability(),
            used_size: table.used_size(),
            capacity: table.capacity(),
            longest_length: table.longest_length(),
            table: table.slots().to_vec(),
            histogram,
            accuracy,
            elapsed,
        }
    }

    /// Largest absolute gap between observed and expected share
    pub fn max_abs_error(&self) -> f64 {
        self.accuracy
            .iter()
            .map(|a| a.error().abs())
            .fold(0.0, f64::max)
    }

    /// Largest absolute gap between observed and table share
    ///
    /// Measures the sampler alone. With many rows, per-row truncation makes
    /// [`max_abs_error`](Self::max_abs_error) large even for a correct table.
    pub fn max_table_error(&self) -> f64 {
        self.accuracy
            .iter()
            .map(|a| a.table_error().abs())
            .fold(0.0, f64::max)
    }

    /// Sampled lengths per second
    pub fn sample_rate(&self) -> f64 {
        crate::util::time::calculate_rate(self.histogram.len(), self.elapsed)
    }
}

fn accuracy_by_length(dist: &TrafficDistribution, histogram: &LengthHistogram) -> Vec<LengthAccuracy> {
    let mut expected: BTreeMap<u16, f64> = BTreeMap::new();
    for entry in dist.entries() {
        *expected.entry(entry.length).or_insert(0.0) += entry.probability;
    }

    let table = dist.table();
    let used = table.used_size() as f64;
    let draws = histogram.len() as f64;

    expected
        .into_iter()
        .map(|(length, expected)| {
            let slots = table.slots_for(length);
            LengthAccuracy {
                length,
                expected,
                slots,
                table_share: if used > 0.0 { slots as f64 / used } else { 0.0 },
                observed: if draws > 0.0 {
                    histogram.count(length) as f64 / draws
                } else {
                    0.0
                },
            }
        })
        .collect()
}
