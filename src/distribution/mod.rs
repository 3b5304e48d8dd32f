//! Empirical packet-length distributions
//!
//! This module turns an observed packet-length histogram (for example one
//! captured from a trace) into a structure that can be sampled in O(1) on the
//! per-packet hot path.
//!
//! # Pipeline
//!
//! 1. **Load** ([`loader`]): parse `frequency,length` rows and compute each
//!    row's probability.
//! 2. **Quantize** ([`table`]): give each row `floor(p * TABLE_MAX_SIZE)`
//!    consecutive slots in a fixed-capacity [`LengthTable`].
//! 3. **Sample** ([`sampler`]): scale one uniform `u32` into the populated
//!    slots and return the length stored there.
//!
//! The table is built once and never mutated afterwards. Samplers share it
//! through an `Arc`, so any number of threads can sample without locking.
//!
//! # Example
//!
//! ```
//! use pktdist::distribution::loader::DistributionLoader;
//! use pktdist::random::EntropySource;
//!
//! let csv = "frequency,length\n1,100\n3,1400\n";
//! let dist = DistributionLoader::new().load_reader(csv.as_bytes()).unwrap();
//!
//! assert_eq!(dist.table().used_size(), 10_000);
//! assert_eq!(dist.longest_length(), 1400);
//!
//! let mut sampler = dist.sampler(EntropySource::pseudo_random(1));
//! let length = sampler.next_length();
//! assert!(length == 100 || length == 1400);
//! ```

pub mod error;
pub mod loader;
pub mod sampler;
pub mod table;

pub use error::{LoadError, LoadResult};
pub use loader::{DistributionLoader, ParseMode};
pub use sampler::LengthSampler;
pub use table::{LengthTable, TABLE_MAX_SIZE};

use crate::config::TestSettings;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One row of an input distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    /// Packet length in bytes
    pub length: u16,
    /// Observed count
    pub frequency: u32,
    /// `frequency / total_frequency`, 0.0 when the total is zero
    pub probability: f64,
}

impl FrequencyEntry {
    /// Slots this row receives in a [`LengthTable`]
    #[inline]
    pub fn slot_count(&self) -> usize {
        // `as` saturates and maps NaN to 0
        (self.probability * TABLE_MAX_SIZE as f64) as usize
    }
}

/// A loaded distribution: the parsed rows and the table built from them
///
/// A distribution without a table (no source configured, or every frequency
/// zero) is *disabled*; callers fall back to their default packet length.
#[derive(Debug, Clone)]
pub struct TrafficDistribution {
    source: Option<PathBuf>,
    entries: Vec<FrequencyEntry>,
    total_frequency: u64,
    table: Arc<LengthTable>,
}

impl TrafficDistribution {
    pub(crate) fn new(
        source: Option<PathBuf>,
        entries: Vec<FrequencyEntry>,
        total_frequency: u64,
        table: LengthTable,
    ) -> Self {
        Self {
            source,
            entries,
            total_frequency,
            table: Arc::new(table),
        }
    }

    /// A distribution that disables weighted sampling
    pub fn disabled() -> Self {
        Self::new(None, Vec::new(), 0, LengthTable::empty())
    }

    /// Whether weighted sampling is available
    pub fn is_enabled(&self) -> bool {
        self.table.is_enabled()
    }

    /// File the distribution was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn total_frequency(&self) -> u64 {
        self.total_frequency
    }

    /// Sum of all row probabilities (1.0 up to rounding, or 0.0 if degenerate)
    pub fn total_probability(&self) -> f64 {
        self.entries.iter().map(|e| e.probability).sum()
    }

    pub fn table(&self) -> &Arc<LengthTable> {
        &self.table
    }

    pub fn longest_length(&self) -> u16 {
        self.table.longest_length()
    }

    /// Recommended IO block size: the longest length in the distribution
    ///
    /// `None` when no rows were loaded.
    pub fn block_size(&self) -> Option<u64> {
        if self.entries.is_empty() {
            return None;
        }
        Some(u64::from(self.longest_length()))
    }

    /// Publish the block size into the consuming test's settings
    ///
    /// Leaves the settings untouched when no rows were loaded.
    pub fn apply_to(&self, settings: &mut TestSettings) {
        if let Some(block_size) = self.block_size() {
            settings.blksize = block_size;
        }
    }

    /// Sampler over this distribution's table
    pub fn sampler<R: RandomSource>(&self, source: R) -> LengthSampler<R> {
        LengthSampler::new(Arc::clone(&self.table), source)
    }
}
