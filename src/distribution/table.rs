//! Quantized packet-length lookup table
//!
//! The table turns weighted sampling into a single array lookup. Each source
//! row owns a contiguous run of slots whose size is proportional to its
//! probability:
//!
//! ```text
//! slots(row) = floor(probability(row) * TABLE_MAX_SIZE)
//! ```
//!
//! Runs are laid out in source order. Truncating each run loses less than one
//! slot per row, so `used_size` may fall short of the capacity; only the
//! populated prefix is ever sampled.
//!
//! # Example
//!
//! ```
//! use pktdist::distribution::{FrequencyEntry, table::LengthTable};
//!
//! let entries = [
//!     FrequencyEntry { length: 100, frequency: 1, probability: 0.25 },
//!     FrequencyEntry { length: 1400, frequency: 3, probability: 0.75 },
//! ];
//! let table = LengthTable::from_entries(&entries, 1400).unwrap();
//!
//! assert_eq!(table.used_size(), 10_000);
//! assert_eq!(table.lookup(0), 100);
//! assert_eq!(table.lookup(u32::MAX), 1400);
//! ```

use super::error::{LoadError, LoadResult};
use super::FrequencyEntry;
use rand::distributions::Distribution;
use rand::Rng;

/// Number of slots in every length table
pub const TABLE_MAX_SIZE: usize = 10_000;

/// Fixed-capacity table of packet lengths
///
/// Immutable once built. Share it between samplers with `Arc`.
#[derive(Clone, PartialEq, Eq)]
pub struct LengthTable {
    slots: Box<[u16]>,
    used_size: u16,
    longest_length: u16,
}

impl LengthTable {
    /// An empty table; weighted sampling is disabled
    pub fn empty() -> Self {
        Self {
            slots: vec![0u16; TABLE_MAX_SIZE].into_boxed_slice(),
            used_size: 0,
            longest_length: 0,
        }
    }

    /// Build a table from entries with computed probabilities
    ///
    /// Entries are laid out in the order given. `longest_length` is the
    /// largest length in the distribution, including rows that received no
    /// slots.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::TableOverflow`] if the runs would not fit. This
    /// can only happen when probabilities sum to more than 1.
    pub fn from_entries(entries: &[FrequencyEntry], longest_length: u16) -> LoadResult<Self> {
        let mut table = Self::empty();
        table.longest_length = longest_length;

        for entry in entries {
            table.push_run(entry.length, entry.slot_count())?;
        }

        Ok(table)
    }

    fn push_run(&mut self, length: u16, count: usize) -> LoadResult<()> {
        let start = self.used_size as usize;
        let end = start + count;
        if end > self.slots.len() {
            return Err(LoadError::TableOverflow {
                requested: end,
                capacity: self.slots.len(),
            });
        }

        self.slots[start..end].fill(length);
        // end <= TABLE_MAX_SIZE < u16::MAX
        self.used_size = end as u16;
        Ok(())
    }

    /// Number of populated slots
    #[inline]
    pub fn used_size(&self) -> u16 {
        self.used_size
    }

    /// Total slot capacity
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Largest length in the distribution the table was built from
    pub fn longest_length(&self) -> u16 {
        self.longest_length
    }

    /// Whether the table can be sampled
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.used_size > 0
    }

    pub fn is_empty(&self) -> bool {
        self.used_size == 0
    }

    /// Slots lost to per-row truncation
    pub fn quantization_loss(&self) -> usize {
        self.slots.len() - self.used_size as usize
    }

    /// The populated slots, in layout order
    pub fn slots(&self) -> &[u16] {
        &self.slots[..self.used_size as usize]
    }

    /// Number of populated slots holding `length`
    pub fn slots_for(&self, length: u16) -> usize {
        self.slots().iter().filter(|&&l| l == length).count()
    }

    /// Map a uniform 32-bit draw to a packet length
    ///
    /// `index = floor(used_size * r / u32::MAX)`, clamped to the last
    /// populated slot (only `r == u32::MAX` reaches `used_size`).
    ///
    /// The table must be enabled; sampling an empty table is a caller bug.
    #[inline(always)]
    pub fn lookup(&self, r: u32) -> u16 {
        debug_assert!(self.is_enabled(), "sampled a disabled length table");

        let used = self.used_size as usize;
        let index = (used as f64 * (f64::from(r) / f64::from(u32::MAX))) as usize;
        self.slots[index.min(used.saturating_sub(1))]
    }
}

impl Default for LengthTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for LengthTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LengthTable")
            .field("used_size", &self.used_size)
            .field("capacity", &self.slots.len())
            .field("longest_length", &self.longest_length)
            .finish()
    }
}

/// Sample the table with any `rand` generator, one `u32` per sample
impl Distribution<u16> for LengthTable {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u16 {
        self.lookup(rng.next_u32())
    }
}
