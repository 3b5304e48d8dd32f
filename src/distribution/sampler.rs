//! Per-packet length sampling
//!
//! A [`LengthSampler`] pairs a shared, immutable [`LengthTable`] with a
//! random source it owns. Each call draws one `u32` and performs one table
//! lookup: no allocation, no IO, no locking on the table.
//!
//! # Thread Safety
//!
//! Give each thread its own sampler. They can share the table (it is behind
//! an `Arc`) and, if a single entropy device handle is wanted, a
//! [`SharedSource`](crate::random::SharedSource).

use super::table::LengthTable;
use crate::random::{EntropySource, RandomSource};
use std::sync::Arc;

/// Weighted packet-length sampler
pub struct LengthSampler<R: RandomSource = EntropySource> {
    table: Arc<LengthTable>,
    source: R,
}

impl<R: RandomSource> LengthSampler<R> {
    pub fn new(table: Arc<LengthTable>, source: R) -> Self {
        Self { table, source }
    }

    /// Whether the table can be sampled
    ///
    /// Check this once before sampling; a disabled table means the caller
    /// should use its default packet length.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.table.is_enabled()
    }

    /// Next packet length
    ///
    /// The table must be enabled.
    #[inline(always)]
    pub fn next_length(&mut self) -> u16 {
        let r = self.source.next_u32();
        self.table.lookup(r)
    }

    /// Fill `out` with sampled lengths
    pub fn fill(&mut self, out: &mut [u16]) {
        for slot in out.iter_mut() {
            *slot = self.next_length();
        }
    }

    pub fn table(&self) -> &Arc<LengthTable> {
        &self.table
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    /// Split the sampler into its table and random source
    pub fn into_parts(self) -> (Arc<LengthTable>, R) {
        (self.table, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::loader::DistributionLoader;
    use crate::random::fallback::FallbackGenerator;
    use std::collections::HashMap;
    use std::thread;

    /// Replays a fixed list of draws
    struct Scripted(std::vec::IntoIter<u32>);

    impl RandomSource for Scripted {
        fn next_u32(&mut self) -> u32 {
            self.0.next().unwrap_or(0)
        }
    }

    fn table(csv: &str) -> Arc<LengthTable> {
        let dist = DistributionLoader::new().load_reader(csv.as_bytes()).unwrap();
        Arc::clone(dist.table())
    }

    #[test]
    fn test_draws_map_to_runs() {
        let t = table("h\n1,100\n3,1400\n");
        let draws = vec![0, u32::MAX / 8, u32::MAX / 2, u32::MAX];
        let mut sampler = LengthSampler::new(t, Scripted(draws.into_iter()));

        assert_eq!(sampler.next_length(), 100);
        assert_eq!(sampler.next_length(), 100);
        assert_eq!(sampler.next_length(), 1400);
        assert_eq!(sampler.next_length(), 1400);
    }

    #[test]
    fn test_only_configured_lengths() {
        let t = table("h\n5,64\n1,576\n2,1500\n0,9000\n");
        let mut sampler = LengthSampler::new(t, FallbackGenerator::from_seed(3));

        for _ in 0..100_000 {
            let length = sampler.next_length();
            assert!(matches!(length, 64 | 576 | 1500), "fabricated length {}", length);
        }
    }

    #[test]
    fn test_empirical_frequencies_converge() {
        let t = table("h\n10,40\n20,576\n30,1300\n40,1500\n");
        let mut sampler = LengthSampler::new(t, FallbackGenerator::from_seed(42));

        let draws = 1_000_000u32;
        let mut counts: HashMap<u16, u32> = HashMap::new();
        for _ in 0..draws {
            *counts.entry(sampler.next_length()).or_insert(0) += 1;
        }

        for (length, probability) in [(40u16, 0.1), (576, 0.2), (1300, 0.3), (1500, 0.4)] {
            let observed = counts[&length] as f64 / draws as f64;
            assert!(
                (observed - probability).abs() < 0.005,
                "length {}: observed {:.4}, expected {:.4}",
                length,
                observed,
                probability
            );
        }
    }

    #[test]
    fn test_fill() {
        let t = table("h\n1,512\n");
        let mut sampler = LengthSampler::new(t, FallbackGenerator::from_seed(9));
        let mut out = [0u16; 64];
        sampler.fill(&mut out);
        assert!(out.iter().all(|&l| l == 512));
    }

    #[test]
    fn test_disabled_table_reported() {
        let sampler = LengthSampler::new(Arc::new(LengthTable::empty()), FallbackGenerator::from_seed(1));
        assert!(!sampler.is_enabled());
    }

    #[test]
    fn test_samplers_share_table_across_threads() {
        let t = table("h\n1,100\n1,200\n");

        let handles: Vec<_> = (0..4u64)
            .map(|seed| {
                let t = Arc::clone(&t);
                thread::spawn(move || {
                    let mut sampler = LengthSampler::new(t, FallbackGenerator::from_seed(seed));
                    (0..10_000).map(|_| sampler.next_length()).filter(|&l| l == 100).count()
                })
            })
            .collect();

        for handle in handles {
            let small = handle.join().unwrap();
            assert!(small > 4500 && small < 5500, "small count {}", small);
        }
        assert_eq!(Arc::strong_count(&t), 1);
    }
}
