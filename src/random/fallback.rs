//! Seeded pseudo-random fallback
//!
//! Used when the entropy device is missing or stops producing data. Uses
//! xoshiro256++, which is fast and has good statistical properties; it is
//! not suitable for anything security related.
//!
//! Each 32-bit output is assembled from two 16-bit draws (high half first).
//! This keeps the output shape independent of the generator's native width.

use super::RandomSource;
use rand::RngCore;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Seeded pseudo-random generator producing 32-bit values
pub struct FallbackGenerator {
    rng: Xoshiro256PlusPlus,
}

impl FallbackGenerator {
    /// Create a generator from a seed
    ///
    /// The same seed always produces the same sequence.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    #[inline(always)]
    fn draw_u16(&mut self) -> u16 {
        (self.rng.next_u32() & 0xffff) as u16
    }
}

impl RandomSource for FallbackGenerator {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        let high = self.draw_u16();
        let low = self.draw_u16();
        (u32::from(high) << 16) | u32::from(low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_seeded() {
        let mut gen1 = FallbackGenerator::from_seed(12345);
        let mut gen2 = FallbackGenerator::from_seed(12345);

        for _ in 0..10 {
            assert_eq!(gen1.next_u32(), gen2.next_u32());
        }
    }

    #[test]
    fn test_fallback_halves() {
        let mut gen = FallbackGenerator::from_seed(42);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);

        let high = rng.next_u32() & 0xffff;
        let low = rng.next_u32() & 0xffff;
        assert_eq!(gen.next_u32(), (high << 16) | low);
    }

    #[test]
    fn test_fallback_covers_full_range() {
        let mut gen = FallbackGenerator::from_seed(7);
        let mut buckets = vec![0u32; 16];

        for _ in 0..16_000 {
            buckets[(gen.next_u32() >> 28) as usize] += 1;
        }

        // Each of the top-nibble buckets should hold roughly 1000 samples
        for count in buckets {
            assert!(count > 800 && count < 1200, "Bucket count {} outside expected range", count);
        }
    }
}
