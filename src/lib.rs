//! pktdist - Empirical packet-length sampling
//!
//! pktdist loads a measured packet-length distribution (a CSV of
//! `frequency,length` rows), quantizes it into a fixed lookup table, and draws
//! packet lengths whose frequencies follow the measured shape. It is meant to
//! be embedded in traffic generators that need realistic packet sizes.
//!
//! # Architecture
//!
//! - **Random source**: reads 32-bit values from an entropy device, falling
//!   back permanently to a seeded pseudo-random generator
//! - **Distribution loader**: parses the CSV and builds a 10,000-slot table
//! - **Sampler**: constant-time weighted draws from the table
//! - **Self-test report**: histogram of sampled lengths against the input
//!
//! # Example
//!
//! ```
//! use pktdist::distribution::DistributionLoader;
//! use pktdist::random::EntropySource;
//!
//! let dist = DistributionLoader::new()
//!     .load_reader("frequency,length\n1,100\n3,1400\n".as_bytes())
//!     .unwrap();
//!
//! let mut sampler = dist.sampler(EntropySource::pseudo_random(7));
//! let length = sampler.next_length();
//! assert!(length == 100 || length == 1400);
//! ```

pub mod config;
pub mod distribution;
pub mod random;
pub mod report;
pub mod util;

// Re-export commonly used types
pub use config::Config;
pub use distribution::{DistributionLoader, LengthSampler, LoadError, TrafficDistribution};
pub use random::{EntropySource, RandomSource};

/// Result type used throughout pktdist
pub type Result<T> = anyhow::Result<T>;
