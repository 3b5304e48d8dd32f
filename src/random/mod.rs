//! Random sources for packet-length sampling
//!
//! Sampling consumes one uniformly distributed `u32` per packet. This module
//! provides the sources those values come from.
//!
//! # Sources
//!
//! - **EntropySource**: reads the OS entropy device (`/dev/urandom` by default)
//!   and degrades to a seeded pseudo-random generator if the device cannot be
//!   opened or read. The degradation is silent to callers and permanent.
//! - **FallbackGenerator**: the seeded generator on its own, for reproducible
//!   runs and tests.
//! - **SharedSource**: one `EntropySource` behind a mutex, so samplers on
//!   several threads can share a single device handle.
//!
//! # Example
//!
//! ```
//! use pktdist::random::{RandomSource, fallback::FallbackGenerator};
//!
//! let mut a = FallbackGenerator::from_seed(7);
//! let mut b = FallbackGenerator::from_seed(7);
//! assert_eq!(a.next_u32(), b.next_u32());
//! ```

use std::sync::{Arc, Mutex, PoisonError};

pub mod entropy;
pub mod fallback;

pub use entropy::{EntropySource, SourceState};

/// Source of uniformly distributed 32-bit values
///
/// Implementations never fail and never block indefinitely: running out of
/// entropy degrades to the next available strategy instead of surfacing an
/// error on the sampling path.
///
/// # Thread Safety
///
/// Sources must be `Send` so a sampler can move to a worker thread. A source
/// is not required to be `Sync`; concurrent callers either own separate
/// sources or share one through [`SharedSource`].
pub trait RandomSource: Send {
    /// Return the next 32-bit value
    fn next_u32(&mut self) -> u32;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}

/// An [`EntropySource`] shared between threads
///
/// Every draw takes the lock, so state transitions (device to fallback) and
/// generator reads are never interleaved. Cloning shares the same source.
#[derive(Clone)]
pub struct SharedSource {
    inner: Arc<Mutex<EntropySource>>,
}

impl SharedSource {
    pub fn new(source: EntropySource) -> Self {
        Self {
            inner: Arc::new(Mutex::new(source)),
        }
    }

    /// Current strategy of the underlying source
    pub fn state(&self) -> SourceState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }
}

impl RandomSource for SharedSource {
    fn next_u32(&mut self) -> u32 {
        // A panic elsewhere cannot leave the source half-transitioned, so a
        // poisoned lock is still safe to use.
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_u32()
    }
}
