//! Entropy-device backed random source with pseudo-random fallback
//!
//! # State Machine
//!
//! ```text
//! Uninitialized --open ok--> DeviceBacked
//!       |                        |
//!   open failed             read failed
//!       |                        |
//!       +------> PseudoRandomFallback <------+
//! ```
//!
//! The device is opened lazily on the first draw. `PseudoRandomFallback` is
//! terminal: once entered, the device is never reopened and the handle is
//! dropped.
//!
//! The fallback generator is seeded exactly once, when it is entered. The
//! seed is the first value ever read from the device if there was one,
//! otherwise the wall-clock time in microseconds truncated to 32 bits.
//!
//! Device reads are buffered, so one read syscall serves about a thousand
//! draws. A short read at the end of the device still counts as a failure.

use super::fallback::FallbackGenerator;
use super::RandomSource;
use crate::util::time::wall_clock_seed;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Default OS entropy device
pub const DEFAULT_ENTROPY_DEVICE: &str = "/dev/urandom";

/// Device bytes buffered per read syscall
const DEVICE_BUFFER_SIZE: usize = 4096;

/// Active strategy of an [`EntropySource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Device not opened yet
    Uninitialized,
    /// Values are read from the entropy device
    DeviceBacked,
    /// Values come from the seeded generator (sticky)
    PseudoRandomFallback,
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SourceState::Uninitialized => write!(f, "uninitialized"),
            SourceState::DeviceBacked => write!(f, "device"),
            SourceState::PseudoRandomFallback => write!(f, "pseudo-random fallback"),
        }
    }
}

enum Strategy {
    Uninitialized,
    Device(Box<dyn Read + Send>),
    Fallback(FallbackGenerator),
}

enum FallbackReason {
    OpenFailed(io::Error),
    ReadFailed(io::Error),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FallbackReason::OpenFailed(e) => write!(f, "cannot open device: {}", e),
            FallbackReason::ReadFailed(e) => write!(f, "device read failed: {}", e),
        }
    }
}

/// Random source preferring the OS entropy device
///
/// See the module documentation for the state machine. `next_u32()` never
/// fails; losing the device only changes where values come from.
pub struct EntropySource {
    device_path: PathBuf,
    strategy: Strategy,
    /// First value read from the device, kept to seed the fallback
    harvested: Option<u32>,
}

impl EntropySource {
    /// Source backed by `/dev/urandom`
    pub fn new() -> Self {
        Self::with_device(DEFAULT_ENTROPY_DEVICE)
    }

    /// Source backed by another device or file
    ///
    /// The path is not touched until the first draw.
    pub fn with_device(path: impl AsRef<Path>) -> Self {
        Self {
            device_path: path.as_ref().to_path_buf(),
            strategy: Strategy::Uninitialized,
            harvested: None,
        }
    }

    /// Source reading from an already opened reader
    ///
    /// Starts in `DeviceBacked`. Useful for pipes and for tests that need to
    /// control when the device runs dry.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            device_path: PathBuf::from("<reader>"),
            strategy: Strategy::Device(Box::new(reader)),
            harvested: None,
        }
    }

    /// Source that starts directly in the fallback state
    ///
    /// Produces a reproducible sequence for a given seed.
    pub fn pseudo_random(seed: u64) -> Self {
        Self {
            device_path: PathBuf::new(),
            strategy: Strategy::Fallback(FallbackGenerator::from_seed(seed)),
            harvested: None,
        }
    }

    /// Current strategy
    pub fn state(&self) -> SourceState {
        match self.strategy {
            Strategy::Uninitialized => SourceState::Uninitialized,
            Strategy::Device(_) => SourceState::DeviceBacked,
            Strategy::Fallback(_) => SourceState::PseudoRandomFallback,
        }
    }

    /// Path of the entropy device this source was configured with
    pub fn device_path(&self) -> &Path {
        &self.device_path
    }

    fn open_device(&mut self) {
        match File::open(&self.device_path) {
            Ok(file) => {
                log::debug!("Opened entropy device {}", self.device_path.display());
                let reader = BufReader::with_capacity(DEVICE_BUFFER_SIZE, file);
                self.strategy = Strategy::Device(Box::new(reader));
            }
            Err(e) => self.enter_fallback(FallbackReason::OpenFailed(e)),
        }
    }

    fn enter_fallback(&mut self, reason: FallbackReason) {
        let seed = match self.harvested {
            Some(value) => {
                log::debug!("Seeding fallback generator from device entropy");
                value
            }
            None => {
                log::debug!("Seeding fallback generator from wall clock");
                wall_clock_seed()
            }
        };

        log::warn!(
            "Entropy device {} unavailable ({}), using pseudo-random fallback",
            self.device_path.display(),
            reason
        );

        // Replacing the strategy drops the device handle
        self.strategy = Strategy::Fallback(FallbackGenerator::from_seed(u64::from(seed)));
    }
}

impl Default for EntropySource {
    fn default() -> Self {
        Self::new()
    }
}

fn read_u32(device: &mut dyn Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    device.read_exact(&mut buf)?;
    Ok(u32::from_ne_bytes(buf))
}

impl RandomSource for EntropySource {
    fn next_u32(&mut self) -> u32 {
        // At most three passes: open, read, fallback
        loop {
            match &mut self.strategy {
                Strategy::Uninitialized => self.open_device(),
                Strategy::Device(device) => match read_u32(device.as_mut()) {
                    Ok(value) => {
                        self.harvested.get_or_insert(value);
                        return value;
                    }
                    Err(e) => self.enter_fallback(FallbackReason::ReadFailed(e)),
                },
                Strategy::Fallback(generator) => return generator.next_u32(),
            }
        }
    }
}

impl rand::RngCore for EntropySource {
    fn next_u32(&mut self) -> u32 {
        RandomSource::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let high = RandomSource::next_u32(self);
        let low = RandomSource::next_u32(self);
        (u64::from(high) << 32) | u64::from(low)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = RandomSource::next_u32(self).to_ne_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
