//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.

pub mod cli;
pub mod toml;
pub mod validator;

use crate::distribution::{DistributionLoader, ParseMode};
use crate::random::entropy::DEFAULT_ENTROPY_DEVICE;
use crate::random::EntropySource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub traffic: TrafficConfig,
    #[serde(default)]
    pub settings: TestSettings,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Packet-length distribution and entropy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficConfig {
    /// `frequency,length` file; weighted lengths are disabled without one
    pub distribution_file: Option<PathBuf>,
    /// Entropy device read by the random source
    #[serde(default = "default_entropy_device")]
    pub entropy_device: PathBuf,
    /// Skip the device and use a seeded generator (reproducible runs)
    pub seed: Option<u64>,
    /// How distribution rows are parsed
    #[serde(default)]
    pub parse_mode: ParseMode,
}

fn default_entropy_device() -> PathBuf {
    PathBuf::from(DEFAULT_ENTROPY_DEVICE)
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            distribution_file: None,
            entropy_device: default_entropy_device(),
            seed: None,
            parse_mode: ParseMode::default(),
        }
    }
}

impl TrafficConfig {
    pub fn loader(&self) -> DistributionLoader {
        DistributionLoader::with_mode(self.parse_mode)
    }

    /// Random source for samplers built from this configuration
    pub fn entropy_source(&self) -> EntropySource {
        match self.seed {
            Some(seed) => EntropySource::pseudo_random(seed),
            None => EntropySource::with_device(&self.entropy_device),
        }
    }
}

/// Settings of the test consuming the sampled lengths
///
/// The loader publishes the longest packet length here as the IO block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSettings {
    /// IO block size in bytes
    #[serde(default = "default_blksize")]
    pub blksize: u64,
}

fn default_blksize() -> u64 {
    128 * 1024
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            blksize: default_blksize(),
        }
    }
}

/// Diagnostic report settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of sampled lengths in the empirical histogram
    #[serde(default = "default_draws")]
    pub draws: u64,
    #[serde(default)]
    pub format: OutputFormat,
    /// Include every populated table slot
    #[serde(default)]
    pub show_table: bool,
    /// Write the report here instead of stdout
    pub output: Option<PathBuf>,
}

fn default_draws() -> u64 {
    1_000_000
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            draws: default_draws(),
            format: OutputFormat::default(),
            show_table: false,
            output: None,
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.traffic.distribution_file {
            Some(path) => writeln!(f, "Distribution: {}", path.display())?,
            None => writeln!(f, "Distribution: none (weighted lengths disabled)")?,
        }
        match self.traffic.seed {
            Some(seed) => writeln!(f, "Random source: seeded ({})", seed)?,
            None => writeln!(f, "Random source: {}", self.traffic.entropy_device.display())?,
        }
        writeln!(f, "Parse mode: {:?}", self.traffic.parse_mode)?;
        write!(f, "Block size: {} bytes", self.settings.blksize)
    }
}
