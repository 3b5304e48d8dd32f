//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// pktdist - Empirical packet-length sampling
#[derive(Parser, Debug)]
#[command(name = "pktdist")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file (CLI flags take precedence)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Packet length distribution file (CSV: header, then frequency,length rows)
    #[arg(short = 'D', long, env = "PKTDIST_DISTRIBUTION")]
    pub distribution: Option<PathBuf>,

    /// Entropy device to read random values from
    #[arg(long)]
    pub entropy_device: Option<PathBuf>,

    /// Use a seeded pseudo-random source instead of the entropy device
    #[arg(long)]
    pub seed: Option<u64>,

    /// Reject malformed distribution rows instead of reading them as zero
    #[arg(long)]
    pub strict: bool,

    // === Output Options ===
    /// Number of packet lengths to sample and print
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Run the diagnostic self-test instead of sampling
    #[arg(long)]
    pub self_test: bool,

    /// Number of draws for the self-test histogram
    #[arg(long)]
    pub draws: Option<u64>,

    /// Include every populated table slot in the self-test report
    #[arg(long)]
    pub show_table: bool,

    /// Self-test report format
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Write the self-test report to a file
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Self-test report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable text
    Text,
    /// JSON document
    Json,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.draws == Some(0) {
            anyhow::bail!("draws must be at least 1");
        }

        if !self.self_test && (self.show_table || self.output.is_some() || self.format.is_some()) {
            anyhow::bail!("--show-table, --format and --output only apply with --self-test");
        }

        if let Some(ref device) = self.entropy_device {
            if self.seed.is_some() {
                anyhow::bail!(
                    "--seed and --entropy-device {} are mutually exclusive",
                    device.display()
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["pktdist"]).unwrap();
        assert_eq!(cli.count, 10);
        assert!(!cli.self_test);
        assert!(!cli.strict);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_parse_self_test() {
        let cli = Cli::try_parse_from([
            "pktdist",
            "--distribution",
            "lengths.csv",
            "--self-test",
            "--draws",
            "5000",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.distribution, Some(PathBuf::from("lengths.csv")));
        assert_eq!(cli.draws, Some(5000));
        assert_eq!(cli.format, Some(ReportFormat::Json));
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_draws() {
        let cli = Cli::try_parse_from(["pktdist", "--self-test", "--draws", "0"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_validate_report_flags_need_self_test() {
        let cli = Cli::try_parse_from(["pktdist", "--show-table"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_validate_seed_and_device() {
        let cli = Cli::try_parse_from(["pktdist", "--seed", "1", "--entropy-device", "/dev/random"]).unwrap();
        assert!(cli.validate().is_err());
    }
}
