//! TOML configuration file parsing
//!
//! ```toml
//! [traffic]
//! distribution_file = "lengths.csv"
//! entropy_device = "/dev/urandom"
//! parse_mode = "strict"
//!
//! [settings]
//! blksize = 65536
//!
//! [report]
//! draws = 1000000
//! format = "json"
//! ```
//!
//! Every section and key is optional.

use super::cli::{Cli, ReportFormat};
use super::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Config {
    if let Some(ref path) = cli.distribution {
        config.traffic.distribution_file = Some(path.clone());
    }
    if let Some(ref device) = cli.entropy_device {
        config.traffic.entropy_device = device.clone();
        config.traffic.seed = None;
    }
    if let Some(seed) = cli.seed {
        config.traffic.seed = Some(seed);
    }
    if cli.strict {
        config.traffic.parse_mode = ParseMode::Strict;
    }

    if let Some(draws) = cli.draws {
        config.report.draws = draws;
    }
    if cli.show_table {
        config.report.show_table = true;
    }
    if let Some(format) = cli.format {
        config.report.format = match format {
            ReportFormat::Text => OutputFormat::Text,
            ReportFormat::Json => OutputFormat::Json,
        };
    }
    if let Some(ref output) = cli.output {
        config.report.output = Some(output.clone());
    }

    config
}

/// Build the effective configuration: TOML file (if any) overridden by CLI
pub fn build_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config::default(),
    };

    Ok(merge_cli_with_config(cli, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let config = parse_toml_string(
            r#"
            [traffic]
            distribution_file = "lengths.csv"
            entropy_device = "/dev/random"
            parse_mode = "strict"

            [settings]
            blksize = 65536

            [report]
            draws = 5000
            format = "json"
            show_table = true
            "#,
        )
        .unwrap();

        assert_eq!(config.traffic.distribution_file, Some(PathBuf::from("lengths.csv")));
        assert_eq!(config.traffic.entropy_device, PathBuf::from("/dev/random"));
        assert_eq!(config.traffic.parse_mode, ParseMode::Strict);
        assert_eq!(config.settings.blksize, 65536);
        assert_eq!(config.report.draws, 5000);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert!(config.report.show_table);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_toml_string("").unwrap();
        assert!(config.traffic.distribution_file.is_none());
        assert_eq!(config.settings.blksize, 131_072);
    }

    #[test]
    fn test_parse_invalid_mode() {
        assert!(parse_toml_string("[traffic]\nparse_mode = \"lenient\"\n").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[traffic]").unwrap();
        writeln!(file, "distribution_file = \"from_file.csv\"").unwrap();
        writeln!(file, "seed = 5").unwrap();
        writeln!(file, "[report]").unwrap();
        writeln!(file, "draws = 100").unwrap();

        let config_path = file.path().to_str().unwrap().to_string();
        let cli = Cli::try_parse_from([
            "pktdist",
            "--config",
            config_path.as_str(),
            "--distribution",
            "from_cli.csv",
            "--strict",
        ])
        .unwrap();

        let config = build_config(&cli).unwrap();
        assert_eq!(config.traffic.distribution_file, Some(PathBuf::from("from_cli.csv")));
        assert_eq!(config.traffic.seed, Some(5));
        assert_eq!(config.traffic.parse_mode, ParseMode::Strict);
        assert_eq!(config.report.draws, 100);
    }

    #[test]
    fn test_entropy_device_clears_file_seed() {
        let config = parse_toml_string("[traffic]\nseed = 5\n").unwrap();
        let cli = Cli::try_parse_from(["pktdist", "--entropy-device", "/dev/random"]).unwrap();

        let config = merge_cli_with_config(&cli, config);
        assert!(config.traffic.seed.is_none());
        assert_eq!(config.traffic.entropy_device, PathBuf::from("/dev/random"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = parse_toml_file(Path::new("/nonexistent/pktdist.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
