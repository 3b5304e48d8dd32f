//! Configuration validation

use super::*;
use anyhow::Result;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_traffic(&config.traffic)?;
    validate_settings(&config.settings)?;
    validate_report(&config.report)?;

    Ok(())
}

/// Validate traffic configuration
pub fn validate_traffic(traffic: &TrafficConfig) -> Result<()> {
    if traffic.seed.is_none() && traffic.entropy_device.as_os_str().is_empty() {
        anyhow::bail!("entropy_device must not be empty");
    }

    if let Some(ref path) = traffic.distribution_file {
        if path.as_os_str().is_empty() {
            anyhow::bail!("distribution_file must not be empty");
        }
    }

    Ok(())
}

/// Validate test settings
pub fn validate_settings(settings: &TestSettings) -> Result<()> {
    if settings.blksize == 0 {
        anyhow::bail!("blksize must be at least 1 byte");
    }

    Ok(())
}

/// Validate report configuration
pub fn validate_report(report: &ReportConfig) -> Result<()> {
    if report.draws == 0 {
        anyhow::bail!("report draws must be at least 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_device_rejected() {
        let mut config = Config::default();
        config.traffic.entropy_device = PathBuf::new();
        assert!(validate_config(&config).is_err());

        // A seeded source never touches the device
        config.traffic.seed = Some(1);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_blksize_rejected() {
        let mut config = Config::default();
        config.settings.blksize = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_draws_rejected() {
        let mut config = Config::default();
        config.report.draws = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("draws"));
    }
}
