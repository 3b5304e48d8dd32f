//! pktdist CLI entry point

use anyhow::{Context, Result};
use log::LevelFilter;
use pktdist::config::{cli::Cli, validator, Config, OutputFormat};
use pktdist::distribution::TrafficDistribution;
use pktdist::report::{self, DistributionReport};
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;

    let level = if cli.debug { LevelFilter::Debug } else { LevelFilter::Info };
    // Logs go to stderr (simple_logger "stderr" feature); stdout carries
    // only sampled lengths or the report.
    SimpleLogger::new()
        .with_level(level)
        .init()
        .context("Failed to initialize logger")?;

    let mut config = pktdist::config::toml::build_config(&cli)?;
    validator::validate_config(&config).context("Configuration validation failed")?;

    let dist = config
        .traffic
        .loader()
        .load(config.traffic.distribution_file.as_deref())
        .context("Failed to load packet length distribution")?;
    dist.apply_to(&mut config.settings);

    if cli.self_test {
        return run_self_test(&config, &dist);
    }

    println!("pktdist v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", config);
    println!();

    run_sampling(&config, &dist, cli.count);
    Ok(())
}

/// Print `count` sampled packet lengths, one per line
fn run_sampling(config: &Config, dist: &TrafficDistribution, count: usize) {
    if !dist.is_enabled() {
        println!("Weighted packet lengths disabled; fixed block size of {} bytes applies", config.settings.blksize);
        return;
    }

    let mut sampler = dist.sampler(config.traffic.entropy_source());
    let mut lengths = vec![0u16; count];
    sampler.fill(&mut lengths);

    for length in lengths {
        println!("{}", length);
    }

    log::debug!("Random source state: {}", sampler.source().state());
}

/// Run the diagnostic self-test and emit the report
fn run_self_test(config: &Config, dist: &TrafficDistribution) -> Result<()> {
    let report_config = &config.report;
    let report = DistributionReport::run(dist, config.traffic.entropy_source(), report_config.draws);

    match report_config.format {
        OutputFormat::Text => {
            if let Some(ref path) = report_config.output {
                let text = report::text::render_report(&report, report_config.show_table);
                std::fs::write(path, text)
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
                println!("Report written to {}", path.display());
            } else {
                report::text::print_report(&report, report_config.show_table);
            }
        }
        OutputFormat::Json => {
            report::json::write_json(&report, report_config.show_table, report_config.output.as_deref())
                .context("Failed to write JSON report")?;
        }
    }

    if dist.is_enabled() && report.max_table_error() > 0.01 {
        eprintln!(
            "Warning: sampled frequencies deviate from the length table by up to {:.4}",
            report.max_table_error()
        );
    }

    Ok(())
}
