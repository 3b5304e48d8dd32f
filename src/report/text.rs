//! Human-readable text output

use super::DistributionReport;
use crate::util::time::{format_duration, format_rate};
use std::fmt::Write;

/// Print a self-test report to console
///
/// Displays the parsed rows, the resulting table, sampled length statistics
/// and the per-length accuracy. With `show_table` every populated slot is
/// printed as well.
pub fn print_report(report: &DistributionReport, show_table: bool) {
    print!("{}", render_report(report, show_table));
}

/// Render a self-test report as text
pub fn render_report(report: &DistributionReport, show_table: bool) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_report(&mut out, report, show_table);
    out
}

fn write_report(out: &mut String, report: &DistributionReport, show_table: bool) -> std::fmt::Result {
    writeln!(out, "═══════════════════════════════════════════════════════════")?;
    writeln!(out, "                 DISTRIBUTION SELF-TEST")?;
    writeln!(out, "═══════════════════════════════════════════════════════════")?;
    writeln!(out)?;

    match &report.source {
        Some(path) => writeln!(out, "Source: {}", path.display())?,
        None => writeln!(out, "Source: none")?,
    }
    writeln!(out)?;

    writeln!(out, "Entries: {}", format_number(report.entries.len() as u64))?;
    writeln!(out, "  {:>8}  {:>12}  {:>10}  {:>6}", "Length", "Frequency", "Prob", "Slots")?;
    for entry in &report.entries {
        writeln!(
            out,
            "  {:>8}  {:>12}  {:>10.6}  {:>6}",
            entry.length,
            entry.frequency,
            entry.probability,
            entry.slot_count()
        )?;
    }
    writeln!(out, "  Total frequency:   {}", format_number(report.total_frequency))?;
    writeln!(out, "  Total probability: {:.6}", report.total_probability)?;
    writeln!(out)?;

    writeln!(out, "Table:")?;
    writeln!(out, "  Used slots:     {} / {}", report.used_size, report.capacity)?;
    writeln!(out, "  Unused slots:   {}", report.capacity - report.used_size as usize)?;
    writeln!(out, "  Longest length: {} bytes", report.longest_length)?;
    if report.used_size == 0 {
        writeln!(out, "  Weighted sampling disabled (empty table)")?;
    }
    writeln!(out)?;

    if !report.histogram.is_empty() {
        let hist = &report.histogram;
        writeln!(out, "Samples:")?;
        writeln!(
            out,
            "  Draws: {} in {} ({} samples/s)",
            format_number(hist.len()),
            format_duration(report.elapsed),
            format_rate(report.sample_rate())
        )?;
        writeln!(out, "  Min:   {} bytes", hist.min())?;
        writeln!(out, "  Mean:  {:.2} bytes", hist.mean())?;
        writeln!(out, "  p50:   {} bytes", hist.percentile(50.0))?;
        writeln!(out, "  p90:   {} bytes", hist.percentile(90.0))?;
        writeln!(out, "  p99:   {} bytes", hist.percentile(99.0))?;
        writeln!(out, "  Max:   {} bytes", hist.max())?;
        writeln!(out)?;

        writeln!(out, "Accuracy:")?;
        writeln!(
            out,
            "  {:>8}  {:>10}  {:>10}  {:>10}  {:>10}",
            "Length", "Expected", "Table", "Observed", "Error"
        )?;
        for row in &report.accuracy {
            writeln!(
                out,
                "  {:>8}  {:>10.6}  {:>10.6}  {:>10.6}  {:>+10.6}",
                row.length,
                row.expected,
                row.table_share,
                row.observed,
                row.error()
            )?;
        }
        writeln!(out, "  Max error: {:.6}", report.max_abs_error())?;
        writeln!(out)?;
    }

    if show_table && !report.table.is_empty() {
        writeln!(out, "Slots:")?;
        for (row, chunk) in report.table.chunks(10).enumerate() {
            write!(out, "  {:>5}:", row * 10)?;
            for length in chunk {
                write!(out, " {:>5}", length)?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "═══════════════════════════════════════════════════════════")?;
    Ok(())
}

/// Format number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::DistributionLoader;
    use crate::random::fallback::FallbackGenerator;

    fn report(csv: &str, draws: u64) -> DistributionReport {
        let dist = DistributionLoader::new().load_reader(csv.as_bytes()).unwrap();
        DistributionReport::run(&dist, FallbackGenerator::from_seed(3), draws)
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_000_000), "1,000,000");
    }

    #[test]
    fn test_render_sections() {
        let text = render_report(&report("frequency,length\n1,100\n3,1400\n", 1000), false);

        assert!(text.contains("DISTRIBUTION SELF-TEST"));
        assert!(text.contains("Used slots:     10000 / 10000"));
        assert!(text.contains("Longest length: 1400 bytes"));
        assert!(text.contains("Draws: 1,000"));
        assert!(text.contains("Accuracy:"));
        assert!(!text.contains("Slots:"));
    }

    #[test]
    fn test_render_slots() {
        let text = render_report(&report("h\n1,100\n", 10), true);
        assert!(text.contains("Slots:"));
        assert!(text.contains("   9990:"));
    }

    #[test]
    fn test_render_disabled() {
        let text = render_report(&report("h\n0,100\n", 10), true);
        assert!(text.contains("Weighted sampling disabled"));
        assert!(!text.contains("Samples:"));
        assert!(!text.contains("Slots:"));
    }
}
