//! JSON output formatting

use super::DistributionReport;
use crate::distribution::FrequencyEntry;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub entries: Vec<FrequencyEntry>,
    pub total_frequency: u64,
    pub total_probability: f64,
    pub table: JsonTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<JsonSamples>,
    pub accuracy: Vec<JsonAccuracy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonTable {
    pub used_size: u16,
    pub capacity: usize,
    pub longest_length: u16,
    pub enabled: bool,
    /// Populated slots, only with `show_table`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<u16>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSamples {
    pub draws: u64,
    pub elapsed_micros: u64,
    pub samples_per_sec: f64,
    pub min: u64,
    pub mean: f64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub max: u64,
    /// `[length, count]` pairs for every sampled length
    pub counts: Vec<(u16, u64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonAccuracy {
    pub length: u16,
    pub expected: f64,
    pub slots: usize,
    pub table_share: f64,
    pub observed: f64,
    pub error: f64,
}

/// Build the serializable form of a report
pub fn build_json_report(report: &DistributionReport, show_table: bool) -> JsonReport {
    let hist = &report.histogram;

    let samples = if hist.is_empty() {
        None
    } else {
        Some(JsonSamples {
            draws: hist.len(),
            elapsed_micros: report.elapsed.as_micros() as u64,
            samples_per_sec: report.sample_rate(),
            min: hist.min(),
            mean: hist.mean(),
            p50: hist.percentile(50.0),
            p90: hist.percentile(90.0),
            p99: hist.percentile(99.0),
            max: hist.max(),
            counts: hist.recorded(),
        })
    };

    JsonReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        source: report.source.as_ref().map(|p| p.display().to_string()),
        entries: report.entries.clone(),
        total_frequency: report.total_frequency,
        total_probability: report.total_probability,
        table: JsonTable {
            used_size: report.used_size,
            capacity: report.capacity,
            longest_length: report.longest_length,
            enabled: report.used_size > 0,
            slots: show_table.then(|| report.table.clone()),
        },
        samples,
        accuracy: report
            .accuracy
            .iter()
            .map(|a| JsonAccuracy {
                length: a.length,
                expected: a.expected,
                slots: a.slots,
                table_share: a.table_share,
                observed: a.observed,
                error: a.error(),
            })
            .collect(),
    }
}

/// Write a report as pretty JSON to `output_path`, or stdout without one
///
/// Stdout carries only the JSON document; log output goes to stderr.
pub fn write_json(report: &DistributionReport, show_table: bool, output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create report file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_json_to(report, show_table, &mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            write_json_to(report, show_table, &mut stdout.lock())?;
        }
    }

    Ok(())
}

/// Write a report as one pretty JSON document followed by a newline
pub fn write_json_to<W: Write>(report: &DistributionReport, show_table: bool, writer: &mut W) -> Result<()> {
    let json = build_json_report(report, show_table);
    serde_json::to_writer_pretty(&mut *writer, &json)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::DistributionLoader;
    use crate::random::fallback::FallbackGenerator;
    use tempfile::TempDir;

    fn report(csv: &str, draws: u64) -> DistributionReport {
        let dist = DistributionLoader::new().load_reader(csv.as_bytes()).unwrap();
        DistributionReport::run(&dist, FallbackGenerator::from_seed(9), draws)
    }

    #[test]
    fn test_build_json_report() {
        let json = build_json_report(&report("frequency,length\n1,100\n3,1400\n", 1000), false);

        assert_eq!(json.entries.len(), 2);
        assert_eq!(json.table.used_size, 10_000);
        assert!(json.table.enabled);
        assert!(json.table.slots.is_none());

        let samples = json.samples.unwrap();
        assert_eq!(samples.draws, 1000);
        assert_eq!(samples.counts.iter().map(|(_, c)| c).sum::<u64>(), 1000);
        assert!(chrono::DateTime::parse_from_rfc3339(&json.generated_at).is_ok());
    }

    #[test]
    fn test_disabled_has_no_samples() {
        let json = build_json_report(&report("h\n0,100\n", 1000), true);
        assert!(!json.table.enabled);
        assert!(json.samples.is_none());
        assert_eq!(json.table.slots, Some(Vec::new()));
    }

    #[test]
    fn test_write_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");

        write_json(&report("h\n1,64\n1,1500\n", 100), true, Some(&path)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["table"]["used_size"], 10_000);
        assert_eq!(value["table"]["slots"].as_array().unwrap().len(), 10_000);
        assert_eq!(value["entries"][1]["length"], 1500);
        assert_eq!(value["samples"]["draws"], 100);
    }

    #[test]
    fn test_json_document_is_whole_output() {
        let mut buf = Vec::new();
        write_json_to(&report("frequency,length\n1,100\n3,1400\n", 500), false, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with('{'));
        assert!(text.ends_with("}\n"));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["samples"]["draws"], 500);
    }

    #[test]
    fn test_write_json_names_unwritable_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("report.json");

        let err = write_json(&report("h\n1,64\n", 10), false, Some(&path)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Failed to create report file"));
        assert!(message.contains("report.json"));
    }
}
