//! Distribution file loading
//!
//! # File Format
//!
//! ```text
//! <header, always skipped>
//! <frequency>,<length>
//! <frequency>,<length>
//! ...
//! ```
//!
//! Blank lines are ignored. The length field ends at the next comma or at the
//! end of the line (`\n` or `\r\n`).
//!
//! # Parsing Modes
//!
//! - **Permissive** (default): numbers are read like C `atoi`. Leading
//!   whitespace and a `+` sign are accepted, the leading run of digits is the
//!   value and the rest of the field is ignored. A field with no leading
//!   digits, a negative number, or a missing field reads as 0. Values wider
//!   than the field saturate. Negative numbers are clamped to 0 rather than
//!   wrapped into the unsigned field, so `-5` never becomes a huge length.
//! - **Strict**: both fields must be plain unsigned integers that fit, and a
//!   row must not carry extra fields. Anything else is a
//!   [`LoadError::MalformedRecord`].

use super::error::{LoadError, LoadResult};
use super::table::LengthTable;
use super::{FrequencyEntry, TrafficDistribution};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Entries are reserved in chunks of this many rows
pub const ENTRY_CHUNK_SIZE: usize = 512;

/// How row fields are converted to numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Malformed numbers read as zero
    #[default]
    Permissive,
    /// Malformed rows fail the load
    Strict,
}

/// Loads `frequency,length` files into a [`TrafficDistribution`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DistributionLoader {
    mode: ParseMode,
}

impl DistributionLoader {
    /// Loader with permissive parsing
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: ParseMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Load the configured distribution source
    ///
    /// With no source configured this succeeds with a disabled distribution.
    pub fn load(&self, source: Option<&Path>) -> LoadResult<TrafficDistribution> {
        match source {
            Some(path) => self.load_path(path),
            None => Ok(TrafficDistribution::disabled()),
        }
    }

    /// Load a distribution file
    ///
    /// # Errors
    ///
    /// [`LoadError::SourceUnavailable`] if the file cannot be opened or read,
    /// plus any error from [`load_reader`](Self::load_reader).
    pub fn load_path(&self, path: &Path) -> LoadResult<TrafficDistribution> {
        let file = File::open(path).map_err(|source| LoadError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        self.parse(BufReader::new(file), Some(path))
    }

    /// Load a distribution from any buffered reader
    pub fn load_reader<R: BufRead>(&self, reader: R) -> LoadResult<TrafficDistribution> {
        self.parse(reader, None)
    }

    fn parse<R: BufRead>(&self, mut reader: R, source: Option<&Path>) -> LoadResult<TrafficDistribution> {
        let source_path = || source.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("<reader>"));
        let read_failed = |source: io::Error| LoadError::SourceUnavailable {
            path: source_path(),
            source,
        };

        let mut entries: Vec<FrequencyEntry> = Vec::new();
        let mut total_frequency: u64 = 0;
        let mut longest_length: u16 = 0;

        let mut buf = Vec::with_capacity(128);
        let mut line_no = 0usize;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(read_failed)? == 0 {
                break;
            }
            line_no += 1;

            if line_no == 1 {
                continue;
            }

            let line = String::from_utf8_lossy(&buf);
            let Some((frequency, length)) = parse_record(&line, line_no, self.mode)? else {
                continue;
            };

            if entries.len() == entries.capacity() {
                let loaded = entries.len();
                entries
                    .try_reserve(ENTRY_CHUNK_SIZE)
                    .map_err(|_| LoadError::OutOfMemory { entries: loaded })?;
            }

            entries.push(FrequencyEntry {
                length,
                frequency,
                probability: 0.0,
            });
            total_frequency += u64::from(frequency);
            longest_length = longest_length.max(length);
        }

        // Zero total leaves every probability at 0.0, so no row gets slots
        if total_frequency > 0 {
            for entry in entries.iter_mut() {
                entry.probability = f64::from(entry.frequency) / total_frequency as f64;
            }
        }

        let table = LengthTable::from_entries(&entries, longest_length)?;

        log::info!(
            "Loaded packet length distribution from {}: {} rows, total frequency {}, {} slots, longest length {}",
            source_path().display(),
            entries.len(),
            total_frequency,
            table.used_size(),
            longest_length
        );
        log::debug!("Quantization left {} slots unused", table.quantization_loss());
        if !table.is_enabled() {
            log::warn!(
                "Distribution {} has no weight, weighted packet lengths disabled",
                source_path().display()
            );
        }

        Ok(TrafficDistribution::new(
            source.map(Path::to_path_buf),
            entries,
            total_frequency,
            table,
        ))
    }
}

/// Parse one data row into `(frequency, length)`
///
/// Returns `Ok(None)` for blank lines.
fn parse_record(line: &str, line_no: usize, mode: ParseMode) -> LoadResult<Option<(u32, u16)>> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let mut fields = line.split(',');
    let frequency_field = fields.next().unwrap_or("");
    let length_field = fields.next();

    match mode {
        ParseMode::Permissive => {
            let frequency = parse_permissive(frequency_field, u64::from(u32::MAX)) as u32;
            let length = length_field
                .map(|f| parse_permissive(f, u64::from(u16::MAX)) as u16)
                .unwrap_or(0);
            Ok(Some((frequency, length)))
        }
        ParseMode::Strict => {
            let malformed = || LoadError::MalformedRecord {
                line: line_no,
                content: line.to_string(),
            };
            if fields.next().is_some() {
                return Err(malformed());
            }
            let frequency = parse_strict::<u32>(frequency_field).ok_or_else(malformed)?;
            let length = length_field
                .and_then(parse_strict::<u16>)
                .ok_or_else(malformed)?;
            Ok(Some((frequency, length)))
        }
    }
}

/// `atoi`-style conversion clamped to `max`
fn parse_permissive(field: &str, max: u64) -> u64 {
    let s = field.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);

    s.bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, b| acc.saturating_mul(10).saturating_add(u64::from(b - b'0')))
        .min(max)
}

fn parse_strict<T: std::str::FromStr>(field: &str) -> Option<T> {
    let field = field.trim();
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
