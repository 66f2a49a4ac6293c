//! CSV output writer

use crate::config::OutputConfig;
use crate::record::{AccidentField, AccidentRecord};
use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::{OutputError, OutputResult, RecordSink};

/// Rewrites one CSV file per year with the full record set
///
/// Each rewrite goes to a sibling `.tmp` file which is synced and then renamed over the
/// target, so an interrupted write never leaves a truncated CSV behind.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
    writes: u64,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            writes: 0,
        }
    }

    /// The file for `year` under the configured directory: `{prefix}_{year}.csv`
    pub fn for_year(config: &OutputConfig, year: u32) -> Self {
        Self::new(output_path(config, year))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of completed rewrites
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Deterministic output path for a year
pub fn output_path(config: &OutputConfig, year: u32) -> PathBuf {
    Path::new(&config.directory).join(format!("{}_{}.csv", config.file_prefix, year))
}

/// Writes the header row and every record to `writer`
pub fn write_records<W: std::io::Write>(
    writer: W,
    records: &[AccidentRecord],
) -> OutputResult<W> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    csv_writer.write_record(AccidentField::header())?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;

    csv_writer
        .into_inner()
        .map_err(|e| OutputError::Write(format!("Failed to finish CSV: {}", e)))
}

impl RecordSink for CsvSink {
    fn persist(&mut self, records: &[AccidentRecord]) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        let file = File::create(&temp_path)?;
        let buf_writer = write_records(BufWriter::new(file), records)?;
        let file = buf_writer
            .into_inner()
            .map_err(|e| OutputError::Write(format!("Failed to flush {}: {}", temp_path.display(), e)))?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;
        self.writes += 1;

        tracing::debug!(
            "Wrote {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
