//! Delimited-text table output.
//!
//! Serializes a flat dataset as a single CSV file with a header row inside
//! a per-dataset output directory. Output is deliberately collapsed to one
//! physical part: callers get a single-artifact guarantee at the cost of a
//! serial write. No retry on failure.

use crate::dataset::Dataset;
use crate::error::{Result, WriteError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Name of the single output part inside a dataset directory.
const PART_FILE_NAME: &str = "part-00000.csv";

/// Delimited-text writer options.
#[derive(Debug, Clone)]
pub struct CsvWriteOptions {
    /// Field delimiter
    pub delimiter: u8,
    /// Token used for null values; empty field by default
    pub null_token: String,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            null_token: String::new(),
        }
    }
}

/// Statistics from a completed write.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Number of data rows written (header excluded)
    pub row_count: usize,
    /// Output file size in bytes
    pub file_size_bytes: u64,
    /// Path of the written part file
    pub file_path: PathBuf,
    /// Wall time spent writing
    pub duration: std::time::Duration,
}

/// CSV table writer.
#[derive(Debug, Clone, Default)]
pub struct TableWriter {
    options: CsvWriteOptions,
}

impl TableWriter {
    /// Writer with the given options.
    pub fn new(options: CsvWriteOptions) -> Self {
        Self { options }
    }

    /// Write a dataset as one headered CSV file under `out_dir`.
    ///
    /// Column order is the schema's field order; null values serialize as
    /// the configured null token. The destination directory is created if
    /// missing; any existing part file is replaced.
    pub fn write(&self, dataset: &Dataset, out_dir: &Path) -> Result<WriteSummary> {
        let start = Instant::now();

        fs::create_dir_all(out_dir).map_err(|e| WriteError::Destination {
            path: out_dir.display().to_string(),
            message: e.to_string(),
        })?;
        let file_path = out_dir.join(PART_FILE_NAME);

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.options.delimiter)
            .from_path(&file_path)
            .map_err(|e| WriteError::Destination {
                path: file_path.display().to_string(),
                message: e.to_string(),
            })?;

        writer
            .write_record(dataset.schema.field_names())
            .map_err(|e| WriteError::Serialization(e.to_string()))?;

        for record in &dataset.records {
            let row: Vec<String> = dataset
                .schema
                .fields()
                .iter()
                .map(|field| {
                    record
                        .get(&field.name)
                        .map(|v| v.render(&self.options.null_token))
                        .unwrap_or_else(|| self.options.null_token.clone())
                })
                .collect();
            writer
                .write_record(&row)
                .map_err(|e| WriteError::Serialization(e.to_string()))?;
        }

        writer
            .flush()
            .map_err(|e| WriteError::Serialization(e.to_string()))?;

        let file_size_bytes = fs::metadata(&file_path).map(|m| m.len()).unwrap_or(0);
        let summary = WriteSummary {
            row_count: dataset.row_count(),
            file_size_bytes,
            file_path,
            duration: start.elapsed(),
        };

        info!(
            path = %summary.file_path.display(),
            rows = summary.row_count,
            bytes = summary.file_size_bytes,
            "Table written"
        );

        Ok(summary)
    }
}
