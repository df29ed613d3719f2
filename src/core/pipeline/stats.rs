//! Per-file records and run-level statistics.

use crate::core::optimizer::Optimized;
use crate::core::scanner::{AssetFormat, AssetKind, Job};
use crate::error::ProcessError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of processing one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub kind: AssetKind,
    pub format: AssetFormat,
    /// Input size; kept on failure whenever the file could be stat'ed
    pub original_size: u64,
    pub processed_size: u64,
    /// `original_size - processed_size`; negative when the output grew
    pub bytes_saved: i64,
    pub output_path: Option<PathBuf>,
    pub webp_path: Option<PathBuf>,
    pub success: bool,
    pub error: Option<String>,
}

impl FileRecord {
    /// Build the record for `job` from its optimizer outcome.
    ///
    /// `input_size` is the size of the input file as seen before
    /// processing; it becomes `original_size` when the optimizer failed.
    pub fn from_outcome(
        job: Job,
        input_size: u64,
        outcome: Result<Optimized, ProcessError>,
    ) -> Self {
        let kind = job.kind();
        match outcome {
            Ok(optimized) => Self {
                bytes_saved: optimized.bytes_saved(),
                path: job.path,
                kind,
                format: job.format,
                original_size: optimized.original_size,
                processed_size: optimized.processed_size,
                output_path: Some(optimized.output_path),
                webp_path: optimized.webp_path,
                success: true,
                error: None,
            },
            Err(error) => Self {
                path: job.path,
                kind,
                format: job.format,
                original_size: input_size,
                processed_size: 0,
                bytes_saved: 0,
                output_path: None,
                webp_path: None,
                success: false,
                error: Some(error.to_string()),
            },
        }
    }
}

/// Aggregated outcome of a run.
///
/// Only the draining thread ever mutates this; derived metrics are computed
/// on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub successful: usize,
    pub failed: usize,
    pub total_bytes_saved: i64,
    /// Records in completion order
    pub records: Vec<FileRecord>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the totals
    pub fn record(&mut self, record: FileRecord) {
        if record.success {
            self.successful += 1;
            self.total_bytes_saved += record.bytes_saved;
        } else {
            self.failed += 1;
        }
        self.records.push(record);
    }

    pub fn total_files(&self) -> usize {
        self.successful + self.failed
    }

    /// Percentage of files that succeeded (0 when nothing ran)
    pub fn success_rate(&self) -> f64 {
        let total = self.total_files();
        if total == 0 {
            return 0.0;
        }
        self.successful as f64 / total as f64 * 100.0
    }

    /// Average bytes saved per successful file (integer division, 0 when none succeeded)
    pub fn average_savings(&self) -> i64 {
        if self.successful == 0 {
            return 0;
        }
        self.total_bytes_saved / self.successful as i64
    }

    pub fn total_original_size(&self) -> u64 {
        self.records.iter().map(|r| r.original_size).sum()
    }

    pub fn total_processed_size(&self) -> u64 {
        self.records.iter().map(|r| r.processed_size).sum()
    }

    /// Records of files that failed
    pub fn failures(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter().filter(|r| !r.success)
    }
}
