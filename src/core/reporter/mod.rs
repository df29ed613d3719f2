//! # Reporter Module
//!
//! Turns run statistics into a JSON report (`metadata.json`) describing
//! the settings used and the outcome for every file.

use crate::core::pipeline::{FileRecord, RunStatistics};
use crate::core::scanner::AssetFormat;
use crate::error::ReportError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name the CLI writes the report under, inside the output directory
pub const REPORT_FILE_NAME: &str = "metadata.json";

/// Run settings recorded alongside the results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    pub quality: u8,
    pub width: u32,
    pub webp: bool,
    pub concurrency: usize,
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub quality: u8,
    pub width: u32,
    pub webp: bool,
    pub concurrency: usize,
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub total_bytes_saved: i64,
    pub total_original_size_bytes: u64,
    pub total_processed_size_bytes: u64,
    pub success_rate_percent: f64,
}

/// One processed file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub input_file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webp_file: Option<PathBuf>,
    pub file_type: AssetFormat,
    pub original_size_bytes: u64,
    pub processed_size_bytes: u64,
    pub bytes_saved: i64,
    pub compression_ratio: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&FileRecord> for ReportEntry {
    fn from(record: &FileRecord) -> Self {
        Self {
            input_file: record.path.clone(),
            output_file: record.output_path.clone(),
            webp_file: record.webp_path.clone(),
            file_type: record.format,
            original_size_bytes: record.original_size,
            processed_size_bytes: record.processed_size,
            bytes_saved: record.bytes_saved,
            compression_ratio: compression_ratio(record.bytes_saved, record.original_size),
            success: record.success,
            error: record.error.clone(),
        }
    }
}

/// The complete report document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub created_at: DateTime<Utc>,
    pub processing_config: ReportConfig,
    pub summary: ReportSummary,
    pub processed_files: Vec<ReportEntry>,
}

impl RunReport {
    pub fn new(context: &ReportContext, stats: &RunStatistics) -> Self {
        Self {
            created_at: Utc::now(),
            processing_config: ReportConfig {
                quality: context.quality,
                width: context.width,
                webp: context.webp,
                concurrency: context.concurrency,
                input_directory: context.input.clone(),
                output_directory: context.output.clone(),
            },
            summary: ReportSummary {
                total_files: stats.total_files(),
                successful_files: stats.successful,
                failed_files: stats.failed,
                total_bytes_saved: stats.total_bytes_saved,
                total_original_size_bytes: stats.total_original_size(),
                total_processed_size_bytes: stats.total_processed_size(),
                success_rate_percent: stats.success_rate(),
            },
            processed_files: stats.records.iter().map(ReportEntry::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty-printed JSON
    pub fn write_to_file(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Savings as a percentage of the original size, e.g. `"42.5%"`
fn compression_ratio(bytes_saved: i64, original_size: u64) -> String {
    if original_size == 0 {
        return "N/A".to_string();
    }
    format!("{:.1}%", bytes_saved as f64 / original_size as f64 * 100.0)
}
