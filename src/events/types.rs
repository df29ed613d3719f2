//! Event type definitions for progress reporting.

use crate::core::scanner::AssetKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the optimizer pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Traversal events
    Scan(ScanEvent),
    /// Per-file optimization events
    Optimize(OptimizeEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events emitted by the traversal thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Traversal has started
    Started { root: PathBuf },
    /// An eligible asset was queued for processing
    AssetFound { path: PathBuf, kind: AssetKind },
    /// Traversal finished; no more jobs will be queued
    Completed { total_assets: usize },
}

/// Events emitted by workers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OptimizeEvent {
    /// A file finished processing (successfully or not)
    Processed(OptimizeProgress),
}

/// Progress information after one file has been processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeProgress {
    /// Number of files processed so far across all workers
    pub completed: usize,
    /// File that just finished
    pub current_path: PathBuf,
    /// Whether the file was optimized successfully
    pub success: bool,
    /// Bytes saved for this file (negative when output grew)
    pub bytes_saved: i64,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Pipeline completed
    Completed { summary: PipelineSummary },
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub total_bytes_saved: i64,
    pub duration_ms: u64,
}
