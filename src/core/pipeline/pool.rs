//! Fixed-size worker pool consuming the job queue.

use super::stats::FileRecord;
use crate::core::optimizer::{Optimized, OptimizerSet};
use crate::core::scanner::Job;
use crate::error::ProcessError;
use crate::events::{Event, EventSender, OptimizeEvent, OptimizeProgress};
use crossbeam_channel::{Receiver, Sender};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Maps input files to the directory their output goes in.
///
/// A file keeps its position relative to the input root, so
/// `in/icons/a.svg` lands in `out/icons/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    input_root: PathBuf,
    output_root: PathBuf,
}

impl OutputLayout {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
        }
    }

    /// Output directory for `path`; files outside the input root go to the output root
    pub fn output_dir_for(&self, path: &Path) -> PathBuf {
        path.parent()
            .and_then(|parent| parent.strip_prefix(&self.input_root).ok())
            .map(|relative| self.output_root.join(relative))
            .unwrap_or_else(|| self.output_root.clone())
    }
}

/// A fixed number of worker threads turning jobs into [`FileRecord`]s
pub struct WorkerPool {
    size: usize,
    optimizers: OptimizerSet,
    layout: OutputLayout,
    dry_run: bool,
}

impl WorkerPool {
    /// Create a pool of `size` workers (at least one is always started)
    pub fn new(size: usize, optimizers: OptimizerSet, layout: OutputLayout, dry_run: bool) -> Self {
        Self {
            size: size.max(1),
            optimizers,
            layout,
            dry_run,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Spawn the workers.
    ///
    /// Each worker holds its own clone of `jobs` and `results`; it exits once
    /// the job queue is closed and drained. Join the returned handles before
    /// dropping the caller's copy of `results` so the result queue only
    /// closes after every record has been sent.
    pub fn start(
        &self,
        jobs: &Receiver<Job>,
        results: &Sender<FileRecord>,
        events: &EventSender,
    ) -> Vec<JoinHandle<()>> {
        let completed = Arc::new(AtomicUsize::new(0));

        (0..self.size)
            .map(|id| {
                let worker = Worker {
                    id,
                    jobs: jobs.clone(),
                    results: results.clone(),
                    optimizers: self.optimizers.clone(),
                    layout: self.layout.clone(),
                    dry_run: self.dry_run,
                    events: events.clone(),
                    completed: Arc::clone(&completed),
                };
                thread::spawn(move || worker.run())
            })
            .collect()
    }
}

struct Worker {
    id: usize,
    jobs: Receiver<Job>,
    results: Sender<FileRecord>,
    optimizers: OptimizerSet,
    layout: OutputLayout,
    dry_run: bool,
    events: EventSender,
    completed: Arc<AtomicUsize>,
}

impl Worker {
    fn run(self) {
        debug!(worker = self.id, "worker started");

        for job in self.jobs.iter() {
            let record = self.process(job);

            let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
            self.events
                .send(Event::Optimize(OptimizeEvent::Processed(OptimizeProgress {
                    completed,
                    current_path: record.path.clone(),
                    success: record.success,
                    bytes_saved: record.bytes_saved,
                })));

            if self.results.send(record).is_err() {
                warn!(worker = self.id, "result queue disconnected; stopping");
                break;
            }
        }

        debug!(worker = self.id, "worker finished");
    }

    fn process(&self, job: Job) -> FileRecord {
        let input_size = fs::metadata(&job.path).map(|m| m.len()).unwrap_or(0);
        let output_dir = self.layout.output_dir_for(&job.path);
        let outcome = self.optimize(&job, &output_dir);

        if let Err(e) = &outcome {
            warn!(path = %job.path.display(), error = %e, "failed to optimize");
        }

        FileRecord::from_outcome(job, input_size, outcome)
    }

    fn optimize(&self, job: &Job, output_dir: &Path) -> Result<Optimized, ProcessError> {
        if !self.dry_run {
            fs::create_dir_all(output_dir).map_err(|source| ProcessError::CreateDir {
                path: output_dir.to_path_buf(),
                source,
            })?;
        }

        self.optimizers
            .for_kind(job.kind())
            .optimize(&job.path, output_dir, self.dry_run)
    }
}
