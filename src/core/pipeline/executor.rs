//! Pipeline execution implementation.

use super::pool::{OutputLayout, WorkerPool};
use super::stats::{FileRecord, RunStatistics};
use crate::core::optimizer::{ImageSettings, OptimizerSet};
use crate::core::scanner::{parse_ignore_patterns, Job, TraversalFilters, Traverser};
use crate::error::{OptimizerError, Result};
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelineSummary};
use crossbeam_channel::bounded;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

/// Capacity of the job and result queues
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// One worker per available core, or one when that cannot be determined
pub fn default_concurrency() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Configuration for one run; immutable once the pipeline is built
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory to scan
    pub input: PathBuf,
    /// Directory outputs are written under
    pub output: PathBuf,
    /// Traversal filters
    pub filters: TraversalFilters,
    /// Number of worker threads
    pub concurrency: usize,
    /// Compute savings without writing anything
    pub dry_run: bool,
    /// Bound of the job and result queues
    pub queue_capacity: usize,
    /// Settings for the image optimizer
    pub image: ImageSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: PathBuf::from("photon-output"),
            filters: TraversalFilters::default(),
            concurrency: default_concurrency(),
            dry_run: false,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            image: ImageSettings::default(),
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    optimizers: Option<OptimizerSet>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            optimizers: None,
        }
    }

    /// Set the directory to scan
    pub fn input(mut self, input: impl Into<PathBuf>) -> Self {
        self.config.input = input.into();
        self
    }

    /// Set the output directory
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.config.output = output.into();
        self
    }

    /// Replace all traversal filters at once
    pub fn filters(mut self, filters: TraversalFilters) -> Self {
        self.config.filters = filters;
        self
    }

    /// Set ignore patterns from a comma-separated list
    pub fn ignore_patterns(mut self, patterns: &str) -> Self {
        self.config.filters.ignore_patterns = parse_ignore_patterns(patterns);
        self
    }

    /// Set the maximum traversal depth (0 = unlimited)
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.filters.max_depth = depth;
        self
    }

    /// Set the minimum file size in bytes (0 = no minimum)
    pub fn min_size(mut self, bytes: u64) -> Self {
        self.config.filters.min_size = bytes;
        self
    }

    /// Set the number of worker threads
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.config.concurrency = workers;
        self
    }

    /// Enable or disable dry-run mode
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Set the job and result queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set image optimizer settings
    pub fn image_settings(mut self, settings: ImageSettings) -> Self {
        self.config.image = settings;
        self
    }

    /// Use custom optimizers instead of the built-in ones
    pub fn optimizers(mut self, optimizers: OptimizerSet) -> Self {
        self.optimizers = Some(optimizers);
        self
    }

    /// Validate the configuration and build the pipeline
    pub fn build(self) -> Result<Pipeline> {
        if self.config.concurrency == 0 {
            return Err(OptimizerError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.config.queue_capacity == 0 {
            return Err(OptimizerError::Config(
                "queue capacity must be at least 1".to_string(),
            ));
        }

        let optimizers = self
            .optimizers
            .unwrap_or_else(|| OptimizerSet::standard(self.config.image));

        Ok(Pipeline {
            config: self.config,
            optimizers,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The traversal → workers → aggregation pipeline
pub struct Pipeline {
    config: PipelineConfig,
    optimizers: OptimizerSet,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<RunStatistics> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting.
    ///
    /// Shutdown order: traversal finishes and drops the job sender; workers
    /// drain the job queue and exit; the supervisor joins them and drops the
    /// last result sender; the drain loop below then ends.
    pub fn run_with_events(&self, events: &EventSender) -> Result<RunStatistics> {
        let start_time = Instant::now();
        let config = &self.config;

        events.send(Event::Pipeline(PipelineEvent::Started));
        info!(
            input = %config.input.display(),
            output = %config.output.display(),
            workers = config.concurrency,
            dry_run = config.dry_run,
            "starting pipeline"
        );

        let (job_tx, job_rx) = bounded::<Job>(config.queue_capacity);
        let (result_tx, result_rx) = bounded::<FileRecord>(config.queue_capacity);

        let pool = WorkerPool::new(
            config.concurrency,
            self.optimizers.clone(),
            OutputLayout::new(&config.input, &config.output),
            config.dry_run,
        );
        let workers = pool.start(&job_rx, &result_tx, events);
        drop(job_rx);

        let mut traverser = Traverser::new(&config.input, config.filters.clone());
        if let Some(nested) = nested_output_dir(&config.input, &config.output) {
            debug!(path = %nested.display(), "output directory is inside the input; skipping it");
            traverser = traverser.exclude(nested);
        }
        let scan_events = events.clone();
        let traversal = thread::spawn(move || traverser.traverse(job_tx, &scan_events));

        let supervisor = thread::spawn(move || {
            let panicked = workers
                .into_iter()
                .map(|handle| handle.join())
                .filter(|joined| joined.is_err())
                .count();
            drop(result_tx);
            panicked
        });

        let mut stats = RunStatistics::new();
        for record in result_rx.iter() {
            stats.record(record);
        }

        let traversal_result = traversal
            .join()
            .map_err(|_| OptimizerError::TraversalPanicked)?;
        let panicked = supervisor
            .join()
            .map_err(|_| OptimizerError::WorkerPanicked {
                count: config.concurrency,
            })?;

        let discovered = traversal_result?;
        if panicked > 0 {
            return Err(OptimizerError::WorkerPanicked { count: panicked });
        }
        debug!(discovered, processed = stats.total_files(), "pipeline drained");

        let duration_ms = start_time.elapsed().as_millis() as u64;
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_files: stats.total_files(),
                successful_files: stats.successful,
                failed_files: stats.failed,
                total_bytes_saved: stats.total_bytes_saved,
                duration_ms,
            },
        }));
        info!(
            files = stats.total_files(),
            failed = stats.failed,
            saved = stats.total_bytes_saved,
            duration_ms,
            "pipeline finished"
        );

        Ok(stats)
    }
}

/// The output directory as the traversal would reach it, when it lies
/// strictly inside `input`
fn nested_output_dir(input: &Path, output: &Path) -> Option<PathBuf> {
    let input_abs = resolve(input)?;
    let output_abs = resolve(output)?;
    let relative = output_abs.strip_prefix(&input_abs).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(input.join(relative))
}

/// Canonical form of `path`, which need not exist yet: the deepest existing
/// ancestor is canonicalized and the missing components appended
fn resolve(path: &Path) -> Option<PathBuf> {
    let mut missing = Vec::new();
    let mut existing = path;
    loop {
        let candidate = if existing.as_os_str().is_empty() {
            Path::new(".")
        } else {
            existing
        };
        if let Ok(canonical) = candidate.canonicalize() {
            return Some(missing.iter().rev().fold(canonical, |acc, part| acc.join(part)));
        }
        missing.push(existing.file_name()?.to_os_string());
        existing = existing.parent()?;
    }
}

/// Check that `input` exists and is a directory
pub fn validate_input_dir(input: &Path) -> Result<()> {
    if !input.exists() {
        return Err(OptimizerError::Config(format!(
            "input directory does not exist: {}",
            input.display()
        )));
    }
    if !input.is_dir() {
        return Err(OptimizerError::Config(format!(
            "input must be a directory: {}",
            input.display()
        )));
    }
    Ok(())
}
