//! # Pipeline Module
//!
//! Orchestrates a run: discovery, parallel optimization and aggregation.
//!
//! ## Threads
//! 1. **Traversal** - one thread walks the input tree and queues jobs
//! 2. **Workers** - a fixed pool optimizes jobs and queues records
//! 3. **Supervisor** - joins the workers, then closes the result queue
//! 4. **Caller** - drains records into [`RunStatistics`]
//!
//! ## Backpressure
//! Both queues are bounded crossbeam channels, so a fast traversal cannot
//! outrun the workers and fast workers cannot outrun the aggregator.

mod executor;
mod pool;
mod stats;

pub use executor::{
    default_concurrency, validate_input_dir, Pipeline, PipelineBuilder, PipelineConfig,
    DEFAULT_QUEUE_CAPACITY,
};
pub use pool::{OutputLayout, WorkerPool};
pub use stats::{FileRecord, RunStatistics};
