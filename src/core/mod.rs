//! # Core Module
//!
//! The UI-agnostic optimization engine.
//!
//! ## Modules
//! - `scanner` - Classifies files and walks the input tree
//! - `optimizer` - Per-format transformations (JPEG, PNG, SVG)
//! - `pipeline` - Worker pool, coordinator and statistics
//! - `reporter` - JSON run reports

pub mod optimizer;
pub mod pipeline;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use optimizer::{ImageSettings, Optimized, Optimizer, OptimizerSet};
pub use pipeline::{FileRecord, Pipeline, PipelineBuilder, RunStatistics};
pub use reporter::{ReportContext, RunReport};
pub use scanner::{classify, AssetFormat, AssetKind, Job, TraversalFilters};
