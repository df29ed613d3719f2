//! # Photon Optimizer
//!
//! A high-concurrency asset optimizer: walks a directory tree, compresses
//! JPEG and PNG images, minifies SVG files and reports how many bytes were
//! saved.
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Traversal, worker pool, optimizers, statistics and reports
//! - `events` - Event-driven progress reporting
//! - `error` - Error types (fatal run errors vs per-file failures)
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OptimizerError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG` wins
/// when set; otherwise only warnings are shown, or debug output for this
/// crate when `verbose` is true. Calling it twice is harmless.
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "warn,photon_optimizer=debug"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
