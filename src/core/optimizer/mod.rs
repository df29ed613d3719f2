//! # Optimizer Module
//!
//! Per-file transformations invoked by the worker pool.
//!
//! ## Optimizers
//! - [`ImageOptimizer`] - JPEG re-encoding, PNG palette quantization,
//!   optional resize and lossless WebP copies
//! - [`SvgMinifier`] - strips comments and indentation from SVG files
//!
//! ## Performance Optimizations
//! - Uses `zune-jpeg` for 1.5-2x faster JPEG decoding
//! - Uses `fast_image_resize` for SIMD-accelerated resizing

pub mod fast_decode;
pub mod fast_resize;
mod raster;
pub mod quantize;
mod svg;

pub use raster::{ImageOptimizer, ImageSettings};
pub use svg::{minify_svg, SvgMinifier};

use crate::core::scanner::AssetKind;
use crate::error::ProcessError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of optimizing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimized {
    /// Size of the input file in bytes
    pub original_size: u64,
    /// Size of the optimized output in bytes
    pub processed_size: u64,
    /// Where the output was (or, in a dry run, would have been) written
    pub output_path: PathBuf,
    /// Lossless WebP sibling, when requested
    pub webp_path: Option<PathBuf>,
}

impl Optimized {
    /// Bytes saved; negative when the output is larger than the input
    pub fn bytes_saved(&self) -> i64 {
        self.original_size as i64 - self.processed_size as i64
    }
}

/// Trait for per-file optimizers
///
/// Implementations must be safe to call from many worker threads at once.
pub trait Optimizer: Send + Sync {
    /// The asset category this optimizer handles
    fn kind(&self) -> AssetKind;

    /// Optimize `path`, writing the result into `output_dir` unless `dry_run`.
    ///
    /// `output_dir` must already exist when `dry_run` is false.
    fn optimize(&self, path: &Path, output_dir: &Path, dry_run: bool)
        -> Result<Optimized, ProcessError>;
}

/// The optimizers a worker pool dispatches to, one per asset kind
#[derive(Clone)]
pub struct OptimizerSet {
    image: Arc<dyn Optimizer>,
    vector: Arc<dyn Optimizer>,
}

impl OptimizerSet {
    pub fn new(image: Arc<dyn Optimizer>, vector: Arc<dyn Optimizer>) -> Self {
        Self { image, vector }
    }

    /// The built-in image optimizer and SVG minifier
    pub fn standard(settings: ImageSettings) -> Self {
        Self::new(
            Arc::new(ImageOptimizer::new(settings)),
            Arc::new(SvgMinifier::new()),
        )
    }

    /// Select the optimizer responsible for `kind`
    pub fn for_kind(&self, kind: AssetKind) -> &dyn Optimizer {
        match kind {
            AssetKind::Image => self.image.as_ref(),
            AssetKind::Vector => self.vector.as_ref(),
        }
    }
}

/// Name of the output file for `input` inside `output_dir`
pub(crate) fn output_path_for(input: &Path, output_dir: &Path) -> Result<PathBuf, ProcessError> {
    let file_name = input
        .file_name()
        .ok_or_else(|| ProcessError::UnsupportedFormat {
            path: input.to_path_buf(),
        })?;
    Ok(output_dir.join(file_name))
}

pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>, ProcessError> {
    fs::read(path).map_err(|source| ProcessError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_output(path: &Path, bytes: &[u8]) -> Result<(), ProcessError> {
    fs::write(path, bytes).map_err(|source| ProcessError::Write {
        path: path.to_path_buf(),
        source,
    })
}
