//! # Scanner Module
//!
//! Discovers optimizable assets in a directory tree and feeds them to the
//! worker pool as [`Job`]s.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg) - image
//! - PNG (.png) - image
//! - SVG (.svg) - vector
//!
//! ## Example
//! ```rust,ignore
//! use photon_optimizer::core::scanner::{Traverser, TraversalFilters};
//!
//! let (tx, rx) = crossbeam_channel::bounded(100);
//! let traverser = Traverser::new("/site/assets", TraversalFilters::default());
//! std::thread::spawn(move || traverser.traverse(tx, &null_sender()));
//! for job in rx { /* ... */ }
//! ```

mod filter;
mod walker;

pub use filter::{parse_ignore_patterns, parse_size, TraversalFilters};
pub use walker::Traverser;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Processing category of an eligible file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Raster images (JPEG, PNG)
    Image,
    /// Vector graphics (SVG)
    Vector,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Image => write!(f, "image"),
            AssetKind::Vector => write!(f, "vector"),
        }
    }
}

/// Concrete file format of an eligible file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFormat {
    Jpeg,
    Png,
    Svg,
}

impl AssetFormat {
    /// Detect format from a file extension, with or without the leading dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(AssetFormat::Jpeg),
            "png" => Some(AssetFormat::Png),
            "svg" => Some(AssetFormat::Svg),
            _ => None,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// The processing category this format belongs to
    pub fn kind(&self) -> AssetKind {
        match self {
            AssetFormat::Jpeg | AssetFormat::Png => AssetKind::Image,
            AssetFormat::Svg => AssetKind::Vector,
        }
    }
}

impl fmt::Display for AssetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetFormat::Jpeg => write!(f, "jpeg"),
            AssetFormat::Png => write!(f, "png"),
            AssetFormat::Svg => write!(f, "svg"),
        }
    }
}

/// Map a file extension to its processing category.
///
/// Returns `None` for files that are not eligible; those are skipped, not
/// reported as errors.
pub fn classify(ext: &str) -> Option<AssetKind> {
    AssetFormat::from_extension(ext).map(|format| format.kind())
}

/// A discovered file awaiting processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Path to the asset
    pub path: PathBuf,
    /// Format detected from the extension
    pub format: AssetFormat,
}

impl Job {
    pub fn new(path: impl Into<PathBuf>, format: AssetFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Which optimizer handles this job
    pub fn kind(&self) -> AssetKind {
        self.format.kind()
    }
}
