//! SVG minification.

use super::{output_path_for, read_input, write_output, Optimized, Optimizer};
use crate::core::scanner::AssetKind;
use crate::error::ProcessError;
use std::path::Path;
use tracing::debug;

/// Strips XML comments and indentation from SVG files
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgMinifier;

impl SvgMinifier {
    pub fn new() -> Self {
        Self
    }
}

impl Optimizer for SvgMinifier {
    fn kind(&self) -> AssetKind {
        AssetKind::Vector
    }

    fn optimize(
        &self,
        path: &Path,
        output_dir: &Path,
        dry_run: bool,
    ) -> Result<Optimized, ProcessError> {
        let original = read_input(path)?;
        let text = String::from_utf8(original).map_err(|e| ProcessError::Decode {
            path: path.to_path_buf(),
            reason: format!("SVG is not valid UTF-8: {}", e),
        })?;

        let minified = minify_svg(&text);
        let output_path = output_path_for(path, output_dir)?;

        if !dry_run {
            write_output(&output_path, minified.as_bytes())?;
        }

        debug!(
            path = %path.display(),
            before = text.len(),
            after = minified.len(),
            "minified svg"
        );

        Ok(Optimized {
            original_size: text.len() as u64,
            processed_size: minified.len() as u64,
            output_path,
            webp_path: None,
        })
    }
}

/// Remove `<!-- -->` comments, trim every line and drop blank lines.
///
/// An unterminated comment is left in place along with everything after it.
pub fn minify_svg(content: &str) -> String {
    let mut stripped = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("<!--") {
        match rest[start..].find("-->") {
            Some(end) => {
                stripped.push_str(&rest[..start]);
                rest = &rest[start + end + 3..];
            }
            None => break,
        }
    }
    stripped.push_str(rest);

    stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
