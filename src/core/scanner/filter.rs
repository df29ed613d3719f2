//! Traversal filters: ignore patterns, depth limit and minimum size.

use std::path::Path;

/// Filters applied while walking the input tree.
///
/// Immutable for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalFilters {
    /// Entries whose full path contains, or whose name starts with, any of
    /// these patterns are skipped together with their subtree
    pub ignore_patterns: Vec<String>,
    /// Maximum directory depth (0 = unlimited, 1 = root files only)
    pub max_depth: usize,
    /// Minimum file size in bytes (0 = no minimum)
    pub min_size: u64,
}

impl TraversalFilters {
    /// Check whether an entry matches one of the ignore patterns
    pub fn is_ignored(&self, path: &Path) -> bool {
        if self.ignore_patterns.is_empty() {
            return false;
        }

        let full = path.to_string_lossy();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        self.ignore_patterns
            .iter()
            .any(|pattern| full.contains(pattern.as_str()) || name.starts_with(pattern.as_str()))
    }

    /// Check whether a file is too small to be worth processing
    pub fn is_too_small(&self, size: u64) -> bool {
        self.min_size > 0 && size < self.min_size
    }

    /// The depth limit in walkdir terms (root = 0, its children = 1)
    pub fn walk_depth(&self) -> Option<usize> {
        match self.max_depth {
            0 => None,
            depth => Some(depth),
        }
    }
}

/// Split a comma-delimited pattern list, trimming each entry.
///
/// Empty entries are dropped: an empty pattern would match every path.
pub fn parse_ignore_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a human-readable size such as `512`, `10kb`, `1.5mb` or `2GB`.
///
/// Units are binary (1 KB = 1024 bytes); fractional results round down.
pub fn parse_size(raw: &str) -> Result<u64, String> {
    let lower = raw.trim().to_ascii_lowercase();
    let (number, multiplier) = [("gb", 1u64 << 30), ("mb", 1 << 20), ("kb", 1 << 10), ("b", 1)]
        .iter()
        .find_map(|(suffix, mult)| lower.strip_suffix(suffix).map(|n| (n.trim(), *mult)))
        .unwrap_or((lower.as_str(), 1));

    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid size: {raw}"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("invalid size: {raw}"));
    }

    Ok((value * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(patterns: &str) -> TraversalFilters {
        TraversalFilters {
            ignore_patterns: parse_ignore_patterns(patterns),
            ..Default::default()
        }
    }

    #[test]
    fn parse_trims_and_drops_empty_entries() {
        assert_eq!(
            parse_ignore_patterns(" node_modules, dist ,,.git "),
            vec!["node_modules", "dist", ".git"]
        );
        assert!(parse_ignore_patterns("").is_empty());
        assert!(parse_ignore_patterns(" , ").is_empty());
    }

    #[test]
    fn ignores_by_path_substring() {
        let f = filters("node_modules");
        assert!(f.is_ignored(Path::new("/site/a/node_modules/x.png")));
        assert!(f.is_ignored(Path::new("/site/a/node_modules")));
        assert!(!f.is_ignored(Path::new("/site/a/modules/x.png")));
    }

    #[test]
    fn ignores_by_name_prefix() {
        let f = filters(".");
        assert!(f.is_ignored(Path::new("/site/.cache")));
        assert!(f.is_ignored(Path::new("/site/.hidden.png")));

        let f = filters("draft");
        assert!(f.is_ignored(Path::new("/site/draft-logo.svg")));
        assert!(!f.is_ignored(Path::new("/site/logo.svg")));
    }

    #[test]
    fn no_patterns_ignores_nothing() {
        let f = TraversalFilters::default();
        assert!(!f.is_ignored(Path::new("/anything/at/all.png")));
    }

    #[test]
    fn min_size_zero_keeps_everything() {
        let f = TraversalFilters::default();
        assert!(!f.is_too_small(0));

        let f = TraversalFilters {
            min_size: 10,
            ..Default::default()
        };
        assert!(f.is_too_small(5));
        assert!(!f.is_too_small(10));
        assert!(!f.is_too_small(15));
    }

    #[test]
    fn zero_depth_is_unlimited() {
        assert_eq!(TraversalFilters::default().walk_depth(), None);
        let f = TraversalFilters {
            max_depth: 2,
            ..Default::default()
        };
        assert_eq!(f.walk_depth(), Some(2));
    }

    #[test]
    fn parse_size_units() {
        assert_eq!(parse_size("0"), Ok(0));
        assert_eq!(parse_size("512"), Ok(512));
        assert_eq!(parse_size("512b"), Ok(512));
        assert_eq!(parse_size("10kb"), Ok(10 * 1024));
        assert_eq!(parse_size("10 KB"), Ok(10 * 1024));
        assert_eq!(parse_size("1.5mb"), Ok(1_572_864));
        assert_eq!(parse_size("2GB"), Ok(2 * 1024 * 1024 * 1024));
    }

    #[test]
    fn parse_size_rejects_garbage() {
        assert!(parse_size("").is_err());
        assert!(parse_size("ten kb").is_err());
        assert!(parse_size("-5kb").is_err());
        assert!(parse_size("5tb").is_err());
    }
}
