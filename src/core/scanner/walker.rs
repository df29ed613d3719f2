//! Directory walking implementation using walkdir.

use super::{filter::TraversalFilters, AssetFormat, Job};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use crossbeam_channel::Sender;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Producer side of the pipeline: walks the input tree and queues a [`Job`]
/// for every eligible file.
#[derive(Debug, Clone)]
pub struct Traverser {
    root: PathBuf,
    filters: TraversalFilters,
    excluded: Option<PathBuf>,
}

impl Traverser {
    /// Create a traverser rooted at `root`
    pub fn new(root: impl Into<PathBuf>, filters: TraversalFilters) -> Self {
        Self {
            root: root.into(),
            filters,
            excluded: None,
        }
    }

    /// Skip the subtree at `path`, spelled as the walk would reach it
    /// (i.e. `root` joined with a relative path).
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded = Some(path.into());
        self
    }

    fn is_pruned(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        self.filters.is_ignored(entry.path())
            || self.excluded.as_deref() == Some(entry.path())
    }

    /// Walk the tree depth-first, sending one job per eligible file.
    ///
    /// Blocks whenever `jobs` is full. The sender is dropped on return, so
    /// once this was the last sender the job queue is closed. Returns the
    /// number of jobs sent. Any unreadable directory aborts the walk.
    ///
    /// Symlinked directories are not entered; symlinks to regular files are
    /// processed like the files themselves.
    pub fn traverse(&self, jobs: Sender<Job>, events: &EventSender) -> Result<usize, ScanError> {
        if !self.root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: self.root.clone(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: self.root.clone(),
        }));

        let mut walker = WalkDir::new(&self.root).follow_links(false);
        if let Some(depth) = self.filters.walk_depth() {
            walker = walker.max_depth(depth);
        }

        let mut emitted = 0;

        // Pruned directories are never read.
        let entries = walker.into_iter().filter_entry(|entry| !self.is_pruned(entry));

        for entry_result in entries {
            let entry = entry_result.map_err(|e| scan_error(e, &self.root))?;

            let file_type = entry.file_type();
            let is_file =
                file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }

            let path = entry.path();

            if self.filters.min_size > 0 {
                match fs::metadata(path) {
                    Ok(metadata) if self.filters.is_too_small(metadata.len()) => {
                        debug!(path = %path.display(), size = metadata.len(), "below minimum size");
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "could not read file metadata; skipping");
                        continue;
                    }
                }
            }

            let Some(format) = AssetFormat::from_path(path) else {
                continue;
            };

            let job = Job::new(entry.into_path(), format);

            events.send(Event::Scan(ScanEvent::AssetFound {
                path: job.path.clone(),
                kind: job.kind(),
            }));

            if jobs.send(job).is_err() {
                debug!("job queue disconnected; stopping traversal");
                break;
            }
            emitted += 1;
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_assets: emitted,
        }));

        Ok(emitted)
    }
}

fn scan_error(err: walkdir::Error, root: &Path) -> ScanError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());

    if err.io_error().map(|e| e.kind()) == Some(io::ErrorKind::PermissionDenied) {
        return ScanError::PermissionDenied { path };
    }

    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));

    ScanError::ReadDirectory { path, source }
}
