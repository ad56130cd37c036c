//! Directory tree traversal
//!
//! Depth-first over an explicit stack of pending directories, so tree depth
//! is bounded by heap rather than call stack. Each directory is listed once,
//! when it is popped, and the listing is collected before any entry is
//! processed. Symlinks are never followed.

use crate::fs::transformer::FileTransformer;
use crate::fs::{FileOutcome, RunReport, SkipReason};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Kind of a directory entry, without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    File,
    Dir,
    Symlink,
    Special,
}

impl From<fs::FileType> for EntryKind {
    fn from(ft: fs::FileType) -> Self {
        if ft.is_symlink() {
            EntryKind::Symlink
        } else if ft.is_dir() {
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else {
            EntryKind::Special
        }
    }
}

/// Walks a directory tree, feeding every regular file to a [`FileTransformer`]
pub struct TreeWalker<'a> {
    transformer: &'a FileTransformer<'a>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(transformer: &'a FileTransformer<'a>) -> Self {
        TreeWalker { transformer }
    }

    /// Transform every regular file below `root`, recording results in `report`
    pub fn transform_tree(&self, root: &Path, report: &mut RunReport) {
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let listing = match list_dir(&dir) {
                Ok(listing) => listing,
                Err(e) => {
                    warn!("Cannot list {}: {}", dir.display(), e);
                    report.record_failure(dir, e.into());
                    continue;
                }
            };

            for (path, e) in listing.errors {
                warn!("Cannot read entry {}: {}", path.display(), e);
                report.record_failure(path, e.into());
            }

            let mut subdirs = Vec::new();
            for (path, kind) in listing.entries {
                match kind {
                    EntryKind::File => self.visit_file(path, report),
                    EntryKind::Dir => subdirs.push(path),
                    EntryKind::Symlink => {
                        debug!("Skipping symlink {}", path.display());
                        report.record_skip(path, SkipReason::Symlink);
                    }
                    EntryKind::Special => {
                        debug!("Skipping special file {}", path.display());
                        report.record_skip(path, SkipReason::SpecialFile);
                    }
                }
            }

            // Reversed so the first subdirectory in name order is visited next
            pending.extend(subdirs.into_iter().rev());
        }
    }

    fn visit_file(&self, path: PathBuf, report: &mut RunReport) {
        match self.transformer.transform_file(&path) {
            Ok(FileOutcome::Transformed { .. }) => report.record_transformed(path),
            Ok(FileOutcome::Skipped(reason)) => report.record_skip(path, reason),
            Err(e) => {
                warn!("Failed on {}: {}", path.display(), e);
                report.record_failure(path, e);
            }
        }
    }
}

/// Snapshot of one directory: readable entries sorted by name, plus the
/// entries that could not be read
#[derive(Debug, Default)]
struct Listing {
    entries: Vec<(PathBuf, EntryKind)>,
    errors: Vec<(PathBuf, io::Error)>,
}

fn list_dir(dir: &Path) -> io::Result<Listing> {
    let items = fs::read_dir(dir)?.map(|entry| {
        entry.map(|entry| {
            let kind = entry.file_type().map(EntryKind::from);
            (entry.path(), kind)
        })
    });
    Ok(collect_listing(dir, items))
}

/// An unreadable entry is charged to `dir`; an entry whose type cannot be
/// read is charged to its own path
fn collect_listing<I>(dir: &Path, items: I) -> Listing
where
    I: IntoIterator<Item = io::Result<(PathBuf, io::Result<EntryKind>)>>,
{
    let mut listing = Listing::default();
    for item in items {
        match item {
            Ok((path, Ok(kind))) => listing.entries.push((path, kind)),
            Ok((path, Err(e))) => listing.errors.push((path, e)),
            Err(e) => listing.errors.push((dir.to_path_buf(), e)),
        }
    }
    listing.entries.sort_by(|a, b| a.0.cmp(&b.0));
    listing
}
