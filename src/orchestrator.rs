//! Top-level entry point
//!
//! Resolves the target path and hands it to the file transformer or the
//! tree walker. Only missing or unsupported targets fail the whole run;
//! everything per-file lands in the returned [`RunReport`].

use crate::error::{Error, Result};
use crate::fs::{FileOutcome, FileTransformer, RunOptions, RunReport, Transform, TreeWalker};
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Encrypt or decrypt `path`, a single file or a whole directory tree
pub fn run(path: &Path, transform: Transform<'_>, options: &RunOptions) -> Result<RunReport> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::PathNotFound(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let transformer = FileTransformer::new(transform, options);
    let mut report = RunReport::default();
    let file_type = metadata.file_type();

    if file_type.is_file() {
        match transformer.transform_file(path) {
            Ok(FileOutcome::Transformed { .. }) => report.record_transformed(path.to_path_buf()),
            Ok(FileOutcome::Skipped(reason)) => {
                info!("Skipped {}: {}", path.display(), reason);
                report.record_skip(path.to_path_buf(), reason);
            }
            Err(e) => {
                warn!("Failed on {}: {}", path.display(), e);
                report.record_failure(path.to_path_buf(), e);
            }
        }
    } else if file_type.is_dir() {
        TreeWalker::new(&transformer).transform_tree(path, &mut report);
    } else {
        return Err(Error::NotRegularFile(path.display().to_string()));
    }

    info!(
        "{} finished: {} transformed, {} skipped, {} failed",
        transform.direction(),
        report.transformed.len(),
        report.skipped.len(),
        report.failed.len()
    );

    Ok(report)
}
