//! Single-file transformation
//!
//! A file is read whole, run through the codec, and replaced through a
//! hidden sibling temp file that is synced and renamed over the original.
//! Until the rename the original is never opened for writing, so any
//! failure leaves it byte-for-byte intact.

use crate::crypto::{decode_with, encode, is_encoded};
use crate::error::{Error, Result};
use crate::fs::backoff::{retry, ExponentialBackoff};
use crate::fs::{Direction, FileOutcome, RunOptions, SkipReason, Transform};
use std::fs::{self, OpenOptions, Permissions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Applies one [`Transform`] to individual files
pub struct FileTransformer<'a> {
    transform: Transform<'a>,
    options: &'a RunOptions,
}

impl<'a> FileTransformer<'a> {
    /// Create a transformer for the given direction and key
    pub fn new(transform: Transform<'a>, options: &'a RunOptions) -> Self {
        FileTransformer { transform, options }
    }

    /// Transform the regular file at `path` in place
    pub fn transform_file(&self, path: &Path) -> Result<FileOutcome> {
        let verb = match (self.transform.direction(), self.options.dry_run) {
            (Direction::Encrypt, false) => "Encrypting",
            (Direction::Decrypt, false) => "Decrypting",
            (Direction::Encrypt, true) => "Would encrypt",
            (Direction::Decrypt, true) => "Would decrypt",
        };
        info!("{} {}", verb, path.display());

        let contents = Zeroizing::new(retry("Read", self.backoff(), || {
            fs::read(path).map_err(Error::from)
        })?);

        let output = match self.transform {
            Transform::Encrypt(key) => {
                if is_encoded(&contents, key.modulus_bytes()) {
                    debug!("Skipping {}: already encrypted", path.display());
                    return Ok(FileOutcome::Skipped(SkipReason::AlreadyEncrypted));
                }
                Zeroizing::new(encode(&contents, key)?)
            }
            Transform::Decrypt(key) => decode_with(&contents, key, &self.options.codec)?,
        };

        if !self.options.dry_run {
            let permissions = fs::metadata(path)?.permissions();
            retry("Write", self.backoff(), || {
                replace_contents(path, &output, &permissions)
            })?;
        }

        Ok(FileOutcome::Transformed {
            bytes_in: contents.len(),
            bytes_out: output.len(),
        })
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.options.retry_base_delay_ms, self.options.retry_attempts)
    }
}

/// Atomically replace the contents of `path` with `data`
fn replace_contents(path: &Path, data: &[u8], permissions: &Permissions) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| Error::NotRegularFile(path.display().to_string()))?;
    let temp_path = parent.join(format!(
        ".{}.{}.tmp",
        name.to_string_lossy(),
        Uuid::new_v4().simple()
    ));

    let result = write_synced(&temp_path, data, permissions)
        .and_then(|()| fs::rename(&temp_path, path).map_err(Error::from));
    if result.is_err() {
        // Best effort: the original is untouched, only the temp file may linger
        let _ = fs::remove_file(&temp_path);
        return result;
    }

    sync_dir(parent);
    Ok(())
}

fn write_synced(path: &Path, data: &[u8], permissions: &Permissions) -> Result<()> {
    let mut file = create_temp(path)?;
    file.write_all(data)?;
    file.set_permissions(permissions.clone())?;
    file.sync_all()?;
    Ok(())
}

/// Create the temp file readable by the owner only, whatever the umask
#[cfg(unix)]
fn create_temp(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_temp(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// Persist the rename itself
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
        debug!("Could not sync directory {}: {}", dir.display(), e);
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
