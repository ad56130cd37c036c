//! File and directory transformation
//!
//! Everything that touches the filesystem lives here: the per-file
//! transformer with its atomic replace, the tree walker, and the retry
//! policy for transient I/O errors.

mod backoff;
mod transformer;
mod walker;

pub use backoff::{retry, ExponentialBackoff};
pub use transformer::FileTransformer;
pub use walker::TreeWalker;

use crate::crypto::{CodecOptions, PrivateKeyHandle, PublicKeyHandle};
use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;

/// Default number of retries for transient I/O errors
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default first retry delay (ms)
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 50;

/// Requested direction of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl Direction {
    /// Resolve the `--encrypt`/`--decrypt` flag pair; exactly one must be set
    pub fn from_flags(encrypt: bool, decrypt: bool) -> Result<Self> {
        match (encrypt, decrypt) {
            (true, false) => Ok(Direction::Encrypt),
            (false, true) => Ok(Direction::Decrypt),
            (true, true) => Err(Error::Config(
                "Specify only one of --encrypt or --decrypt".to_string(),
            )),
            (false, false) => Err(Error::Config(
                "Specify whether to --encrypt or --decrypt".to_string(),
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Encrypt => write!(f, "encrypt"),
            Direction::Decrypt => write!(f, "decrypt"),
        }
    }
}

/// A direction paired with the only key type valid for it
#[derive(Debug, Clone, Copy)]
pub enum Transform<'k> {
    Encrypt(&'k PublicKeyHandle),
    Decrypt(&'k PrivateKeyHandle),
}

impl Transform<'_> {
    pub fn direction(&self) -> Direction {
        match self {
            Transform::Encrypt(_) => Direction::Encrypt,
            Transform::Decrypt(_) => Direction::Decrypt,
        }
    }
}

/// Knobs for a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Read and transform, but never write
    pub dry_run: bool,
    /// Retries for transient I/O errors
    pub retry_attempts: u32,
    /// First retry delay (ms), doubled per attempt
    pub retry_base_delay_ms: u64,
    /// Codec acceptance options
    pub codec: CodecOptions,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            dry_run: false,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            codec: CodecOptions::default(),
        }
    }
}

/// Why an entry was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// File already carries the encrypted-file header
    AlreadyEncrypted,
    /// Symbolic link (never followed)
    Symlink,
    /// Socket, FIFO, device node, ...
    SpecialFile,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyEncrypted => write!(f, "already encrypted"),
            SkipReason::Symlink => write!(f, "symbolic link"),
            SkipReason::SpecialFile => write!(f, "special file"),
        }
    }
}

/// Result of transforming one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Transformed { bytes_in: usize, bytes_out: usize },
    Skipped(SkipReason),
}

/// Summary of a run
#[derive(Debug, Default)]
pub struct RunReport {
    pub transformed: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub failed: Vec<(PathBuf, Error)>,
}

impl RunReport {
    pub fn record_transformed(&mut self, path: PathBuf) {
        self.transformed.push(path);
    }

    pub fn record_skip(&mut self, path: PathBuf, reason: SkipReason) {
        self.skipped.push((path, reason));
    }

    pub fn record_failure(&mut self, path: PathBuf, error: Error) {
        self.failed.push((path, error));
    }

    /// True when no entry failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_flags() {
        assert_eq!(Direction::from_flags(true, false).unwrap(), Direction::Encrypt);
        assert_eq!(Direction::from_flags(false, true).unwrap(), Direction::Decrypt);
        assert!(matches!(Direction::from_flags(true, true), Err(Error::Config(_))));
        assert!(matches!(Direction::from_flags(false, false), Err(Error::Config(_))));
    }

    #[test]
    fn test_report_success() {
        let mut report = RunReport::default();
        report.record_transformed(PathBuf::from("a"));
        report.record_skip(PathBuf::from("b"), SkipReason::Symlink);
        assert!(report.is_success());

        report.record_failure(PathBuf::from("c"), Error::NotEncrypted);
        assert!(!report.is_success());
    }
}
