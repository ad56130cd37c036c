//! Error types for pemcrypt

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pemcrypt
#[derive(Error, Debug)]
pub enum Error {
    // Path errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a regular file or directory: {0}")]
    NotRegularFile(String),

    // Codec errors
    #[error("Payload too large: {size} bytes exceeds key capacity of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Malformed transport encoding: {0}")]
    Decode(String),

    #[error("Ciphertext does not match the private key or is corrupted")]
    CipherMismatch,

    #[error("File is not in the encrypted format")]
    NotEncrypted,

    #[error("Unsupported format version: {0:#04x}")]
    UnsupportedVersion(u8),

    #[error("Encryption error: {0}")]
    Encryption(String),

    // Key errors
    #[error("Key error: {0}")]
    Key(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether retrying the failed operation may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    /// Whether the error stops a run before any file is modified
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::PathNotFound(_)
                | Error::NotRegularFile(_)
                | Error::Key(_)
                | Error::Config(_)
                | Error::InvalidConfig(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
