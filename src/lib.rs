//! pemcrypt - In-place RSA encryption of files and directory trees
//!
//! This library rewrites file contents under an RSA-OAEP public key and
//! restores them with the matching private key. Filenames and directory
//! structure are left as they are.

pub mod config;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod orchestrator;

pub use config::Config;
pub use error::{Error, Result};
pub use orchestrator::run;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crypto::{PrivateKeyHandle, PublicKeyHandle};
    pub use crate::error::{Error, Result};
    pub use crate::fs::{Direction, RunOptions, RunReport, Transform};
    pub use crate::orchestrator::run;
}
