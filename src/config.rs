//! Configuration management for pemcrypt

use crate::crypto::CodecOptions;
use crate::error::{Error, Result};
use crate::fs::{RunOptions, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default public key file, relative to the working directory
pub const DEFAULT_PUBLIC_KEY: &str = "public_key.pem";

/// Default private key file, relative to the working directory
pub const DEFAULT_PRIVATE_KEY: &str = "private_key.pem";

/// Highest accepted retry count
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

/// Key file locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyConfig {
    /// PEM public key used for encryption
    pub public_key: PathBuf,

    /// Unencrypted PEM private key used for decryption
    pub private_key: PathBuf,
}

/// File I/O configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IoConfig {
    /// Retry attempts for transient I/O errors
    pub retry_attempts: u32,

    /// Base delay for exponential backoff (ms)
    pub retry_base_delay_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Key file locations
    #[serde(default)]
    pub keys: KeyConfig,

    /// File I/O configuration
    #[serde(default)]
    pub io: IoConfig,

    /// Codec acceptance options
    #[serde(default)]
    pub codec: CodecOptions,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for KeyConfig {
    fn default() -> Self {
        KeyConfig {
            public_key: PathBuf::from(DEFAULT_PUBLIC_KEY),
            private_key: PathBuf::from(DEFAULT_PRIVATE_KEY),
        }
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        IoConfig {
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Default config file location (`~/.config/pemcrypt/config.json`)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pemcrypt")
            .join("config.json")
    }

    /// Load configuration from a file (YAML or JSON), with environment variable
    /// substitution and overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path_ref, e))
        })?;

        let mut config = Self::parse(&content, is_yaml(path_ref))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else the default file if present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(expand_tilde(path)),
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    let mut config = Config::default();
                    config.apply_env_overrides();
                    config.validate()?;
                    Ok(config)
                }
            }
        }
    }

    fn parse(content: &str, yaml: bool) -> Result<Self> {
        let content = Self::substitute_env_vars(content);

        if yaml {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse YAML config: {}", e)))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse JSON config: {}", e)))
        }
    }

    /// Substitute environment variables in config content
    /// Supports ${VAR_NAME} syntax
    fn substitute_env_vars(content: &str) -> String {
        let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex");

        re.replace_all(content, |caps: &regex::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("PEMCRYPT_PUBLIC_KEY") {
            let path = path.trim();
            if !path.is_empty() {
                self.keys.public_key = PathBuf::from(path);
            }
        }

        if let Ok(path) = std::env::var("PEMCRYPT_PRIVATE_KEY") {
            let path = path.trim();
            if !path.is_empty() {
                self.keys.private_key = PathBuf::from(path);
            }
        }

        if let Ok(attempts) = std::env::var("PEMCRYPT_RETRY_ATTEMPTS") {
            if let Ok(n) = attempts.trim().parse::<u32>() {
                self.io.retry_attempts = n;
            }
        }

        if let Ok(level) = std::env::var("PEMCRYPT_LOG_LEVEL") {
            let level = level.trim();
            if !level.is_empty() {
                self.logging.level = level.to_string();
            }
        }
    }

    /// Apply command-line overrides, which take precedence over file and environment
    pub fn apply_cli_overrides(
        &mut self,
        public_key: Option<&Path>,
        private_key: Option<&Path>,
        accept_headerless: bool,
    ) {
        if let Some(path) = public_key {
            self.keys.public_key = path.to_path_buf();
        }
        if let Some(path) = private_key {
            self.keys.private_key = path.to_path_buf();
        }
        if accept_headerless {
            self.codec.accept_headerless = true;
        }
    }

    /// Save configuration to a file (format determined by extension)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        let content = if is_yaml(path_ref) {
            serde_yaml::to_string(self).map_err(|e| {
                Error::Config(format!("Failed to serialize config to YAML: {}", e))
            })?
        } else {
            serde_json::to_string_pretty(self).map_err(|e| {
                Error::Config(format!("Failed to serialize config to JSON: {}", e))
            })?
        };

        std::fs::write(path_ref, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.keys.public_key.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("Public key path is empty".to_string()));
        }

        if self.keys.private_key.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("Private key path is empty".to_string()));
        }

        if self.io.retry_attempts > MAX_RETRY_ATTEMPTS {
            return Err(Error::InvalidConfig(format!(
                "retry_attempts must be at most {}",
                MAX_RETRY_ATTEMPTS
            )));
        }

        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(Error::InvalidConfig(format!(
                    "Unknown log level '{}'",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Options for a run under this configuration
    pub fn run_options(&self, dry_run: bool) -> RunOptions {
        RunOptions {
            dry_run,
            retry_attempts: self.io.retry_attempts,
            retry_base_delay_ms: self.io.retry_base_delay_ms,
            codec: self.codec.clone(),
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Expand ~ to home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
