//! pemcrypt - In-place RSA encryption of files and directory trees
//!
//! Usage:
//!   pemcrypt <path> --encrypt   - Encrypt a file or every file below a directory
//!   pemcrypt <path> --decrypt   - Reverse a previous encryption

use clap::Parser;
use pemcrypt::{
    config::{expand_tilde, Config},
    crypto::{PrivateKeyHandle, PublicKeyHandle},
    fs::{Direction, RunReport, Transform},
    Result,
};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Exit code when some files failed
const EXIT_PARTIAL_FAILURE: i32 = 1;

/// Exit code when the run could not start
const EXIT_FATAL: i32 = 2;

#[derive(Parser)]
#[command(name = "pemcrypt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Encrypt or decrypt a file or folder in place with an RSA key pair")]
struct Cli {
    /// Path to encrypt/decrypt, can be a file or an entire folder
    path: PathBuf,

    /// Encrypt the file/folder with the public key (only -e or -d can be given)
    #[arg(short, long)]
    encrypt: bool,

    /// Decrypt the file/folder with the private key (only -e or -d can be given)
    #[arg(short, long)]
    decrypt: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Public key PEM file (overrides config)
    #[arg(long)]
    public_key: Option<PathBuf>,

    /// Private key PEM file (overrides config)
    #[arg(long)]
    private_key: Option<PathBuf>,

    /// Accept encrypted files that lack the format header
    #[arg(long)]
    accept_headerless: bool,

    /// Check every file without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Direction is resolved before the config is read or any key or file is touched
    let setup = Direction::from_flags(cli.encrypt, cli.decrypt).and_then(|direction| {
        let config = Config::load_or_default(cli.config.as_deref())?;
        Ok((direction, config))
    });

    // Setup logging
    let level = match (&setup, cli.verbose) {
        (_, true) => "debug",
        (Ok((_, config)), false) => config.logging.level.as_str(),
        (Err(_), false) => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let result = setup.and_then(|(direction, config)| execute(&cli, direction, config));
    match result {
        Ok(report) if report.is_success() => {}
        Ok(report) => {
            for (path, e) in &report.failed {
                error!("{}: {}", path.display(), e);
            }
            std::process::exit(EXIT_PARTIAL_FAILURE);
        }
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(EXIT_FATAL);
        }
    }
}

fn execute(cli: &Cli, direction: Direction, mut config: Config) -> Result<RunReport> {
    config.apply_cli_overrides(
        cli.public_key.as_deref(),
        cli.private_key.as_deref(),
        cli.accept_headerless,
    );

    let options = config.run_options(cli.dry_run);
    if options.dry_run {
        info!("DRY RUN MODE - no files will be modified");
    }

    match direction {
        Direction::Encrypt => {
            let key_path = expand_tilde(&config.keys.public_key);
            let key = PublicKeyHandle::load(&key_path)?;
            debug!("Loaded {:?} from {:?}", key, key_path);
            pemcrypt::run(&cli.path, Transform::Encrypt(&key), &options)
        }
        Direction::Decrypt => {
            let key_path = expand_tilde(&config.keys.private_key);
            let key = PrivateKeyHandle::load(&key_path)?;
            debug!("Loaded {:?} from {:?}", key, key_path);
            pemcrypt::run(&cli.path, Transform::Decrypt(&key), &options)
        }
    }
}
