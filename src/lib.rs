//! Auto upload - replace a remote directory with local data over SFTP
//!
//! Settings are merged per field from command line flags, a saved settings
//! file and interactive prompts. The remote target folder is then wiped,
//! recreated and filled with a mirror of the local file or directory tree.

pub mod app;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod error;
pub mod prompt;
pub mod sftp;
pub mod ssh;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging to stderr
///
/// `RUST_LOG` wins over `default_level` when set.
pub fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
