//! SSH module - authenticated connections for the SFTP uploader
//!
//! # Features
//! - Private key authentication
//! - Host key verification via ~/.ssh/known_hosts

mod client;
mod config;
mod error;
pub mod known_hosts;
mod session;

pub use client::{ClientHandler, SshClient};
pub use config::SshConfig;
pub use error::SshError;
pub use known_hosts::{HostKeyVerification, KnownHostsStore};
pub use session::SshSession;
