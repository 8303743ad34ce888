//! SSH Configuration

use std::path::PathBuf;

use crate::config::UploadSettings;

/// SSH connection configuration
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Remote host address
    pub host: String,

    /// SSH port
    pub port: u16,

    /// Username for authentication
    pub username: String,

    /// Path to private key file (the only supported credential)
    pub key_path: PathBuf,

    /// known_hosts file used for host key verification
    /// (None: ~/.ssh/known_hosts)
    pub known_hosts: Option<PathBuf>,

    /// Strict host key checking
    /// - true: reject connections to unknown hosts
    /// - false: accept unknown hosts with a warning, still reject changed keys
    pub strict_host_key_checking: bool,
}

impl SshConfig {
    /// Connection parameters of resolved upload settings
    pub fn from_settings(settings: &UploadSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            username: settings.user.clone(),
            key_path: settings.private_key.clone(),
            known_hosts: None,
            strict_host_key_checking: false,
        }
    }

    pub fn with_known_hosts(mut self, path: Option<PathBuf>) -> Self {
        self.known_hosts = path;
        self
    }

    pub fn with_strict_host_key_checking(mut self, strict: bool) -> Self {
        self.strict_host_key_checking = strict;
        self
    }
}
