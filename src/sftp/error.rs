//! SFTP Error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SftpError {
    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("SFTP subsystem not available: {0}")]
    SubsystemNotAvailable(String),

    #[error("No such remote file or directory: {0}")]
    FileNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Remote {op} failed on {path}: {message}")]
    Remote {
        op: &'static str,
        path: String,
        message: String,
    },

    #[error("Local file {path}: {source}")]
    Local {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload of {local} to {remote} failed: {message}")]
    Upload {
        local: PathBuf,
        remote: String,
        message: String,
    },
}

impl SftpError {
    pub fn local(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SftpError::Local {
            path: path.into(),
            source,
        }
    }
}
