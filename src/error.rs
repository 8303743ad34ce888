//! Top level error type for an upload run

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{Field, StorageError};
use crate::sftp::SftpError;
use crate::ssh::SshError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid path for {field}: {path}: {reason}")]
    InvalidPath {
        field: Field,
        path: PathBuf,
        reason: String,
    },

    #[error("No value available for {0}")]
    MissingRequiredValue(Field),

    #[error("Invalid value for {field}: {value:?}: {reason}")]
    InvalidValue {
        field: Field,
        value: String,
        reason: String,
    },

    #[error("Unusable settings file: {0}")]
    SettingsCorrupt(#[source] StorageError),

    #[error("Settings storage failed: {0}")]
    Settings(#[source] StorageError),

    #[error("Connection failed: {0}")]
    ConnectionFailure(#[from] SshError),

    #[error("Remote operation failed: {0}")]
    RemoteIoFailure(#[from] SftpError),

    #[error("Aborted: {0}")]
    UserAborted(String),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Corrupt { .. } | StorageError::VersionTooNew { .. } => {
                AppError::SettingsCorrupt(err)
            }
            other => AppError::Settings(other),
        }
    }
}
