//! Upload settings data types

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Current settings file version
pub const CONFIG_VERSION: u32 = 1;

/// Fully resolved settings driving one upload run
///
/// Every field has been validated by the resolver: paths exist and are
/// canonical, the port is non-zero and text fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    /// Remote host address
    pub host: String,
    /// SSH port
    pub port: u16,
    /// Remote username
    pub user: String,
    /// Private key used for authentication
    pub private_key: PathBuf,
    /// Local file or directory to upload
    pub data: PathBuf,
    /// Remote target directory (POSIX path)
    pub remote_folder: String,
}

/// On-disk representation of the settings file
///
/// Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// Schema version
    pub version: u32,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub private_key: PathBuf,
    pub data: PathBuf,
    pub remote_folder: String,
}

impl From<&UploadSettings> for SettingsFile {
    fn from(settings: &UploadSettings) -> Self {
        Self {
            version: CONFIG_VERSION,
            host: settings.host.clone(),
            port: settings.port,
            user: settings.user.clone(),
            private_key: settings.private_key.clone(),
            data: settings.data.clone(),
            remote_folder: settings.remote_folder.clone(),
        }
    }
}

impl From<SettingsFile> for UploadSettings {
    fn from(file: SettingsFile) -> Self {
        Self {
            host: file.host,
            port: file.port,
            user: file.user,
            private_key: file.private_key,
            data: file.data,
            remote_folder: file.remote_folder,
        }
    }
}

/// One configurable setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Host,
    Port,
    User,
    PrivateKey,
    Data,
    RemoteFolder,
}

impl Field {
    /// All fields, in resolution order
    pub const ALL: [Field; 6] = [
        Field::Host,
        Field::Port,
        Field::User,
        Field::PrivateKey,
        Field::Data,
        Field::RemoteFolder,
    ];

    /// Key name, as used in the settings file
    pub fn key(&self) -> &'static str {
        match self {
            Field::Host => "host",
            Field::Port => "port",
            Field::User => "user",
            Field::PrivateKey => "private_key",
            Field::Data => "data",
            Field::RemoteFolder => "remote_folder",
        }
    }

    /// Question shown when the value has to be typed in
    pub fn prompt(&self) -> &'static str {
        match self {
            Field::Host => "Enter host address",
            Field::Port => "Enter port",
            Field::User => "Enter username",
            Field::PrivateKey => "Enter local path to private-key for sftp",
            Field::Data => "Enter file or directory to upload",
            Field::RemoteFolder => "Enter remote-folder path",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl UploadSettings {
    /// Text form of a field, as fed back into the resolver
    pub fn value_of(&self, field: Field) -> String {
        match field {
            Field::Host => self.host.clone(),
            Field::Port => self.port.to_string(),
            Field::User => self.user.clone(),
            Field::PrivateKey => self.private_key.to_string_lossy().to_string(),
            Field::Data => self.data.to_string_lossy().to_string(),
            Field::RemoteFolder => self.remote_folder.clone(),
        }
    }

    /// `user@host:port`, for status output
    pub fn target(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}
