//! Settings Storage
//!
//! Handles reading/writing the upload settings file.
//! Default location: `settings.json` in the current working directory.

use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::types::{SettingsFile, UploadSettings, CONFIG_VERSION};

/// Default settings file name, relative to the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Settings storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings file {path} has version {found}, newer than supported {supported}")]
    VersionTooNew {
        path: PathBuf,
        found: u32,
        supported: u32,
    },
}

/// Settings storage manager
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Create storage manager with custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Ensure the settings directory exists
    async fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }
        Ok(())
    }

    /// Load settings from disk
    /// Returns `None` if the file doesn't exist
    pub async fn load(&self) -> Result<Option<UploadSettings>, StorageError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        // Read the version first so a newer schema is reported as such rather
        // than as an unknown field.
        #[derive(serde::Deserialize)]
        struct Versioned {
            version: u32,
        }
        let versioned: Versioned =
            serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        if versioned.version > CONFIG_VERSION {
            return Err(StorageError::VersionTooNew {
                path: self.path.clone(),
                found: versioned.version,
                supported: CONFIG_VERSION,
            });
        }

        let file: SettingsFile =
            serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!("Loaded settings from {:?}", self.path);
        Ok(Some(file.into()))
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &UploadSettings) -> Result<(), StorageError> {
        self.ensure_dir().await?;

        // Write to temp file first, then rename (atomic write)
        let temp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&SettingsFile::from(settings))?;

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.sync_all().await.map_err(|e| self.io_error(e))?;

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::info!("Settings saved to {:?}", self.path);
        Ok(())
    }

    /// Check if settings file exists
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.is_ok()
    }

    /// Get settings file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> UploadSettings {
        UploadSettings {
            host: "h".to_string(),
            port: 22,
            user: "u".to_string(),
            private_key: PathBuf::from("/tmp/key"),
            data: PathBuf::from("/tmp/file.txt"),
            remote_folder: "/app".to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let temp = tempdir().unwrap();
        let store = SettingsStore::with_path(temp.path().join("settings.json"));

        assert!(!store.exists().await);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp = tempdir().unwrap();
        let store = SettingsStore::with_path(temp.path().join("nested").join("settings.json"));

        store.save(&sample()).await.unwrap();
        assert!(store.exists().await);

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, sample());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let temp = tempdir().unwrap();
        let store = SettingsStore::with_path(temp.path().join("settings.json"));

        store.save(&sample()).await.unwrap();
        let mut changed = sample();
        changed.remote_folder = "/other".to_string();
        store.save(&changed).await.unwrap();

        assert_eq!(store.load().await.unwrap().unwrap().remote_folder, "/other");
    }

    #[tokio::test]
    async fn test_load_corrupt() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, "\u{80}\u{3}}garbage").unwrap();

        let err = SettingsStore::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_load_wrong_types() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"version":1,"host":"h","port":"twenty-two","user":"u",
               "private_key":"/k","data":"/d","remote_folder":"/app"}"#,
        )
        .unwrap();

        let err = SettingsStore::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_load_missing_field() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"version":1,"host":"h","port":22}"#).unwrap();

        let err = SettingsStore::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_load_unknown_field() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"version":1,"host":"h","port":22,"user":"u","private_key":"/k",
               "data":"/d","remote_folder":"/app","password":"hunter2"}"#,
        )
        .unwrap();

        let err = SettingsStore::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_load_newer_version() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"version":99,"hosts":[]}"#).unwrap();

        let err = SettingsStore::with_path(path).load().await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::VersionTooNew { found: 99, supported: CONFIG_VERSION, .. }
        ));
    }
}
