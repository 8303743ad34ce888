//! Configuration Management Module
//!
//! Persistent upload settings and the per-field merge of flags, saved
//! settings and prompted values.

pub mod resolver;
pub mod storage;
pub mod types;

pub use resolver::{
    validate_path, PresetSource, PromptSource, Resolution, SettingsResolver, Tier, ValueSource,
};
pub use storage::{SettingsStore, StorageError, DEFAULT_SETTINGS_FILE};
pub use types::{Field, SettingsFile, UploadSettings, CONFIG_VERSION};
