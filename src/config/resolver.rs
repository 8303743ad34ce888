//! Settings resolution
//!
//! Every field is taken from the first source that has a value for it, in
//! the order the sources were registered: command line flags, then the
//! loaded settings file, then the terminal.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::types::{Field, UploadSettings};
use crate::error::AppError;
use crate::prompt::Prompter;

/// Where a resolved value came from, highest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Flag,
    Stored,
    Prompted,
}

/// Provider of raw field values
#[async_trait]
pub trait ValueSource: Send {
    fn tier(&self) -> Tier;

    /// Raw text for `field`, or `None` when this source has nothing for it
    async fn value(&mut self, field: Field) -> Result<Option<String>, AppError>;
}

/// Fixed set of values (command line flags or a loaded settings file)
pub struct PresetSource {
    tier: Tier,
    values: HashMap<Field, String>,
}

impl PresetSource {
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            values: HashMap::new(),
        }
    }

    /// Add a value; blank and missing values are ignored
    pub fn with<V: ToString>(mut self, field: Field, value: Option<V>) -> Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.trim().is_empty() {
                self.values.insert(field, value);
            }
        }
        self
    }

    /// Every field of previously saved settings
    pub fn from_settings(settings: &UploadSettings) -> Self {
        Field::ALL.iter().fold(Self::new(Tier::Stored), |source, &field| {
            source.with(field, Some(settings.value_of(field)))
        })
    }
}

#[async_trait]
impl ValueSource for PresetSource {
    fn tier(&self) -> Tier {
        self.tier
    }

    async fn value(&mut self, field: Field) -> Result<Option<String>, AppError> {
        Ok(self.values.get(&field).cloned())
    }
}

/// Values typed in by the user
pub struct PromptSource<'a> {
    prompter: &'a mut dyn Prompter,
}

impl<'a> PromptSource<'a> {
    pub fn new(prompter: &'a mut dyn Prompter) -> Self {
        Self { prompter }
    }
}

#[async_trait]
impl ValueSource for PromptSource<'_> {
    fn tier(&self) -> Tier {
        Tier::Prompted
    }

    async fn value(&mut self, field: Field) -> Result<Option<String>, AppError> {
        self.prompter.input(field).await.map(Some)
    }
}

/// Outcome of a resolution: the settings and the tier behind every field
#[derive(Debug)]
pub struct Resolution {
    pub settings: UploadSettings,
    pub origins: BTreeMap<Field, Tier>,
}

impl Resolution {
    /// Whether a flag changed a value relative to the `loaded` settings
    ///
    /// Only flag-sourced fields are compared. Stored paths are canonicalized
    /// first, as a plain load would do; a stored path that no longer exists
    /// counts as changed.
    pub async fn overrides(&self, loaded: &UploadSettings) -> bool {
        for (&field, &tier) in &self.origins {
            if tier != Tier::Flag {
                continue;
            }
            let unchanged = match field {
                Field::PrivateKey => same_path(&loaded.private_key, &self.settings.private_key).await,
                Field::Data => same_path(&loaded.data, &self.settings.data).await,
                _ => loaded.value_of(field).trim() == self.settings.value_of(field),
            };
            if !unchanged {
                debug!("{} overridden by flag", field);
                return true;
            }
        }
        false
    }
}

async fn same_path(stored: &Path, resolved: &Path) -> bool {
    tokio::fs::canonicalize(stored)
        .await
        .is_ok_and(|canonical| canonical == resolved)
}

/// Per-field precedence merge over an ordered list of sources
pub struct SettingsResolver<'a> {
    sources: Vec<Box<dyn ValueSource + 'a>>,
}

impl<'a> SettingsResolver<'a> {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Register the next source, with lower precedence than the previous ones
    pub fn source(mut self, source: impl ValueSource + 'a) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Resolve and validate all fields
    pub async fn resolve(mut self) -> Result<Resolution, AppError> {
        let mut partial = PartialSettings::default();
        let mut origins = BTreeMap::new();

        for field in Field::ALL {
            let (raw, tier) = self.lookup(field).await?;
            debug!("Resolved {} from {:?}", field, tier);
            partial.set(field, raw.trim()).await?;
            origins.insert(field, tier);
        }

        Ok(Resolution {
            settings: partial.finish()?,
            origins,
        })
    }

    async fn lookup(&mut self, field: Field) -> Result<(String, Tier), AppError> {
        for source in self.sources.iter_mut() {
            if let Some(value) = source.value(field).await? {
                if !value.trim().is_empty() {
                    return Ok((value, source.tier()));
                }
            }
        }
        Err(AppError::MissingRequiredValue(field))
    }
}

impl Default for SettingsResolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct PartialSettings {
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    private_key: Option<PathBuf>,
    data: Option<PathBuf>,
    remote_folder: Option<String>,
}

impl PartialSettings {
    async fn set(&mut self, field: Field, raw: &str) -> Result<(), AppError> {
        match field {
            Field::Host => self.host = Some(raw.to_string()),
            Field::Port => self.port = Some(parse_port(raw)?),
            Field::User => self.user = Some(raw.to_string()),
            Field::PrivateKey => self.private_key = Some(validate_path(field, raw).await?),
            Field::Data => self.data = Some(validate_path(field, raw).await?),
            Field::RemoteFolder => self.remote_folder = Some(raw.to_string()),
        }
        Ok(())
    }

    fn finish(self) -> Result<UploadSettings, AppError> {
        use AppError::MissingRequiredValue as Missing;
        Ok(UploadSettings {
            host: self.host.ok_or(Missing(Field::Host))?,
            port: self.port.ok_or(Missing(Field::Port))?,
            user: self.user.ok_or(Missing(Field::User))?,
            private_key: self.private_key.ok_or(Missing(Field::PrivateKey))?,
            data: self.data.ok_or(Missing(Field::Data))?,
            remote_folder: self.remote_folder.ok_or(Missing(Field::RemoteFolder))?,
        })
    }
}

fn parse_port(raw: &str) -> Result<u16, AppError> {
    match raw.parse::<u16>() {
        Ok(0) => Err(AppError::InvalidValue {
            field: Field::Port,
            value: raw.to_string(),
            reason: "port must be positive".to_string(),
        }),
        Ok(port) => Ok(port),
        Err(e) => Err(AppError::InvalidValue {
            field: Field::Port,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Check that a local path exists and return its canonical form
///
/// The private key must additionally be a regular file.
pub async fn validate_path(field: Field, candidate: &str) -> Result<PathBuf, AppError> {
    let path = Path::new(candidate);
    let invalid = |reason: String| AppError::InvalidPath {
        field,
        path: path.to_path_buf(),
        reason,
    };

    let canonical = tokio::fs::canonicalize(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            invalid("path does not exist".to_string())
        } else {
            invalid(e.to_string())
        }
    })?;

    if field == Field::PrivateKey {
        let metadata = tokio::fs::metadata(&canonical)
            .await
            .map_err(|e| invalid(e.to_string()))?;
        if !metadata.is_file() {
            return Err(invalid("not a regular file".to_string()));
        }
    }

    Ok(canonical)
}
