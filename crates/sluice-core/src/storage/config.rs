use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::interceptor::registry::InterceptorDefinition;
use crate::storage::error::StorageSystemError;
use crate::storage::StorageProvider;

/// Host key listing the hidden interceptors, in execution order
pub const INTERCEPTORS_KEY: &str = "interceptors";
/// Host key for the directory backing the local blob store
pub const BLOB_STORE_DIR_KEY: &str = "blobstore.dir";
/// Host key for the directory holding message catalogs
pub const MESSAGES_DIR_KEY: &str = "messages.dir";
/// Host key selecting the catalog locale
pub const MESSAGES_LOCALE_KEY: &str = "messages.locale";

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Every format compiled into this build
    pub fn all() -> Vec<ConfigFormat> {
        let mut formats = vec![ConfigFormat::Json];
        #[cfg(feature = "yaml-config")]
        formats.push(ConfigFormat::Yaml);
        #[cfg(feature = "toml-config")]
        formats.push(ConfigFormat::Toml);
        formats
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// In-memory representation of configuration data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    /// Raw configuration values
    #[serde(flatten)]
    values: HashMap<String, Value>,
}

impl ConfigData {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Create a configuration from a HashMap
    pub fn from_hashmap(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    /// Get a configuration value
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a configuration value with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Raw value for `key`, trying the literal key first and then walking
    /// nested tables along the dots (`blobstore.dir` -> `[blobstore] dir`).
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.values.get(key) {
            return Some(value);
        }
        let mut parts = key.split('.');
        let mut current = self.values.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| StorageSystemError::SerializationError {
            format: "json".to_string(),
            source: Box::new(e),
        })?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Remove a configuration value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Check if key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get all keys
    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// Merge with another config, overriding existing values
    pub fn merge(&mut self, other: &ConfigData) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String> {
        let serialized: std::result::Result<String, BoxedError> = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(&self).map_err(boxed),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(&self).map_err(boxed),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(&self).map_err(boxed),
        };
        serialized.map_err(|source| {
            StorageSystemError::SerializationError {
                format: format.extension().to_string(),
                source,
            }
            .into()
        })
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self> {
        let parsed: std::result::Result<Self, BoxedError> = match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(boxed),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(boxed),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(boxed),
        };
        parsed.map_err(|source| {
            StorageSystemError::DeserializationError {
                format: format.extension().to_string(),
                source,
            }
            .into()
        })
    }
}

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn boxed<E>(e: E) -> BoxedError
where
    E: std::error::Error + Send + Sync + 'static,
{
    Box::new(e)
}

/// Host-level configuration, read-only to interceptors.
///
/// This is the framework's own configuration file, never a user-facing
/// pipeline definition, which is what keeps interceptors hidden.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostConfig {
    data: ConfigData,
}

impl HostConfig {
    pub fn from_data(data: ConfigData) -> Self {
        Self { data }
    }

    /// Load host configuration from `path`, picking the format from its extension
    pub fn load(provider: &dyn StorageProvider, path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            StorageSystemError::UnsupportedConfigFormat(path.display().to_string())
        })?;
        if !provider.is_file(path) {
            return Err(StorageSystemError::FileNotFound(path.to_path_buf()).into());
        }
        let content = provider.read_to_string(path)?;
        let data = ConfigData::deserialize(&content, format)?;
        log::debug!("Loaded host configuration from {:?} ({} keys)", path, data.keys().len());
        Ok(Self { data })
    }

    pub fn data(&self) -> &ConfigData {
        &self.data
    }

    /// String form of a configuration value, `None` when undefined or null.
    ///
    /// Strings come back verbatim, scalars stringified and tables or arrays
    /// as compact JSON.
    pub fn get(&self, name: &str) -> Option<String> {
        match self.data.lookup(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// The hidden interceptor chain, empty when the host defines none
    pub fn interceptor_definitions(&self) -> Result<Vec<InterceptorDefinition>> {
        match self.data.lookup(INTERCEPTORS_KEY) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| Error::Config {
                key: INTERCEPTORS_KEY.to_string(),
                message: e.to_string(),
            }),
        }
    }

    pub fn blob_store_dir(&self) -> Option<PathBuf> {
        self.get(BLOB_STORE_DIR_KEY).map(PathBuf::from)
    }

    /// Directory and locale of the message catalog, when both are configured
    pub fn message_catalog(&self) -> Option<(PathBuf, String)> {
        let dir = self.get(MESSAGES_DIR_KEY)?;
        let locale = self.get(MESSAGES_LOCALE_KEY)?;
        Some((PathBuf::from(dir), locale))
    }
}
