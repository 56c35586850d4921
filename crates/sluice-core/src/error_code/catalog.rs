use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::storage::config::{ConfigData, ConfigFormat};
use crate::storage::error::StorageSystemError;
use crate::storage::StorageProvider;

static INSTALLED: OnceLock<MessageCatalog> = OnceLock::new();

/// Localized message templates for a single locale, keyed by error code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    locale: String,
    templates: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            templates: HashMap::new(),
        }
    }

    /// Builder-style insert, mostly for tests and embedded catalogs.
    pub fn with_template(mut self, code: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(code.into(), template.into());
        self
    }

    pub fn insert(&mut self, code: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(code.into(), template.into());
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn template(&self, code: &str) -> Option<&str> {
        self.templates.get(code).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Build a catalog from a flat `code -> template` table.
    ///
    /// Non-string entries are rejected so a typo in the file shows up at
    /// startup rather than as a fallback message later.
    pub fn from_config(locale: impl Into<String>, data: &ConfigData) -> Result<Self> {
        let mut catalog = Self::new(locale);
        for key in data.keys() {
            match data.get::<String>(&key) {
                Some(template) => catalog.insert(key, template),
                None => {
                    return Err(Error::Config {
                        key,
                        message: "message template must be a string".to_string(),
                    });
                }
            }
        }
        Ok(catalog)
    }

    /// Load `<dir>/<locale>.<ext>`, trying every enabled format in turn.
    pub fn load(provider: &dyn StorageProvider, dir: &Path, locale: &str) -> Result<Self> {
        for format in ConfigFormat::all() {
            let path = dir.join(format!("{}.{}", locale, format.extension()));
            if !provider.is_file(&path) {
                continue;
            }
            log::debug!("Loading message catalog for locale '{}' from {:?}", locale, path);
            let content = provider.read_to_string(&path)?;
            let data = ConfigData::deserialize(&content, format)?;
            return Self::from_config(locale, &data);
        }
        Err(StorageSystemError::FileNotFound(dir.join(locale)).into())
    }
}

/// Install the process-wide catalog used by localized rendering.
///
/// Only the first call succeeds; the rejected catalog is handed back.
pub fn install_catalog(catalog: MessageCatalog) -> std::result::Result<(), MessageCatalog> {
    let locale = catalog.locale.clone();
    INSTALLED.set(catalog)?;
    log::info!("Installed message catalog for locale '{}'", locale);
    Ok(())
}

/// The process-wide catalog, if one was installed.
pub fn installed_catalog() -> Option<&'static MessageCatalog> {
    INSTALLED.get()
}
