//! Translator configuration
//!
//! ```json
//! {
//!     "backend": "json",
//!     "directory": "lang",
//!     "language": "cs",
//!     "replacements": { "site": "Example", "user": false },
//!     "plural_forms": { "xx": { "count": 2, "form": "n != 1" } }
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{TranslatorError, TranslatorResult};
use crate::store::StoreOptions;

/// Environment variable overriding [`TranslatorConfig::language`]
pub const LANGUAGE_ENV: &str = "CATEGORY_I18N_LANGUAGE";
/// Environment variable overriding [`TranslatorConfig::directory`]
pub const DIRECTORY_ENV: &str = "CATEGORY_I18N_DIRECTORY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluralFormConfig {
    pub count: usize,
    pub form: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Backend identifier looked up in a [`StoreRegistry`](crate::store::StoreRegistry)
    pub backend: String,
    pub directory: Option<PathBuf>,
    pub language: Option<String>,
    /// Placeholder values: strings, numbers, or `false` to keep the placeholder
    pub replacements: BTreeMap<String, Value>,
    pub plural_forms: BTreeMap<String, PluralFormConfig>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            backend: "json".to_string(),
            directory: None,
            language: None,
            replacements: BTreeMap::new(),
            plural_forms: BTreeMap::new(),
        }
    }
}

impl TranslatorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a JSON configuration file.
    ///
    /// A relative `directory` is resolved against the file's own directory.
    pub fn from_file(path: &Path) -> TranslatorResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| TranslatorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json_str(&content).map_err(|source| TranslatorError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        if let (Some(directory), Some(base)) = (&config.directory, path.parent()) {
            if directory.is_relative() {
                config.directory = Some(base.join(directory));
            }
        }

        Ok(config)
    }

    /// Override `language` and `directory` from the environment, when set
    pub fn apply_env(mut self) -> Self {
        if let Ok(language) = std::env::var(LANGUAGE_ENV) {
            if !language.trim().is_empty() {
                self.language = Some(language.trim().to_string());
            }
        }
        if let Ok(directory) = std::env::var(DIRECTORY_ENV) {
            if !directory.trim().is_empty() {
                self.directory = Some(PathBuf::from(directory.trim()));
            }
        }
        self
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            directory: self.directory.clone(),
        }
    }
}
