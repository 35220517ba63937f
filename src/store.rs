//! Category storage backends
//!
//! A store persists the raw JSON object of one category for one language.
//! The translator reads through [`CategoryStore::load`]; `save` is for
//! tooling that writes category files.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{TranslatorError, TranslatorResult};
use crate::normalize::RawCategory;

pub trait CategoryStore: Send + Sync {
    /// Load the raw data of `category` under `path` for `language`.
    ///
    /// Missing data is an empty map, not an error.
    fn load(&self, path: &str, category: &str, language: &str) -> TranslatorResult<RawCategory>;

    /// Persist the raw data of `category` under `path` for `language`
    fn save(
        &mut self,
        path: &str,
        category: &str,
        language: &str,
        data: &RawCategory,
    ) -> TranslatorResult<()>;

    /// Where the data for this triple lives, for diagnostics
    fn location(&self, path: &str, category: &str, language: &str) -> String;
}

/// File name of a category, e.g. `cs.messages.json`
pub fn category_file_name(category: &str, language: &str) -> String {
    format!("{}.{}.json", language, category)
}

/// Directory of JSON files laid out as `{path}/{language}.{category}.json`
#[derive(Debug, Clone)]
pub struct JsonStore {
    directory: PathBuf,
}

impl JsonStore {
    /// Create a store rooted at `directory`, which must exist
    pub fn new(directory: impl Into<PathBuf>) -> TranslatorResult<Self> {
        let directory = directory.into();
        if !directory.is_dir() {
            return Err(TranslatorError::MissingDirectory(directory));
        }
        Ok(JsonStore { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_path(&self, path: &str, category: &str, language: &str) -> PathBuf {
        let mut file = self.directory.clone();
        if !path.is_empty() {
            file.push(path);
        }
        file.push(category_file_name(category, language));
        file
    }
}

impl CategoryStore for JsonStore {
    fn load(&self, path: &str, category: &str, language: &str) -> TranslatorResult<RawCategory> {
        let file = self.file_path(path, category, language);
        if !file.is_file() {
            debug!(file = %file.display(), "Category file not found");
            return Ok(RawCategory::new());
        }

        let content = fs::read_to_string(&file).map_err(|source| TranslatorError::Io {
            path: file.clone(),
            source,
        })?;
        let json: Value = serde_json::from_str(&content).map_err(|source| TranslatorError::Json {
            path: file.clone(),
            source,
        })?;

        match json {
            Value::Object(map) => Ok(map),
            _ => Err(TranslatorError::InvalidCategory {
                location: file.display().to_string(),
            }),
        }
    }

    fn save(
        &mut self,
        path: &str,
        category: &str,
        language: &str,
        data: &RawCategory,
    ) -> TranslatorResult<()> {
        let file = self.file_path(path, category, language);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(|source| TranslatorError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(data).map_err(|source| TranslatorError::Json {
            path: file.clone(),
            source,
        })?;
        fs::write(&file, content).map_err(|source| TranslatorError::Io { path: file, source })
    }

    fn location(&self, path: &str, category: &str, language: &str) -> String {
        self.file_path(path, category, language).display().to_string()
    }
}

/// In-process store, keyed by `(path, category, language)`
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    categories: HashMap<(String, String, String), RawCategory>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Builder-style insert of one category
    pub fn with_category(
        mut self,
        path: &str,
        category: &str,
        language: &str,
        data: RawCategory,
    ) -> Self {
        self.insert(path, category, language, data);
        self
    }

    pub fn insert(&mut self, path: &str, category: &str, language: &str, data: RawCategory) {
        self.categories.insert(
            (path.to_string(), category.to_string(), language.to_string()),
            data,
        );
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl CategoryStore for MemoryStore {
    fn load(&self, path: &str, category: &str, language: &str) -> TranslatorResult<RawCategory> {
        let key = (path.to_string(), category.to_string(), language.to_string());
        Ok(self.categories.get(&key).cloned().unwrap_or_default())
    }

    fn save(
        &mut self,
        path: &str,
        category: &str,
        language: &str,
        data: &RawCategory,
    ) -> TranslatorResult<()> {
        self.insert(path, category, language, data.clone());
        Ok(())
    }

    fn location(&self, path: &str, category: &str, language: &str) -> String {
        let file = category_file_name(category, language);
        if path.is_empty() {
            format!("memory:{}", file)
        } else {
            format!("memory:{}/{}", path, file)
        }
    }
}

/// Options handed to a store factory
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub directory: Option<PathBuf>,
}

/// Builds a store from options
pub type StoreFactory =
    Box<dyn Fn(&StoreOptions) -> TranslatorResult<Box<dyn CategoryStore>> + Send + Sync>;

/// Maps backend identifiers used in configuration to store factories.
///
/// `"json"` and `"memory"` are registered by default.
pub struct StoreRegistry {
    factories: HashMap<String, StoreFactory>,
}

impl fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("backends", &self.backends())
            .finish()
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        let mut registry = StoreRegistry::empty();
        registry.register("json", |options| {
            let directory = options
                .directory
                .clone()
                .ok_or(TranslatorError::MissingOption {
                    backend: "json".to_string(),
                    option: "directory",
                })?;
            Ok(Box::new(JsonStore::new(directory)?))
        });
        registry.register("memory", |_| Ok(Box::new(MemoryStore::new())));
        registry
    }
}

impl StoreRegistry {
    pub fn new() -> Self {
        StoreRegistry::default()
    }

    /// A registry with no backends at all
    pub fn empty() -> Self {
        StoreRegistry {
            factories: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, backend: &str, factory: F) -> &mut Self
    where
        F: Fn(&StoreOptions) -> TranslatorResult<Box<dyn CategoryStore>> + Send + Sync + 'static,
    {
        self.factories.insert(backend.to_string(), Box::new(factory));
        self
    }

    /// Registered backend identifiers, sorted
    pub fn backends(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn create(
        &self,
        backend: &str,
        options: &StoreOptions,
    ) -> TranslatorResult<Box<dyn CategoryStore>> {
        let factory = self
            .factories
            .get(backend)
            .ok_or_else(|| TranslatorError::UnknownBackend(backend.to_string()))?;
        factory(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> RawCategory {
        match json!({ "title": "Nadpis", "-- items": ["a", "b"] }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_json_store_requires_directory() {
        let err = JsonStore::new("/definitely/not/a/real/dir").unwrap_err();
        assert!(matches!(err, TranslatorError::MissingDirectory(_)));
    }

    #[test]
    fn test_json_store_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).unwrap();
        assert_eq!(
            store.file_path("", "menu", "cs"),
            dir.path().join("cs.menu.json")
        );
        assert_eq!(
            store.file_path("admin/users", "menu", "cs"),
            dir.path().join("admin/users/cs.menu.json")
        );
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).unwrap();
        assert!(store.load("", "menu", "cs").unwrap().is_empty());
    }

    #[test]
    fn test_json_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(dir.path()).unwrap();
        store.save("admin", "menu", "cs", &sample()).unwrap();
        assert!(dir.path().join("admin/cs.menu.json").is_file());
        assert_eq!(store.load("admin", "menu", "cs").unwrap(), sample());
        assert!(store.load("admin", "menu", "en").unwrap().is_empty());
    }

    #[test]
    fn test_json_store_rejects_non_object_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cs.menu.json"), "[1, 2]").unwrap();
        let store = JsonStore::new(dir.path()).unwrap();
        let err = store.load("", "menu", "cs").unwrap_err();
        assert!(matches!(err, TranslatorError::InvalidCategory { .. }));
    }

    #[test]
    fn test_json_store_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cs.menu.json"), "{ broken").unwrap();
        let store = JsonStore::new(dir.path()).unwrap();
        let err = store.load("", "menu", "cs").unwrap_err();
        assert!(matches!(err, TranslatorError::Json { .. }));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new().with_category("", "menu", "cs", sample());
        assert_eq!(store.load("", "menu", "cs").unwrap(), sample());
        assert!(store.load("", "menu", "en").unwrap().is_empty());
        store.save("a/b", "menu", "en", &sample()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.location("a/b", "menu", "en"), "memory:a/b/en.menu.json");
        assert_eq!(store.location("", "menu", "en"), "memory:en.menu.json");
    }

    #[test]
    fn test_registry_defaults() {
        let registry = StoreRegistry::new();
        assert_eq!(registry.backends(), vec!["json", "memory"]);
        assert!(registry.create("memory", &StoreOptions::default()).is_ok());

        let err = registry.create("json", &StoreOptions::default()).err().unwrap();
        assert!(matches!(err, TranslatorError::MissingOption { option: "directory", .. }));

        let err = registry.create("yaml", &StoreOptions::default()).err().unwrap();
        assert!(matches!(err, TranslatorError::UnknownBackend(name) if name == "yaml"));
    }

    #[test]
    fn test_registry_custom_backend() {
        let mut registry = StoreRegistry::empty();
        registry.register("fixed", |_| {
            Ok(Box::new(MemoryStore::new().with_category("", "menu", "cs", sample())))
        });
        let store = registry.create("fixed", &StoreOptions::default()).unwrap();
        assert_eq!(store.load("", "menu", "cs").unwrap(), sample());
    }
}
