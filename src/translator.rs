//! The translation pipeline
//!
//! # Example
//!
//! ```ignore
//! use category_i18n::{JsonStore, Replacements, Translator};
//!
//! let mut translator = Translator::new(JsonStore::new("lang")?);
//! translator.set_language("cs");
//!
//! // lang/cs.calendar.json: { "days": ["den", "dny", "dní"] }
//! let days = translator.translate("calendar.days", Some(5), &Replacements::new())?;
//! assert_eq!(days, "dní");
//! ```

use std::collections::hash_map::Entry as CacheEntry;
use std::collections::{HashMap, HashSet};
use std::fmt;

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::TranslatorConfig;
use crate::error::{TranslatorError, TranslatorResult};
use crate::helpers::Helpers;
use crate::key::{MessageKey, split_message};
use crate::normalize::{Category, Entry, RawCategory, normalize};
use crate::plural::PluralForms;
use crate::replace::{Replacement, Replacements};
use crate::store::{CategoryStore, StoreRegistry};
use crate::translated::Translated;

/// Insertion-ordered set of message keys
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl KeySet {
    /// Returns `false` if the key was already present
    pub fn insert(&mut self, key: &str) -> bool {
        if self.seen.contains(key) {
            return false;
        }
        self.seen.insert(key.to_string());
        self.order.push(key.to_string());
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Cache key: `(language, path, category)`
type CacheKey = (String, String, String);

pub struct Translator {
    store: Box<dyn CategoryStore>,
    language: Option<String>,
    plural_forms: PluralForms,
    replacements: Replacements,
    helpers: Helpers,
    // Normalized categories, filled on first use
    cache: HashMap<CacheKey, Category>,
    translated: KeySet,
    untranslated: KeySet,
    last_translated: Option<String>,
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("language", &self.language)
            .field("plural_forms", &self.plural_forms.len())
            .field("replacements", &self.replacements)
            .field("helpers", &self.helpers)
            .field("cached_categories", &self.cache.len())
            .field("translated", &self.translated.len())
            .field("untranslated", &self.untranslated.len())
            .finish()
    }
}

impl Translator {
    pub fn new(store: impl CategoryStore + 'static) -> Self {
        Self::with_store(Box::new(store))
    }

    /// Create a translator around an already boxed store, with the built-in plural forms
    pub fn with_store(store: Box<dyn CategoryStore>) -> Self {
        Translator {
            store,
            language: None,
            plural_forms: PluralForms::builtin(),
            replacements: Replacements::new(),
            helpers: Helpers::new(),
            cache: HashMap::new(),
            translated: KeySet::default(),
            untranslated: KeySet::default(),
            last_translated: None,
        }
    }

    /// Build a translator from configuration, creating its store through `registry`
    pub fn from_config(
        config: &TranslatorConfig,
        registry: &StoreRegistry,
    ) -> TranslatorResult<Self> {
        let store = registry.create(&config.backend, &config.store_options())?;
        let mut translator = Translator::with_store(store);

        if let Some(language) = &config.language {
            translator.set_language(language.as_str());
        }
        for (name, value) in &config.replacements {
            match Replacement::from_json(value) {
                Some(replacement) => {
                    translator.add_replacement(name, replacement);
                }
                None => warn!(name = %name, "Ignoring replacement without a textual value"),
            }
        }
        for (language, form) in &config.plural_forms {
            translator.add_plural_form(language, form.count, &form.form)?;
        }

        debug!(
            backend = %config.backend,
            language = ?translator.language,
            "Translator configured"
        );
        Ok(translator)
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn set_language(&mut self, language: impl Into<String>) -> &mut Self {
        self.language = Some(language.into());
        self
    }

    pub fn replacements(&self) -> &Replacements {
        &self.replacements
    }

    pub fn add_replacement(&mut self, name: &str, value: impl Into<Replacement>) -> &mut Self {
        self.replacements.insert(name, value);
        self
    }

    pub fn remove_replacement(&mut self, name: &str) -> TranslatorResult<&mut Self> {
        self.replacements
            .remove(name)
            .ok_or_else(|| TranslatorError::UnknownReplacement(name.to_string()))?;
        Ok(self)
    }

    pub fn plural_forms(&self) -> &PluralForms {
        &self.plural_forms
    }

    pub fn add_plural_form(
        &mut self,
        language: &str,
        count: usize,
        form: &str,
    ) -> TranslatorResult<&mut Self> {
        self.plural_forms.insert(language, count, form)?;
        Ok(self)
    }

    pub fn helpers(&self) -> &Helpers {
        &self.helpers
    }

    pub fn add_helper<F>(&mut self, name: &str, helper: F) -> &mut Self
    where
        F: Fn(&str, &[String]) -> String + Send + Sync + 'static,
    {
        self.helpers.add_helper(name, helper);
        self
    }

    pub fn remove_helper(&mut self, name: &str) -> bool {
        self.helpers.remove_helper(name).is_some()
    }

    pub fn add_filter<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.helpers.add_filter(filter);
        self
    }

    /// Drop every cached category
    pub fn invalidate(&mut self) -> &mut Self {
        self.cache.clear();
        self
    }

    /// Keys that resolved to a translation, in first-seen order
    pub fn translated(&self) -> &[String] {
        self.translated.as_slice()
    }

    /// Keys with no translation, in first-seen order
    pub fn untranslated(&self) -> &[String] {
        self.untranslated.as_slice()
    }

    /// Lookup key of the last successful translation, if the last call found one
    pub fn last_translated(&self) -> Option<&str> {
        self.last_translated.as_deref()
    }

    pub fn store(&self) -> &dyn CategoryStore {
        self.store.as_ref()
    }

    /// Direct store access. Call [`invalidate`](Self::invalidate) after writing through it.
    pub fn store_mut(&mut self) -> &mut dyn CategoryStore {
        self.store.as_mut()
    }

    /// Write a category through the store and drop the cache
    pub fn save_category(
        &mut self,
        path: &str,
        category: &str,
        language: &str,
        data: &RawCategory,
    ) -> TranslatorResult<()> {
        self.store.save(path, category, language, data)?;
        self.invalidate();
        Ok(())
    }

    /// Translate a message key.
    ///
    /// `count` selects the plural variant and is available to the message
    /// as `%count%`. `args` are merged over the persistent replacements.
    ///
    /// A key that has no translation is returned as text (after
    /// replacements) and recorded in [`untranslated`](Self::untranslated).
    pub fn translate(
        &mut self,
        message: &str,
        count: Option<i64>,
        args: &Replacements,
    ) -> TranslatorResult<Translated> {
        self.last_translated = None;
        trace!(key = message, ?count, "Translating");

        let mut args = args.clone();
        if let Some(count) = count {
            args.insert("count", count);
        }
        let replacements = Replacements::merged(&self.replacements, &args);

        let key = MessageKey::parse(message);
        if key.ignored {
            return Ok(Translated::Text(replacements.apply(&key.message)));
        }

        let language = key
            .language
            .clone()
            .or_else(|| self.language.clone())
            .ok_or(TranslatorError::NoLanguageSet)?;

        let lookup = replacements.apply(&key.message);
        let entry = self.find_entry(&language, &lookup)?;
        let entry = match (entry, key.index) {
            (Some(entry), Some(index)) => Some(list_element(entry, index, &lookup)?),
            (entry, _) => entry,
        };

        let Some(entry) = entry else {
            debug!(key = %lookup, language = %language, "Untranslated message");
            self.untranslated.insert(&lookup);
            return Ok(Translated::Text(replacements.apply(&lookup)));
        };

        let result = self
            .plural_forms
            .pluralize(&entry, count, &language)
            .map(|text| replacements.apply(text));
        let result = self.helpers.apply_filters(result);
        let result = self.helpers.apply_helpers(result, &key.helpers)?;

        self.translated.insert(&lookup);
        self.last_translated = Some(lookup);
        Ok(result)
    }

    /// [`translate`](Self::translate) without a count
    pub fn translate_args(
        &mut self,
        message: &str,
        args: &Replacements,
    ) -> TranslatorResult<Translated> {
        self.translate(message, None, args)
    }

    /// Translate a JSON value.
    ///
    /// Strings are translated; any other value is returned unchanged and
    /// leaves the coverage sets untouched.
    pub fn translate_value(
        &mut self,
        value: Value,
        count: Option<i64>,
        args: &Replacements,
    ) -> TranslatorResult<Value> {
        match value {
            Value::String(message) => Ok(self.translate(&message, count, args)?.into()),
            other => {
                self.last_translated = None;
                Ok(other)
            }
        }
    }

    /// Translate `base.key_leaf` and `base.value_leaf` and pair their elements.
    ///
    /// Both must be lists of the same length. A repeated key keeps its first
    /// position and takes the later value.
    pub fn translate_pairs(
        &mut self,
        base: &str,
        key_leaf: &str,
        value_leaf: &str,
        count: Option<i64>,
        args: &Replacements,
    ) -> TranslatorResult<Vec<(String, String)>> {
        let keys_message = format!("{}.{}", base, key_leaf);
        let values_message = format!("{}.{}", base, value_leaf);

        let keys = self.translate(&keys_message, count, args)?;
        let values = self.translate(&values_message, count, args)?;

        let (Some(keys), Some(values)) = (keys.into_list(), values.into_list()) else {
            return Err(TranslatorError::ShapeMismatch {
                keys: keys_message,
                values: values_message,
                reason: "translations are not lists".to_string(),
            });
        };
        if keys.len() != values.len() {
            return Err(TranslatorError::ShapeMismatch {
                keys: keys_message,
                values: values_message,
                reason: format!("{} keys but {} values", keys.len(), values.len()),
            });
        }

        let mut pairs: Vec<(String, String)> = Vec::with_capacity(keys.len());
        for (key, value) in keys.into_iter().zip(values) {
            match pairs.iter_mut().find(|(existing, _)| *existing == key) {
                Some(pair) => pair.1 = value,
                None => pairs.push((key, value)),
            }
        }
        Ok(pairs)
    }

    /// Translate every key, optionally prefixed with `base.`
    pub fn translate_map<S: AsRef<str>>(
        &mut self,
        keys: &[S],
        count: Option<i64>,
        args: &Replacements,
        base: Option<&str>,
    ) -> TranslatorResult<Vec<Translated>> {
        keys.iter()
            .map(|key| {
                let message = match base {
                    Some(base) => format!("{}.{}", base, key.as_ref()),
                    None => key.as_ref().to_string(),
                };
                self.translate(&message, count, args)
            })
            .collect()
    }

    fn find_entry(&mut self, language: &str, lookup: &str) -> TranslatorResult<Option<Entry>> {
        let (path, category, name) = split_message(lookup);
        if category.is_empty() || name.is_empty() {
            return Ok(None);
        }
        let category = self.load_category(language, &path, &category)?;
        Ok(category.get(&name).cloned())
    }

    fn load_category(
        &mut self,
        language: &str,
        path: &str,
        category: &str,
    ) -> TranslatorResult<&Category> {
        let cache_key = (language.to_string(), path.to_string(), category.to_string());
        match self.cache.entry(cache_key) {
            CacheEntry::Occupied(cached) => Ok(cached.into_mut()),
            CacheEntry::Vacant(slot) => {
                let raw = self.store.load(path, category, language)?;
                let normalized = normalize(&raw);
                debug!(
                    location = %self.store.location(path, category, language),
                    entries = normalized.len(),
                    "Loaded category"
                );
                Ok(slot.insert(normalized))
            }
        }
    }
}

fn list_element(entry: Entry, index: usize, key: &str) -> TranslatorResult<Entry> {
    match entry {
        Entry::List(mut items) => {
            if index >= items.len() {
                return Err(TranslatorError::IndexNotFound {
                    key: key.to_string(),
                    index,
                });
            }
            Ok(Entry::Variants(items.swap_remove(index)))
        }
        Entry::Variants(_) => Err(TranslatorError::NotAList {
            key: key.to_string(),
        }),
    }
}
