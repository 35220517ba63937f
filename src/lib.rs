//! Translation of dotted message keys from JSON category files.
//!
//! A key such as `admin.users.labels.email` names the leaf `email` in the
//! category `labels` under the path `admin/users`; for language `cs` the
//! default [`JsonStore`] reads it from `admin/users/cs.labels.json`.
//!
//! On top of plain lookups the translator supports plural variants chosen
//! by per-language plural expressions, `%name%` replacements, list entries
//! addressed with `[N]`, a `lang|` prefix that overrides the language for
//! one call, `:literal:` keys that are never looked up, and helpers
//! appended as `|name:arg`. Every key is recorded as translated or
//! untranslated for coverage reports.

pub mod config;
pub mod error;
pub mod helpers;
pub mod key;
pub mod normalize;
pub mod plural;
pub mod replace;
pub mod store;
pub mod translated;
pub mod translator;

// Re-export the main types for convenient access
pub use config::{PluralFormConfig, TranslatorConfig};
pub use error::{TranslatorError, TranslatorResult};
pub use helpers::{Filter, Helper, Helpers};
pub use key::{HelperCall, MessageKey};
pub use normalize::{Category, Entry, RawCategory, normalize};
pub use plural::{PluralExpr, PluralForm, PluralForms};
pub use replace::{Replacement, Replacements};
pub use store::{CategoryStore, JsonStore, MemoryStore, StoreOptions, StoreRegistry};
pub use translated::Translated;
pub use translator::{KeySet, Translator};
