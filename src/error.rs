use std::path::PathBuf;

use thiserror::Error;

/// Error types for translation, storage and configuration
#[derive(Debug, Error)]
pub enum TranslatorError {
    /// `translate` was called without a configured language and the key has no `lang|` prefix
    #[error("no language set: configure one with set_language or prefix the key with `lang|`")]
    NoLanguageSet,
    /// An `[N]` index was used on an entry that is not a list
    #[error("translation '{key}' is not a list")]
    NotAList { key: String },
    /// An `[N]` index is out of range for the list entry
    #[error("index {index} not found in list '{key}'")]
    IndexNotFound { key: String, index: usize },
    /// Paired translations are not lists of the same length
    #[error("cannot pair '{keys}' with '{values}': {reason}")]
    ShapeMismatch {
        keys: String,
        values: String,
        reason: String,
    },
    /// A helper named in a key suffix is not registered
    #[error("helper '{0}' is not registered")]
    UnknownHelper(String),
    /// `remove_replacement` was called for a name that was never added
    #[error("replacement '{0}' was not found")]
    UnknownReplacement(String),
    /// A plural-form expression failed to compile
    #[error("invalid plural form '{form}' for language '{language}': {reason}")]
    InvalidPluralForm {
        language: String,
        form: String,
        reason: String,
    },
    /// No store factory is registered under this backend identifier
    #[error("storage backend '{0}' is not registered")]
    UnknownBackend(String),
    /// The translation directory does not exist
    #[error("directory '{}' does not exist", .0.display())]
    MissingDirectory(PathBuf),
    /// A backend needs a configuration option that was not provided
    #[error("backend '{backend}' requires the '{option}' option")]
    MissingOption {
        backend: String,
        option: &'static str,
    },
    /// Reading or writing a category file failed
    #[error("failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A category or configuration file is not valid JSON
    #[error("failed to parse JSON from '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A category file parsed, but its root is not an object
    #[error("invalid category data in '{location}': root must be an object")]
    InvalidCategory { location: String },
}

/// Result type for translator operations
pub type TranslatorResult<T> = Result<T, TranslatorError>;
