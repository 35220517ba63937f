use serde_json::Value;
use std::fmt;

/// The result of a translation: a single string, or one string per list element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translated {
    Text(String),
    List(Vec<String>),
}

impl Translated {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Translated::Text(text) => Some(text),
            Translated::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Translated::Text(_) => None,
            Translated::List(items) => Some(items),
        }
    }

    pub fn into_list(self) -> Option<Vec<String>> {
        match self {
            Translated::Text(_) => None,
            Translated::List(items) => Some(items),
        }
    }

    /// Apply `f` to every string
    pub fn map<F>(self, mut f: F) -> Self
    where
        F: FnMut(&str) -> String,
    {
        match self {
            Translated::Text(text) => Translated::Text(f(&text)),
            Translated::List(items) => Translated::List(items.iter().map(|item| f(item)).collect()),
        }
    }
}

impl fmt::Display for Translated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Translated::Text(text) => write!(f, "{}", text),
            Translated::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

impl PartialEq<&str> for Translated {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}

impl From<Translated> for Value {
    fn from(translated: Translated) -> Self {
        match translated {
            Translated::Text(text) => Value::String(text),
            Translated::List(items) => Value::Array(items.into_iter().map(Value::String).collect()),
        }
    }
}
