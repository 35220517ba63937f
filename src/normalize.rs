//! Conversion of raw category files into typed entries
//!
//! A category file is a JSON object. Each value is a plain string, an
//! array of plural variants, or (for keys prefixed with `-- `) an array of
//! list elements, each of them a string or an array of plural variants.
//! Strings of the form `#...#` are comments and are dropped.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::warn;

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^--\s(.*)").unwrap());
static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#.*#$").unwrap());

/// Raw category data as returned by a [`CategoryStore`](crate::store::CategoryStore)
pub type RawCategory = Map<String, Value>;

/// A normalized translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Plural variants; index 0 is the singular/default form
    Variants(Vec<String>),
    /// A list whose elements each carry their own plural variants
    List(Vec<Vec<String>>),
}

impl Entry {
    pub fn is_list(&self) -> bool {
        matches!(self, Entry::List(_))
    }
}

/// Normalized translations of one category, keyed by leaf name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Category(HashMap<String, Entry>);

impl Category {
    pub fn new() -> Self {
        Category(HashMap::new())
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: Entry) {
        self.0.insert(name.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Whether a string is a `#...#` comment
pub fn is_comment(text: &str) -> bool {
    COMMENT.is_match(text)
}

/// Normalize raw category data
pub fn normalize(raw: &RawCategory) -> Category {
    let mut category = Category::new();

    for (key, value) in raw {
        let (name, list) = match LIST_MARKER.captures(key) {
            Some(caps) => (caps[1].to_string(), true),
            None => (key.clone(), false),
        };

        let entry = match value {
            Value::String(text) if is_comment(text) => None,
            Value::String(text) => Some(Entry::Variants(vec![text.clone()])),
            Value::Array(items) => normalize_array(items, list),
            _ => {
                warn!(name = %name, "Skipping translation with unsupported shape");
                None
            }
        };

        if let Some(entry) = entry {
            category.insert(name, entry);
        }
    }

    category
}

fn normalize_array(items: &[Value], list: bool) -> Option<Entry> {
    let mut flat = Vec::new();
    let mut nested: Vec<Vec<String>> = Vec::new();
    let mut has_nested = false;

    for item in items {
        match item {
            Value::Array(variants) => {
                has_nested = true;
                nested.push(variants.iter().filter_map(variant_text).collect());
            }
            other => {
                if let Some(text) = variant_text(other) {
                    flat.push(text.clone());
                    nested.push(vec![text]);
                }
            }
        }
    }

    if list || has_nested {
        (!nested.is_empty()).then_some(Entry::List(nested))
    } else {
        (!flat.is_empty()).then_some(Entry::Variants(flat))
    }
}

/// Text of a single variant, or `None` for comments and non-text values
fn variant_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!is_comment(&text)).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawCategory {
        match value {
            Value::Object(map) => map,
            _ => panic!("test data must be an object"),
        }
    }

    #[test]
    fn test_string_becomes_single_variant() {
        let category = normalize(&raw(json!({ "title": "Hello" })));
        assert_eq!(
            category.get("title"),
            Some(&Entry::Variants(vec!["Hello".to_string()]))
        );
    }

    #[test]
    fn test_plural_variants_drop_comments() {
        let category = normalize(&raw(json!({
            "days": ["#days in calendar#", "den", "dny", "dní"]
        })));
        assert_eq!(
            category.get("days"),
            Some(&Entry::Variants(vec![
                "den".to_string(),
                "dny".to_string(),
                "dní".to_string()
            ]))
        );
    }

    #[test]
    fn test_list_marker() {
        let category = normalize(&raw(json!({
            "-- items": ["a", "#skip#", ["b", "bs", "#note#"], "c"]
        })));
        assert_eq!(category.get("-- items"), None);
        assert_eq!(category.names().collect::<Vec<_>>(), vec!["items"]);
        assert_eq!(
            category.get("items"),
            Some(&Entry::List(vec![
                vec!["a".to_string()],
                vec!["b".to_string(), "bs".to_string()],
                vec!["c".to_string()],
            ]))
        );
    }

    #[test]
    fn test_nested_arrays_make_a_list_without_marker() {
        let category = normalize(&raw(json!({
            "pairs": [["one", "ones"], ["two", "twos"]]
        })));
        assert!(category.get("pairs").is_some_and(Entry::is_list));
    }

    #[test]
    fn test_list_marker_with_string_value() {
        let category = normalize(&raw(json!({ "-- single": "only" })));
        assert_eq!(
            category.get("single"),
            Some(&Entry::Variants(vec!["only".to_string()]))
        );
    }

    #[test]
    fn test_unsupported_shapes_are_omitted() {
        let category = normalize(&raw(json!({
            "@metadata": { "authors": ["someone"] },
            "flag": true,
            "nothing": null,
            "comments": ["#only a comment#"],
            "#": "#file header#",
            "title": "Hello"
        })));
        assert_eq!(category.len(), 1);
        assert!(category.get("title").is_some());
    }

    #[test]
    fn test_numbers_are_stringified() {
        let category = normalize(&raw(json!({ "answer": [42] })));
        assert_eq!(
            category.get("answer"),
            Some(&Entry::Variants(vec!["42".to_string()]))
        );
    }

    #[test]
    fn test_comment_pattern() {
        assert!(is_comment("#todo#"));
        assert!(is_comment("##"));
        assert!(!is_comment("#hashtag"));
        assert!(!is_comment("a #b#"));
    }
}
