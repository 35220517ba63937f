//! Helper and filter registry
//!
//! Helpers are named transformations selected per key with a
//! `|name:arg:arg` suffix. Filters run on every translated string, in the
//! order they were added. Neither runs for keys that were not found.

use std::collections::HashMap;
use std::fmt;

use crate::error::{TranslatorError, TranslatorResult};
use crate::key::HelperCall;
use crate::translated::Translated;

/// A helper receives the current value and the arguments from the key suffix
pub type Helper = Box<dyn Fn(&str, &[String]) -> String + Send + Sync>;

/// A filter receives the current value only
pub type Filter = Box<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Default)]
pub struct Helpers {
    helpers: HashMap<String, Helper>,
    filters: Vec<Filter>,
}

impl fmt::Debug for Helpers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.helpers.keys().collect();
        names.sort();
        f.debug_struct("Helpers")
            .field("helpers", &names)
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl Helpers {
    pub fn new() -> Self {
        Helpers::default()
    }

    /// Register `helper` under `name`, replacing any previous one
    pub fn add_helper<F>(&mut self, name: &str, helper: F) -> &mut Self
    where
        F: Fn(&str, &[String]) -> String + Send + Sync + 'static,
    {
        self.helpers.insert(name.to_string(), Box::new(helper));
        self
    }

    pub fn remove_helper(&mut self, name: &str) -> Option<Helper> {
        self.helpers.remove(name)
    }

    pub fn has_helper(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub fn add_filter<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Run every filter, in registration order, over every string
    pub fn apply_filters(&self, value: Translated) -> Translated {
        self.filters
            .iter()
            .fold(value, |value, filter| value.map(|text| filter(text)))
    }

    /// Apply `calls` left to right
    pub fn apply_helpers(
        &self,
        value: Translated,
        calls: &[HelperCall],
    ) -> TranslatorResult<Translated> {
        let mut value = value;
        for call in calls {
            let helper = self
                .helpers
                .get(&call.name)
                .ok_or_else(|| TranslatorError::UnknownHelper(call.name.clone()))?;
            value = value.map(|text| helper(text, call.args.as_slice()));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truncate(value: &str, args: &[String]) -> String {
        let len = args
            .first()
            .and_then(|arg| arg.parse::<usize>().ok())
            .unwrap_or(usize::MAX);
        value.chars().take(len).collect()
    }

    #[test]
    fn test_helper_with_argument() {
        let mut helpers = Helpers::new();
        helpers.add_helper("truncate", truncate);
        let calls = vec![HelperCall::parse("truncate:5")];
        let result = helpers
            .apply_helpers(Translated::Text("hello world".to_string()), &calls)
            .unwrap();
        assert_eq!(result, "hello");
    }

    #[test]
    fn test_helpers_run_in_order() {
        let mut helpers = Helpers::new();
        helpers
            .add_helper("truncate", truncate)
            .add_helper("wrap", |value, args| {
                let open = args.first().map(String::as_str).unwrap_or("[");
                let close = args.get(1).map(String::as_str).unwrap_or("]");
                format!("{}{}{}", open, value, close)
            });
        let calls = vec![HelperCall::parse("wrap:<:>"), HelperCall::parse("truncate:3")];
        let result = helpers
            .apply_helpers(Translated::Text("abcdef".to_string()), &calls)
            .unwrap();
        assert_eq!(result, "<ab");
    }

    #[test]
    fn test_helpers_apply_to_list_items() {
        let mut helpers = Helpers::new();
        helpers.add_helper("upper", |value, _| value.to_uppercase());
        let result = helpers
            .apply_helpers(
                Translated::List(vec!["a".to_string(), "b".to_string()]),
                &[HelperCall::parse("upper")],
            )
            .unwrap();
        assert_eq!(result, Translated::List(vec!["A".to_string(), "B".to_string()]));
    }

    #[test]
    fn test_unknown_helper() {
        let helpers = Helpers::new();
        let err = helpers
            .apply_helpers(Translated::Text("x".to_string()), &[HelperCall::parse("nope:1")])
            .unwrap_err();
        assert!(matches!(err, TranslatorError::UnknownHelper(name) if name == "nope"));
    }

    #[test]
    fn test_filters_run_in_registration_order() {
        let mut helpers = Helpers::new();
        helpers
            .add_filter(|value| format!("{}!", value))
            .add_filter(|value| value.replace('!', "?"));
        assert_eq!(helpers.filter_count(), 2);
        assert_eq!(
            helpers.apply_filters(Translated::Text("hi".to_string())),
            "hi?"
        );
    }

    #[test]
    fn test_remove_helper() {
        let mut helpers = Helpers::new();
        helpers.add_helper("upper", |value, _| value.to_uppercase());
        assert!(helpers.has_helper("upper"));
        assert!(helpers.remove_helper("upper").is_some());
        assert!(!helpers.has_helper("upper"));
    }
}
