//! Message key parsing
//!
//! A message key is a dotted path to a translation plus optional syntax
//! around it:
//!
//! ```text
//! :literal text:               ignored, returned as-is after replacements
//! cs|book.chapters.title       resolved in "cs" instead of the configured language
//! menu.items[2]                third element of a list entry
//! menu.title|truncate:5|upper  helpers applied left to right
//! ```
//!
//! The bare message `a.b.category.name` addresses the leaf `name` in
//! the category file `category` found under the path `a/b`.

use regex::Regex;
use std::sync::LazyLock;

static IGNORED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:(.*):$").unwrap());
static LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z-]+)\|(.*)$").unwrap());
static INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^|]*)\[([0-9]+)\]((?:\|.*)?)$").unwrap());

/// A helper invocation parsed from a `|name:arg:arg` suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperCall {
    pub name: String,
    pub args: Vec<String>,
}

impl HelperCall {
    /// Parse a single helper token such as `truncate:5` or `upper`
    pub fn parse(token: &str) -> Self {
        match token.split_once(':') {
            Some((name, rest)) => HelperCall {
                name: name.to_string(),
                args: rest.split(':').map(str::to_string).collect(),
            },
            None => HelperCall {
                name: token.to_string(),
                args: Vec::new(),
            },
        }
    }
}

/// A fully parsed message key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageKey {
    /// The key was wrapped in `:...:` and must not be looked up
    pub ignored: bool,
    /// Language from a `lang|` prefix
    pub language: Option<String>,
    /// The bare dotted message, without prefix, index or helpers
    pub message: String,
    pub path: String,
    pub category: String,
    pub name: String,
    /// Element of a list entry selected with `[N]`
    pub index: Option<usize>,
    pub helpers: Vec<HelperCall>,
}

impl MessageKey {
    /// Parse a raw key string.
    ///
    /// Parsing never fails: text that does not match one of the
    /// modifiers is kept as part of the bare message.
    pub fn parse(raw: &str) -> Self {
        if let Some(caps) = IGNORED.captures(raw) {
            return MessageKey {
                ignored: true,
                message: caps[1].to_string(),
                ..Default::default()
            };
        }

        let mut language = None;
        let mut rest = raw.to_string();
        if let Some(caps) = LANGUAGE.captures(raw) {
            language = Some(caps[1].to_string());
            rest = caps[2].to_string();
        }

        let mut index = None;
        if let Some(caps) = INDEX.captures(&rest) {
            // Digits that overflow usize cannot address any element
            index = Some(caps[2].parse::<usize>().unwrap_or(usize::MAX));
            rest = format!("{}{}", &caps[1], &caps[3]);
        }

        let mut tokens = rest.split('|');
        let message = tokens.next().unwrap_or_default().to_string();
        let helpers = tokens
            .filter(|token| !token.is_empty())
            .map(HelperCall::parse)
            .collect();

        let (path, category, name) = split_message(&message);

        MessageKey {
            ignored: false,
            language,
            message,
            path,
            category,
            name,
            index,
            helpers,
        }
    }

    /// Whether the bare message names both a category and a leaf
    pub fn is_addressable(&self) -> bool {
        !self.category.is_empty() && !self.name.is_empty()
    }
}

/// Split a dotted message into `(path, category, name)`.
///
/// The last segment is the name, the one before it the category and the
/// remaining segments form the path, joined with `/`.
pub fn split_message(message: &str) -> (String, String, String) {
    let Some((head, name)) = message.rsplit_once('.') else {
        return (String::new(), String::new(), message.to_string());
    };
    let (path, category) = match head.rsplit_once('.') {
        Some((path, category)) => (path.replace('.', "/"), category),
        None => (String::new(), head),
    };
    (path, category.to_string(), name.to_string())
}
