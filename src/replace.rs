//! `%name%` placeholder substitution

use serde_json::Value;

/// Value substituted for a `%name%` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    Text(String),
    /// Leave `%name%` in place, for a later pass to fill in
    Keep,
}

impl From<&str> for Replacement {
    fn from(value: &str) -> Self {
        Replacement::Text(value.to_string())
    }
}

impl From<String> for Replacement {
    fn from(value: String) -> Self {
        Replacement::Text(value)
    }
}

macro_rules! replacement_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Replacement {
                fn from(value: $ty) -> Self {
                    Replacement::Text(value.to_string())
                }
            }
        )*
    };
}

replacement_from_number!(i32, i64, u32, u64, usize, f64);

/// `false` keeps the placeholder; `true` substitutes `1`
impl From<bool> for Replacement {
    fn from(value: bool) -> Self {
        if value {
            Replacement::Text("1".to_string())
        } else {
            Replacement::Keep
        }
    }
}

impl Replacement {
    /// Convert a JSON value. Arrays, objects and `null` have no textual form.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Replacement::Text(text.clone())),
            Value::Number(number) => Some(Replacement::Text(number.to_string())),
            Value::Bool(flag) => Some(Replacement::from(*flag)),
            _ => None,
        }
    }
}

/// Insertion-ordered placeholder table.
///
/// Inserting an existing name replaces its value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacements(Vec<(String, Replacement)>);

impl Replacements {
    pub fn new() -> Self {
        Replacements(Vec::new())
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<Replacement>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Replacement>) {
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Replacement> {
        let pos = self.0.iter().position(|(existing, _)| existing == name)?;
        Some(self.0.remove(pos).1)
    }

    pub fn get(&self, name: &str) -> Option<&Replacement> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Replacement)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// `args` merged over `base`; call-time values win
    pub fn merged(base: &Replacements, args: &Replacements) -> Replacements {
        let mut merged = base.clone();
        for (name, value) in args.iter() {
            merged.insert(name, value.clone());
        }
        merged
    }

    /// Replace every `%name%` in `text`, in table order
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (name, value) in self.iter() {
            if let Replacement::Text(value) = value {
                let placeholder = format!("%{}%", name);
                if result.contains(&placeholder) {
                    result = result.replace(&placeholder, value);
                }
            }
        }
        result
    }
}

impl<N: Into<String>, V: Into<Replacement>> FromIterator<(N, V)> for Replacements {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut replacements = Replacements::new();
        for (name, value) in iter {
            let name: String = name.into();
            replacements.insert(&name, value);
        }
        replacements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_replaces_all_occurrences() {
        let replacements = Replacements::new().with("name", "Anna");
        assert_eq!(
            replacements.apply("%name% and %name% meet %other%"),
            "Anna and Anna meet %other%"
        );
    }

    #[test]
    fn test_keep_leaves_placeholder() {
        let replacements = Replacements::new().with("name", false).with("n", 3);
        assert_eq!(replacements.apply("%name% has %n%"), "%name% has 3");
    }

    #[test]
    fn test_merge_call_args_win() {
        let base = Replacements::new().with("site", "Example").with("user", "guest");
        let args = Replacements::new().with("user", "anna").with("count", 2);
        let merged = Replacements::merged(&base, &args);
        let names: Vec<&str> = merged.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["site", "user", "count"]);
        assert_eq!(merged.get("user"), Some(&Replacement::from("anna")));
    }

    #[test]
    fn test_merge_can_defer_a_global() {
        let base = Replacements::new().with("user", "guest");
        let args = Replacements::new().with("user", false);
        assert_eq!(
            Replacements::merged(&base, &args).apply("hi %user%"),
            "hi %user%"
        );
    }

    #[test]
    fn test_order_matters_for_chained_placeholders() {
        let replacements = Replacements::new().with("a", "%b%").with("b", "x");
        assert_eq!(replacements.apply("%a%"), "x");
        let reversed = Replacements::new().with("b", "x").with("a", "%b%");
        assert_eq!(reversed.apply("%a%"), "%b%");
    }

    #[test]
    fn test_remove() {
        let mut replacements = Replacements::new().with("a", "1").with("b", "2");
        assert_eq!(replacements.remove("a"), Some(Replacement::from("1")));
        assert_eq!(replacements.remove("a"), None);
        assert_eq!(replacements.len(), 1);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(
            Replacement::from_json(&serde_json::json!(5)),
            Some(Replacement::from("5"))
        );
        assert_eq!(
            Replacement::from_json(&serde_json::json!(false)),
            Some(Replacement::Keep)
        );
        assert_eq!(Replacement::from_json(&serde_json::json!(null)), None);
    }

    #[test]
    fn test_collect() {
        let replacements: Replacements = vec![("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(replacements.apply("%a%%b%"), "12");
    }
}
