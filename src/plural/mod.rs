//! Plural form selection
//!
//! Every language maps to a plural expression over `n` whose value is the
//! zero-based index of the variant to use. A built-in table covers the
//! common gettext rule sets; languages outside the table fall back to the
//! ICU CLDR cardinal rules.

pub mod expr;

use icu_locale::Locale;
use icu_plurals::{PluralCategory, PluralRuleType, PluralRules};
use std::collections::HashMap;

pub use expr::PluralExpr;

use crate::error::{TranslatorError, TranslatorResult};
use crate::normalize::Entry;
use crate::translated::Translated;

const ONE_FORM: &str = "0";
const GERMANIC: &str = "n != 1";
const ROMANIC: &str = "n > 1";
const CZECH: &str = "(n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2";
const EAST_SLAVIC: &str =
    "(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)";

/// Built-in `(language, count, form)` table, following gettext conventions
const BUILTIN_FORMS: &[(&str, usize, &str)] = &[
    ("ja", 1, ONE_FORM),
    ("zh", 1, ONE_FORM),
    ("ko", 1, ONE_FORM),
    ("vi", 1, ONE_FORM),
    ("th", 1, ONE_FORM),
    ("id", 1, ONE_FORM),
    ("ms", 1, ONE_FORM),
    ("en", 2, GERMANIC),
    ("de", 2, GERMANIC),
    ("nl", 2, GERMANIC),
    ("sv", 2, GERMANIC),
    ("da", 2, GERMANIC),
    ("nb", 2, GERMANIC),
    ("nn", 2, GERMANIC),
    ("no", 2, GERMANIC),
    ("fi", 2, GERMANIC),
    ("et", 2, GERMANIC),
    ("it", 2, GERMANIC),
    ("es", 2, GERMANIC),
    ("pt", 2, GERMANIC),
    ("el", 2, GERMANIC),
    ("hu", 2, GERMANIC),
    ("bg", 2, GERMANIC),
    ("ca", 2, GERMANIC),
    ("eo", 2, GERMANIC),
    ("he", 2, GERMANIC),
    ("hi", 2, GERMANIC),
    ("sq", 2, GERMANIC),
    ("fr", 2, ROMANIC),
    ("pt-br", 2, ROMANIC),
    ("tr", 2, ROMANIC),
    ("cs", 3, CZECH),
    ("sk", 3, CZECH),
    (
        "pl",
        3,
        "(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)",
    ),
    ("ru", 3, EAST_SLAVIC),
    ("uk", 3, EAST_SLAVIC),
    ("be", 3, EAST_SLAVIC),
    ("sr", 3, EAST_SLAVIC),
    ("hr", 3, EAST_SLAVIC),
    ("bs", 3, EAST_SLAVIC),
    (
        "lt",
        3,
        "(n%10==1 && n%100!=11 ? 0 : n%10>=2 && (n%100<10 || n%100>=20) ? 1 : 2)",
    ),
    ("lv", 3, "(n%10==1 && n%100!=11 ? 0 : n != 0 ? 1 : 2)"),
    (
        "ro",
        3,
        "(n==1 ? 0 : (n==0 || (n%100 > 0 && n%100 < 20)) ? 1 : 2)",
    ),
    (
        "sl",
        4,
        "(n%100==1 ? 0 : n%100==2 ? 1 : n%100==3 || n%100==4 ? 2 : 3)",
    ),
    ("ga", 5, "n==1 ? 0 : n==2 ? 1 : n<7 ? 2 : n<11 ? 3 : 4"),
    (
        "ar",
        6,
        "n==0 ? 0 : n==1 ? 1 : n==2 ? 2 : n%100>=3 && n%100<=10 ? 3 : n%100>=11 ? 4 : 5",
    ),
    ("is", 2, "n%10!=1 || n%100==11"),
    ("mk", 2, "n==1 || n%10==1 ? 0 : 1"),
];

/// Plural rule for one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralForm {
    /// Number of variants the language distinguishes
    pub count: usize,
    pub expr: PluralExpr,
}

impl PluralForm {
    pub fn form(&self) -> &str {
        self.expr.source()
    }
}

/// Registry of plural rules keyed by language
#[derive(Debug, Clone, Default)]
pub struct PluralForms {
    forms: HashMap<String, PluralForm>,
}

impl PluralForms {
    /// An empty registry; languages resolve through the CLDR fallback only
    pub fn new() -> Self {
        PluralForms {
            forms: HashMap::new(),
        }
    }

    /// A registry pre-filled with the built-in table
    pub fn builtin() -> Self {
        let mut forms = PluralForms::new();
        for (language, count, form) in BUILTIN_FORMS {
            // The table is covered by tests; a bad row only loses that language
            if let Err(e) = forms.insert(language, *count, form) {
                tracing::error!("Built-in plural form rejected: {}", e);
            }
        }
        forms
    }

    /// Register or replace the rule for `language`
    pub fn insert(&mut self, language: &str, count: usize, form: &str) -> TranslatorResult<()> {
        let expr = PluralExpr::parse(form).map_err(|reason| TranslatorError::InvalidPluralForm {
            language: language.to_string(),
            form: form.to_string(),
            reason,
        })?;
        self.forms
            .insert(language.to_lowercase(), PluralForm { count, expr });
        Ok(())
    }

    /// Rule for `language`, trying the full tag first and then its primary subtag
    pub fn get(&self, language: &str) -> Option<&PluralForm> {
        let language = language.to_lowercase().replace('_', "-");
        self.forms.get(&language).or_else(|| {
            language
                .split_once('-')
                .and_then(|(primary, _)| self.forms.get(primary))
        })
    }

    /// Languages with a registered rule, lowercased
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.forms.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Zero-based variant index for `count` in `language`.
    ///
    /// `None` when the expression is undefined for `count` (or negative),
    /// or when no rule is known for the language.
    pub fn variant_index(&self, language: &str, count: i64) -> Option<usize> {
        match self.get(language) {
            Some(form) => form
                .expr
                .evaluate(count)
                .and_then(|index| usize::try_from(index).ok()),
            None => cldr_variant_index(language, count),
        }
    }

    /// Select the variant(s) of `entry` for `count`.
    ///
    /// Without a count, the first variant is used. An index the entry does
    /// not have also falls back to the first variant.
    pub fn pluralize(&self, entry: &Entry, count: Option<i64>, language: &str) -> Translated {
        let index = count.and_then(|count| self.variant_index(language, count));
        match entry {
            Entry::Variants(variants) => Translated::Text(select_variant(variants, index)),
            Entry::List(items) => Translated::List(
                items
                    .iter()
                    .map(|variants| select_variant(variants, index))
                    .collect(),
            ),
        }
    }
}

fn select_variant(variants: &[String], index: Option<usize>) -> String {
    index
        .and_then(|index| variants.get(index))
        .or_else(|| variants.first())
        .cloned()
        .unwrap_or_default()
}

const CLDR_ORDER: [PluralCategory; 6] = [
    PluralCategory::Zero,
    PluralCategory::One,
    PluralCategory::Two,
    PluralCategory::Few,
    PluralCategory::Many,
    PluralCategory::Other,
];

/// Variant index from the CLDR cardinal rules.
///
/// The index is the position of the count's category among the categories
/// the language uses for integers, in CLDR order (zero, one, two, few,
/// many, other). Those categories are found by classifying `0..=1000` and
/// one million. This matches the gettext ordering for most languages.
fn cldr_variant_index(language: &str, count: i64) -> Option<usize> {
    let locale: Locale = language.parse().ok()?;
    let rules = PluralRules::try_new(locale.into(), PluralRuleType::Cardinal.into()).ok()?;

    let mut seen = [false; CLDR_ORDER.len()];
    for value in (0..=1000usize).chain([1_000_000]) {
        let category = rules.category_for(value);
        if let Some(pos) = CLDR_ORDER.iter().position(|c| *c == category) {
            seen[pos] = true;
        }
    }
    let used: Vec<PluralCategory> = CLDR_ORDER
        .iter()
        .zip(seen)
        .filter(|(_, seen)| *seen)
        .map(|(category, _)| *category)
        .collect();

    let n = usize::try_from(count.unsigned_abs()).unwrap_or(usize::MAX);
    let actual = rules.category_for(n);
    used.iter().position(|category| *category == actual)
}
