//! Definition model: per-language values, plural forms, tags and references.

use std::collections::{
    BTreeMap,
    HashMap,
    HashSet,
};
use std::fmt;

use super::Catalog;

/// Grammatical-number buckets defined by the CLDR plural rules.
///
/// The variant order is the canonical serialization order for plural blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    /// Every category in canonical order.
    pub const ALL: [Self; 6] =
        [Self::Zero, Self::One, Self::Two, Self::Few, Self::Many, Self::Other];

    /// Parses the text-format name of a category.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "zero" => Some(Self::Zero),
            "one" => Some(Self::One),
            "two" => Some(Self::Two),
            "few" => Some(Self::Few),
            "many" => Some(Self::Many),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// The text-format name of the category.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved value for one language: a single string or a plural mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationValue {
    /// One form used for every quantity.
    Scalar(String),
    /// One form per grammatical-number category.
    Plural(BTreeMap<PluralCategory, String>),
}

impl TranslationValue {
    /// Whether the value carries plural forms.
    #[must_use]
    pub const fn is_plural(&self) -> bool {
        matches!(self, Self::Plural(_))
    }

    /// The scalar reading of the value (`other` for plural mappings).
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) => Some(text),
            Self::Plural(forms) => forms.get(&PluralCategory::Other).map(String::as_str),
        }
    }
}

/// One localizable string identity with per-language values.
///
/// A definition may alias another definition by key (`ref` in the text
/// format); the alias is resolved once the whole catalog is known, see
/// [`Catalog::resolve_references`].
#[derive(Debug, Clone)]
pub struct Definition {
    /// Unique identifier within a catalog. Immutable after creation.
    key: String,
    /// Own comment; [`Definition::comment`] falls back through references.
    comment: Option<String>,
    /// `None` (never set) is distinct from an explicitly empty list.
    tags: Option<Vec<String>>,
    /// Language code to single value.
    translations: HashMap<String, String>,
    /// Language code to plural forms, ordered by canonical category order.
    plural_translations: HashMap<String, BTreeMap<PluralCategory, String>>,
    /// Explicit plural marker used while plural data is still being imported.
    plural: bool,
    /// Alias target as declared in the source.
    reference_key: Option<String>,
    /// Alias target validated against the catalog store.
    reference: Option<String>,
}

impl Definition {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            comment: None,
            tags: None,
            translations: HashMap::new(),
            plural_translations: HashMap::new(),
            plural: false,
            reference_key: None,
            reference: None,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The definition's own comment, ignoring references.
    #[must_use]
    pub fn raw_comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// The effective comment: own comment, else the first one found along
    /// the reference chain.
    #[must_use]
    pub fn comment<'a>(&'a self, catalog: &'a Catalog) -> Option<&'a str> {
        let mut visited = HashSet::new();
        let mut current = self;
        loop {
            if let Some(comment) = current.comment.as_deref() {
                return Some(comment);
            }
            if !visited.insert(current.key.as_str()) {
                return None;
            }
            current = current.referenced(catalog)?;
        }
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = Some(comment.into());
    }

    #[must_use]
    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = Some(tags);
    }

    /// The alias target as declared, whether or not it resolved.
    #[must_use]
    pub fn reference_key(&self) -> Option<&str> {
        self.reference_key.as_deref()
    }

    pub fn set_reference_key(&mut self, key: impl Into<String>) {
        self.reference_key = Some(key.into());
    }

    /// Records the outcome of the post-parse resolution pass.
    pub(crate) fn set_resolved_reference(&mut self, key: Option<String>) {
        self.reference = key;
    }

    /// The definition this one aliases, if the alias resolved.
    #[must_use]
    pub fn referenced<'a>(&self, catalog: &'a Catalog) -> Option<&'a Definition> {
        self.reference.as_deref().and_then(|key| catalog.definition(key))
    }

    #[must_use]
    pub fn translation(&self, lang: &str) -> Option<&str> {
        self.translations.get(lang).map(String::as_str)
    }

    pub fn set_translation(&mut self, lang: impl Into<String>, value: impl Into<String>) {
        self.translations.insert(lang.into(), value.into());
    }

    /// The recorded plural forms for `lang`, if any.
    #[must_use]
    pub fn plural_forms(&self, lang: &str) -> Option<&BTreeMap<PluralCategory, String>> {
        self.plural_translations.get(lang)
    }

    pub fn set_plural_translation(
        &mut self,
        lang: impl Into<String>,
        category: PluralCategory,
        value: impl Into<String>,
    ) {
        self.plural_translations.entry(lang.into()).or_default().insert(category, value.into());
    }

    /// Replaces every plural form recorded for `lang`.
    pub fn set_plural_forms(
        &mut self,
        lang: impl Into<String>,
        forms: BTreeMap<PluralCategory, String>,
    ) {
        self.plural_translations.insert(lang.into(), forms);
    }

    pub fn set_plural(&mut self, plural: bool) {
        self.plural = plural;
    }

    /// Whether this definition carries plural forms.
    ///
    /// Recorded forms always count; the explicit marker only matters while
    /// plural data is still being imported.
    #[must_use]
    pub fn is_plural(&self) -> bool {
        self.plural || !self.plural_translations.is_empty()
    }

    /// Merges an imported value for `lang` into this definition.
    pub(crate) fn apply_value(&mut self, lang: &str, value: TranslationValue) {
        match value {
            TranslationValue::Scalar(text) => {
                self.translations.insert(lang.to_owned(), text);
            }
            TranslationValue::Plural(forms) => {
                self.plural = true;
                self.plural_translations.insert(lang.to_owned(), forms);
            }
        }
    }

    /// Resolved value for `lang`, following the reference chain.
    ///
    /// Plural forms win over the single value when both exist for `lang`.
    #[must_use]
    pub fn translation_for_lang(&self, lang: &str, catalog: &Catalog) -> Option<TranslationValue> {
        self.resolve_translation(&[lang], true, catalog, &mut HashSet::new())
    }

    /// First value present among `candidates`, in order.
    ///
    /// Fallback candidates only consult single values, never plural forms.
    #[must_use]
    pub fn translation_for_fallbacks(
        &self,
        candidates: &[&str],
        catalog: &Catalog,
    ) -> Option<TranslationValue> {
        self.resolve_translation(candidates, false, catalog, &mut HashSet::new())
    }

    /// Shared lookup behind [`Definition::translation_for_lang`] and
    /// [`Definition::translation_for_fallbacks`].
    fn resolve_translation<'a>(
        &'a self,
        candidates: &[&str],
        plural_priority: bool,
        catalog: &'a Catalog,
        visited: &mut HashSet<&'a str>,
    ) -> Option<TranslationValue> {
        if plural_priority
            && let Some(lang) = candidates.first()
            && let Some(forms) = self.plural_translations.get(*lang)
        {
            return Some(TranslationValue::Plural(forms.clone()));
        }

        for lang in candidates {
            if let Some(value) = self.translations.get(*lang) {
                return Some(TranslationValue::Scalar(value.clone()));
            }
        }

        // Cyclic alias declarations stop at the first repeated key.
        visited.insert(self.key.as_str());
        let target = self.referenced(catalog)?;
        if visited.contains(target.key()) {
            return None;
        }
        target.resolve_translation(candidates, plural_priority, catalog, visited)
    }

    /// Evaluates the tag filter for this definition.
    ///
    /// `requested` is a list of OR-groups; every group must be satisfied. A
    /// group passes when one of its plain tags is present, or one of its
    /// `~`-negated tags is absent. Definitions that never had tags set defer
    /// to their reference; explicitly empty tags only pass with
    /// `include_untagged`.
    #[must_use]
    pub fn matches_tags(
        &self,
        requested: Option<&[Vec<String>]>,
        include_untagged: bool,
        catalog: &Catalog,
    ) -> bool {
        let Some(groups) = requested.filter(|groups| !groups.is_empty()) else {
            return true;
        };
        self.matches_tag_groups(groups, include_untagged, catalog, &mut HashSet::new())
    }

    /// Tag evaluation with the reference-deferral cycle guard threaded through.
    fn matches_tag_groups<'a>(
        &'a self,
        groups: &[Vec<String>],
        include_untagged: bool,
        catalog: &'a Catalog,
        visited: &mut HashSet<&'a str>,
    ) -> bool {
        match self.tags.as_deref() {
            None => {
                visited.insert(self.key.as_str());
                match self.referenced(catalog) {
                    Some(target) if !visited.contains(target.key()) => {
                        target.matches_tag_groups(groups, include_untagged, catalog, visited)
                    }
                    _ => include_untagged,
                }
            }
            Some([]) => include_untagged,
            Some(tags) => groups.iter().all(|group| group_matches(group, tags)),
        }
    }
}

/// One OR-group passes when a plain tag is present or a `~`-negated tag is
/// absent from the definition's own tags.
fn group_matches(group: &[String], tags: &[String]) -> bool {
    let plain_hit = group
        .iter()
        .filter(|tag| !tag.starts_with('~'))
        .any(|tag| tags.contains(tag));
    let negated_hit = group
        .iter()
        .filter_map(|tag| tag.strip_prefix('~'))
        .any(|tag| !tags.iter().any(|own| own == tag));
    plain_hit || negated_hit
}
