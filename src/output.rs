//! Output projection: the single-language view of a catalog.
//!
//! A projection applies tag filtering, resolves each definition's value for
//! the requested language with fallback languages, and merges plural data so
//! formatters can render the result without re-running any of that logic.

use serde::{
    Deserialize,
    Serialize,
};

use crate::catalog::{
    Catalog,
    Definition,
    PluralCategory,
    TranslationValue,
};

/// Restricts a projection to one side of the translated/untranslated split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeFilter {
    /// Only keys that already have a value for the requested language.
    Translated,
    /// Only keys missing a value for the requested language.
    Untranslated,
}

/// Options shared by every projection from one catalog.
#[derive(Debug, Clone, Default)]
pub struct ProjectionOptions {
    /// Tag OR-groups; every group must pass. `None` disables filtering.
    pub tags: Option<Vec<Vec<String>>>,
    /// Whether definitions without tags pass the filter.
    pub include_untagged: bool,
    /// Restricts output to translated or untranslated keys.
    pub include: Option<IncludeFilter>,
    /// Overrides the catalog's developer language as the final fallback.
    pub developer_language: Option<String>,
}

/// Projects single-language views out of a catalog.
#[derive(Debug, Clone, Copy)]
pub struct OutputProjector<'a> {
    /// Source catalog, never mutated by projection.
    catalog: &'a Catalog,
    /// Options applied to every processed language.
    options: &'a ProjectionOptions,
}

impl<'a> OutputProjector<'a> {
    #[must_use]
    pub const fn new(catalog: &'a Catalog, options: &'a ProjectionOptions) -> Self {
        Self { catalog, options }
    }

    /// The last-resort fallback language for every projection.
    #[must_use]
    pub fn default_language(&self) -> Option<&str> {
        self.options
            .developer_language
            .as_deref()
            .or_else(|| self.catalog.developer_language_code())
    }

    /// Builds the reduced catalog for `language`.
    ///
    /// Section order and names are preserved, including sections left empty
    /// by filtering; formatters drop those at render time. The result's
    /// language codes are copied from the source verbatim.
    #[must_use]
    pub fn process(&self, language: &str) -> Catalog {
        let mut result = Catalog::new();
        result.set_language_codes(self.catalog.language_codes().to_vec());

        for section in self.catalog.sections() {
            let index = result.add_section(section.name());
            for definition in self.catalog.definitions_in(section) {
                let tags = self.options.tags.as_deref();
                if !definition.matches_tags(tags, self.options.include_untagged, self.catalog) {
                    continue;
                }

                let mut value = definition.translation_for_lang(language, self.catalog);
                if value.is_some() && self.options.include == Some(IncludeFilter::Untranslated) {
                    continue;
                }
                if value.is_none() && self.options.include != Some(IncludeFilter::Translated) {
                    let candidates = self.fallback_candidates(language);
                    value = definition.translation_for_fallbacks(&candidates, self.catalog);
                }
                let Some(value) = value else {
                    continue;
                };

                result.add_definition(index, project_definition(definition, language, &value));
            }
        }
        result
    }

    /// Languages tried, in order, when `language` itself has no value.
    fn fallback_candidates(&self, language: &str) -> Vec<&str> {
        pre_fallback(language).into_iter().chain(self.default_language()).collect()
    }
}

/// Script-matched sibling tried before the default language.
fn pre_fallback(language: &str) -> Option<&'static str> {
    match language {
        "zh-CN" => Some("zh-Hans"),
        "zh-TW" => Some("zh-Hant"),
        _ => None,
    }
}

/// Clones `definition` with `value` recorded under `language`.
///
/// Plural definitions are guaranteed an `other` form for `language`, so
/// plural-aware formats always have a usable fallback form.
fn project_definition(
    definition: &Definition,
    language: &str,
    value: &TranslationValue,
) -> Definition {
    let mut projected = definition.clone();
    match value {
        TranslationValue::Scalar(text) => projected.set_translation(language, text.clone()),
        TranslationValue::Plural(forms) => {
            projected.set_plural_forms(language, forms.clone());
            if let Some(other) = forms.get(&PluralCategory::Other) {
                projected.set_translation(language, other.clone());
            }
        }
    }

    if projected.is_plural() {
        let has_other = projected
            .plural_forms(language)
            .is_some_and(|forms| forms.contains_key(&PluralCategory::Other));
        let scalar = value
            .as_scalar()
            .map(str::to_owned)
            .or_else(|| projected.translation(language).map(str::to_owned));
        if !has_other && let Some(scalar) = scalar {
            projected.set_plural_translation(language, PluralCategory::Other, scalar);
        }
    }
    projected
}
