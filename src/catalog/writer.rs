//! Canonical text-format writer.
//!
//! Sections and definitions serialize in stored order. Language codes are
//! fully sorted at write time, unlike the sticky-first order the rest of the
//! crate uses. Values are re-quoted so the parser's backtick stripping
//! round-trips exactly.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt::Write as _;

use super::{
    Catalog,
    Definition,
};

/// Value prefix that aliases another key in the same catalog.
const STRING_REFERENCE_PREFIX: &str = "@string/";

/// Serializes `catalog` into the canonical text format.
pub(super) fn render(catalog: &Catalog) -> String {
    let mut languages: Vec<&str> = catalog.language_codes().iter().map(String::as_str).collect();
    languages.sort_unstable();

    let mut out = String::new();
    for section in catalog.sections() {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "[[{}]]", section.name());
        for key in section.keys() {
            if let Some(definition) = catalog.definition(key) {
                render_definition(&mut out, definition, &languages, catalog);
            }
        }
    }
    out
}

/// Emits one `\t[key]` block: annotations once, then values per language.
fn render_definition(
    out: &mut String,
    definition: &Definition,
    languages: &[&str],
    catalog: &Catalog,
) {
    let _ = writeln!(out, "\t[{}]", definition.key());

    if let Some(reference_key) = definition.reference_key() {
        let _ = writeln!(out, "\t\tref = {reference_key}");
    }
    if let Some(tags) = definition.tags()
        && !tags.is_empty()
    {
        let _ = writeln!(out, "\t\ttags = {}", tags.join(","));
    }
    if let Some(comment) = definition.raw_comment()
        && !comment.is_empty()
    {
        let _ = writeln!(out, "\t\tcomment = {comment}");
    }

    for lang in languages {
        if let Some(forms) = definition.plural_forms(lang) {
            for (category, value) in forms {
                let _ = writeln!(out, "\t\t{lang}:{category} = {}", quote(value));
            }
        } else if let Some(value) = resolve_value(definition, lang, catalog) {
            let _ = writeln!(out, "\t\t{lang} = {}", quote(value));
        } else if definition.reference_key().is_none() {
            tracing::warn!("'{}' has no value for language '{lang}'", definition.key());
        }
    }
}

/// The emittable value for `lang`, flattening `@string/` aliases embedded in
/// the value itself.
///
/// A chain that dead-ends or cycles falls back to the last raw value, so
/// unresolvable aliases survive re-serialization unchanged.
fn resolve_value<'a>(
    definition: &'a Definition,
    lang: &str,
    catalog: &'a Catalog,
) -> Option<&'a str> {
    let mut visited = HashSet::new();
    let mut current = definition.translation(lang)?;
    loop {
        let Some(target_key) = current.strip_prefix(STRING_REFERENCE_PREFIX) else {
            return Some(current);
        };
        if !visited.insert(target_key) {
            return Some(current);
        }
        let Some(next) =
            catalog.definition(target_key).and_then(|target| target.translation(lang))
        else {
            return Some(current);
        };
        current = next;
    }
}

/// Wraps values whose leading or trailing characters the parser would
/// otherwise trim or strip.
fn quote(value: &str) -> Cow<'_, str> {
    let backtick_pair = value.starts_with('`') && value.ends_with('`');
    if value.starts_with(' ') || value.ends_with(' ') || backtick_pair {
        Cow::Owned(format!("`{value}`"))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::super::PluralCategory;
    use super::*;

    fn catalog_from(text: &str) -> Catalog {
        Catalog::from_reader(text.as_bytes()).unwrap()
    }

    #[rstest]
    fn renders_annotations_once_then_sorted_languages() {
        let mut catalog = Catalog::new();
        let section = catalog.add_section("General");
        let mut greeting = Definition::new("greeting");
        greeting.set_comment("the main greeting");
        greeting.set_tags(vec!["common".to_owned(), "home".to_owned()]);
        greeting.set_translation("fr", "Bonjour");
        greeting.set_translation("en", "Hello");
        catalog.add_definition(section, greeting);
        catalog.add_language_code("fr");
        catalog.add_language_code("en");

        assert_that!(
            render(&catalog),
            eq("[[General]]\n\
                \t[greeting]\n\
                \t\ttags = common,home\n\
                \t\tcomment = the main greeting\n\
                \t\ten = Hello\n\
                \t\tfr = Bonjour\n")
        );
    }

    #[rstest]
    fn separates_sections_with_blank_lines() {
        let mut catalog = Catalog::new();
        let first = catalog.add_section("First");
        let second = catalog.add_section("Second");
        let mut a = Definition::new("a");
        a.set_translation("en", "A");
        catalog.add_definition(first, a);
        let mut b = Definition::new("b");
        b.set_translation("en", "B");
        catalog.add_definition(second, b);
        catalog.add_language_code("en");

        assert_that!(
            render(&catalog),
            eq("[[First]]\n\t[a]\n\t\ten = A\n\n[[Second]]\n\t[b]\n\t\ten = B\n")
        );
    }

    #[rstest]
    fn emits_plural_forms_in_category_order() {
        let mut catalog = Catalog::new();
        let section = catalog.add_section("S");
        let mut items = Definition::new("items");
        items.set_plural_translation("en", PluralCategory::Other, "%d items");
        items.set_plural_translation("en", PluralCategory::One, "1 item");
        items.set_translation("en", "%d items");
        catalog.add_definition(section, items);
        catalog.add_language_code("en");

        // Plural forms replace the single value for that language.
        assert_that!(
            render(&catalog),
            eq("[[S]]\n\t[items]\n\t\ten:one = 1 item\n\t\ten:other = %d items\n")
        );
    }

    #[rstest]
    #[case::leading_space("  padded", "`  padded`")]
    #[case::trailing_space("padded ", "`padded `")]
    #[case::backtick_pair("`tick`", "``tick``")]
    #[case::lone_backtick("`", "```")]
    #[case::plain("plain", "plain")]
    #[case::inner_backtick("a`b", "a`b")]
    fn quotes_values_the_parser_would_mangle(#[case] value: &str, #[case] expected: &str) {
        assert_that!(quote(value).as_ref(), eq(expected));
    }

    #[rstest]
    fn quotes_plural_values_too() {
        let mut catalog = Catalog::new();
        let section = catalog.add_section("S");
        let mut items = Definition::new("items");
        items.set_plural_translation("en", PluralCategory::One, " 1 item ");
        catalog.add_definition(section, items);
        catalog.add_language_code("en");

        assert_that!(render(&catalog), eq("[[S]]\n\t[items]\n\t\ten:one = ` 1 item `\n"));
    }

    #[rstest]
    fn flattens_string_reference_values() {
        let catalog = catalog_from(
            "[[S]]\n\
             \t[color_primary]\n\
             \t\ten = Blue\n\
             \t[button_color]\n\
             \t\ten = @string/color_primary\n",
        );

        assert_that!(
            render(&catalog),
            eq("[[S]]\n\
                \t[color_primary]\n\
                \t\ten = Blue\n\
                \t[button_color]\n\
                \t\ten = Blue\n")
        );
    }

    #[rstest]
    fn follows_string_reference_chains_across_sections() {
        let catalog = catalog_from(
            "[[A]]\n\
             \t[first]\n\
             \t\ten = @string/second\n\
             \n\
             [[B]]\n\
             \t[second]\n\
             \t\ten = @string/third\n\
             \t[third]\n\
             \t\ten = X\n",
        );

        let text = render(&catalog);

        assert_that!(text, contains_substring("\t[first]\n\t\ten = X\n"));
        assert_that!(text, contains_substring("\t[second]\n\t\ten = X\n"));
    }

    #[rstest]
    #[case::dead_end("[[S]]\n\t[k]\n\t\ten = @string/missing\n", "@string/missing")]
    #[case::mid_string("[[S]]\n\t[k]\n\t\ten = see @string/k2\n", "see @string/k2")]
    fn unresolvable_string_references_stay_raw(#[case] text: &str, #[case] expected: &str) {
        let catalog = catalog_from(text);

        assert_that!(render(&catalog), contains_substring(format!("\t\ten = {expected}\n")));
    }

    #[rstest]
    fn cyclic_string_references_stay_raw() {
        let catalog = catalog_from(
            "[[S]]\n\
             \t[a]\n\
             \t\ten = @string/b\n\
             \t[b]\n\
             \t\ten = @string/a\n",
        );

        let text = render(&catalog);

        assert_that!(text, contains_substring("\t[a]\n\t\ten = @string/b\n"));
        assert_that!(text, contains_substring("\t[b]\n\t\ten = @string/a\n"));
    }

    #[rstest]
    fn round_trip_is_byte_stable() {
        let text = "[[General]]\n\
                    \t[greeting]\n\
                    \t\ttags = common,home\n\
                    \t\tcomment = hi\n\
                    \t\ten = Hello\n\
                    \t\tfr = `Bonjour `\n\
                    \t[farewell]\n\
                    \t\tref = greeting\n\
                    \n\
                    [[Cart]]\n\
                    \t[items]\n\
                    \t\ten:one = 1 item\n\
                    \t\ten:other = %d items\n";

        let first = render(&catalog_from(text));
        let second = render(&catalog_from(&first));

        assert_that!(first, eq(text));
        assert_that!(second, eq(first.as_str()));
    }
}
