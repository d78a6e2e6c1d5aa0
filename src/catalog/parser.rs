//! Canonical text-format parser.
//!
//! The grammar is line oriented: `[[Section]]` headers, `[key]` definition
//! headers, and `name = value` pairs where `name` is either a reserved
//! attribute (`comment`, `tags`, `ref`) or a language code with an optional
//! `:pluralcategory` suffix.

use std::io::BufRead;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{
    Catalog,
    CatalogError,
    Definition,
    PluralCategory,
};

/// `[[Section Name]]`, empty names included.
#[allow(clippy::unwrap_used)]
static SECTION_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[\[(.*)\]\]$").unwrap());

/// `[key]`.
#[allow(clippy::unwrap_used)]
static DEFINITION_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[(.+)\]$").unwrap());

/// `name = value` with an optional `:pluralcategory` after the name.
#[allow(clippy::unwrap_used)]
static PAIR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:=]+)(?::([^=]+))?=(.*)$").unwrap());

/// Reads a whole catalog from `reader`.
///
/// `path` is only used to name the source in parse errors.
pub(super) fn parse<R: BufRead>(reader: R, path: Option<&Path>) -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::new();
    if let Some(path) = path {
        catalog.set_path(path);
    }

    let mut current_section: Option<usize> = None;
    let mut current_key: Option<String> = None;

    for (index, line) in reader.lines().enumerate() {
        let raw = line?;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(captures) = SECTION_LINE.captures(line) {
            let name = captures.get(1).map_or("", |m| m.as_str());
            current_section = Some(catalog.add_section(name));
            continue;
        }

        if let Some(captures) = DEFINITION_LINE.captures(line) {
            let key = captures.get(1).map_or("", |m| m.as_str());
            // Definitions before any section header land in an unnamed one.
            let section = *current_section.get_or_insert_with(|| catalog.add_section(""));
            catalog.add_definition(section, Definition::new(key));
            current_key = Some(key.to_owned());
            continue;
        }

        if let Some(captures) = PAIR_LINE.captures(line) {
            let Some(definition_key) = current_key.as_deref() else {
                return Err(parse_error(index + 1, line, path));
            };
            let attr = captures.get(1).map_or("", |m| m.as_str()).trim();
            let category = captures.get(2).map(|m| m.as_str().trim());
            let value = unquote(captures.get(3).map_or("", |m| m.as_str()).trim());
            apply_pair(&mut catalog, definition_key, attr, category, value, index + 1);
            continue;
        }

        return Err(parse_error(index + 1, line, path));
    }

    catalog.resolve_references();
    Ok(catalog)
}

/// Applies one `name = value` line to the definition it belongs to.
fn apply_pair(
    catalog: &mut Catalog,
    definition_key: &str,
    attr: &str,
    category: Option<&str>,
    value: &str,
    line_number: usize,
) {
    if !matches!(attr, "comment" | "tags" | "ref") {
        catalog.add_language_code(attr);
    }
    let Some(definition) = catalog.definition_mut(definition_key) else {
        return;
    };

    match attr {
        "comment" => definition.set_comment(value),
        "tags" => {
            let tags = if value.is_empty() {
                Vec::new()
            } else {
                value.split(',').map(str::to_owned).collect()
            };
            definition.set_tags(tags);
        }
        "ref" => definition.set_reference_key(value),
        lang => match category {
            None => definition.set_translation(lang, value),
            Some(name) => match PluralCategory::from_name(name) {
                // `other` doubles as the single value so that consumers
                // without plural support still see something.
                Some(PluralCategory::Other) => {
                    definition.set_translation(lang, value);
                    definition.set_plural_translation(lang, PluralCategory::Other, value);
                }
                Some(category) => definition.set_plural_translation(lang, category, value),
                None => {
                    tracing::warn!("Unknown plural category '{name}' on line {line_number}");
                }
            },
        },
    }
}

/// Strips one pair of wrapping backticks, the writer's escape for values
/// with meaningful leading or trailing characters.
fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('`') && value.ends_with('`') {
        value.get(1..value.len() - 1).unwrap_or(value)
    } else {
        value
    }
}

/// Builds the failure for a line matching no grammar shape.
fn parse_error(line_number: usize, line: &str, path: Option<&Path>) -> CatalogError {
    CatalogError::Parse {
        line_number,
        line: line.to_owned(),
        path: path.map(Path::to_path_buf),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    fn parse_text(text: &str) -> Catalog {
        parse(text.as_bytes(), None).unwrap()
    }

    #[rstest]
    fn parses_sections_definitions_and_attributes() {
        let catalog = parse_text(
            "[[General]]\n\
             \t[greeting]\n\
             \t\tcomment = the main greeting\n\
             \t\ttags = common,home\n\
             \t\ten = Hello\n\
             \t\tfr = Bonjour\n\
             \t[farewell]\n\
             \t\tref = greeting\n\
             \t\ten = Bye\n\
             \n\
             [[Cart]]\n\
             \t[cart_title]\n\
             \t\ten = Your cart\n",
        );

        assert_that!(catalog.sections(), len(eq(2)));
        assert_that!(catalog.sections()[0].name(), eq("General"));
        assert_that!(catalog.sections()[0].keys(), elements_are![eq("greeting"), eq("farewell")]);

        let greeting = catalog.definition("greeting").unwrap();
        assert_that!(greeting.raw_comment(), some(eq("the main greeting")));
        assert_that!(greeting.tags(), some(elements_are![eq("common"), eq("home")]));
        assert_that!(greeting.translation("en"), some(eq("Hello")));
        assert_that!(greeting.translation("fr"), some(eq("Bonjour")));

        let farewell = catalog.definition("farewell").unwrap();
        assert_that!(farewell.reference_key(), some(eq("greeting")));
        assert_that!(farewell.referenced(&catalog).unwrap().key(), eq("greeting"));
    }

    #[rstest]
    fn registers_languages_in_declaration_order() {
        let catalog = parse_text(
            "[[S]]\n\
             \t[k]\n\
             \t\tfr = Bonjour\n\
             \t\tde = Hallo\n\
             \t\ten = Hello\n",
        );

        // The first language seen stays pinned first; the rest sort.
        assert_that!(
            catalog.language_codes(),
            elements_are![eq("fr"), eq("de"), eq("en")]
        );
    }

    #[rstest]
    fn creates_unnamed_section_for_leading_definition() {
        let catalog = parse_text("[orphan]\n\ten = Hello\n");

        assert_that!(catalog.sections(), len(eq(1)));
        assert_that!(catalog.sections()[0].name(), eq(""));
        assert_that!(catalog.definition("orphan").unwrap().translation("en"), some(eq("Hello")));
    }

    #[rstest]
    fn parses_empty_section_header() {
        let catalog = parse_text("[[]]\n\t[k]\n\t\ten = Hello\n");

        assert_that!(catalog.sections()[0].name(), eq(""));
        assert_that!(catalog.definition("k"), some(anything()));
    }

    #[rstest]
    #[case::leading_space("`  padded`", "  padded")]
    #[case::trailing_space("`padded  `", "padded  ")]
    #[case::backtick_literal("``tick``", "`tick`")]
    #[case::not_quoted("plain", "plain")]
    #[case::single_backtick("`", "`")]
    fn strips_wrapping_backticks(#[case] raw: &str, #[case] expected: &str) {
        let text = format!("[[S]]\n\t[k]\n\t\ten = {raw}\n");
        let catalog = parse_text(&text);

        assert_that!(catalog.definition("k").unwrap().translation("en"), some(eq(expected)));
    }

    #[rstest]
    fn plural_other_sets_both_forms() {
        let catalog = parse_text(
            "[[S]]\n\
             \t[items]\n\
             \t\ten:one = 1 item\n\
             \t\ten:other = %d items\n",
        );

        let items = catalog.definition("items").unwrap();
        assert_that!(items.translation("en"), some(eq("%d items")));
        let forms = items.plural_forms("en").unwrap();
        assert_that!(forms.get(&PluralCategory::One), some(eq("1 item")));
        assert_that!(forms.get(&PluralCategory::Other), some(eq("%d items")));
        assert_that!(items.is_plural(), eq(true));
    }

    #[rstest]
    fn unknown_plural_category_is_skipped() {
        let catalog = parse_text(
            "[[S]]\n\
             \t[items]\n\
             \t\ten:plenty = lots\n\
             \t\ten = some\n",
        );

        let items = catalog.definition("items").unwrap();
        assert_that!(items.plural_forms("en"), none());
        assert_that!(items.translation("en"), some(eq("some")));
        // The language still registers even though the value was dropped.
        assert_that!(catalog.language_codes(), elements_are![eq("en")]);
    }

    #[rstest]
    fn duplicate_key_last_write_wins() {
        let catalog = parse_text(
            "[[S]]\n\
             \t[k]\n\
             \t\ten = first\n\
             \t[k]\n\
             \t\ten = second\n",
        );

        assert_that!(catalog.definition("k").unwrap().translation("en"), some(eq("second")));
    }

    #[rstest]
    fn resolves_forward_references() {
        let catalog = parse_text(
            "[[S]]\n\
             \t[alias]\n\
             \t\tref = later\n\
             \t[later]\n\
             \t\ten = Hello\n",
        );

        let alias = catalog.definition("alias").unwrap();
        assert_that!(alias.referenced(&catalog).unwrap().key(), eq("later"));
    }

    #[rstest]
    fn unresolved_reference_stays_silent() {
        let catalog = parse_text(
            "[[S]]\n\
             \t[alias]\n\
             \t\tref = missing\n",
        );

        let alias = catalog.definition("alias").unwrap();
        assert_that!(alias.reference_key(), some(eq("missing")));
        assert_that!(alias.referenced(&catalog), none());
    }

    #[rstest]
    fn malformed_line_names_position_and_content() {
        let result = parse("[[S]]\n\t[k]\n\t\tno equals sign here\n".as_bytes(), None);

        let error = result.unwrap_err();
        assert!(matches!(error, CatalogError::Parse { line_number: 3, path: None, .. }));
        assert_that!(
            error.to_string(),
            eq("Unable to parse line 3 of <input>: no equals sign here")
        );
    }

    #[rstest]
    fn value_line_before_any_definition_is_an_error() {
        let result = parse("[[S]]\n\t\ten = Hello\n".as_bytes(), None);

        let error = result.unwrap_err();
        assert!(matches!(error, CatalogError::Parse { line_number: 2, .. }));
    }
}
