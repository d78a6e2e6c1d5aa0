//! Android `strings.xml` resource files.
//!
//! Reading is line oriented: string, plurals and comment elements are
//! recognized per line, which covers the files the writer produces as well
//! as hand-maintained resources with conventional formatting.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::BufRead;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::{
    Catalog,
    Definition,
    ImportOptions,
    PluralCategory,
    Section,
    TranslationValue,
};
use crate::formats::formatter::{
    FormatError,
    Formatter,
    default_language_for_path,
};
use crate::formats::placeholders;
use crate::output::{
    OutputProjector,
    ProjectionOptions,
};

/// A whole single-line XML comment.
#[allow(clippy::unwrap_used)]
static COMMENT_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<!--(.*?)-->$").unwrap());

/// A string resource opened and closed on one line.
#[allow(clippy::unwrap_used)]
static STRING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<string name="([^"]*)"[^>]*>(.*)</string>$"#).unwrap());

/// The opening of a string resource that continues on later lines.
#[allow(clippy::unwrap_used)]
static STRING_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<string name="([^"]*)"[^>]*>(.*)$"#).unwrap());

/// The opening of a plurals resource.
#[allow(clippy::unwrap_used)]
static PLURALS_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<plurals name="([^"]*)"[^>]*>$"#).unwrap());

/// A quantity item inside a plurals resource.
#[allow(clippy::unwrap_used)]
static ITEM_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<item quantity="([^"]*)"[^>]*>(.*)</item>$"#).unwrap());

/// An XML entity the reader decodes.
#[allow(clippy::unwrap_used)]
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:amp|lt|gt|quot|apos|#\d+|#x[0-9a-fA-F]+);").unwrap());

/// The literal `\u0020` sequence that encodes a significant space.
#[allow(clippy::unwrap_used)]
static SPACE_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\u0020").unwrap());

/// Leading or trailing spaces that would be dropped by the resource parser.
#[allow(clippy::unwrap_used)]
static PADDING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ +| +$").unwrap());

/// A CDATA opening or any other angle bracket.
#[allow(clippy::unwrap_used)]
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<!\[CDATA\[|<").unwrap());

/// A CDATA opening, a basic HTML-style tag, or any other angle bracket.
#[allow(clippy::unwrap_used)]
static ALLOWED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<!\[CDATA\[|</?(?:b|em|i|cite|dfn|big|small|font|tt|s|strike|del|u|super|sub|ul|li|br|div|span|p|a)\b|<",
    )
    .unwrap()
});

/// An `@package:type/name` resource reference or a bare `@`.
#[allow(clippy::unwrap_used)]
static RESOURCE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(?:[a-z.]+:)?[a-z+]+/[a-zA-Z_]+|@").unwrap());

/// A `values-xx` or `values-xx-rYY` resource directory name.
#[allow(clippy::unwrap_used)]
static VALUES_QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^values-([a-z]{2}(?:-r[a-z]{2})?)$").unwrap());

/// The uppercase region opening that Android writes as `-r`.
#[allow(clippy::unwrap_used)]
static REGION_QUALIFIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-(\p{Lu})").unwrap());

/// The Android string-resource format.
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidFormatter {
    /// Escape every angle bracket instead of allowing basic HTML tags.
    pub escape_all_tags: bool,
}

impl AndroidFormatter {
    /// Creates the formatter with basic HTML-style tags left intact.
    #[must_use]
    pub const fn new() -> Self {
        Self { escape_all_tags: false }
    }

    /// Renders one section's definitions, or `None` when nothing qualifies.
    fn render_section(
        &self,
        section: &Section,
        language: &str,
        catalog: &Catalog,
    ) -> Option<String> {
        let mut rendered = String::new();
        for definition in catalog.definitions_in(section) {
            let Some(block) = self.render_definition(definition, language, catalog) else {
                continue;
            };
            rendered.push('\n');
            rendered.push_str(&block);
        }
        (!rendered.is_empty()).then_some(rendered)
    }

    /// Renders a definition as a string or plurals resource.
    fn render_definition(
        &self,
        definition: &Definition,
        language: &str,
        catalog: &Catalog,
    ) -> Option<String> {
        let mut block = String::new();
        if let Some(comment) = definition.comment(catalog) {
            let _ = writeln!(block, "    <!-- {} -->", comment.replace("--", "\u{2014}"));
        }
        if self.supports_plural() && definition.is_plural() {
            let forms = definition.plural_forms(language)?;
            let _ = writeln!(block, "\t<plurals name=\"{}\">", definition.key());
            let items: Vec<String> = forms
                .iter()
                .map(|(category, value)| {
                    format!(
                        "\t  <item quantity=\"{category}\">{}</item>",
                        self.format_value(value)
                    )
                })
                .collect();
            block.push_str(&items.join("\n"));
            block.push_str("\n\t</plurals>");
        } else {
            let value = definition.translation(language)?;
            let _ = write!(
                block,
                "    <string name=\"{}\">{}</string>",
                definition.key(),
                self.format_value(value)
            );
        }
        Some(block)
    }

    /// Converts placeholders, escapes, and encodes significant padding.
    fn format_value(&self, value: &str) -> String {
        let converted = placeholders::convert_placeholders_to_android(value);
        let escaped = self.escape_value(&converted);
        PADDING
            .replace_all(&escaped, |captures: &regex::Captures<'_>| {
                let spaces = captures.get(0).map_or(0, |found| found.len());
                r"\u0020".repeat(spaces)
            })
            .into_owned()
    }

    /// Escapes quotes, ampersands, angle brackets and resource references.
    ///
    /// Angle brackets are escaped wholesale once the value carries a
    /// placeholder, since Android drops styling from formatted strings
    /// anyway; otherwise a small set of HTML-style tags passes through.
    fn escape_value(&self, value: &str) -> String {
        let value = value.replace('"', "\\\"").replace('\'', "\\'");
        let value = value.replace('&', "&amp;");
        let guard = if self.escape_all_tags || placeholders::placeholder_count(&value) > 0 {
            &*ANY_TAG
        } else {
            &*ALLOWED_TAG
        };
        let value = guard.replace_all(&value, |captures: &regex::Captures<'_>| {
            let matched = captures.get(0).map_or("", |found| found.as_str());
            if matched == "<" { "&lt;".to_owned() } else { matched.to_owned() }
        });
        RESOURCE_REFERENCE
            .replace_all(&value, |captures: &regex::Captures<'_>| {
                let matched = captures.get(0).map_or("", |found| found.as_str());
                if matched == "@" { "\\@".to_owned() } else { matched.to_owned() }
            })
            .into_owned()
    }
}

impl Formatter for AndroidFormatter {
    fn format_name(&self) -> &'static str {
        "android"
    }

    fn extension(&self) -> &'static str {
        "xml"
    }

    fn default_file_name(&self) -> &'static str {
        "strings.xml"
    }

    fn supports_plural(&self) -> bool {
        true
    }

    fn read(
        &self,
        reader: &mut dyn BufRead,
        language: &str,
        catalog: &mut Catalog,
        options: &ImportOptions,
    ) -> Result<(), FormatError> {
        let mut comment: Option<String> = None;
        let mut lines = reader.lines();
        while let Some(line) = lines.next() {
            let line = line?;
            let trimmed = line.trim();
            if let Some(captures) = COMMENT_LINE.captures(trimmed) {
                let body = captures.get(1).map_or("", |found| found.as_str());
                let content = collapse_whitespace(body);
                if !content.is_empty() && !content.starts_with("SECTION:") {
                    comment = Some(content);
                }
                continue;
            }
            if let Some(captures) = STRING_LINE.captures(trimmed) {
                let key = captures.get(1).map_or("", |found| found.as_str());
                let value = decode_value(captures.get(2).map_or("", |found| found.as_str()));
                catalog.set_translation_for_key(
                    key,
                    language,
                    TranslationValue::Scalar(value),
                    options,
                );
                if let Some(comment) = comment.take() {
                    catalog.set_comment_for_key(key, &comment, options);
                }
                continue;
            }
            if let Some(captures) = STRING_OPEN.captures(trimmed) {
                let key = captures.get(1).map_or("", |found| found.as_str()).to_owned();
                let mut value = captures.get(2).map_or("", |found| found.as_str()).to_owned();
                for continuation in lines.by_ref() {
                    let continuation = continuation?;
                    let rest = continuation.trim();
                    value.push('\n');
                    if let Some(tail) = rest.strip_suffix("</string>") {
                        value.push_str(tail);
                        break;
                    }
                    value.push_str(rest);
                }
                catalog.set_translation_for_key(
                    &key,
                    language,
                    TranslationValue::Scalar(decode_value(&value)),
                    options,
                );
                if let Some(comment) = comment.take() {
                    catalog.set_comment_for_key(&key, &comment, options);
                }
                continue;
            }
            if let Some(captures) = PLURALS_OPEN.captures(trimmed) {
                let key = captures.get(1).map_or("", |found| found.as_str()).to_owned();
                let mut forms = BTreeMap::new();
                for item_line in lines.by_ref() {
                    let item_line = item_line?;
                    let item = item_line.trim();
                    if item == "</plurals>" {
                        break;
                    }
                    let Some(item_captures) = ITEM_LINE.captures(item) else {
                        continue;
                    };
                    let quantity = item_captures.get(1).map_or("", |found| found.as_str());
                    if let Some(category) = PluralCategory::from_name(quantity) {
                        forms.insert(
                            category,
                            decode_value(item_captures.get(2).map_or("", |found| found.as_str())),
                        );
                    } else {
                        tracing::warn!("Unknown plural quantity '{quantity}' for '{key}'");
                    }
                }
                catalog.set_translation_for_key(
                    &key,
                    language,
                    TranslationValue::Plural(forms),
                    options,
                );
                comment = None;
            }
        }
        Ok(())
    }

    fn write(
        &self,
        language: &str,
        catalog: &Catalog,
        options: &ProjectionOptions,
    ) -> Option<String> {
        let projected = OutputProjector::new(catalog, options).process(language);
        if projected.is_empty() {
            return None;
        }
        let sections: Vec<String> = projected
            .sections()
            .iter()
            .filter_map(|section| self.render_section(section, language, &projected))
            .collect();
        let mut result = String::new();
        let _ = writeln!(result, "<?xml version=\"1.0\" encoding=\"utf-8\"?>");
        result.push_str("<resources>");
        result.push_str(&sections.join("\n"));
        result.push_str("\n</resources>\n");
        Some(result)
    }

    fn output_path_for_language(&self, language: &str, catalog: &Catalog) -> String {
        if catalog.developer_language_code() == Some(language) {
            return "values".to_owned();
        }
        REGION_QUALIFIER
            .replace_all(&format!("values-{language}"), "-r${1}")
            .into_owned()
    }

    fn determine_language_given_path(&self, path: &Path, catalog: &Catalog) -> Option<String> {
        for component in path.components() {
            let Some(segment) = component.as_os_str().to_str() else {
                continue;
            };
            if segment == "values" {
                let code = catalog.developer_language_code().unwrap_or("en");
                return Some(code.to_owned());
            }
            if let Some(captures) = VALUES_QUALIFIER.captures(segment) {
                let qualifier = captures.get(1).map_or("", |found| found.as_str());
                return Some(normalize_language_code(&qualifier.replacen("-r", "-", 1)));
            }
        }
        default_language_for_path(path, catalog)
    }
}

/// Decodes an Android resource value back into catalog syntax.
fn decode_value(raw: &str) -> String {
    let value = decode_entities(raw);
    let value = value.replace("\\'", "'").replace("\\\"", "\"");
    let value = placeholders::convert_placeholders_from_android(&value);
    let value = value.replace("\\@", "@");
    SPACE_LITERAL.replace_all(&value, " ").into_owned()
}

/// Decodes the XML entities the writer emits, plus character references.
fn decode_entities(raw: &str) -> String {
    ENTITY
        .replace_all(raw, |captures: &regex::Captures<'_>| {
            let entity = captures.get(0).map_or("", |found| found.as_str());
            match entity {
                "&amp;" => "&".to_owned(),
                "&lt;" => "<".to_owned(),
                "&gt;" => ">".to_owned(),
                "&quot;" => "\"".to_owned(),
                "&apos;" => "'".to_owned(),
                numeric => decode_character_reference(numeric)
                    .unwrap_or_else(|| numeric.to_owned()),
            }
        })
        .into_owned()
}

/// Decodes `&#34;` and `&#x22;` style character references.
fn decode_character_reference(entity: &str) -> Option<String> {
    let body = entity.strip_prefix("&#")?.strip_suffix(';')?;
    let code = match body.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => body.parse().ok()?,
    };
    char::from_u32(code).map(String::from)
}

/// Trims a comment and collapses interior whitespace runs.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes an Android locale qualifier to a catalog language code.
fn normalize_language_code(code: &str) -> String {
    match code {
        "zh" | "zh-CN" => "zh-Hans".to_owned(),
        "zh-HK" => "zh-Hant".to_owned(),
        "in" => "id".to_owned(),
        other => other.to_owned(),
    }
}
