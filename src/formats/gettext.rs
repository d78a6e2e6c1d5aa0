//! Gettext-style `.po` files.
//!
//! Entries are keyed by `msgid` holding the catalog key and `msgstr`
//! holding the translated value, with the usual quoted continuation lines.
//! Plural variants are not represented; plural definitions contribute
//! their `other` form.

use std::fmt::Write as _;
use std::io::BufRead;
use std::mem;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::{
    Catalog,
    Definition,
    ImportOptions,
    Section,
    TranslationValue,
};
use crate::formats::formatter::{
    FormatError,
    Formatter,
};
use crate::output::{
    OutputProjector,
    ProjectionOptions,
};

/// An extracted `#.` comment line.
#[allow(clippy::unwrap_used)]
static EXTRACTED_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#\.\s*(.*)$").unwrap());

/// A `msgid` directive with its quoted content.
#[allow(clippy::unwrap_used)]
static MSGID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^msgid\s+"(.*)"$"#).unwrap());

/// A `msgstr` directive with its quoted content.
#[allow(clippy::unwrap_used)]
static MSGSTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^msgstr\s+"(.*)"$"#).unwrap());

/// A bare quoted line continuing the previous directive.
#[allow(clippy::unwrap_used)]
static CONTINUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^"(.*)"$"#).unwrap());

/// The gettext `.po` format.
#[derive(Debug, Clone, Copy, Default)]
pub struct GettextFormatter;

impl GettextFormatter {
    /// Creates the formatter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Formatter for GettextFormatter {
    fn format_name(&self) -> &'static str {
        "gettext"
    }

    fn extension(&self) -> &'static str {
        "po"
    }

    fn default_file_name(&self) -> &'static str {
        "strings.po"
    }

    fn read(
        &self,
        reader: &mut dyn BufRead,
        language: &str,
        catalog: &mut Catalog,
        options: &ImportOptions,
    ) -> Result<(), FormatError> {
        let mut entry = Entry::default();
        let mut pending_comment: Option<String> = None;
        let mut target = Target::None;
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if let Some(captures) = EXTRACTED_COMMENT.captures(trimmed) {
                pending_comment =
                    Some(captures.get(1).map_or("", |found| found.as_str()).to_owned());
                continue;
            }
            if let Some(captures) = MSGID.captures(trimmed) {
                commit(catalog, language, options, mem::take(&mut entry));
                entry.key = Some(unescape(captures.get(1).map_or("", |found| found.as_str())));
                entry.comment = pending_comment.take();
                target = Target::Key;
                continue;
            }
            if let Some(captures) = MSGSTR.captures(trimmed) {
                entry.value = Some(unescape(captures.get(1).map_or("", |found| found.as_str())));
                target = Target::Value;
                continue;
            }
            if let Some(captures) = CONTINUATION.captures(trimmed) {
                let fragment = unescape(captures.get(1).map_or("", |found| found.as_str()));
                match target {
                    Target::Key => {
                        entry.key.get_or_insert_with(String::new).push_str(&fragment);
                    }
                    Target::Value => {
                        entry.value.get_or_insert_with(String::new).push_str(&fragment);
                    }
                    Target::None => {}
                }
            }
        }
        commit(catalog, language, options, entry);
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
        let base_language = projected.developer_language_code();
        let sections: Vec<String> = projected
            .sections()
            .iter()
            .filter_map(|section| render_section(section, language, base_language, &projected))
            .collect();
        let mut result = render_header(language);
        result.push('\n');
        result.push_str(&sections.join("\n"));
        Some(result)
    }
}

/// One PO entry being accumulated during a read.
#[derive(Default)]
struct Entry {
    /// Unescaped `msgid` content.
    key: Option<String>,
    /// Unescaped `msgstr` content.
    value: Option<String>,
    /// Extracted comment bound to the entry.
    comment: Option<String>,
}

/// Which buffer a bare continuation line extends.
#[derive(Clone, Copy)]
enum Target {
    /// No directive seen yet.
    None,
    /// The last directive was `msgid`.
    Key,
    /// The last directive was `msgstr`.
    Value,
}

/// Records a finished entry.
///
/// The file header has an empty `msgid` and falls out here, as does any
/// entry without a value.
fn commit(catalog: &mut Catalog, language: &str, options: &ImportOptions, entry: Entry) {
    let Entry { key, value, comment } = entry;
    let Some(key) = key.filter(|key| !key.is_empty()) else {
        return;
    };
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return;
    };
    catalog.set_translation_for_key(&key, language, TranslationValue::Scalar(value), options);
    if let Some(comment) = comment
        && !comment.is_empty()
        && !comment.starts_with("---------")
    {
        catalog.set_comment_for_key(&key, &comment, options);
    }
}

/// Decodes the `\"` escape inside quoted content.
fn unescape(text: &str) -> String {
    text.replace("\\\"", "\"")
}

/// Encodes quotes for quoted PO content.
fn escape_quotes(text: &str) -> String {
    text.replace('"', "\\\"")
}

/// Renders the PO header with its content-type stanza.
fn render_header(language: &str) -> String {
    let mut header = String::new();
    let _ = writeln!(header, "##");
    let _ = writeln!(header, " # Gettext Strings File");
    let _ = writeln!(
        header,
        " # Generated by {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    let _ = writeln!(header, " # Language: {language}");
    let _ = writeln!(header, "msgid \"\"");
    let _ = writeln!(header, "msgstr \"\"");
    let _ = write!(header, "\"Content-Type: text/plain; charset=UTF-8\\n\"");
    header
}

/// Renders one section with its banner, or `None` when nothing qualifies.
fn render_section(
    section: &Section,
    language: &str,
    base_language: Option<&str>,
    catalog: &Catalog,
) -> Option<String> {
    let blocks: Vec<String> = catalog
        .definitions_in(section)
        .filter_map(|definition| render_definition(definition, language, base_language, catalog))
        .collect();
    if blocks.is_empty() {
        return None;
    }
    let mut rendered = String::new();
    if !section.name().is_empty() {
        let _ = write!(rendered, "\n#--------- {} ---------#\n", section.name());
    }
    for block in blocks {
        rendered.push('\n');
        rendered.push_str(&block);
    }
    Some(rendered)
}

/// Renders one entry: comment, base translation, then msgid and msgstr.
fn render_definition(
    definition: &Definition,
    language: &str,
    base_language: Option<&str>,
    catalog: &Catalog,
) -> Option<String> {
    let value = definition.translation(language)?;
    let mut rendered = String::new();
    if let Some(comment) = definition.comment(catalog) {
        let _ = writeln!(rendered, "#. {}", escape_quotes(comment));
    }
    if let Some(base) = base_language.and_then(|code| definition.translation(code)) {
        let _ = writeln!(rendered, "# base translation: \"{base}\"");
    }
    let _ = writeln!(rendered, "msgid \"{}\"", escape_quotes(definition.key()));
    let _ = writeln!(rendered, "msgstr \"{}\"", escape_quotes(value));
    Some(rendered)
}
