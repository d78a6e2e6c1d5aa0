//! The capability contract platform formatters implement.

use std::fmt;
use std::io::BufRead;
use std::path::Path;

use thiserror::Error;

use crate::catalog::{
    Catalog,
    ImportOptions,
};
use crate::output::ProjectionOptions;

/// Failures while consuming a platform translation file.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The underlying stream failed while reading.
    #[error("Failed to read translation file: {0}")]
    Io(#[from] std::io::Error),
}

/// A platform string-file format that can feed and consume the catalog.
///
/// Writing always runs through the output projection first, so formatters
/// only ever see definitions that already carry a value for the requested
/// language.
pub trait Formatter: fmt::Debug {
    /// Identifier used to select the format explicitly.
    fn format_name(&self) -> &'static str;

    /// File extension the format produces, without the leading dot.
    fn extension(&self) -> &'static str;

    /// File name used when writing into a bare directory.
    fn default_file_name(&self) -> &'static str;

    /// Whether the format can represent plural variants natively.
    fn supports_plural(&self) -> bool {
        false
    }

    /// Imports translations for `language` from a platform file.
    ///
    /// # Errors
    ///
    /// Returns an error when the reader fails. Unrecognized lines are
    /// skipped, not rejected.
    fn read(
        &self,
        reader: &mut dyn BufRead,
        language: &str,
        catalog: &mut Catalog,
        options: &ImportOptions,
    ) -> Result<(), FormatError>;

    /// Renders the projected catalog for `language`, or `None` when the
    /// projection comes back empty.
    fn write(
        &self,
        language: &str,
        catalog: &Catalog,
        options: &ProjectionOptions,
    ) -> Option<String>;

    /// Relative output location for `language` under the format's layout.
    fn output_path_for_language(&self, language: &str, _catalog: &Catalog) -> String {
        language.to_owned()
    }

    /// Guesses which language a platform file at `path` holds.
    fn determine_language_given_path(&self, path: &Path, catalog: &Catalog) -> Option<String> {
        default_language_for_path(path, catalog)
    }
}

/// Registry of the formatters the crate ships with.
#[derive(Debug, Default)]
pub struct FormatterRegistry {
    /// Registered formatters in lookup order.
    formatters: Vec<Box<dyn Formatter>>,
}

impl FormatterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in formats.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(super::android::AndroidFormatter::new()));
        registry.register(Box::new(super::gettext::GettextFormatter::new()));
        registry
    }

    /// Adds a formatter to the registry.
    pub fn register(&mut self, formatter: Box<dyn Formatter>) {
        self.formatters.push(formatter);
    }

    /// Looks a formatter up by its name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&dyn Formatter> {
        self.iter().find(|formatter| formatter.format_name() == name)
    }

    /// Looks a formatter up by a file extension, without the leading dot.
    #[must_use]
    pub fn find_by_extension(&self, extension: &str) -> Option<&dyn Formatter> {
        self.iter().find(|formatter| formatter.extension() == extension)
    }

    /// Iterates the registered formatters in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Formatter> {
        self.formatters.iter().map(|formatter| &**formatter)
    }
}

/// Guesses a language from a file path by its stem or directory names.
///
/// The stem wins when it looks like a language code or matches a language the
/// catalog already declares; otherwise the nearest matching path segment is
/// used.
#[must_use]
pub fn default_language_for_path(path: &Path, catalog: &Catalog) -> Option<String> {
    if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
        && (is_language_code(stem) || catalog.language_codes().iter().any(|code| code == stem))
    {
        return Some(stem.to_owned());
    }
    path.components().rev().find_map(|component| {
        let segment = component.as_os_str().to_str()?;
        is_language_code(segment).then(|| segment.to_owned())
    })
}

/// Whether `text` looks like `xx` or `xx-YY`.
fn is_language_code(text: &str) -> bool {
    match text.as_bytes() {
        [a, b] => a.is_ascii_alphabetic() && b.is_ascii_alphabetic(),
        [a, b, b'-', c, d] => {
            a.is_ascii_alphabetic()
                && b.is_ascii_alphabetic()
                && c.is_ascii_alphabetic()
                && d.is_ascii_alphabetic()
        }
        _ => false,
    }
}
