//! Catalog store: ordered sections over a key-indexed definition map.

use std::collections::HashMap;
use std::fs::{
    self,
    File,
};
use std::io::{
    BufRead,
    BufReader,
};
use std::path::{
    Path,
    PathBuf,
};

use super::definition::{
    Definition,
    TranslationValue,
};
use super::error::CatalogError;
use super::{
    parser,
    writer,
};

/// Section name used for definitions created by `consume_all` imports.
const UNCATEGORIZED_SECTION: &str = "Uncategorized";

/// A named grouping of definition keys, preserving source order.
///
/// Sections only hold keys; the definitions themselves live in the catalog's
/// key index, so a key declared twice shows up in every declaring section but
/// has a single merged definition.
#[derive(Debug, Clone, Default)]
pub struct Section {
    /// May be empty, serialized as `[[]]`.
    name: String,
    /// Keys in declaration order, duplicates included.
    keys: Vec<String>,
}

impl Section {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

/// Options controlling how platform-format imports merge into a catalog.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Create definitions for unknown keys instead of warning about them.
    pub consume_all: bool,
    /// Import comments alongside values.
    pub consume_comments: bool,
    /// Tags applied to definitions created through `consume_all`.
    pub tags: Vec<String>,
}

/// The source-of-truth string catalog.
///
/// Populated either in bulk from the canonical text format or incrementally
/// through the import upserts. Definitions are never deleted once created.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Sections in source order.
    sections: Vec<Section>,
    /// Key index owning every definition.
    definitions: HashMap<String, Definition>,
    /// Known language codes; index 0 is the developer language, the rest
    /// stay lexicographically sorted.
    language_codes: Vec<String>,
    /// Where the catalog was read from, when it came from disk.
    path: Option<PathBuf>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a catalog from the canonical text format on disk.
    ///
    /// # Errors
    ///
    /// Fails when `path` is not a file, on read errors, and on lines
    /// matching no grammar shape.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        if !path.is_file() {
            return Err(CatalogError::FileNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        parser::parse(BufReader::new(file), Some(path))
    }

    /// Reads a catalog from any canonical-format stream.
    ///
    /// # Errors
    ///
    /// Fails on read errors and on lines matching no grammar shape.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, CatalogError> {
        parser::parse(reader, None)
    }

    /// Serializes the catalog into the canonical text format.
    #[must_use]
    pub fn to_text(&self) -> String {
        writer::render(self)
    }

    /// Writes the canonical text format to `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be written.
    pub fn write_to_file(&self, path: &Path) -> Result<(), CatalogError> {
        fs::write(path, self.to_text())?;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Appends a new section and returns its index.
    pub fn add_section(&mut self, name: impl Into<String>) -> usize {
        self.sections.push(Section { name: name.into(), keys: Vec::new() });
        self.sections.len() - 1
    }

    /// Registers `definition` under the section at `section` and in the key
    /// index. An existing definition with the same key is replaced.
    pub fn add_definition(&mut self, section: usize, definition: Definition) {
        if let Some(section) = self.sections.get_mut(section) {
            section.keys.push(definition.key().to_owned());
        }
        self.definitions.insert(definition.key().to_owned(), definition);
    }

    #[must_use]
    pub fn definition(&self, key: &str) -> Option<&Definition> {
        self.definitions.get(key)
    }

    pub fn definition_mut(&mut self, key: &str) -> Option<&mut Definition> {
        self.definitions.get_mut(key)
    }

    /// Whether the catalog holds any definitions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// The definitions declared in `section`, in declaration order.
    pub fn definitions_in<'a>(
        &'a self,
        section: &'a Section,
    ) -> impl Iterator<Item = &'a Definition> {
        section.keys.iter().filter_map(|key| self.definitions.get(key))
    }

    #[must_use]
    pub fn language_codes(&self) -> &[String] {
        &self.language_codes
    }

    /// The sticky-first developer language, once any language is known.
    #[must_use]
    pub fn developer_language_code(&self) -> Option<&str> {
        self.language_codes.first().map(String::as_str)
    }

    /// Registers a language code.
    ///
    /// The first code ever added becomes the developer language and stays
    /// pinned at index 0; every later addition re-sorts the remainder.
    pub fn add_language_code(&mut self, code: impl Into<String>) {
        let code = code.into();
        if self.language_codes.iter().any(|existing| *existing == code) {
            return;
        }
        if let Some(developer) = self.language_codes.first().cloned() {
            self.language_codes.push(code);
            self.language_codes.retain(|existing| *existing != developer);
            self.language_codes.sort_unstable();
            self.language_codes.insert(0, developer);
        } else {
            self.language_codes.push(code);
        }
    }

    /// Moves `code` to index 0, registering it if unknown.
    pub fn set_developer_language_code(&mut self, code: impl Into<String>) {
        let code = code.into();
        self.language_codes.retain(|existing| *existing != code);
        self.language_codes.insert(0, code);
    }

    /// Replaces the language list wholesale, preserving the given order.
    pub(crate) fn set_language_codes(&mut self, codes: Vec<String>) {
        self.language_codes = codes;
    }

    /// Links every definition's declared `ref` to its target, once the full
    /// key index is known. Unknown targets are left unlinked.
    pub fn resolve_references(&mut self) {
        let resolved: Vec<(String, Option<String>)> = self
            .definitions
            .values()
            .filter_map(|definition| {
                let reference_key = definition.reference_key()?;
                let target =
                    self.definitions.contains_key(reference_key).then(|| reference_key.to_owned());
                Some((definition.key().to_owned(), target))
            })
            .collect();

        let mut unresolved = 0_usize;
        for (key, target) in resolved {
            if target.is_none() {
                unresolved += 1;
            }
            if let Some(definition) = self.definitions.get_mut(&key) {
                definition.set_resolved_reference(target);
            }
        }
        if unresolved > 0 {
            tracing::debug!("{unresolved} reference(s) point at unknown keys");
        }
    }

    /// Upserts one imported value.
    ///
    /// Known keys take the value unless it merely repeats their reference's
    /// value for `lang`. Unknown keys are created in the `Uncategorized`
    /// section when `consume_all` is set, and warned about otherwise. The
    /// language registers in every case.
    pub fn set_translation_for_key(
        &mut self,
        key: &str,
        lang: &str,
        value: TranslationValue,
        options: &ImportOptions,
    ) {
        if self.definitions.contains_key(key) {
            if !self.is_reference_duplicate(key, lang, &value)
                && let Some(definition) = self.definitions.get_mut(key)
            {
                definition.apply_value(lang, value);
            }
        } else if options.consume_all {
            tracing::debug!("Adding new definition '{key}'");
            let section = self.uncategorized_section();
            let mut definition = Definition::new(key);
            if !options.tags.is_empty() {
                definition.set_tags(options.tags.clone());
            }
            definition.apply_value(lang, value);
            self.add_definition(section, definition);
        } else {
            tracing::warn!("'{key}' not found in catalog");
        }
        self.add_language_code(lang);
    }

    /// Attaches an imported comment to a known key.
    ///
    /// Does nothing unless `consume_comments` is set, and skips comments
    /// that merely repeat the reference's own comment.
    pub fn set_comment_for_key(&mut self, key: &str, comment: &str, options: &ImportOptions) {
        if !options.consume_comments || !self.definitions.contains_key(key) {
            return;
        }
        let duplicate = self
            .definitions
            .get(key)
            .and_then(Definition::reference_key)
            .and_then(|reference_key| self.definitions.get(reference_key))
            .and_then(Definition::raw_comment)
            .is_some_and(|existing| existing == comment);
        if !duplicate
            && let Some(definition) = self.definitions.get_mut(key)
        {
            definition.set_comment(comment);
        }
    }

    /// Whether an imported scalar just restates the reference's value.
    fn is_reference_duplicate(&self, key: &str, lang: &str, value: &TranslationValue) -> bool {
        let TranslationValue::Scalar(text) = value else {
            return false;
        };
        let Some(reference_key) = self.definitions.get(key).and_then(Definition::reference_key)
        else {
            return false;
        };
        self.definitions
            .get(reference_key)
            .and_then(|reference| reference.translation(lang))
            .is_some_and(|existing| existing == text)
    }

    /// Index of the `Uncategorized` section, creating it at the front on
    /// first use.
    fn uncategorized_section(&mut self) -> usize {
        if let Some(index) =
            self.sections.iter().position(|section| section.name == UNCATEGORIZED_SECTION)
        {
            index
        } else {
            self.sections
                .insert(0, Section { name: UNCATEGORIZED_SECTION.to_owned(), keys: Vec::new() });
            0
        }
    }
}
