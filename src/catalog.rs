//! The string catalog: data model, canonical text format, import upserts.

/// Definition model: per-language values, plural forms, tags, references
mod definition;
/// Catalog error types
mod error;
/// Canonical text-format parser
mod parser;
/// Catalog store, sections and import upserts
mod store;
/// Canonical text-format writer
mod writer;

pub use definition::{
    Definition,
    PluralCategory,
    TranslationValue,
};
pub use error::CatalogError;
pub use store::{
    Catalog,
    ImportOptions,
    Section,
};
