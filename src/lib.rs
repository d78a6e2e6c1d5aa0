//! string-catalog
//!
//! A string catalog for app localization: one canonical text file holds
//! every key with its translations, and platform formatters project it
//! into and out of `strings.xml` and `.po` files.

pub mod catalog;
pub mod config;
pub mod formats;
pub mod output;

// Re-export the central type
pub use catalog::Catalog;
