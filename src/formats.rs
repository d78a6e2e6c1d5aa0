//! Platform string-file formats: the formatter contract and the built-ins.

/// Android `strings.xml` resources.
mod android;
/// The formatter capability contract and registry.
mod formatter;
/// Gettext `.po` files.
mod gettext;
/// printf-style placeholder conversion.
mod placeholders;

pub use android::AndroidFormatter;
pub use formatter::{
    FormatError,
    Formatter,
    FormatterRegistry,
    default_language_for_path,
};
pub use gettext::GettextFormatter;
