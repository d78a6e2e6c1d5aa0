//! printf-style placeholder conversion between catalog and Android syntax.
//!
//! Catalog values use the `%@` object placeholder; Android string resources
//! use `%s` and require explicit argument positions as soon as a string has
//! more than one placeholder.

use std::sync::LazyLock;

use regex::Regex;

/// Optional position, flags, width, precision and length of a placeholder.
const PLACEHOLDER_SPEC: &str =
    r"(?:\d+\$)?[-+ 0#]?(?:\d+|\*)?(?:\.(?:\d+|\*))?(?:hh|h|ll|l|L|z|j|t|q)?";

/// A full placeholder of either syntax, or a `%%` escape.
#[allow(clippy::unwrap_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("%%|%{PLACEHOLDER_SPEC}[diufFeEgGxXoscpaA@]")).unwrap());

/// A placeholder, a `%%` escape, or a stray percent sign.
#[allow(clippy::unwrap_used)]
static PERCENT_OR_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("%%|%{PLACEHOLDER_SPEC}[diufFeEgGxXoscpaA@]|%")).unwrap());

/// The `%@` object placeholder with its leading spec captured.
#[allow(clippy::unwrap_used)]
static OBJECT_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(%{PLACEHOLDER_SPEC})@")).unwrap());

/// The `%s` string placeholder with its leading spec captured.
#[allow(clippy::unwrap_used)]
static STRING_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(%{PLACEHOLDER_SPEC})s")).unwrap());

/// An explicit argument position, `%1$` style.
#[allow(clippy::unwrap_used)]
static NUMBERED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%\d+\$").unwrap());

/// Counts the placeholders in `value`, ignoring `%%` escapes.
pub(crate) fn placeholder_count(value: &str) -> usize {
    PLACEHOLDER.find_iter(value).filter(|found| found.as_str() != "%%").count()
}

/// Converts catalog placeholders to Android syntax.
///
/// `%@` becomes `%s`. Once the value contains a placeholder, stray percent
/// signs are doubled; once it contains more than one and none carry explicit
/// positions, positions are added in order of appearance.
pub(crate) fn convert_placeholders_to_android(value: &str) -> String {
    let value = OBJECT_PLACEHOLDER.replace_all(value, "${1}s");
    let count = placeholder_count(&value);
    if count == 0 {
        return value.into_owned();
    }

    let value = escape_stray_percents(&value);
    if count < 2 {
        return value;
    }

    let numbered = NUMBERED_PLACEHOLDER.find_iter(&value).count();
    if numbered == count {
        return value;
    }
    if numbered > 0 {
        tracing::warn!("Mixed numbered and unnumbered placeholders in '{value}'");
        return value;
    }

    let mut index = 0_usize;
    PLACEHOLDER
        .replace_all(&value, |captures: &regex::Captures<'_>| {
            let matched = captures.get(0).map_or("", |found| found.as_str());
            if matched == "%%" {
                matched.to_owned()
            } else {
                index += 1;
                matched.replacen('%', &format!("%{index}$"), 1)
            }
        })
        .into_owned()
}

/// Converts Android `%s` placeholders back to catalog syntax.
pub(crate) fn convert_placeholders_from_android(value: &str) -> String {
    STRING_PLACEHOLDER.replace_all(value, "${1}@").into_owned()
}

/// Doubles percent signs that do not begin a placeholder.
fn escape_stray_percents(value: &str) -> String {
    PERCENT_OR_PLACEHOLDER
        .replace_all(value, |captures: &regex::Captures<'_>| {
            let matched = captures.get(0).map_or("", |found| found.as_str());
            if matched == "%" { "%%".to_owned() } else { matched.to_owned() }
        })
        .into_owned()
}
