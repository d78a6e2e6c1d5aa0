use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::catalog::ImportOptions;
use crate::output::{
    IncludeFilter,
    ProjectionOptions,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "tags[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Workspace settings, read from `.string-catalog.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Language whose values back fallback resolution during output.
    ///
    /// If unset, the catalog's first declared language is used.
    pub developer_language: Option<String>,

    /// Tag groups selecting definitions for output.
    ///
    /// Tags within a group are alternatives; groups must all match.
    pub tags: Option<Vec<Vec<String>>>,
    pub include_untagged: bool,

    pub include: Option<IncludeFilter>,

    pub consume_all: bool,
    pub consume_comments: bool,
    /// Tags given to definitions created during imports.
    pub import_tags: Vec<String>,
}

impl Settings {
    /// Checks the settings for inconsistencies.
    ///
    /// # Errors
    ///
    /// Returns every failed check with the path of the offending field.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Some(language) = &self.developer_language
            && language.trim().is_empty()
        {
            errors.push(ValidationError::new("developerLanguage", "must not be empty"));
        }
        if let Some(groups) = &self.tags {
            for (index, group) in groups.iter().enumerate() {
                if group.is_empty() {
                    errors.push(ValidationError::new(
                        format!("tags[{index}]"),
                        "tag group must not be empty",
                    ));
                } else if group.iter().any(|tag| tag.trim().is_empty()) {
                    errors.push(ValidationError::new(
                        format!("tags[{index}]"),
                        "tags must not be blank",
                    ));
                }
            }
        }
        if self.import_tags.iter().any(|tag| tag.trim().is_empty()) {
            errors.push(ValidationError::new("importTags", "tags must not be blank"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// The projection options these settings describe.
    #[must_use]
    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            tags: self.tags.clone(),
            include_untagged: self.include_untagged,
            include: self.include,
            developer_language: self.developer_language.clone(),
        }
    }

    /// The import options these settings describe.
    #[must_use]
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            consume_all: self.consume_all,
            consume_comments: self.consume_comments,
            tags: self.import_tags.clone(),
        }
    }
}
