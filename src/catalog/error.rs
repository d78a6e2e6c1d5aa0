//! Error types for catalog reading and writing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or parsing the canonical catalog format.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A line matched none of the recognized grammar shapes.
    #[error("Unable to parse line {line_number} of {}: {line}", display_path(.path))]
    Parse {
        /// One-based line number within the source.
        line_number: usize,
        /// The offending line, already whitespace-trimmed.
        line: String,
        /// Source file, when parsing from disk.
        path: Option<PathBuf>,
    },

    /// The catalog path given to [`crate::catalog::Catalog::from_file`] is not a file.
    #[error("File does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The underlying stream failed while reading or writing.
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
}

/// Names the parse source, falling back to a marker for in-memory input.
fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref().map_or_else(|| "<input>".to_string(), |path| path.display().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    fn parse_error_names_line_and_path() {
        let error = CatalogError::Parse {
            line_number: 12,
            line: "!!garbage".to_string(),
            path: Some(PathBuf::from("strings.txt")),
        };

        let message = error.to_string();

        assert_that!(message, contains_substring("line 12"));
        assert_that!(message, contains_substring("strings.txt"));
        assert_that!(message, contains_substring("!!garbage"));
    }

    #[rstest]
    fn parse_error_without_path_marks_input() {
        let error = CatalogError::Parse {
            line_number: 1,
            line: "oops".to_string(),
            path: None,
        };

        assert_that!(error.to_string(), contains_substring("<input>"));
    }
}
