//! Loading the settings file from a workspace.

use std::path::Path;

use super::{
    ConfigError,
    Settings,
};

/// Loads settings from a workspace root.
///
/// Looks for a `.string-catalog.json` file; a missing file is not an error
/// and yields `None`.
///
/// # Errors
///
/// - file read errors
/// - JSON parse errors
/// - validation errors
pub fn load_from_workspace(workspace_root: &Path) -> Result<Option<Settings>, ConfigError> {
    let config_path = workspace_root.join(".string-catalog.json");

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let settings: Settings = serde_json::from_str(&content)?;
    settings.validate().map_err(ConfigError::ValidationErrors)?;

    Ok(Some(settings))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    /// `load_from_workspace`: the settings file exists
    #[rstest]
    fn test_load_from_workspace_with_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"developerLanguage": "en", "consumeAll": true}"#;
        fs::write(temp_dir.path().join(".string-catalog.json"), config_content).unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert!(result.is_ok());
        let settings = result.unwrap();
        assert!(settings.is_some());
        let settings = settings.unwrap();
        assert_eq!(settings.developer_language.as_deref(), Some("en"));
        assert!(settings.consume_all);
    }

    /// `load_from_workspace`: no settings file present
    #[rstest]
    fn test_load_from_workspace_no_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    /// `load_from_workspace`: JSON parse error
    #[rstest]
    fn test_load_from_workspace_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".string-catalog.json"), "invalid json").unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert!(result.is_err());
    }

    /// `load_from_workspace`: validation failure surfaces as an error
    #[rstest]
    fn test_load_from_workspace_invalid_settings() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".string-catalog.json"), r#"{"tags": [[]]}"#).unwrap();

        let result = load_from_workspace(temp_dir.path());

        let error = result.unwrap_err();
        assert!(matches!(error, ConfigError::ValidationErrors(_)));
        assert!(error.to_string().contains("tags[0]"));
    }
}
