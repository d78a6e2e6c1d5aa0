//! Workspace configuration for catalog imports and output.

/// Settings file loader
mod loader;
/// Configuration types and settings
mod types;

pub use loader::load_from_workspace;
pub use types::{
    ConfigError,
    Settings,
    ValidationError,
};
