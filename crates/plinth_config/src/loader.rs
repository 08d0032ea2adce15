//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the configuration file inside a project directory.
pub const CONFIG_FILE: &str = "plinth.toml";

/// Loads and validates a `plinth.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `plinth.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks names, paths, expected digests, and schemas.
///
/// Cross-references between validators and modules are resolved by the
/// compiler, which reports them with its own errors.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    for (name, path) in &config.modules {
        if name.is_empty() {
            return Err(ConfigError::ValidationError("empty module name".to_string()));
        }
        if path.is_empty() {
            return Err(ConfigError::MissingField(format!("modules.{name}")));
        }
    }
    for (name, validator) in &config.validators {
        if name.is_empty() {
            return Err(ConfigError::ValidationError(
                "empty validator name".to_string(),
            ));
        }
        if validator.source.is_empty() {
            return Err(ConfigError::MissingField(format!("validators.{name}.source")));
        }
        if validator.purpose.is_empty() {
            return Err(ConfigError::MissingField(format!(
                "validators.{name}.purpose"
            )));
        }
        validator.redeemer.validate().map_err(|e| {
            ConfigError::ValidationError(format!("validators.{name}.redeemer: {e}"))
        })?;
        if let Some(datum) = &validator.datum {
            datum.validate().map_err(|e| {
                ConfigError::ValidationError(format!("validators.{name}.datum: {e}"))
            })?;
        }
    }
    for (name, digest) in &config.expected_hashes {
        if !config.validators.contains_key(name) {
            return Err(ConfigError::ValidationError(format!(
                "expected hash for unknown validator '{name}'"
            )));
        }
        if hex::decode(digest).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "expected hash for '{name}' is not valid hex: '{digest}'"
            )));
        }
    }
    Ok(())
}
