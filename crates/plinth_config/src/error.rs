//! Project configuration failures.

/// `plinth.toml` could not be read, parsed, or accepted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read plinth.toml: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid TOML or does not match the project layout.
    #[error("invalid plinth.toml: {0}")]
    ParseError(String),

    /// A name or path is empty. Carries the dotted key.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A value is well formed but unusable, such as a bad schema or hash.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("validators.vault.source".to_string());
        assert_eq!(
            format!("{err}"),
            "missing required field: validators.vault.source"
        );
    }

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "invalid plinth.toml: expected '=' at line 3"
        );
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("bad hex".to_string());
        assert_eq!(format!("{err}"), "validation error: bad hex");
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("cannot read plinth.toml:"));
    }
}
