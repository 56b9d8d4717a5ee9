use crate::types::BundlerConfig;
use crate::validate::{validate_config, ValidationError};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl BundlerConfig {
    /// Parse and validate a TOML document.
    ///
    /// ```
    /// use dtsmerge_config::BundlerConfig;
    ///
    /// let config = BundlerConfig::from_toml_str(r#"
    ///     [[entries]]
    ///     file_path = "src/index.ts"
    ///
    ///     [entries.output]
    ///     umd_module_name = "MyLib"
    /// "#).unwrap();
    /// assert_eq!(config.entries.len(), 1);
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: BundlerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_config(self)
    }
}
