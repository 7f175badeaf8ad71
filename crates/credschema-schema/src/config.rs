//! Compiler configuration.
//!
//! `ParsingOptions` change how a schema document is read and therefore
//! travel with the schema (they are part of its serialized form).
//! `SchemaConfig` describes the local environment (the proof system's field
//! size, the linked-data namespace) and is supplied by the caller on both
//! sides; override it via environment variables or explicit construction.

use credschema_core::{FieldConfig, FieldError};
use serde::{Deserialize, Serialize};

/// Default namespace for linked-data terms.
pub const DEFAULT_CONTEXT_PREFIX: &str = "https://ld.credschema.dev/terms#";

/// How to fill in numeric metadata a schema leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsingOptions {
    /// When true, integers without `minimum` and numbers without
    /// `multipleOf` receive the defaults below instead of failing.
    pub use_defaults: bool,
    /// Minimum assumed for integers and numbers that declare none.
    pub default_minimum_integer: i64,
    /// Decimal places assumed for numbers that declare no `multipleOf`.
    pub default_decimal_places: u32,
}

impl Default for ParsingOptions {
    fn default() -> Self {
        Self {
            use_defaults: false,
            default_minimum_integer: -(1i64 << 32),
            default_decimal_places: 0,
        }
    }
}

impl ParsingOptions {
    /// Options with `use_defaults` switched on.
    pub fn with_defaults() -> Self {
        Self {
            use_defaults: true,
            ..Self::default()
        }
    }
}

/// Environment the compiler runs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaConfig {
    /// Size of the proof system's scalar field.
    pub field: FieldConfig,
    /// IRI prefix for linked-data terms.
    pub context_prefix: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            context_prefix: DEFAULT_CONTEXT_PREFIX.to_string(),
        }
    }
}

impl SchemaConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CREDSCHEMA_MODULUS_BITS` (default: 255)
    /// - `CREDSCHEMA_CONTEXT_PREFIX` (default: `https://ld.credschema.dev/terms#`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("CREDSCHEMA_MODULUS_BITS") {
            let bits: u32 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidModulus(raw.clone()))?;
            config.field = FieldConfig::new(bits)?;
        }

        if let Ok(prefix) = std::env::var("CREDSCHEMA_CONTEXT_PREFIX") {
            config = config.with_context_prefix(prefix)?;
        }

        Ok(config)
    }

    /// Replace the field configuration.
    pub fn with_field(mut self, field: FieldConfig) -> Self {
        self.field = field;
        self
    }

    /// Replace the linked-data prefix.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidPrefix` if the prefix is empty or contains
    /// whitespace.
    pub fn with_context_prefix(mut self, prefix: impl Into<String>) -> Result<Self, ConfigError> {
        let prefix = prefix.into();
        if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidPrefix(prefix));
        }
        self.context_prefix = prefix;
        Ok(self)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CREDSCHEMA_MODULUS_BITS must be an integer, got '{0}'")]
    InvalidModulus(String),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("invalid linked-data prefix '{0}'")]
    InvalidPrefix(String),
}
