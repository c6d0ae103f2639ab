//! Error types for polymorphic relation resolution
//!
//! Configuration problems are reported once, when a registry is normalized.
//! Key problems are reported when a relation query is built. Errors coming
//! from a persistence backend are never wrapped here; they travel through the
//! backend's own associated error type.

use thiserror::Error;

/// Result type alias for relation resolution
pub type PolymorphicResult<T> = Result<T, PolymorphicError>;

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while normalizing or resolving polymorphic relations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolymorphicError {
    /// The relation configuration is structurally invalid
    #[error("Configuration error in relation '{relation}': {message}")]
    Configuration { relation: String, message: String },

    /// The entity type has more than one primary key column
    #[error("Composite primary keys are not supported for '{entity_type}' (columns: {})", .columns.join(", "))]
    UnsupportedKey {
        entity_type: String,
        columns: Vec<String>,
    },

    /// The entity type reports no primary key column at all
    #[error("Entity '{entity_type}' has no primary key column")]
    MissingPrimaryKey { entity_type: String },

    /// The owner does not expose the configured key column
    #[error("Owner '{entity_type}' has no value for key column '{column}'")]
    MissingAttribute { entity_type: String, column: String },

    /// The owner key is null, typically because the owner was never saved
    #[error("Owner '{entity_type}' has a null value in key column '{column}'")]
    NullOwnerKey { entity_type: String, column: String },

    /// No relation with this name is registered
    #[error("Unknown polymorphic relation '{0}'")]
    UnknownRelation(String),
}

impl PolymorphicError {
    /// Create a configuration error for a relation
    pub fn configuration(relation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            relation: relation.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error for a required option that is missing at both levels
    pub fn missing_option(relation: impl Into<String>, option: &str) -> Self {
        Self::configuration(
            relation,
            format!(
                "required option '{}' must be set either on the relation or in the behavior defaults",
                option
            ),
        )
    }

    /// Returns true for errors detected while normalizing configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Errors raised while loading polymorphic configuration from text or files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Invalid(#[from] PolymorphicError),
}
