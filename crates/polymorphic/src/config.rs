//! Polymorphic configuration files
//!
//! A configuration holds the behavior-level defaults and the relation map of
//! one owner type:
//!
//! ```yaml
//! defaults:
//!   foreign_key_column: external_id
//!   discriminator_column: type
//!   discriminator_value: 1
//! relations:
//!   comments: ArticleComment
//!   tags:
//!     shape: many_to_many
//!     related_entity_type: Tag
//!     junction_table: entity_tag
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, PolymorphicResult};
use crate::relationships::{PolymorphicDefaults, RawRelation, RelationRegistry};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolymorphicConfig {
    pub defaults: PolymorphicDefaults,
    #[serde(alias = "polyRelations")]
    pub relations: BTreeMap<String, RawRelation>,
}

impl PolymorphicConfig {
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a `.yaml`, `.yml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let content = std::fs::read_to_string(path)?;
        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content),
            "json" => Self::from_json_str(&content),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Read a file and normalize its relations in one step
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<RelationRegistry> {
        let path = path.as_ref();
        let registry = Self::from_file(path)?.into_registry()?;
        tracing::info!(
            "Loaded {} polymorphic relation(s) from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn into_registry(self) -> PolymorphicResult<RelationRegistry> {
        RelationRegistry::normalize(self.relations, &self.defaults)
    }
}
