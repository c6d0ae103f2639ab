//! Relation Metadata - Raw relation options, behavior defaults and normalized definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::descriptor::Conditions;

/// Shape of a polymorphic relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationShape {
    /// Related rows carry the owner key and discriminator directly (HAS_MANY)
    OneToMany,
    /// Related rows are reached through a junction table (MANY_MANY)
    ManyToMany,
}

impl RelationShape {
    /// Canonical snake_case name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneToMany => "one_to_many",
            Self::ManyToMany => "many_to_many",
        }
    }

    /// Returns true if this shape requires a junction table
    pub fn requires_junction(self) -> bool {
        matches!(self, Self::ManyToMany)
    }
}

impl fmt::Display for RelationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a shape name is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownShape(pub String);

impl fmt::Display for UnknownShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown relation shape '{}' (expected one_to_many or many_to_many)",
            self.0
        )
    }
}

impl std::error::Error for UnknownShape {}

impl FromStr for RelationShape {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "onetomany" | "hasmany" => Ok(Self::OneToMany),
            "manytomany" | "manymany" | "belongstomany" => Ok(Self::ManyToMany),
            _ => Err(UnknownShape(s.to_string())),
        }
    }
}

/// Numeric shape codes used by legacy configurations: 1 = HAS_MANY, 2 = MANY_MANY
fn shape_name_for_code(code: i64) -> String {
    match code {
        1 => RelationShape::OneToMany.as_str().to_string(),
        2 => RelationShape::ManyToMany.as_str().to_string(),
        other => other.to_string(),
    }
}

/// Accept a shape as a name or a numeric code; unknown codes fail later, during normalization
fn deserialize_shape_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ShapeName {
        Name(String),
        Code(i64),
    }

    Ok(Option::<ShapeName>::deserialize(deserializer)?.map(|shape| match shape {
        ShapeName::Name(name) => name,
        ShapeName::Code(code) => shape_name_for_code(code),
    }))
}

/// Relation options exactly as declared, before defaults are applied
///
/// Every option is optional here. A `null` value deserializes to `None` and
/// counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationSpec {
    /// Shape name, parsed during normalization
    #[serde(
        alias = "type",
        deserialize_with = "deserialize_shape_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub shape: Option<String>,

    #[serde(alias = "class", alias = "related", skip_serializing_if = "Option::is_none")]
    pub related_entity_type: Option<String>,

    #[serde(alias = "pkColumnName", skip_serializing_if = "Option::is_none")]
    pub primary_key_column: Option<String>,

    #[serde(alias = "foreignKeyColumnName", skip_serializing_if = "Option::is_none")]
    pub foreign_key_column: Option<String>,

    #[serde(alias = "typeColumnName", skip_serializing_if = "Option::is_none")]
    pub discriminator_column: Option<String>,

    #[serde(alias = "polymorphicType", skip_serializing_if = "Option::is_none")]
    pub discriminator_value: Option<Value>,

    #[serde(alias = "deleteRelated", skip_serializing_if = "Option::is_none")]
    pub cascade_delete: Option<bool>,

    #[serde(alias = "viaTable", skip_serializing_if = "Option::is_none")]
    pub junction_table: Option<String>,

    #[serde(alias = "otherKeyColumnName", skip_serializing_if = "Option::is_none")]
    pub related_key_column: Option<String>,

    #[serde(alias = "relatedPkColumnName", skip_serializing_if = "Option::is_none")]
    pub related_primary_key_column: Option<String>,
}

impl RelationSpec {
    /// Start a one-to-many relation to `related_entity_type`
    pub fn one_to_many(related_entity_type: impl Into<String>) -> Self {
        Self::default()
            .with_shape(RelationShape::OneToMany)
            .with_related(related_entity_type)
    }

    /// Start a many-to-many relation to `related_entity_type` through `junction_table`
    pub fn many_to_many(
        related_entity_type: impl Into<String>,
        junction_table: impl Into<String>,
    ) -> Self {
        Self::default()
            .with_shape(RelationShape::ManyToMany)
            .with_related(related_entity_type)
            .with_junction_table(junction_table)
    }

    pub fn with_shape(mut self, shape: RelationShape) -> Self {
        self.shape = Some(shape.as_str().to_string());
        self
    }

    pub fn with_related(mut self, related_entity_type: impl Into<String>) -> Self {
        self.related_entity_type = Some(related_entity_type.into());
        self
    }

    /// Owner column the foreign key points at
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key_column = Some(column.into());
        self
    }

    pub fn with_foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key_column = Some(column.into());
        self
    }

    pub fn with_discriminator_column(mut self, column: impl Into<String>) -> Self {
        self.discriminator_column = Some(column.into());
        self
    }

    pub fn with_discriminator_value(mut self, value: impl Into<Value>) -> Self {
        self.discriminator_value = Some(value.into());
        self
    }

    pub fn with_cascade_delete(mut self, cascade_delete: bool) -> Self {
        self.cascade_delete = Some(cascade_delete);
        self
    }

    pub fn with_junction_table(mut self, table: impl Into<String>) -> Self {
        self.junction_table = Some(table.into());
        self
    }

    /// Junction column referencing the related entity
    pub fn with_related_key(mut self, column: impl Into<String>) -> Self {
        self.related_key_column = Some(column.into());
        self
    }

    /// Related entity column the junction's related key points at
    pub fn with_related_primary_key(mut self, column: impl Into<String>) -> Self {
        self.related_primary_key_column = Some(column.into());
        self
    }
}

/// A relation as declared in configuration: a bare related type or full options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRelation {
    /// Bare related type, expanded to a one-to-many relation with all defaults
    Shorthand(String),
    Detailed(RelationSpec),
}

impl RawRelation {
    /// Expand into structured options
    pub fn expand(self) -> RelationSpec {
        match self {
            Self::Shorthand(related) => RelationSpec::one_to_many(related),
            Self::Detailed(spec) => spec,
        }
    }
}

impl From<RelationSpec> for RawRelation {
    fn from(spec: RelationSpec) -> Self {
        Self::Detailed(spec)
    }
}

impl From<String> for RawRelation {
    fn from(related: String) -> Self {
        Self::Shorthand(related)
    }
}

impl From<&str> for RawRelation {
    fn from(related: &str) -> Self {
        Self::Shorthand(related.to_string())
    }
}

/// Behavior-level defaults shared by every relation of one owner type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolymorphicDefaults {
    #[serde(alias = "pkColumnName")]
    pub primary_key_column: Option<String>,

    #[serde(alias = "foreignKeyColumnName")]
    pub foreign_key_column: Option<String>,

    #[serde(alias = "typeColumnName")]
    pub discriminator_column: Option<String>,

    #[serde(alias = "polymorphicType")]
    pub discriminator_value: Option<Value>,
}

impl Default for PolymorphicDefaults {
    fn default() -> Self {
        Self {
            primary_key_column: None,
            foreign_key_column: Some("external_id".to_string()),
            discriminator_column: Some("type".to_string()),
            discriminator_value: None,
        }
    }
}

impl PolymorphicDefaults {
    /// Defaults with nothing set at all
    pub fn empty() -> Self {
        Self {
            primary_key_column: None,
            foreign_key_column: None,
            discriminator_column: None,
            discriminator_value: None,
        }
    }

    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key_column = Some(column.into());
        self
    }

    pub fn with_foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key_column = Some(column.into());
        self
    }

    pub fn with_discriminator_column(mut self, column: impl Into<String>) -> Self {
        self.discriminator_column = Some(column.into());
        self
    }

    pub fn with_discriminator_value(mut self, value: impl Into<Value>) -> Self {
        self.discriminator_value = Some(value.into());
        self
    }
}

/// Shape-specific part of a normalized relation
#[derive(Debug, Clone, PartialEq)]
pub enum RelationKind {
    OneToMany {
        cascade_delete: bool,
    },
    ManyToMany {
        junction_table: String,
        related_key_column: String,
        /// Resolved from the related entity's primary key when `None`
        related_primary_key_column: Option<String>,
    },
}

/// A fully resolved relation; immutable once the registry is built
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDefinition {
    pub(crate) name: String,
    pub(crate) related_entity_type: String,
    pub(crate) primary_key_column: Option<String>,
    pub(crate) foreign_key_column: String,
    pub(crate) discriminator_column: String,
    pub(crate) discriminator_value: Value,
    pub(crate) kind: RelationKind,
}

impl RelationDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> RelationShape {
        match self.kind {
            RelationKind::OneToMany { .. } => RelationShape::OneToMany,
            RelationKind::ManyToMany { .. } => RelationShape::ManyToMany,
        }
    }

    pub fn kind(&self) -> &RelationKind {
        &self.kind
    }

    pub fn related_entity_type(&self) -> &str {
        &self.related_entity_type
    }

    /// Owner key column when configured; `None` means the owner's primary key
    pub fn primary_key_column(&self) -> Option<&str> {
        self.primary_key_column.as_deref()
    }

    pub fn foreign_key_column(&self) -> &str {
        &self.foreign_key_column
    }

    pub fn discriminator_column(&self) -> &str {
        &self.discriminator_column
    }

    pub fn discriminator_value(&self) -> &Value {
        &self.discriminator_value
    }

    /// Always false for many-to-many relations
    pub fn cascade_delete(&self) -> bool {
        matches!(self.kind, RelationKind::OneToMany { cascade_delete: true })
    }

    pub fn junction_table(&self) -> Option<&str> {
        match &self.kind {
            RelationKind::ManyToMany { junction_table, .. } => Some(junction_table),
            RelationKind::OneToMany { .. } => None,
        }
    }

    pub fn related_key_column(&self) -> Option<&str> {
        match &self.kind {
            RelationKind::ManyToMany { related_key_column, .. } => Some(related_key_column),
            RelationKind::OneToMany { .. } => None,
        }
    }

    /// `{discriminator_column: discriminator_value}`
    pub fn discriminator_filter(&self) -> Conditions {
        let mut filter = Conditions::new();
        filter.insert(
            self.discriminator_column.clone(),
            self.discriminator_value.clone(),
        );
        filter
    }
}
