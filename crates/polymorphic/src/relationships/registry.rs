//! Relation Registry - Normalizes a relation configuration map once into immutable definitions

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::PolymorphicConfig;
use crate::error::{PolymorphicError, PolymorphicResult};
use crate::inflector::{related_key_column, EnglishInflector, Inflector};
use super::metadata::{
    PolymorphicDefaults, RawRelation, RelationDefinition, RelationKind, RelationShape,
    RelationSpec,
};

/// Normalized relations of one owner type
///
/// Built once during setup and never mutated afterwards. Clones share the same
/// definitions.
#[derive(Debug, Clone, Default)]
pub struct RelationRegistry {
    definitions: Arc<BTreeMap<String, RelationDefinition>>,
    default_primary_key_column: Option<String>,
}

impl RelationRegistry {
    /// Normalize a relation map against behavior defaults
    pub fn normalize<I, K, R>(raw: I, defaults: &PolymorphicDefaults) -> PolymorphicResult<Self>
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Into<RawRelation>,
    {
        Self::normalize_with(raw, defaults, &EnglishInflector)
    }

    /// Normalize using a custom inflector for derived junction columns
    pub fn normalize_with<I, K, R>(
        raw: I,
        defaults: &PolymorphicDefaults,
        inflector: &dyn Inflector,
    ) -> PolymorphicResult<Self>
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Into<RawRelation>,
    {
        let default_primary_key_column =
            optional_column("defaults", "primary_key_column", defaults.primary_key_column.as_deref())?;

        let mut definitions = BTreeMap::new();
        for (name, relation) in raw {
            let name = name.into();
            if definitions.contains_key(&name) {
                tracing::warn!("Polymorphic relation '{}' is declared twice", name);
                return Err(PolymorphicError::configuration(name, "relation is declared more than once"));
            }

            let definition = normalize_relation(&name, relation.into().expand(), defaults, inflector)
                .map_err(|err| {
                    tracing::warn!("Rejected polymorphic relation '{}': {}", name, err);
                    err
                })?;

            tracing::debug!(
                "Normalized {} relation '{}' -> {} (fk: {}, {} = {})",
                definition.shape(),
                definition.name,
                definition.related_entity_type,
                definition.foreign_key_column,
                definition.discriminator_column,
                definition.discriminator_value
            );
            definitions.insert(name, definition);
        }

        tracing::info!("Built polymorphic relation registry with {} relation(s)", definitions.len());

        Ok(Self {
            definitions: Arc::new(definitions),
            default_primary_key_column,
        })
    }

    /// Normalize the relations of a loaded configuration
    pub fn from_config(config: &PolymorphicConfig) -> PolymorphicResult<Self> {
        Self::normalize(config.relations.clone(), &config.defaults)
    }

    /// Get a definition by relation name
    pub fn get(&self, name: &str) -> Option<&RelationDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Relation names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationDefinition> {
        self.definitions.values()
    }

    pub fn definitions(&self) -> &BTreeMap<String, RelationDefinition> {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Behavior-level owner key column, if one was configured
    pub fn default_primary_key_column(&self) -> Option<&str> {
        self.default_primary_key_column.as_deref()
    }

    /// One-to-many definitions whose rows are deleted together with the owner
    pub fn cascading(&self) -> impl Iterator<Item = &RelationDefinition> {
        self.definitions.values().filter(|definition| definition.cascade_delete())
    }
}

impl<'a> IntoIterator for &'a RelationRegistry {
    type Item = &'a RelationDefinition;
    type IntoIter = std::collections::btree_map::Values<'a, String, RelationDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.values()
    }
}

fn normalize_relation(
    name: &str,
    spec: RelationSpec,
    defaults: &PolymorphicDefaults,
    inflector: &dyn Inflector,
) -> PolymorphicResult<RelationDefinition> {
    let shape_name = spec
        .shape
        .as_deref()
        .ok_or_else(|| PolymorphicError::configuration(name, "relation shape is not set"))?;
    let shape: RelationShape = shape_name
        .parse()
        .map_err(|err| PolymorphicError::configuration(name, format!("{}", err)))?;

    let related_entity_type = spec
        .related_entity_type
        .as_deref()
        .map(str::trim)
        .filter(|related| !related.is_empty())
        .ok_or_else(|| PolymorphicError::configuration(name, "related entity type is not set"))?
        .to_string();

    let foreign_key_column = required_column(
        name,
        "foreign_key_column",
        spec.foreign_key_column.as_deref(),
        defaults.foreign_key_column.as_deref(),
    )?;
    let discriminator_column = required_column(
        name,
        "discriminator_column",
        spec.discriminator_column.as_deref(),
        defaults.discriminator_column.as_deref(),
    )?;
    let discriminator_value = resolve_value(
        spec.discriminator_value,
        defaults.discriminator_value.as_ref(),
    )
    .ok_or_else(|| PolymorphicError::missing_option(name, "discriminator_value"))?;

    let primary_key_column = match optional_column(name, "primary_key_column", spec.primary_key_column.as_deref())? {
        Some(column) => Some(column),
        None => optional_column(name, "primary_key_column", defaults.primary_key_column.as_deref())?,
    };

    let kind = match shape {
        RelationShape::OneToMany => RelationKind::OneToMany {
            cascade_delete: spec.cascade_delete.unwrap_or(false),
        },
        RelationShape::ManyToMany => {
            let junction_table = optional_column(name, "junction_table", spec.junction_table.as_deref())?
                .ok_or_else(|| {
                    PolymorphicError::configuration(name, "many-to-many relation requires 'junction_table'")
                })?;
            let related_key_column = optional_column(name, "related_key_column", spec.related_key_column.as_deref())?
                .unwrap_or_else(|| related_key_column(inflector, &related_entity_type));
            let related_primary_key_column = optional_column(
                name,
                "related_primary_key_column",
                spec.related_primary_key_column.as_deref(),
            )?;

            if spec.cascade_delete == Some(true) {
                tracing::warn!(
                    "Ignoring cascade_delete on many-to-many relation '{}'; junction rows are left in place",
                    name
                );
            }

            RelationKind::ManyToMany {
                junction_table,
                related_key_column,
                related_primary_key_column,
            }
        }
    };

    Ok(RelationDefinition {
        name: name.to_string(),
        related_entity_type,
        primary_key_column,
        foreign_key_column,
        discriminator_column,
        discriminator_value,
        kind,
    })
}

/// Relation value if present, else the default; a missing value at both levels is an error
fn required_column(
    relation: &str,
    option: &str,
    value: Option<&str>,
    default: Option<&str>,
) -> PolymorphicResult<String> {
    let column = match value {
        Some(column) => Some(column),
        None => default,
    };
    optional_column(relation, option, column)?
        .ok_or_else(|| PolymorphicError::missing_option(relation, option))
}

/// A present column name must be non-blank
fn optional_column(
    relation: &str,
    option: &str,
    value: Option<&str>,
) -> PolymorphicResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(column) if column.trim().is_empty() => Err(PolymorphicError::configuration(
            relation,
            format!("option '{}' must name a column, got an empty string", option),
        )),
        Some(column) => Ok(Some(column.trim().to_string())),
    }
}

fn resolve_value(value: Option<Value>, default: Option<&Value>) -> Option<Value> {
    value
        .filter(|value| !value.is_null())
        .or_else(|| default.filter(|value| !value.is_null()).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> PolymorphicDefaults {
        PolymorphicDefaults::default().with_discriminator_value(1)
    }

    #[test]
    fn test_shorthand_normalization() {
        let registry = RelationRegistry::normalize([("comments", "ArticleComment")], &defaults()).unwrap();

        let comments = registry.get("comments").unwrap();
        assert_eq!(comments.shape(), RelationShape::OneToMany);
        assert_eq!(comments.related_entity_type(), "ArticleComment");
        assert!(!comments.cascade_delete());
        assert_eq!(comments.foreign_key_column(), "external_id");
        assert_eq!(comments.discriminator_column(), "type");
        assert_eq!(comments.discriminator_value(), &json!(1));
        assert_eq!(comments.primary_key_column(), None);
    }

    #[test]
    fn test_relation_override_wins_per_field() {
        let defaults = PolymorphicDefaults::empty()
            .with_primary_key("default_pk")
            .with_foreign_key("default_fk")
            .with_discriminator_column("default_type")
            .with_discriminator_value(999);

        let fields: Vec<(&str, RelationSpec)> = vec![
            ("pk", RelationSpec::one_to_many("Comment").with_primary_key("my_pk")),
            ("fk", RelationSpec::one_to_many("Comment").with_foreign_key("my_fk")),
            ("column", RelationSpec::one_to_many("Comment").with_discriminator_column("my_type")),
            ("value", RelationSpec::one_to_many("Comment").with_discriminator_value("my_value")),
        ];
        let registry = RelationRegistry::normalize(fields, &defaults).unwrap();

        let pk = registry.get("pk").unwrap();
        assert_eq!(pk.primary_key_column(), Some("my_pk"));
        assert_eq!(pk.foreign_key_column(), "default_fk");

        let fk = registry.get("fk").unwrap();
        assert_eq!(fk.foreign_key_column(), "my_fk");
        assert_eq!(fk.primary_key_column(), Some("default_pk"));

        let column = registry.get("column").unwrap();
        assert_eq!(column.discriminator_column(), "my_type");
        assert_eq!(column.discriminator_value(), &json!(999));

        let value = registry.get("value").unwrap();
        assert_eq!(value.discriminator_value(), &json!("my_value"));
        assert_eq!(value.discriminator_column(), "default_type");
    }

    #[test]
    fn test_falsy_relation_value_wins() {
        let registry = RelationRegistry::normalize(
            [
                ("zero", RelationSpec::one_to_many("Comment").with_discriminator_value(0)),
                ("no", RelationSpec::one_to_many("Comment").with_discriminator_value(false)),
                ("blank", RelationSpec::one_to_many("Comment").with_discriminator_value("")),
            ],
            &defaults(),
        )
        .unwrap();

        assert_eq!(registry.get("zero").unwrap().discriminator_value(), &json!(0));
        assert_eq!(registry.get("no").unwrap().discriminator_value(), &json!(false));
        assert_eq!(registry.get("blank").unwrap().discriminator_value(), &json!(""));
    }

    #[test]
    fn test_null_relation_value_falls_back_to_default() {
        let spec = RelationSpec {
            discriminator_value: Some(Value::Null),
            ..RelationSpec::one_to_many("Comment")
        };
        let registry = RelationRegistry::normalize([("comments", spec)], &defaults()).unwrap();
        assert_eq!(registry.get("comments").unwrap().discriminator_value(), &json!(1));
    }

    #[test]
    fn test_missing_required_option_names_field() {
        let cases = [
            (PolymorphicDefaults::default(), "discriminator_value"),
            (PolymorphicDefaults::empty().with_discriminator_column("type").with_discriminator_value(1), "foreign_key_column"),
            (PolymorphicDefaults::empty().with_foreign_key("external_id").with_discriminator_value(1), "discriminator_column"),
        ];

        for (defaults, option) in cases {
            let err = RelationRegistry::normalize([("comments", "Comment")], &defaults).unwrap_err();
            assert!(err.is_configuration());
            let message = err.to_string();
            assert!(message.contains(option), "{} should mention {}", message, option);
            assert!(message.contains("comments"));
        }
    }

    #[test]
    fn test_empty_column_rejected() {
        let err = RelationRegistry::normalize(
            [("comments", RelationSpec::one_to_many("Comment").with_foreign_key("  "))],
            &defaults(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("foreign_key_column"));
    }

    #[test]
    fn test_missing_shape_and_related_type() {
        let no_shape = RelationSpec {
            related_entity_type: Some("Comment".to_string()),
            ..RelationSpec::default()
        };
        let err = RelationRegistry::normalize([("comments", no_shape)], &defaults()).unwrap_err();
        assert!(err.to_string().contains("shape"));

        let no_related = RelationSpec::default().with_shape(RelationShape::OneToMany);
        let err = RelationRegistry::normalize([("comments", no_related)], &defaults()).unwrap_err();
        assert!(err.to_string().contains("related entity type"));
    }

    #[test]
    fn test_unrecognized_shape() {
        let spec = RelationSpec {
            shape: Some("has_one".to_string()),
            related_entity_type: Some("Comment".to_string()),
            ..RelationSpec::default()
        };
        let err = RelationRegistry::normalize([("comment", spec)], &defaults()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("has_one"));
    }

    #[test]
    fn test_many_to_many_requires_junction_table() {
        let spec = RelationSpec::default()
            .with_shape(RelationShape::ManyToMany)
            .with_related("Tag");
        let err = RelationRegistry::normalize([("tags", spec)], &defaults()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("junction_table"));
    }

    #[test]
    fn test_many_to_many_derives_related_key() {
        let registry = RelationRegistry::normalize(
            [
                ("tags", RelationSpec::many_to_many("Tags", "entity_tag")),
                ("labels", RelationSpec::many_to_many("app::models::Label", "entity_label")),
                ("custom", RelationSpec::many_to_many("Tag", "entity_tag").with_related_key("custom_tag_id")),
            ],
            &defaults(),
        )
        .unwrap();

        assert_eq!(registry.get("tags").unwrap().related_key_column(), Some("tag_id"));
        assert_eq!(registry.get("labels").unwrap().related_key_column(), Some("label_id"));
        assert_eq!(registry.get("custom").unwrap().related_key_column(), Some("custom_tag_id"));
    }

    #[test]
    fn test_many_to_many_never_cascades() {
        let registry = RelationRegistry::normalize(
            [
                ("tags", RelationSpec::many_to_many("Tag", "entity_tag").with_cascade_delete(true)),
                ("comments", RelationSpec::one_to_many("Comment").with_cascade_delete(true)),
                ("notes", RelationSpec::one_to_many("Note")),
            ],
            &defaults(),
        )
        .unwrap();

        let cascading: Vec<&str> = registry.cascading().map(|d| d.name()).collect();
        assert_eq!(cascading, vec!["comments"]);
    }

    #[test]
    fn test_duplicate_relation_name_rejected() {
        let err = RelationRegistry::normalize(
            vec![("comments", "Comment"), ("comments", "Note")],
            &defaults(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_registry_accessors_and_sharing() {
        let registry = RelationRegistry::normalize(
            [("notes", "Note"), ("comments", "Comment")],
            &defaults().with_primary_key("uuid"),
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert!(registry.contains("notes"));
        assert!(!registry.contains("tags"));
        assert_eq!(registry.names(), vec!["comments", "notes"]);
        assert_eq!(registry.default_primary_key_column(), Some("uuid"));
        assert_eq!((&registry).into_iter().count(), 2);

        let clone = registry.clone();
        assert!(Arc::ptr_eq(&registry.definitions, &clone.definitions));
    }

    #[test]
    fn test_empty_registry() {
        let registry = RelationRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.get("anything").is_none());
    }
}
