//! Attribute registry: per-entity native and derived search attributes.
//!
//! The registry is populated once at startup and only read afterwards; wrap
//! it in an `Arc` to share it between threads.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::validate::validate_attribute_name;
use crate::expression::build;
use crate::{AttributeDefinition, CoreError, Expression, SchemaProvider, SortDirection, TableRef};

/// One queryable record type and its attributes.
#[derive(Clone, Debug)]
pub struct EntityDescriptor {
    name: String,
    table: String,
    attributes: BTreeMap<String, AttributeDefinition>,
    default_order: Vec<(String, SortDirection)>,
}

impl EntityDescriptor {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, table: T) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            attributes: BTreeMap::new(),
            default_order: Vec::new(),
        }
    }

    /// Order applied to queries that request no sort of their own.
    pub fn with_default_order<S: Into<String>>(mut self, column: S, direction: SortDirection) -> Self {
        self.default_order.push((column.into(), direction));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn table_ref(&self) -> TableRef {
        TableRef::new(self.table.as_str())
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeDefinition)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn default_order(&self) -> &[(String, SortDirection)] {
        &self.default_order
    }
}

#[derive(Debug, Default)]
pub struct AttributeRegistry {
    entities: BTreeMap<String, EntityDescriptor>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, descriptor: EntityDescriptor) -> Result<(), CoreError> {
        if self.entities.contains_key(descriptor.name()) {
            return Err(CoreError::DuplicateEntity(descriptor.name.clone()));
        }
        debug!(entity = %descriptor.name, table = %descriptor.table, "entity added");
        self.entities.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Add `descriptor` and register every column of its table as a native
    /// attribute.
    pub fn add_entity_from_schema(
        &mut self,
        schema: &dyn SchemaProvider,
        descriptor: EntityDescriptor,
    ) -> Result<(), CoreError> {
        let entity = descriptor.name.clone();
        let columns = schema.columns(descriptor.table())?;
        self.add_entity(descriptor)?;
        for col in columns {
            let def = AttributeDefinition::native(col.name.as_str(), col.column_type);
            self.register(&entity, &col.name, def)?;
        }
        Ok(())
    }

    pub fn register(
        &mut self,
        entity: &str,
        name: &str,
        definition: AttributeDefinition,
    ) -> Result<(), CoreError> {
        validate_attribute_name(name)?;
        let descriptor = self
            .entities
            .get_mut(entity)
            .ok_or_else(|| CoreError::UnknownEntity(entity.to_string()))?;
        if descriptor.attributes.contains_key(name) {
            return Err(CoreError::DuplicateAttribute {
                entity: entity.to_string(),
                name: name.to_string(),
            });
        }
        debug!(
            entity,
            attribute = name,
            native = definition.is_native(),
            visibility = ?definition.visibility,
            "attribute registered"
        );
        descriptor.attributes.insert(name.to_string(), definition);
        Ok(())
    }

    pub fn entity(&self, name: &str) -> Result<&EntityDescriptor, CoreError> {
        self.entities
            .get(name)
            .ok_or_else(|| CoreError::UnknownEntity(name.to_string()))
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.values()
    }

    pub fn resolve(&self, entity: &str, name: &str) -> Result<&AttributeDefinition, CoreError> {
        self.entity(entity)?
            .attribute(name)
            .ok_or_else(|| CoreError::UnknownAttribute {
                entity: entity.to_string(),
                name: name.to_string(),
            })
    }

    /// Names usable in filters: everything not marked sort-only.
    pub fn searchable_attributes(&self, entity: &str) -> Result<BTreeSet<String>, CoreError> {
        Ok(self
            .entity(entity)?
            .attributes()
            .filter(|(_, def)| def.visibility.searchable())
            .map(|(name, _)| name.to_string())
            .collect())
    }

    /// Names usable in sorts: everything not marked search-only.
    pub fn sortable_attributes(&self, entity: &str) -> Result<BTreeSet<String>, CoreError> {
        Ok(self
            .entity(entity)?
            .attributes()
            .filter(|(_, def)| def.visibility.sortable())
            .map(|(name, _)| name.to_string())
            .collect())
    }

    /// Check every column read by an attribute expression, native or
    /// derived, and every default-order column against the schema.
    pub fn validate_against(&self, schema: &dyn SchemaProvider) -> Result<(), CoreError> {
        for descriptor in self.entities.values() {
            let table = descriptor.table();
            let table_ref = descriptor.table_ref();
            let expressions: Vec<Expression> = descriptor
                .attributes()
                .map(|(_, def)| build(def, &table_ref))
                .collect();
            let read = expressions.iter().flat_map(Expression::columns);
            let ordered = descriptor.default_order().iter().map(|(c, _)| c.as_str());
            for column in read.chain(ordered) {
                if !schema.has_column(table, column)? {
                    return Err(CoreError::UnknownColumn {
                        table: table.to_string(),
                        column: column.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
