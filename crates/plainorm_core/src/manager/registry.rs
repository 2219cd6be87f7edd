//! Read-only registry of validated entity types.

use crate::error::{ConfigurationError, OrmError, OrmResult};
use crate::mapping::metadata::EntityMetadata;
use crate::model::schema::Entity;
use std::any::{type_name, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Validated metadata per managed type, fixed once built.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entries: HashMap<TypeId, EntityMetadata>,
}

impl EntityRegistry {
    pub(crate) fn insert(
        &mut self,
        type_id: TypeId,
        inspect: fn() -> Result<EntityMetadata, ConfigurationError>,
    ) -> Result<&EntityMetadata, ConfigurationError> {
        match self.entries.entry(type_id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(inspect()?)),
        }
    }

    /// Metadata for `E`, or `UnmanagedType` when `E` was never registered.
    pub fn metadata<E: Entity>(&self) -> OrmResult<&EntityMetadata> {
        self.entries
            .get(&TypeId::of::<E>())
            .ok_or(OrmError::UnmanagedType {
                type_name: type_name::<E>(),
            })
    }

    pub fn is_managed<E: Entity>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<E>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityMetadata> {
        self.entries.values()
    }
}
