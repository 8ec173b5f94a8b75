use std::{any::TypeId, collections::HashMap};

use tracing::debug;

use super::descriptor::TypeDescriptor;
use crate::{
    error::{RegistryError, RegistryResult},
    value::Value,
};

/// What a registry lookup is keyed on.
pub enum TypeSelector<'a> {
    /// Exact registered name.
    Name(&'a str),
    /// Runtime type.
    Type(TypeId),
    /// A value instance; its runtime type is used.
    Instance(&'a Value),
}

/// Ordered collection of type descriptors.
///
/// Registration order is significant: structural lookups scan the
/// descriptors in insertion order and the first match wins, so overlapping
/// registrations establish an intentional precedence. The scan is linear in
/// the number of registered types, which is acceptable for the small
/// registries this crate is built for.
pub struct TypeRegistry {
    items: Vec<TypeDescriptor>,
    by_name: HashMap<String, usize>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Stores a descriptor under its name.
    ///
    /// Registering a second descriptor under an existing name fails with
    /// [`RegistryError::DuplicateType`] unless it targets the same runtime
    /// type, in which case the descriptor is replaced silently.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> RegistryResult<()> {
        if let Some(&index) = self.by_name.get(descriptor.name()) {
            if self.items[index].type_id() != descriptor.type_id() {
                return Err(RegistryError::DuplicateType(descriptor.name().to_string()));
            }
            debug!(name = descriptor.name(), "replacing type descriptor");
            self.items[index] = descriptor;
            return Ok(());
        }
        debug!(name = descriptor.name(), "registered type descriptor");
        self.by_name
            .insert(descriptor.name().to_string(), self.items.len());
        self.items.push(descriptor);
        Ok(())
    }

    /// Resolves a descriptor for the given selector.
    ///
    /// Name lookups are exact-match only; type and instance lookups scan in
    /// registration order. Returns `None` when nothing matches.
    pub fn resolve(&self, selector: TypeSelector<'_>) -> Option<&TypeDescriptor> {
        match selector {
            TypeSelector::Name(name) => self.by_name.get(name).map(|&index| &self.items[index]),
            TypeSelector::Type(type_id) => self.scan(type_id),
            TypeSelector::Instance(value) => value.runtime_type_id().and_then(|id| self.scan(id)),
        }
    }

    fn scan(&self, type_id: TypeId) -> Option<&TypeDescriptor> {
        self.items.iter().find(|item| item.type_id() == type_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
