mod deserialize;
mod serialize;
mod text;
pub mod wire;

pub use deserialize::DeserializeOptions;
pub use serialize::SerializeOptions;

use crate::{
    error::RegistryResult,
    registry::{datetime_descriptor, TypeDescriptor, TypeRegistry},
};

/// Graph-safe codec: a type registry plus the serialize and deserialize
/// engines and the text facade.
///
/// A serializer owns no per-call state; every top-level call builds its own
/// scratch context, so independent calls from different threads are safe as
/// long as the registry is not mutated concurrently.
pub struct Serializer {
    registry: TypeRegistry,
}

impl Serializer {
    /// Creates a serializer with the built-in `DateTime` type installed.
    pub fn new() -> Self {
        let mut registry = TypeRegistry::new();
        registry
            .register(datetime_descriptor())
            .expect("the built-in type cannot collide in a fresh registry");
        Self { registry }
    }

    /// Creates a serializer and registers the given descriptors on top of
    /// the built-ins.
    pub fn with_types(types: Vec<TypeDescriptor>) -> RegistryResult<Self> {
        let mut serializer = Self::new();
        for descriptor in types {
            serializer.registry.register(descriptor)?;
        }
        Ok(serializer)
    }

    /// Creates a serializer over an existing registry; no built-ins are
    /// added.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}
