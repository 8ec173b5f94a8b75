use std::{any::TypeId, fmt};

use serde_json::Value as Json;

use crate::{
    codec::{SerializeOptions, Serializer},
    error::{DeserializeError, SerializeError},
    value::{foreign::short_type_name, Value},
};

/// Convert-out hook: turns an instance into its plain payload.
///
/// Receives the value, the active serialize options and the engine itself,
/// and owns the full conversion of the instance.
pub type ToExternalFn =
    Box<dyn Fn(&Value, &SerializeOptions, &Serializer) -> Result<Json, SerializeError> + Send + Sync>;

/// Convert-in hook: rebuilds an instance from its plain payload.
pub type ToInternalFn = Box<dyn Fn(&Json) -> Result<Value, DeserializeError> + Send + Sync>;

/// Conversion capabilities registered for one runtime type.
///
/// Hooks are trusted: the engine applies them without validating their
/// output. A descriptor with no hooks still participates in registry
/// lookups (its name and type link an envelope to a known type).
pub struct TypeDescriptor {
    name: String,
    type_id: TypeId,
    to_external: Option<ToExternalFn>,
    to_internal: Option<ToInternalFn>,
}

impl TypeDescriptor {
    /// Descriptor for `T`, named after `T`'s short type name.
    pub fn of<T: 'static>() -> Self {
        Self {
            name: short_type_name(std::any::type_name::<T>()).to_string(),
            type_id: TypeId::of::<T>(),
            to_external: None,
            to_internal: None,
        }
    }

    /// Overrides the registered name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_to_external<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value, &SerializeOptions, &Serializer) -> Result<Json, SerializeError>
            + Send
            + Sync
            + 'static,
    {
        self.to_external = Some(Box::new(hook));
        self
    }

    pub fn with_to_internal<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Json) -> Result<Value, DeserializeError> + Send + Sync + 'static,
    {
        self.to_internal = Some(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn to_external(&self) -> Option<&ToExternalFn> {
        self.to_external.as_ref()
    }

    pub fn to_internal(&self) -> Option<&ToInternalFn> {
        self.to_internal.as_ref()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("type_id", &self.type_id)
            .field("to_external", &self.to_external.is_some())
            .field("to_internal", &self.to_internal.is_some())
            .finish()
    }
}
