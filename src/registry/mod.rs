mod builtins;
mod descriptor;
mod type_registry;

pub(crate) use builtins::datetime_descriptor;
pub use descriptor::{ToExternalFn, ToInternalFn, TypeDescriptor};
pub use type_registry::{TypeRegistry, TypeSelector};
