/// Serialize/deserialize engines, wire-node shapes and the text facade.
pub mod codec;
/// Storage wrapper settings loading.
pub mod config;
/// Common error types: registry, serialize, deserialize, storage.
pub mod error;
/// Type descriptors and the type registry.
pub mod registry;
/// Key-value persistence wrapper and store seams (InMemory, sync/async).
pub mod storage;
/// The dynamic value graph model.
pub mod value;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// The codec facade and its per-call options.
pub use codec::{DeserializeOptions, SerializeOptions, Serializer};
/// Storage settings.
pub use config::Settings;
/// Operation errors and result types.
pub use error::{
    DeserializeError, DeserializeResult, RegistryError, RegistryResult, SerializeError,
    SerializeResult, StorageError, StorageResult,
};
/// Type registration and lookup.
pub use registry::{TypeDescriptor, TypeRegistry, TypeSelector};
/// Persistence wrapper, store seams and the in-memory backend.
pub use storage::{
    AsyncKvStorage, AsyncTextStore, InMemoryStore, KvStorage, SetOptions, StorageOptions, TextStore,
};
/// Graph values and foreign instances.
pub use value::{Boxed, ForeignValue, Value};
