pub mod deserialize;
pub mod registry;
pub mod serialize;
pub mod storage;

pub use deserialize::{DeserializeError, DeserializeResult};
pub use registry::{RegistryError, RegistryResult};
pub use serialize::{SerializeError, SerializeResult};
pub use storage::{StorageError, StorageResult};
