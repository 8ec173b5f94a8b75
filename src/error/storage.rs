use thiserror::Error;

use super::{deserialize::DeserializeError, serialize::SerializeError};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] SerializeError),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] DeserializeError),

    #[error("Store backend error: {0}")]
    Backend(String),
}
