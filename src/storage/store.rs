use async_trait::async_trait;

use crate::error::StorageResult;

/// Synchronous text store: the only surface the persistence wrapper needs
/// from a backend.
pub trait TextStore: Send + Sync {
    /// Returns the stored text for `key`, if any.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `text` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, text: String) -> StorageResult<()>;
}

/// Asynchronous text store, for backends that suspend on I/O.
#[async_trait]
pub trait AsyncTextStore: Send + Sync {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    async fn set_item(&mut self, key: &str, text: String) -> StorageResult<()>;
}
