use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::store::{AsyncTextStore, TextStore};
use crate::error::StorageResult;

/// Text store backed by a concurrent in-memory map.
///
/// Implements both store seams, so the same instance serves the sync and
/// async wrappers (the async surface simply delegates). Clones share the
/// underlying map.
#[derive(Clone)]
pub struct InMemoryStore {
    data: Arc<DashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TextStore for InMemoryStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.get(key).map(|entry| entry.clone()))
    }

    fn set_item(&mut self, key: &str, text: String) -> StorageResult<()> {
        self.data.insert(key.to_string(), text);
        Ok(())
    }
}

#[async_trait]
impl AsyncTextStore for InMemoryStore {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        TextStore::get_item(self, key)
    }

    async fn set_item(&mut self, key: &str, text: String) -> StorageResult<()> {
        TextStore::set_item(self, key, text)
    }
}
