use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::store::{AsyncTextStore, TextStore};
use crate::{
    codec::{DeserializeOptions, SerializeOptions, Serializer},
    error::StorageResult,
    value::Value,
};

/// Prefix under which expiration metadata is stored.
pub const EXPIRE_KEY_PREFIX: &str = "_xexp:";

/// Behavior switches for the storage wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    /// Wrap stored values in identity envelopes.
    pub wrap: bool,
    /// Permit cyclic values; only effective together with `wrap`.
    pub circular_dependency: bool,
    /// Omit absent fields when serializing.
    pub skip_undefined: bool,
    /// Keep expiration metadata alongside every key.
    pub expire: bool,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            wrap: true,
            circular_dependency: false,
            skip_undefined: false,
            expire: false,
        }
    }
}

/// Per-call options for a single `set`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetOptions {
    /// Deadline after which the key reads back as absent.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Key-value persistence wrapper over a synchronous text store.
///
/// Serializes values through the graph-safe codec on the way in and
/// rebuilds them on the way out, carrying the wrap/cycle/skip options into
/// every call. With expiration enabled, every key is expected to carry a
/// `_xexp:`-prefixed metadata entry; a key without one reads back as
/// expired.
pub struct KvStorage<S> {
    store: S,
    serializer: Serializer,
    options: StorageOptions,
}

impl<S: TextStore> KvStorage<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, StorageOptions::default())
    }

    pub fn with_options(store: S, options: StorageOptions) -> Self {
        Self {
            store,
            serializer: Serializer::new(),
            options,
        }
    }

    /// Replaces the serializer, e.g. one preloaded with custom types.
    pub fn with_serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn serializer_mut(&mut self) -> &mut Serializer {
        &mut self.serializer
    }

    pub fn set(&mut self, key: &str, value: &Value) -> StorageResult<()> {
        self.set_with(key, value, SetOptions::default())
    }

    pub fn set_with(
        &mut self,
        key: &str,
        value: &Value,
        set_options: SetOptions,
    ) -> StorageResult<()> {
        if let Some(expires_at) = set_options.expires_at.filter(|_| self.options.expire) {
            self.store.set_item(
                &expire_key(key),
                expires_at.timestamp_millis().to_string(),
            )?;
        }
        let text = self
            .serializer
            .to_text(value, &self.options.serialize_options())?
            .unwrap_or_else(|| "null".to_string());
        debug!(key, "storing serialized value");
        self.store.set_item(key, text)
    }

    pub fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        if self.options.expire && self.is_expired(key)? {
            debug!(key, "key is expired");
            return Ok(None);
        }
        let Some(text) = self.store.get_item(key)? else {
            return Ok(None);
        };
        let value = self
            .serializer
            .from_text(&text, &self.options.deserialize_options())?;
        Ok(Some(value))
    }

    fn is_expired(&self, key: &str) -> StorageResult<bool> {
        let entry = self.store.get_item(&expire_key(key))?;
        // in expiration mode a key without usable metadata counts as expired
        let Some(deadline) = entry.and_then(|text| text.trim().parse::<i64>().ok()) else {
            return Ok(true);
        };
        Ok(deadline < Utc::now().timestamp_millis())
    }
}

/// Key-value persistence wrapper over an asynchronous text store.
///
/// Same semantics as [`KvStorage`]; the codec stays synchronous, only the
/// store round trips suspend.
pub struct AsyncKvStorage<S> {
    store: S,
    serializer: Serializer,
    options: StorageOptions,
}

impl<S: AsyncTextStore> AsyncKvStorage<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, StorageOptions::default())
    }

    pub fn with_options(store: S, options: StorageOptions) -> Self {
        Self {
            store,
            serializer: Serializer::new(),
            options,
        }
    }

    pub fn with_serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn serializer_mut(&mut self) -> &mut Serializer {
        &mut self.serializer
    }

    pub async fn set(&mut self, key: &str, value: &Value) -> StorageResult<()> {
        self.set_with(key, value, SetOptions::default()).await
    }

    pub async fn set_with(
        &mut self,
        key: &str,
        value: &Value,
        set_options: SetOptions,
    ) -> StorageResult<()> {
        let text = self
            .serializer
            .to_text(value, &self.options.serialize_options())?
            .unwrap_or_else(|| "null".to_string());
        if let Some(expires_at) = set_options.expires_at.filter(|_| self.options.expire) {
            self.store
                .set_item(
                    &expire_key(key),
                    expires_at.timestamp_millis().to_string(),
                )
                .await?;
        }
        debug!(key, "storing serialized value");
        self.store.set_item(key, text).await
    }

    pub async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        if self.options.expire && self.is_expired(key).await? {
            debug!(key, "key is expired");
            return Ok(None);
        }
        let Some(text) = self.store.get_item(key).await? else {
            return Ok(None);
        };
        let value = self
            .serializer
            .from_text(&text, &self.options.deserialize_options())?;
        Ok(Some(value))
    }

    async fn is_expired(&self, key: &str) -> StorageResult<bool> {
        let entry = self.store.get_item(&expire_key(key)).await?;
        let Some(deadline) = entry.and_then(|text| text.trim().parse::<i64>().ok()) else {
            return Ok(true);
        };
        Ok(deadline < Utc::now().timestamp_millis())
    }
}

impl StorageOptions {
    fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            wrap: self.wrap,
            support_circular_dependency: self.circular_dependency,
            skip_undefined: self.skip_undefined,
        }
    }

    fn deserialize_options(&self) -> DeserializeOptions {
        // unwrap mirrors wrap: what was enveloped on the way in is
        // interpreted on the way out
        DeserializeOptions { unwrap: self.wrap }
    }
}

fn expire_key(key: &str) -> String {
    format!("{EXPIRE_KEY_PREFIX}{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expire_key_prefix() {
        assert_eq!(expire_key("session"), "_xexp:session");
    }

    /// Option plumbing into the codec layers.
    #[test]
    fn test_option_mapping() {
        let options = StorageOptions {
            wrap: true,
            circular_dependency: true,
            skip_undefined: true,
            expire: false,
        };
        let ser = options.serialize_options();
        assert!(ser.wrap && ser.support_circular_dependency && ser.skip_undefined);
        assert!(options.deserialize_options().unwrap);

        let plain = StorageOptions {
            wrap: false,
            ..StorageOptions::default()
        };
        assert!(!plain.deserialize_options().unwrap);
    }
}
