mod kv;
mod memory;
mod store;

pub use kv::{AsyncKvStorage, KvStorage, SetOptions, StorageOptions, EXPIRE_KEY_PREFIX};
pub use memory::InMemoryStore;
pub use store::{AsyncTextStore, TextStore};
