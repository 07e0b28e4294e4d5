use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;

/// Minimal key-value backend, the only persistence surface the stores
/// write through.
///
/// Implementations are whole-value and last-writer-wins: there is no
/// atomicity across a read-modify-write cycle spanning two calls, so two
/// concurrent writers to the same backend can silently lose one write.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory backend. Serves as the tab-scoped transient store for the
/// guest flag and as the test fake for the persistent one.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self
            .map
            .lock()
            .map_err(|e| anyhow::anyhow!("kv lock poisoned: {}", e))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|e| anyhow::anyhow!("kv lock poisoned: {}", e))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|e| anyhow::anyhow!("kv lock poisoned: {}", e))?;
        map.remove(key);
        Ok(())
    }
}
