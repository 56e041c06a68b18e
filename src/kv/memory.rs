//! In-memory KV surface
//!
//! TTLs are enforced lazily on read. `set_unavailable(true)` makes every
//! call fail transiently, for exercising staging-failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::errors::{KvError, KvResult};
use super::surface::KvSurface;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

/// In-memory KV store
#[derive(Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, Entry>>,
    unavailable: AtomicBool,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every call fail transiently (test hook)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of live (unexpired) keys
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .expect("kv lock")
            .values()
            .filter(|e| e.expires_at.map(|at| at > now).unwrap_or(true))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> KvResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable("kv marked unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KvSurface for MemoryKv {
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> KvResult<()> {
        self.check_available()?;
        let entry = Entry {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        };
        self.entries
            .write()
            .expect("kv lock")
            .insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        self.check_available()?;
        let mut entries = self.entries.write().expect("kv lock");
        match entries.get(key) {
            Some(entry) => {
                if let Some(at) = entry.expires_at {
                    if at <= Instant::now() {
                        entries.remove(key);
                        return Ok(None);
                    }
                }
                Ok(Some(entry.value.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        self.check_available()?;
        self.entries.write().expect("kv lock").remove(key);
        Ok(())
    }
}
