//! KV surface contract

use std::time::Duration;

use async_trait::async_trait;

use super::errors::KvResult;

/// Opaque key/value store seam.
///
/// Puts are last-writer-wins. A `ttl` of `None` means no expiry.
#[async_trait]
pub trait KvSurface: Send + Sync {
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> KvResult<()>;

    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    async fn delete(&self, key: &str) -> KvResult<()>;
}
