//! Object store contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::identity::DatasetId;
use crate::validation::ValidationStatus;

use super::errors::ObjectResult;

/// Custom metadata carried alongside every stored object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub dataset_id: DatasetId,
    pub version: u64,
    pub record_count: usize,
    pub validation_status: ValidationStatus,
}

/// An object read back from the store
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub metadata: Option<ObjectMetadata>,
}

/// Object store seam (content type is always `application/json`)
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, body: &[u8], metadata: &ObjectMetadata) -> ObjectResult<()>;

    async fn get(&self, key: &str) -> ObjectResult<Option<StoredObject>>;

    async fn delete(&self, key: &str) -> ObjectResult<()>;

    /// Keys under a prefix, non-recursive
    async fn list(&self, prefix: &str) -> ObjectResult<Vec<String>>;
}
