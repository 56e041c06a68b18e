//! Schema registry over the metadata store
//!
//! Registration is an admin operation; ingestion only reads. Registering
//! an active schema deactivates any prior active schema for the dataset
//! in the same store operation, so "at most one active" always holds.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::identity::DatasetId;
use crate::metadata::MetadataStore;

use super::errors::{SchemaError, SchemaResult};
use super::types::{Compatibility, DatasetSchema};
use super::validator::SchemaValidator;

/// Schema registry
pub struct SchemaRegistry {
    store: Arc<dyn MetadataStore>,
}

impl SchemaRegistry {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    /// Register a schema. The hash is recomputed here; a caller-supplied
    /// hash is ignored.
    pub async fn register(&self, mut schema: DatasetSchema) -> SchemaResult<DatasetSchema> {
        schema.version()?;
        schema.schema_hash = schema.recompute_hash();

        self.store
            .register_schema(schema.clone())
            .await
            .map_err(|e| SchemaError::store(e.to_string()))?;

        Ok(schema)
    }

    /// The active schema for a dataset, if any is registered.
    pub async fn active(&self, dataset_id: &DatasetId) -> SchemaResult<Option<DatasetSchema>> {
        self.store
            .active_schema(dataset_id)
            .await
            .map_err(|e| SchemaError::store(e.to_string()))
    }

    /// A specific registered version.
    pub async fn version(
        &self,
        dataset_id: &DatasetId,
        schema_version: &str,
    ) -> SchemaResult<DatasetSchema> {
        self.store
            .schema_version(dataset_id, schema_version)
            .await
            .map_err(|e| SchemaError::store(e.to_string()))?
            .ok_or_else(|| SchemaError::version_not_found(dataset_id.as_str(), schema_version))
    }

    /// Validate a batch against the active schema, enforcing the
    /// dual-read window when the data declares its own version.
    ///
    /// Returns the active schema used, or `None` when the dataset has no
    /// registered schema (structure is then unconstrained).
    pub async fn validate_batch(
        &self,
        dataset_id: &DatasetId,
        records: &[Value],
        data_schema_version: Option<&str>,
    ) -> SchemaResult<Option<DatasetSchema>> {
        let Some(active) = self.active(dataset_id).await? else {
            return Ok(None);
        };

        if let Some(declared) = data_schema_version {
            if active.compatibility_of(declared) == Compatibility::Incompatible {
                return Err(SchemaError::incompatible(
                    dataset_id.as_str(),
                    declared,
                    active.schema_version.clone(),
                ));
            }
        }

        SchemaValidator::new(&active).validate_batch(records, Utc::now())?;

        Ok(Some(active))
    }
}
