//! Local filesystem object store
//!
//! Keys map to paths under a root directory; custom metadata lives in a
//! `.meta` sidecar next to the object. Keys must stay inside the root.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::errors::{ObjectError, ObjectResult};
use super::store::{ObjectMetadata, ObjectStore, StoredObject};

/// Filesystem-backed object store
#[derive(Debug)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn full_path(&self, key: &str) -> ObjectResult<PathBuf> {
        if key.is_empty() || key.starts_with('/') || key.split('/').any(|part| part == "..") {
            return Err(ObjectError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }

    fn meta_path(&self, key: &str) -> ObjectResult<PathBuf> {
        Ok(self.full_path(key)?.with_extension("meta"))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, body: &[u8], metadata: &ObjectMetadata) -> ObjectResult<()> {
        let path = self.full_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ObjectError::Io(e.to_string()))?;
        }

        fs::write(&path, body)
            .await
            .map_err(|e| ObjectError::Io(e.to_string()))?;

        let meta_json =
            serde_json::to_vec(metadata).map_err(|e| ObjectError::Io(e.to_string()))?;
        fs::write(self.meta_path(key)?, meta_json)
            .await
            .map_err(|e| ObjectError::Io(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> ObjectResult<Option<StoredObject>> {
        let path = self.full_path(key)?;
        let body = match fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ObjectError::Io(e.to_string())),
        };

        let metadata = match fs::read(self.meta_path(key)?).await {
            Ok(bytes) => serde_json::from_slice(&bytes).ok(),
            Err(_) => None,
        };

        Ok(Some(StoredObject { body, metadata }))
    }

    async fn delete(&self, key: &str) -> ObjectResult<()> {
        let path = self.full_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ObjectError::NotFound(key.to_string()))
            }
            Err(e) => return Err(ObjectError::Io(e.to_string())),
        }
        let _ = fs::remove_file(self.meta_path(key)?).await;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> ObjectResult<Vec<String>> {
        let dir = self.full_path(prefix)?;
        let mut results = Vec::new();

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(results),
            Err(e) => return Err(ObjectError::Io(e.to_string())),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ObjectError::Io(e.to_string()))?
        {
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".meta") {
                    continue;
                }
                results.push(format!("{}/{}", prefix.trim_end_matches('/'), name));
            }
        }

        results.sort();
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::DatasetId;
    use crate::validation::ValidationStatus;
    use tempfile::TempDir;

    fn metadata() -> ObjectMetadata {
        ObjectMetadata {
            dataset_id: DatasetId::from_raw("0123456789abcdef"),
            version: 1,
            record_count: 2,
            validation_status: ValidationStatus::Valid,
        }
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path().to_path_buf());

        store
            .put("snapshots/ab/v1.json", b"{\"x\":1}", &metadata())
            .await
            .unwrap();

        let stored = store.get("snapshots/ab/v1.json").await.unwrap().unwrap();
        assert_eq!(stored.body, b"{\"x\":1}");
        let meta = stored.metadata.unwrap();
        assert_eq!(meta.version, 1);
        assert_eq!(meta.record_count, 2);
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path().to_path_buf());
        assert!(store.get("snapshots/ab/v9.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_skips_sidecars() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path().to_path_buf());

        store
            .put("snapshots/ab/v1.json", b"1", &metadata())
            .await
            .unwrap();
        store
            .put("snapshots/ab/v2.json", b"2", &metadata())
            .await
            .unwrap();

        let keys = store.list("snapshots/ab").await.unwrap();
        assert_eq!(
            keys,
            vec!["snapshots/ab/v1.json", "snapshots/ab/v2.json"]
        );
    }

    #[tokio::test]
    async fn test_path_escape_rejected() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path().to_path_buf());
        assert!(store.get("../outside.json").await.is_err());
        assert!(store.get("/absolute.json").await.is_err());
    }

    #[tokio::test]
    async fn test_delete() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path().to_path_buf());

        store
            .put("snapshots/ab/v1.json", b"1", &metadata())
            .await
            .unwrap();
        store.delete("snapshots/ab/v1.json").await.unwrap();
        assert!(store.get("snapshots/ab/v1.json").await.unwrap().is_none());
        assert!(matches!(
            store.delete("snapshots/ab/v1.json").await,
            Err(ObjectError::NotFound(_))
        ));
    }
}
