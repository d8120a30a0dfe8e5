//! The object-storage client the registry is written against.
//!
//! `ObjectClient` is the narrow put/head/list surface the registry needs.
//! `StoreClient` implements it over any `object_store` backend (S3, GCS,
//! local filesystem, in-memory). Retries and timeouts are whatever the
//! underlying `object_store` client is configured with.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;

use crate::error::{RegistryError, Result};

/// Metadata of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Full key, including any bucket prefix.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
}

/// Minimal object storage operations.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Look up an object; `None` if nothing is stored at `key`.
    async fn head(&self, key: &str) -> Result<Option<ObjectInfo>>;

    /// Store `body` at `key`, replacing whatever is there.
    async fn put(&self, key: &str, body: Bytes) -> Result<()>;

    /// List every object below `prefix`, draining all pages.
    ///
    /// Matching is per path segment: `a/b` does not match `a/bc/x`.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>>;
}

/// [`ObjectClient`] backed by an `object_store` implementation.
#[derive(Debug, Clone)]
pub struct StoreClient {
    store: Arc<dyn ObjectStore>,
}

impl StoreClient {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        StoreClient { store }
    }
}

fn storage_err(key: &str, source: object_store::Error) -> RegistryError {
    RegistryError::Storage {
        key: key.to_string(),
        source,
    }
}

fn info(meta: object_store::ObjectMeta) -> ObjectInfo {
    ObjectInfo {
        key: meta.location.to_string(),
        size: meta.size as u64,
    }
}

#[async_trait]
impl ObjectClient for StoreClient {
    async fn head(&self, key: &str) -> Result<Option<ObjectInfo>> {
        match self.store.head(&ObjectPath::from(key)).await {
            Ok(meta) => Ok(Some(info(meta))),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(storage_err(key, e)),
        }
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<()> {
        self.store
            .put(&ObjectPath::from(key), body.into())
            .await
            .map(|_| ())
            .map_err(|e| storage_err(key, e))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let prefix_path = ObjectPath::from(prefix);
        self.store
            .list(Some(&prefix_path))
            .map_ok(info)
            .try_collect()
            .await
            .map_err(|e| storage_err(prefix, e))
    }
}
