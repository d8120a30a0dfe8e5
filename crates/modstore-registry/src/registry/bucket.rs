//! Registry implementation shared by all object-storage backends.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use super::{Registry, RegistryKind};
use crate::error::{RegistryError, Result};
use crate::key;
use crate::module::{Module, ModuleId};
use crate::storage::ObjectClient;

/// Formats backend-specific download locators.
pub trait Locator: Send + Sync {
    fn kind(&self) -> RegistryKind;

    /// Locator for the object stored at `key` (bucket prefix included).
    fn download_url(&self, key: &str) -> String;
}

/// A registry whose only state is the set of archive keys in a bucket.
pub struct BucketRegistry<L> {
    client: Arc<dyn ObjectClient>,
    prefix: String,
    locator: L,
}

impl<L: Locator> BucketRegistry<L> {
    /// Build a registry over an existing client.
    ///
    /// `prefix` is prepended to every key; surrounding `/` are ignored.
    pub fn new(client: Arc<dyn ObjectClient>, prefix: impl Into<String>, locator: L) -> Self {
        BucketRegistry {
            client,
            prefix: prefix.into().trim_matches('/').to_string(),
            locator,
        }
    }
}

#[async_trait]
impl<L: Locator> Registry for BucketRegistry<L> {
    fn kind(&self) -> RegistryKind {
        self.locator.kind()
    }

    fn object_key(&self, id: &ModuleId) -> String {
        key::with_prefix(&self.prefix, &key::module_key(id))
    }

    async fn get_module(&self, id: &ModuleId) -> Result<Module> {
        let object_key = self.object_key(id);
        tracing::debug!(module = %id, key = %object_key, "probing registry");

        let Some(object) = self.client.head(&object_key).await? else {
            return Err(RegistryError::NotFound { key: object_key });
        };

        let stored = key::decode_version(&object.key)?;
        if stored != id.version {
            return Err(RegistryError::KeyMismatch {
                key: object.key,
                expected: id.version.clone(),
                found: stored,
            });
        }

        tracing::debug!(module = %id, key = %object.key, size = object.size, "module resolved");
        Ok(Module::from_id(id, self.locator.download_url(&object.key)))
    }

    async fn list_module_versions(
        &self,
        namespace: &str,
        name: &str,
        provider: &str,
    ) -> Result<Vec<Module>> {
        let prefix = key::with_prefix(
            &self.prefix,
            &key::provider_prefix(namespace, name, provider),
        );
        let objects = self.client.list(&prefix).await?;

        objects
            .into_iter()
            .map(|object| -> Result<Module> {
                let id = key::decode_key(&object.key)?;
                if (id.namespace.as_str(), id.name.as_str(), id.provider.as_str())
                    != (namespace, name, provider)
                {
                    return Err(RegistryError::KeyMismatch {
                        key: object.key,
                        expected: format!("{namespace}/{name}/{provider}"),
                        found: format!("{}/{}/{}", id.namespace, id.name, id.provider),
                    });
                }
                Ok(Module::from_id(&id, self.locator.download_url(&object.key)))
            })
            .collect()
    }

    async fn upload_module(&self, id: &ModuleId, content: Bytes) -> Result<Module> {
        id.validate()?;
        let object_key = self.object_key(id);

        match self.get_module(id).await {
            Ok(_) => return Err(RegistryError::AlreadyExists { key: object_key }),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        // Not atomic with the probe above; see the module docs.
        let size = content.len();
        self.client
            .put(&object_key, content)
            .await
            .map_err(|e| RegistryError::UploadFailed {
                key: object_key.clone(),
                detail: e.to_string(),
            })?;
        tracing::debug!(module = %id, key = %object_key, size, "archive written");

        self.get_module(id).await
    }
}
