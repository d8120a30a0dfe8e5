//! The registry contract and its storage backends.
//!
//! Every backend shares one implementation, [`BucketRegistry`], which keeps
//! all state in object keys (see [`crate::key`]). Backends only differ in
//! how their object client is built and how download locators look.
//!
//! Publishing is check-then-put: `upload_module` probes for the key and
//! writes only if it is absent. The probe and the write are not atomic, so
//! two publishers racing on the same identity can both write and the last
//! one wins. No conditional write primitive is used.

mod bucket;
mod gcs;
mod local;
mod s3;

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::module::{Module, ModuleId};

pub use bucket::{BucketRegistry, Locator};
pub use gcs::{GcsConfig, GcsLocator, GcsRegistry};
pub use local::{LocalConfig, LocalLocator, LocalRegistry};
pub use s3::{S3Config, S3Locator, S3Registry};

/// Backend kinds a registry can be opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    S3,
    Gcs,
    Local,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RegistryKind::S3 => "s3",
            RegistryKind::Gcs => "gcs",
            RegistryKind::Local => "local",
        })
    }
}

/// Storage for immutable, versioned module archives.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> RegistryKind;

    /// Full storage key of an identity, backend prefix included.
    fn object_key(&self, id: &ModuleId) -> String;

    /// Resolve the archive stored for exactly this identity.
    ///
    /// Fails with `NotFound` if nothing is stored, and with `KeyMismatch`
    /// if the stored key encodes a different version than requested.
    async fn get_module(&self, id: &ModuleId) -> Result<Module>;

    /// Every stored version of a module, in backend listing order.
    async fn list_module_versions(
        &self,
        namespace: &str,
        name: &str,
        provider: &str,
    ) -> Result<Vec<Module>>;

    /// Store a new archive. Existing archives are never overwritten.
    async fn upload_module(&self, id: &ModuleId, content: Bytes) -> Result<Module>;
}

/// Backend selection plus its settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    S3(S3Config),
    Gcs(GcsConfig),
    Local(LocalConfig),
}

impl BackendConfig {
    pub fn kind(&self) -> RegistryKind {
        match self {
            BackendConfig::S3(_) => RegistryKind::S3,
            BackendConfig::Gcs(_) => RegistryKind::Gcs,
            BackendConfig::Local(_) => RegistryKind::Local,
        }
    }
}

/// Open the registry described by `config`.
pub fn open(config: &BackendConfig) -> Result<Box<dyn Registry>> {
    let registry: Box<dyn Registry> = match config {
        BackendConfig::S3(c) => Box::new(S3Registry::connect(c)?),
        BackendConfig::Gcs(c) => Box::new(GcsRegistry::connect(c)?),
        BackendConfig::Local(c) => Box::new(LocalRegistry::open(c)?),
    };
    tracing::debug!(kind = %registry.kind(), "opened registry");
    Ok(registry)
}
