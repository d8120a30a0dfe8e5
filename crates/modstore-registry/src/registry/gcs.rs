//! Google Cloud Storage backend.

use std::path::PathBuf;
use std::sync::Arc;

use object_store::gcp::GoogleCloudStorageBuilder;
use serde::{Deserialize, Serialize};

use super::bucket::{BucketRegistry, Locator};
use super::RegistryKind;
use crate::error::{RegistryError, Result};
use crate::storage::StoreClient;

/// GCS backend settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcsConfig {
    pub bucket: String,
    #[serde(default)]
    pub prefix: String,
    /// Project the bucket belongs to, usually `GOOGLE_CLOUD_PROJECT`.
    #[serde(default)]
    pub project: Option<String>,
    /// Service account key file; otherwise application default credentials.
    #[serde(default)]
    pub credentials: Option<PathBuf>,
}

/// Formats `gcs::` module source locators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcsLocator {
    bucket: String,
}

impl GcsLocator {
    pub fn new(bucket: impl Into<String>) -> Self {
        GcsLocator {
            bucket: bucket.into(),
        }
    }
}

impl Locator for GcsLocator {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Gcs
    }

    fn download_url(&self, key: &str) -> String {
        format!(
            "gcs::https://www.googleapis.com/storage/v1/{}/{key}",
            self.bucket
        )
    }
}

/// Registry stored in a GCS bucket.
pub type GcsRegistry = BucketRegistry<GcsLocator>;

impl BucketRegistry<GcsLocator> {
    /// Build a GCS client from the environment plus `config`.
    pub fn connect(config: &GcsConfig) -> Result<Self> {
        if config.bucket.is_empty() {
            return Err(RegistryError::Config {
                detail: "missing gcs bucket".to_string(),
            });
        }
        let project = config
            .project
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| RegistryError::Config {
                detail: "GOOGLE_CLOUD_PROJECT must be set for the gcs registry".to_string(),
            })?;

        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(&config.bucket);
        if let Some(path) = &config.credentials {
            builder = builder.with_service_account_path(path.to_string_lossy());
        }

        let store = builder.build().map_err(|e| RegistryError::Config {
            detail: format!("gcs client: {e}"),
        })?;
        tracing::debug!(bucket = %config.bucket, project, "gcs registry configured");

        Ok(BucketRegistry::new(
            Arc::new(StoreClient::new(Arc::new(store))),
            config.prefix.as_str(),
            GcsLocator::new(&config.bucket),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_format() {
        assert_eq!(
            GcsLocator::new("mods").download_url("p/k.tar.gz"),
            "gcs::https://www.googleapis.com/storage/v1/mods/p/k.tar.gz"
        );
    }

    #[test]
    fn connect_requires_project() {
        let config = GcsConfig {
            bucket: "mods".to_string(),
            ..GcsConfig::default()
        };
        match GcsRegistry::connect(&config).err().unwrap() {
            RegistryError::Config { detail } => assert!(detail.contains("GOOGLE_CLOUD_PROJECT")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
