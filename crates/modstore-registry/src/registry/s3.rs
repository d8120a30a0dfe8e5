//! Amazon S3 (and S3-compatible) backend.

use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use serde::{Deserialize, Serialize};

use super::bucket::{BucketRegistry, Locator};
use super::RegistryKind;
use crate::error::{RegistryError, Result};
use crate::storage::StoreClient;

const DEFAULT_REGION: &str = "us-east-1";

/// S3 backend settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    #[serde(default)]
    pub prefix: String,
    /// Falls back to the SDK environment (`AWS_REGION`) when unset.
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services such as MinIO.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Formats `s3::` module source locators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Locator {
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl S3Locator {
    pub fn new(bucket: impl Into<String>, region: Option<String>, endpoint: Option<String>) -> Self {
        S3Locator {
            bucket: bucket.into(),
            region: region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint,
        }
    }
}

impl Locator for S3Locator {
    fn kind(&self) -> RegistryKind {
        RegistryKind::S3
    }

    fn download_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!(
                "s3::{}/{}/{key}",
                endpoint.trim_end_matches('/'),
                self.bucket
            ),
            None => format!(
                "s3::https://s3-{}.amazonaws.com/{}/{key}",
                self.region, self.bucket
            ),
        }
    }
}

/// Registry stored in an S3 bucket.
pub type S3Registry = BucketRegistry<S3Locator>;

impl BucketRegistry<S3Locator> {
    /// Build an S3 client from the environment plus `config`.
    ///
    /// Credentials come from the usual AWS environment variables or the
    /// instance metadata service.
    pub fn connect(config: &S3Config) -> Result<Self> {
        if config.bucket.is_empty() {
            return Err(RegistryError::Config {
                detail: "missing s3 bucket".to_string(),
            });
        }

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(&config.bucket);
        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(false)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder.build().map_err(|e| RegistryError::Config {
            detail: format!("s3 client: {e}"),
        })?;
        tracing::debug!(bucket = %config.bucket, prefix = %config.prefix, "s3 registry configured");

        Ok(BucketRegistry::new(
            Arc::new(StoreClient::new(Arc::new(store))),
            config.prefix.as_str(),
            S3Locator::new(&config.bucket, config.region.clone(), config.endpoint.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aws_locator() {
        let locator = S3Locator::new("mods", Some("eu-central-1".to_string()), None);
        assert_eq!(
            locator.download_url("a/b.tar.gz"),
            "s3::https://s3-eu-central-1.amazonaws.com/mods/a/b.tar.gz"
        );
    }

    #[test]
    fn default_region_locator() {
        let locator = S3Locator::new("mods", None, None);
        assert!(locator
            .download_url("k")
            .starts_with("s3::https://s3-us-east-1.amazonaws.com/"));
    }

    #[test]
    fn custom_endpoint_locator() {
        let locator = S3Locator::new("mods", None, Some("http://minio:9000/".to_string()));
        assert_eq!(locator.download_url("k"), "s3::http://minio:9000/mods/k");
    }

    #[test]
    fn connect_requires_bucket() {
        let err = S3Registry::connect(&S3Config::default()).err().unwrap();
        assert!(matches!(err, RegistryError::Config { .. }));
    }
}
