//! Local filesystem backend for development and testing.
//!
//! Layout on disk mirrors the bucket layout:
//! ```text
//! <root>/[<prefix>/]namespace=<ns>/name=<name>/provider=<p>/version=<v>/<archive>.tar.gz
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use object_store::local::LocalFileSystem;
use serde::{Deserialize, Serialize};

use super::bucket::{BucketRegistry, Locator};
use super::RegistryKind;
use crate::error::{RegistryError, Result};
use crate::storage::StoreClient;

/// Local backend settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Directory holding the registry; created if missing.
    pub root: PathBuf,
    #[serde(default)]
    pub prefix: String,
}

/// Locators are plain absolute file paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalLocator {
    root: PathBuf,
}

impl LocalLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalLocator { root: root.into() }
    }
}

impl Locator for LocalLocator {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Local
    }

    fn download_url(&self, key: &str) -> String {
        self.root.join(key).to_string_lossy().into_owned()
    }
}

/// Registry stored in a local directory.
pub type LocalRegistry = BucketRegistry<LocalLocator>;

impl BucketRegistry<LocalLocator> {
    /// Open (creating if needed) a registry rooted at `config.root`.
    pub fn open(config: &LocalConfig) -> Result<Self> {
        if config.root.as_os_str().is_empty() {
            return Err(RegistryError::Config {
                detail: "missing local registry root".to_string(),
            });
        }
        std::fs::create_dir_all(&config.root)?;
        let root = config.root.canonicalize()?;

        let store = LocalFileSystem::new_with_prefix(&root).map_err(|e| RegistryError::Config {
            detail: format!("local registry at {}: {e}", root.display()),
        })?;

        Ok(BucketRegistry::new(
            Arc::new(StoreClient::new(Arc::new(store))),
            config.prefix.as_str(),
            LocalLocator::new(root),
        ))
    }
}
