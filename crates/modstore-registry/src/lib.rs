//! Publishing side of a module registry.
//!
//! Discovers versioned modules on disk, filters them by version policy,
//! archives them and stores them in object storage under a fixed key
//! layout that a read API can resolve by namespace/name/provider/version.
//!
//! # Architecture
//!
//! - [`spec`] — module descriptors (`modstore.toml`)
//! - [`version`] — semver range and regex version policy
//! - [`archive`] — streaming `.tar.gz` archiver
//! - [`key`] — the storage key layout shared by all backends
//! - [`registry`] — the [`Registry`] contract with S3, GCS and local backends
//! - [`publish`] — the discover/filter/archive/upload pipeline
//!
//! The registry has no index: an archive's key is its metadata.

pub mod archive;
pub mod error;
pub mod integrity;
pub mod key;
pub mod module;
pub mod publish;
pub mod registry;
pub mod spec;
pub mod storage;
pub mod version;

// Re-exports for convenience.
pub use archive::{archive_module, write_archive};
pub use error::{RegistryError, Result};
pub use integrity::ContentHash;
pub use module::{Module, ModuleId};
pub use publish::{discover, publish, Outcome, PublishEntry, PublishOptions, PublishReport};
pub use registry::{open as open_registry, BackendConfig, Registry, RegistryKind};
pub use spec::{ModuleSpec, SPEC_FILE_NAME};
pub use storage::{ObjectClient, StoreClient};
pub use version::{Rejection, Verdict, VersionPolicy};
