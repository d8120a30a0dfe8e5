//! Module descriptor (`modstore.toml`) parsing.
//!
//! Every publishable module directory carries a descriptor declaring its
//! identity. Only the four identity fields are interpreted; everything else
//! is kept as free-form metadata.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::module::ModuleId;

/// Conventional file name of a module descriptor.
pub const SPEC_FILE_NAME: &str = "modstore.toml";

/// A parsed module descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Identity and metadata (required).
    #[serde(default)]
    pub metadata: SpecMetadata,
    /// Any other top-level tables.
    #[serde(flatten)]
    pub extra: toml::Table,
}

/// The `[metadata]` table of a descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecMetadata {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub version: String,
    /// Free-form keys next to the identity fields.
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl ModuleSpec {
    /// Parse a descriptor from a TOML string.
    pub fn parse(input: &str) -> Result<Self> {
        Self::parse_at(input, Path::new("<memory>"))
    }

    /// Load a descriptor from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::InvalidSpec {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::parse_at(&content, path)
    }

    fn parse_at(input: &str, path: &Path) -> Result<Self> {
        let spec: ModuleSpec = toml::from_str(input).map_err(|e| RegistryError::InvalidSpec {
            path: PathBuf::from(path),
            detail: e.message().to_string(),
        })?;

        let meta = &spec.metadata;
        for (field, value) in [
            ("namespace", &meta.namespace),
            ("name", &meta.name),
            ("provider", &meta.provider),
            ("version", &meta.version),
        ] {
            if value.trim().is_empty() {
                return Err(RegistryError::Validation {
                    detail: format!("metadata.{field} is required in {}", path.display()),
                });
            }
        }

        Ok(spec)
    }

    /// The identity declared by this descriptor.
    pub fn id(&self) -> ModuleId {
        ModuleId::new(
            &self.metadata.namespace,
            &self.metadata.name,
            &self.metadata.provider,
            &self.metadata.version,
        )
    }
}
