//! Module identity and the registry-side module record.

use std::fmt;

use object_store::path::PathPart;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// The identity of a module version: `(namespace, name, provider, version)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId {
    /// Publisher namespace.
    pub namespace: String,
    /// Module name.
    pub name: String,
    /// Target provider (e.g. `aws`).
    pub provider: String,
    /// Version string as declared by the module.
    pub version: String,
}

impl ModuleId {
    /// Create an identity from its four components.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        provider: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ModuleId {
            namespace: namespace.into(),
            name: name.into(),
            provider: provider.into(),
            version: version.into(),
        }
    }

    /// Check that every field is non-empty and stored verbatim in a key.
    ///
    /// A `/` inside a field would add a segment to the storage key and make
    /// it impossible to decode the identity back out of it. Characters the
    /// object store percent-encodes (`~`, `%`, `#`, `*`, ...) and the `.`/`..`
    /// segments would be written under a different key than the one built
    /// here, so they are rejected as well.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in self.fields() {
            if value.is_empty() {
                return Err(RegistryError::Validation {
                    detail: format!("{field} not defined"),
                });
            }
            if value.contains('/') {
                return Err(RegistryError::Validation {
                    detail: format!("{field} '{value}' must not contain '/'"),
                });
            }
            if PathPart::from(value).as_ref() != value {
                return Err(RegistryError::Validation {
                    detail: format!(
                        "{field} '{value}' contains characters not allowed in a storage key"
                    ),
                });
            }
        }
        Ok(())
    }

    fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("namespace", &self.namespace),
            ("name", &self.name),
            ("provider", &self.provider),
            ("version", &self.version),
        ]
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}@{}",
            self.namespace, self.name, self.provider, self.version
        )
    }
}

/// A module archive stored in a registry backend.
///
/// Only ever built from an object that exists in the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub namespace: String,
    pub name: String,
    pub provider: String,
    pub version: String,
    /// Backend-specific locator a client can fetch the archive from.
    pub download_url: String,
}

impl Module {
    pub(crate) fn from_id(id: &ModuleId, download_url: String) -> Self {
        Module {
            namespace: id.namespace.clone(),
            name: id.name.clone(),
            provider: id.provider.clone(),
            version: id.version.clone(),
            download_url,
        }
    }

    /// The identity of this module.
    pub fn id(&self) -> ModuleId {
        ModuleId::new(&self.namespace, &self.name, &self.provider, &self.version)
    }
}
