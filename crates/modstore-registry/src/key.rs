//! Storage key layout shared by every backend.
//!
//! ```text
//! namespace=<ns>/name=<name>/provider=<provider>/version=<version>/<ns>-<name>-<provider>-<version>.tar.gz
//! ```
//!
//! Readers of the bucket rely on this layout, so it must never change.
//! The archive file name is not parsed back: `-` may occur inside any field,
//! which makes the dash-joined name ambiguous. Decoding only looks at the
//! `field=value` directory segments.

use crate::error::{RegistryError, Result};
use crate::module::ModuleId;

/// File extension of every stored archive.
pub const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// Build the canonical key for a module version.
pub fn module_key(id: &ModuleId) -> String {
    format!(
        "{prefix}/version={v}/{ns}-{n}-{p}-{v}{ARCHIVE_EXTENSION}",
        prefix = provider_prefix(&id.namespace, &id.name, &id.provider),
        ns = id.namespace,
        n = id.name,
        p = id.provider,
        v = id.version,
    )
}

/// Key prefix under which every version of a module is stored.
pub fn provider_prefix(namespace: &str, name: &str, provider: &str) -> String {
    format!("namespace={namespace}/name={name}/provider={provider}")
}

/// Recover the version from a stored key.
///
/// The `version=` segment must be followed by exactly one archive file name.
pub fn decode_version(key: &str) -> Result<String> {
    let segments: Vec<&str> = key.split('/').collect();
    let decode_err = || RegistryError::KeyDecode {
        key: key.to_string(),
    };

    let idx = segments
        .iter()
        .rposition(|s| s.starts_with("version="))
        .ok_or_else(decode_err)?;

    match &segments[idx + 1..] {
        [file] if file.ends_with(ARCHIVE_EXTENSION) => {}
        _ => return Err(decode_err()),
    }

    let version = &segments[idx]["version=".len()..];
    if version.is_empty() {
        return Err(decode_err());
    }
    Ok(version.to_string())
}

/// Recover the full identity from a stored key.
///
/// Any leading backend prefix segments are ignored; the four `field=`
/// segments must appear in layout order directly before the file name.
pub fn decode_key(key: &str) -> Result<ModuleId> {
    let version = decode_version(key)?;
    let segments: Vec<&str> = key.split('/').collect();
    let decode_err = || RegistryError::KeyDecode {
        key: key.to_string(),
    };

    // [.., namespace=, name=, provider=, version=, file]
    if segments.len() < 5 {
        return Err(decode_err());
    }
    let tail = &segments[segments.len() - 5..segments.len() - 2];
    let field = |segment: &str, label: &str| -> Result<String> {
        segment
            .strip_prefix(label)
            .and_then(|s| s.strip_prefix('='))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(decode_err)
    };

    Ok(ModuleId {
        namespace: field(tail[0], "namespace")?,
        name: field(tail[1], "name")?,
        provider: field(tail[2], "provider")?,
        version,
    })
}

/// Join a bucket prefix and a key, trimming stray separators.
pub fn with_prefix(prefix: &str, key: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}/{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(version: &str) -> ModuleId {
        ModuleId::new("acme", "vpc", "aws", version)
    }

    #[test]
    fn key_layout() {
        assert_eq!(
            module_key(&id("1.0.0")),
            "namespace=acme/name=vpc/provider=aws/version=1.0.0/acme-vpc-aws-1.0.0.tar.gz"
        );
    }

    #[test]
    fn version_round_trip() {
        for v in ["1.0.0", "0.9.0", "1.2.0-beta.1", "2.0.0+build.7", "v3"] {
            assert_eq!(decode_version(&module_key(&id(v))).unwrap(), v);
        }
    }

    #[test]
    fn identity_round_trip_with_dashes() {
        let original = ModuleId::new("my-org", "vpc-peering", "aws-gov", "1.0.0-rc-1");
        assert_eq!(decode_key(&module_key(&original)).unwrap(), original);
    }

    #[test]
    fn decode_ignores_bucket_prefix() {
        let key = with_prefix("/modules/prod/", &module_key(&id("1.4.0")));
        assert!(key.starts_with("modules/prod/namespace=acme"));
        assert_eq!(decode_version(&key).unwrap(), "1.4.0");
        assert_eq!(decode_key(&key).unwrap(), id("1.4.0"));
    }

    #[test]
    fn decode_rejects_missing_version_segment() {
        let err = decode_version("namespace=acme/name=vpc/provider=aws/README.md").unwrap_err();
        assert!(matches!(err, RegistryError::KeyDecode { .. }));
    }

    #[test]
    fn decode_rejects_non_archive_object() {
        let err =
            decode_version("namespace=acme/name=vpc/provider=aws/version=1.0.0/notes.txt")
                .unwrap_err();
        assert!(matches!(err, RegistryError::KeyDecode { .. }));
    }

    #[test]
    fn decode_rejects_nested_objects() {
        let key = "namespace=acme/name=vpc/provider=aws/version=1.0.0/extra/a.tar.gz";
        assert!(decode_version(key).is_err());
    }

    #[test]
    fn decode_key_rejects_wrong_field_order() {
        let key = "name=vpc/namespace=acme/provider=aws/version=1.0.0/acme-vpc-aws-1.0.0.tar.gz";
        assert!(decode_key(key).is_err());
    }

    #[test]
    fn empty_prefix_is_transparent() {
        assert_eq!(with_prefix("", "a/b"), "a/b");
        assert_eq!(with_prefix("/", "a/b"), "a/b");
    }
}
