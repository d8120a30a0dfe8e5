//! Archive digests.
//!
//! Stored archives are immutable, so the SHA-256 of what a run uploaded is
//! enough to tell later whether the stored bytes are the ones it produced.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of an archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn compute(data: &[u8]) -> Self {
        ContentHash(format!("{:x}", Sha256::digest(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
