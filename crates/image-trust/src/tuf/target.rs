//! Signed targets: named artifact versions with content hashes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, TrustError};

use super::role::RoleName;

/// Hash algorithm name used for content hashes.
pub const SHA256: &str = "sha256";

/// A named artifact version (an image tag) and the content it binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Tag name; unique within a repository.
    pub name: String,
    /// Content hashes keyed by algorithm, base64-encoded on disk.
    #[serde(with = "base64_hashes")]
    pub hashes: BTreeMap<String, Vec<u8>>,
    /// Content length in bytes.
    pub length: u64,
}

impl Target {
    pub fn new(name: impl Into<String>, hashes: BTreeMap<String, Vec<u8>>, length: u64) -> Self {
        Self {
            name: name.into(),
            hashes,
            length,
        }
    }

    /// Build a target whose single hash is the SHA-256 of `content`.
    pub fn from_content(name: impl Into<String>, content: &[u8]) -> Self {
        let mut hashes = BTreeMap::new();
        hashes.insert(SHA256.to_string(), Sha256::digest(content).to_vec());
        Self::new(name, hashes, content.len() as u64)
    }

    /// Check that this target can be published.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidTarget` if the name or hash set is empty.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(TrustError::InvalidTarget("target name is empty".into()));
        }
        if self.hashes.is_empty() {
            return Err(TrustError::InvalidTarget(format!(
                "target '{}' has no content hashes",
                self.name
            )));
        }
        Ok(())
    }

    /// Hex-encoded SHA-256 digest, if present.
    pub fn sha256_hex(&self) -> Option<String> {
        self.hashes.get(SHA256).map(hex::encode)
    }
}

/// A target together with the role it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetWithRole {
    pub target: Target,
    pub role: RoleName,
}

mod base64_hashes {
    use std::collections::BTreeMap;

    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(hashes: &BTreeMap<String, Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded: BTreeMap<&str, String> = hashes
            .iter()
            .map(|(algo, bytes)| {
                (
                    algo.as_str(),
                    base64::engine::general_purpose::STANDARD.encode(bytes),
                )
            })
            .collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = BTreeMap::<String, String>::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|(algo, value)| {
                base64::engine::general_purpose::STANDARD
                    .decode(value.as_bytes())
                    .map(|bytes| (algo, bytes))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
