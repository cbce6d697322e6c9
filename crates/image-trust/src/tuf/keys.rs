//! Key identifiers and local key ownership.
//!
//! A trust repository lists its keys under canonical, repository-qualified
//! identifiers (`docker.io/library/alpine/1f2e…`). Delegation roles refer to
//! bare key IDs (`1f2e…`). [`CanonicalKeyId::to_local`] is the only bridge
//! between the two forms.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A bare signing-key identifier, as referenced by delegation roles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a key ID from public key bytes: hex SHA-256 of the key.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(public_key)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A repository-qualified key identifier, e.g. `{gun}/{key_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKeyId(String);

impl CanonicalKeyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Qualify a bare key ID with a repository name.
    pub fn qualified(gun: &str, key_id: &KeyId) -> Self {
        Self(format!("{}/{}", gun.trim_end_matches('/'), key_id.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strip the qualifier, keeping only the final path segment.
    ///
    /// Trailing separators are ignored, so `gun/abc/` yields `abc`.
    pub fn to_local(&self) -> KeyId {
        let trimmed = self.0.trim_end_matches('/');
        let base = match trimmed.rfind('/') {
            Some(idx) => &trimmed[idx + 1..],
            None => trimmed,
        };
        KeyId(base.to_string())
    }
}

impl fmt::Display for CanonicalKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptor for a locally held key. The key material itself never
/// passes through this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    /// Role hint recorded when the key was stored (e.g. `targets/alice`).
    #[serde(default)]
    pub role: String,
}

impl KeyInfo {
    pub fn for_role(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

/// Every key a repository can sign with, keyed by canonical ID.
pub type KeyListing = BTreeMap<CanonicalKeyId, KeyInfo>;

/// Collect the bare key IDs the caller controls.
///
/// Duplicates collapse; an empty listing yields an empty set.
pub fn owned_key_ids<'a, I>(canonical_ids: I) -> HashSet<KeyId>
where
    I: IntoIterator<Item = &'a CanonicalKeyId>,
{
    canonical_ids
        .into_iter()
        .map(CanonicalKeyId::to_local)
        .collect()
}
