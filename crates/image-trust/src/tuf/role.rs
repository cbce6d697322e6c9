//! Role names and delegation roles.
//!
//! Role names are hierarchical paths rooted at the canonical `targets`
//! role, e.g. `targets/releases` or `targets/releases/qa/beta`. They are
//! kept as ordered segments so that parent/child relationships are decided
//! by segment comparison rather than string slicing.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};

use super::keys::KeyId;

/// Name of the canonical targets role.
pub const CANONICAL_TARGETS_ROLE: &str = "targets";

/// Default name of the operator-designated releases role.
pub const RELEASES_ROLE: &str = "targets/releases";

const SEPARATOR: char = '/';

/// A hierarchical role name stored as ordered path segments.
///
/// The first segment is always `targets`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName {
    segments: Vec<String>,
}

impl RoleName {
    /// The canonical `targets` role.
    pub fn targets() -> Self {
        Self {
            segments: vec![CANONICAL_TARGETS_ROLE.to_string()],
        }
    }

    /// The default `targets/releases` role.
    pub fn releases() -> Self {
        Self {
            segments: vec![CANONICAL_TARGETS_ROLE.to_string(), "releases".to_string()],
        }
    }

    /// Parse a `/`-separated role name.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidRoleName` if the name is empty, contains
    /// an empty segment, or is not rooted at `targets`.
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(TrustError::InvalidRoleName("empty role name".into()));
        }

        let segments: Vec<String> = name.split(SEPARATOR).map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(TrustError::InvalidRoleName(format!(
                "'{name}' contains an empty path segment"
            )));
        }
        if segments[0] != CANONICAL_TARGETS_ROLE {
            return Err(TrustError::InvalidRoleName(format!(
                "'{name}' is not rooted at '{CANONICAL_TARGETS_ROLE}'"
            )));
        }

        Ok(Self { segments })
    }

    /// Return a new role name one level below this one.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidRoleName` if `segment` is empty or
    /// contains a separator.
    pub fn child(&self, segment: &str) -> Result<Self> {
        if segment.is_empty() || segment.contains(SEPARATOR) {
            return Err(TrustError::InvalidRoleName(format!(
                "'{segment}' is not a single role name segment"
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Ordered path segments, starting with `targets`.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments; the canonical targets role has depth 1.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The parent role, or `None` for the canonical targets role.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Is this the canonical `targets` role?
    pub fn is_targets(&self) -> bool {
        self.segments.len() == 1
    }

    /// Is this role exactly one level below `parent`?
    pub fn is_direct_child_of(&self, parent: &RoleName) -> bool {
        self.segments.len() == parent.segments.len() + 1
            && self.segments.starts_with(&parent.segments)
    }

    /// Is this role somewhere below `ancestor`?
    pub fn is_descendant_of(&self, ancestor: &RoleName) -> bool {
        self.segments.len() > ancestor.segments.len()
            && self.segments.starts_with(&ancestor.segments)
    }

    /// Is this role a direct child of the canonical targets role?
    pub fn is_direct_child_of_targets(&self) -> bool {
        self.segments.len() == 2
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl FromStr for RoleName {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoleName {
    type Error = TrustError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RoleName> for String {
    fn from(role: RoleName) -> Self {
        role.to_string()
    }
}

/// A delegation role: a signing authority below `targets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRole {
    /// Hierarchical role name.
    pub name: RoleName,
    /// Key IDs allowed to sign for this role.
    pub key_ids: Vec<KeyId>,
    /// Path prefixes of target names this role may sign.
    pub paths: Vec<String>,
}

impl DelegationRole {
    /// Create a delegation role with no path restrictions granted.
    ///
    /// A role without paths accepts no target; use [`Self::with_all_paths`]
    /// or [`Self::with_paths`] to scope it.
    pub fn new(name: RoleName, key_ids: Vec<KeyId>) -> Self {
        Self {
            name,
            key_ids,
            paths: Vec::new(),
        }
    }

    /// Allow the role to sign any target name.
    pub fn with_all_paths(mut self) -> Self {
        self.paths = vec![String::new()];
        self
    }

    /// Restrict the role to target names starting with one of `paths`.
    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether this role's path restrictions accept `target_name`.
    ///
    /// Each restriction is a prefix; the empty prefix accepts every name.
    pub fn check_paths(&self, target_name: &str) -> bool {
        self.paths.iter().any(|p| target_name.starts_with(p.as_str()))
    }

    /// Check whether any of this role's keys is in `owned`.
    pub fn has_any_key(&self, owned: &HashSet<KeyId>) -> bool {
        self.key_ids.iter().any(|id| owned.contains(id))
    }
}
