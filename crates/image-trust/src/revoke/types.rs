//! Revocation requests, phases and reports.

use std::fmt;

use crate::error::{Result, TrustError};
use crate::reference::ImageReference;
use crate::resolve::SignableRoles;
use crate::tuf::RoleName;

/// What to revoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationScope {
    /// Remove signatures for one tag.
    SingleTag(String),
    /// Remove signatures for every tag.
    AllTags,
}

/// A revocation against one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationRequest {
    /// Artifact reference, used to tag errors.
    pub reference: String,
    /// Single tag or all tags.
    pub scope: RevocationScope,
    /// Operator-designated releases role, searched before `targets`.
    pub releases_role: RoleName,
}

impl RevocationRequest {
    pub fn single_tag(reference: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            scope: RevocationScope::SingleTag(tag.into()),
            releases_role: RoleName::releases(),
        }
    }

    pub fn all_tags(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            scope: RevocationScope::AllTags,
            releases_role: RoleName::releases(),
        }
    }

    /// Build a request from a parsed image reference.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidReference` for digest references:
    /// signatures are removed by tag.
    pub fn from_reference(reference: &ImageReference) -> Result<Self> {
        if reference.is_digested() {
            return Err(TrustError::InvalidReference(
                "cannot remove signature for digest".into(),
            ));
        }
        Ok(match reference.tag() {
            Some(tag) => Self::single_tag(reference.as_str(), tag),
            None => Self::all_tags(reference.as_str()),
        })
    }

    /// Use a different releases role.
    pub fn with_releases_role(mut self, role: RoleName) -> Self {
        self.releases_role = role;
        self
    }

    /// Roles searched for targets, highest priority first.
    pub fn search_roles(&self) -> Vec<RoleName> {
        if self.releases_role.is_targets() {
            vec![RoleName::targets()]
        } else {
            vec![self.releases_role.clone(), RoleName::targets()]
        }
    }

    /// Does this request need operator confirmation before running?
    pub fn requires_confirmation(&self) -> bool {
        matches!(self.scope, RevocationScope::AllTags)
    }
}

/// Progress of one revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationPhase {
    Resolving,
    Removing,
    Publishing,
    Committed,
    Aborted,
}

impl RevocationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::Removing => "removing",
            Self::Publishing => "publishing",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
        }
    }

    /// Is this a final phase?
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Aborted)
    }
}

impl fmt::Display for RevocationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One target, the roles it was staged for removal from, and the subset of
/// those that actually held it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedTarget {
    pub name: String,
    /// Every role the caller can sign the target into.
    pub roles: SignableRoles,
    /// Roles that held the target when the revocation was planned.
    pub removed_from: Vec<RoleName>,
}

/// Result of a committed revocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationReport {
    /// Repository the revocation was published to.
    pub gun: String,
    /// Targets removed, in the order they were staged.
    pub removed: Vec<RemovedTarget>,
}

impl RevocationReport {
    /// Number of signatures actually removed, one per (target, role) pair
    /// that held the target.
    pub fn removal_count(&self) -> usize {
        self.removed.iter().map(|r| r.removed_from.len()).sum()
    }
}
