//! Signable-role resolution.
//!
//! Given a repository and a target, decide which roles the caller may sign
//! the target into (or remove it from):
//!
//! 1. A repository without delegations only has `targets`.
//! 2. Otherwise a delegation qualifies when it is a direct child of
//!    `targets`, its path restrictions accept the target name, and at least
//!    one of its keys is held locally.
//! 3. No qualifying delegation is an error, never an empty result.

use std::collections::HashSet;

use log::debug;

use crate::error::{Result, TrustError};
use crate::repository::TrustRepository;
use crate::tuf::{owned_key_ids, DelegationRole, KeyId, RoleName, Target};

/// Non-empty, ordered set of roles a target can be signed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableRoles(Vec<RoleName>);

impl SignableRoles {
    pub fn as_slice(&self) -> &[RoleName] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoleName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A resolved set is never empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, role: &RoleName) -> bool {
        self.0.contains(role)
    }

    pub fn into_vec(self) -> Vec<RoleName> {
        self.0
    }
}

impl<'a> IntoIterator for &'a SignableRoles {
    type Item = &'a RoleName;
    type IntoIter = std::slice::Iter<'a, RoleName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Resolve the roles `target` can be signed into on `repo`.
///
/// # Errors
///
/// Returns `TrustError::NoSigningKeysForDelegations` if delegations exist
/// but none qualifies, or any error raised by the repository.
pub fn resolve_signable_roles<R>(repo: &R, target: &Target) -> Result<SignableRoles>
where
    R: TrustRepository + ?Sized,
{
    let owned = owned_key_ids(repo.list_all_key_ids()?.keys());
    let delegations = repo.delegation_roles()?;
    select_signable_roles(&owned, &delegations, &target.name)
}

/// Pure selection step of [`resolve_signable_roles`].
pub fn select_signable_roles(
    owned: &HashSet<KeyId>,
    delegations: &[DelegationRole],
    target_name: &str,
) -> Result<SignableRoles> {
    if delegations.is_empty() {
        debug!("no delegations, signing {target_name} into targets");
        return Ok(SignableRoles(vec![RoleName::targets()]));
    }

    let mut roles = Vec::new();
    for delegation in delegations {
        if !delegation.name.is_direct_child_of_targets() {
            debug!("skipping {}: not a direct child of targets", delegation.name);
            continue;
        }
        if !delegation.check_paths(target_name) {
            debug!(
                "skipping {}: paths do not cover {target_name}",
                delegation.name
            );
            continue;
        }
        if !delegation.has_any_key(owned) {
            debug!("skipping {}: no local key", delegation.name);
            continue;
        }
        roles.push(delegation.name.clone());
    }

    if roles.is_empty() {
        return Err(TrustError::NoSigningKeysForDelegations);
    }
    Ok(SignableRoles(roles))
}
