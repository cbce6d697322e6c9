//! Published trust metadata shared by the repository implementations.
//!
//! Holds the ordered delegation roles and the targets signed into each
//! role. Staged changes are applied to a copy so that a failed publish
//! leaves the original untouched.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};
use crate::tuf::{DelegationRole, RoleName, Target, TargetWithRole};

use super::changelist::{Change, ChangeList};

/// Delegations and per-role target lists for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustMetadata {
    /// Delegation roles in insertion order.
    pub delegations: Vec<DelegationRole>,
    /// Targets signed into each role, keyed by role name.
    pub targets: BTreeMap<RoleName, Vec<Target>>,
}

impl Default for TrustMetadata {
    fn default() -> Self {
        let mut targets = BTreeMap::new();
        targets.insert(RoleName::targets(), Vec::new());
        Self {
            delegations: Vec::new(),
            targets,
        }
    }
}

impl TrustMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Is `role` the targets role or a known delegation?
    pub fn has_role(&self, role: &RoleName) -> bool {
        role.is_targets() || self.delegations.iter().any(|d| &d.name == role)
    }

    /// Add or replace a delegation role.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidRoleName` if the role is `targets`
    /// itself, or `TrustError::UnknownRole` if its parent does not exist.
    pub fn add_delegation(&mut self, role: DelegationRole) -> Result<()> {
        let parent = role.name.parent().ok_or_else(|| {
            TrustError::InvalidRoleName(format!(
                "'{}' cannot be used as a delegation",
                role.name
            ))
        })?;
        if !self.has_role(&parent) {
            return Err(TrustError::UnknownRole(parent.to_string()));
        }

        self.targets.entry(role.name.clone()).or_default();
        match self.delegations.iter_mut().find(|d| d.name == role.name) {
            Some(existing) => *existing = role,
            None => self.delegations.push(role),
        }
        Ok(())
    }

    /// Sign a target into `role`, replacing any target with the same name.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::UnknownRole` for an unknown role, or
    /// `TrustError::InvalidTarget` if the target cannot be published.
    pub fn add_target(&mut self, target: Target, role: &RoleName) -> Result<()> {
        target.validate()?;
        if !self.has_role(role) {
            return Err(TrustError::UnknownRole(role.to_string()));
        }
        let list = self.targets.entry(role.clone()).or_default();
        list.retain(|t| t.name != target.name);
        list.push(target);
        Ok(())
    }

    /// Find the first role in `roles` holding `name`.
    pub fn find_target(&self, name: &str, roles: &[RoleName]) -> Option<TargetWithRole> {
        search_order(roles).iter().find_map(|role| {
            self.targets
                .get(role)
                .and_then(|list| list.iter().find(|t| t.name == name))
                .map(|target| TargetWithRole {
                    target: target.clone(),
                    role: role.clone(),
                })
        })
    }

    /// List targets across `roles`, de-duplicated by name; earlier roles win.
    pub fn list_targets(&self, roles: &[RoleName]) -> Vec<TargetWithRole> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for role in search_order(roles) {
            let Some(list) = self.targets.get(&role) else {
                continue;
            };
            for target in list {
                if seen.insert(target.name.clone()) {
                    found.push(TargetWithRole {
                        target: target.clone(),
                        role: role.clone(),
                    });
                }
            }
        }
        found
    }

    /// Every role currently holding a target named `name`, in role order.
    pub fn roles_containing(&self, name: &str) -> Vec<RoleName> {
        self.targets
            .iter()
            .filter(|(_, list)| list.iter().any(|t| t.name == name))
            .map(|(role, _)| role.clone())
            .collect()
    }

    /// Apply `changes` to a copy of this metadata.
    ///
    /// Removing a target a role does not hold is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::UnknownRole` if a change names a role that does
    /// not exist, or `TrustError::InvalidTarget` if any remaining target has
    /// no content hashes. `self` is never modified.
    pub fn apply(&self, changes: &ChangeList) -> Result<TrustMetadata> {
        let mut next = self.clone();
        for change in changes {
            let Change::RemoveTarget { name, roles } = change;
            for role in search_order(roles) {
                if !next.has_role(&role) {
                    return Err(TrustError::UnknownRole(role.to_string()));
                }
                if let Some(list) = next.targets.get_mut(&role) {
                    list.retain(|t| &t.name != name);
                }
            }
        }
        next.validate_targets()?;
        Ok(next)
    }

    /// Check every signed target is publishable.
    pub fn validate_targets(&self) -> Result<()> {
        self.targets
            .values()
            .flatten()
            .try_for_each(Target::validate)
    }
}

/// An empty role list means the canonical targets role.
fn search_order(roles: &[RoleName]) -> Vec<RoleName> {
    if roles.is_empty() {
        vec![RoleName::targets()]
    } else {
        roles.to_vec()
    }
}
