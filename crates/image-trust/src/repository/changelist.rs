//! Staged metadata mutations.
//!
//! A [`ChangeList`] accumulates removal intents in memory. Repositories keep
//! one as their pending set; revocation builds one up front and submits it
//! through [`ChangeList::commit`], the single commit point for both the
//! success and the failure path.

use log::{debug, warn};

use crate::error::{Result, TrustError};
use crate::tuf::RoleName;

use super::TrustRepository;

/// A single staged mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Remove the named target from each listed role.
    RemoveTarget { name: String, roles: Vec<RoleName> },
}

/// Ordered list of staged changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeList {
    changes: Vec<Change>,
}

impl ChangeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target removal (builder form).
    pub fn remove_target(mut self, name: impl Into<String>, roles: Vec<RoleName>) -> Self {
        self.push_removal(name, roles);
        self
    }

    /// Add a target removal.
    pub fn push_removal(&mut self, name: impl Into<String>, roles: Vec<RoleName>) {
        self.changes.push(Change::RemoveTarget {
            name: name.into(),
            roles,
        });
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    /// Stage every change on `repo`, then publish once.
    ///
    /// Anything already staged on `repo` is discarded first, so only this
    /// list is published. Staging errors are tagged with `reference` and
    /// abort before publish. A publish error is reported as
    /// `TrustError::PublishFailed`. In both cases whatever was staged on
    /// `repo` is discarded.
    pub fn commit<R>(self, repo: &mut R, reference: &str) -> Result<()>
    where
        R: TrustRepository + ?Sized,
    {
        repo.discard_changes();
        debug!("staging {} change(s) for {}", self.len(), reference);
        for change in &self.changes {
            let Change::RemoveTarget { name, roles } = change;
            if let Err(e) = repo.remove_target(name, roles) {
                warn!("staging removal of {name} failed, discarding staged changes");
                repo.discard_changes();
                return Err(e.in_context(reference));
            }
        }

        debug!("publishing {}", repo.gun());
        if let Err(e) = repo.publish() {
            warn!("publish of {} failed: {e}", repo.gun());
            repo.discard_changes();
            return Err(TrustError::PublishFailed {
                reference: reference.to_string(),
                source: Box::new(e),
            });
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ChangeList {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
