//! In-memory trust repository.
//!
//! Holds published metadata and a pending [`ChangeList`] in memory. Used by
//! tests and benches, and as a reference for the repository contract.
//! Publish failures can be injected to exercise the abort path.

use log::debug;

use crate::error::{Result, TrustError};
use crate::tuf::{
    CanonicalKeyId, DelegationRole, KeyId, KeyInfo, KeyListing, RoleName, Target, TargetWithRole,
};

use super::changelist::ChangeList;
use super::metadata::TrustMetadata;
use super::TrustRepository;

/// A trust repository that lives entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryRepository {
    gun: String,
    keys: KeyListing,
    metadata: TrustMetadata,
    pending: ChangeList,
    publish_failure: Option<String>,
    publish_attempts: usize,
}

impl MemoryRepository {
    pub fn new(gun: impl Into<String>) -> Self {
        Self {
            gun: gun.into(),
            keys: KeyListing::new(),
            metadata: TrustMetadata::new(),
            pending: ChangeList::new(),
            publish_failure: None,
            publish_attempts: 0,
        }
    }

    /// Record a locally held key and return its canonical ID.
    pub fn add_key(&mut self, key_id: &KeyId) -> CanonicalKeyId {
        let canonical = CanonicalKeyId::qualified(&self.gun, key_id);
        self.keys.insert(canonical.clone(), KeyInfo::default());
        canonical
    }

    /// Add a delegation directly to the published metadata.
    pub fn add_delegation(&mut self, role: DelegationRole) -> Result<()> {
        self.metadata.add_delegation(role)
    }

    /// Sign a target directly into the published metadata.
    pub fn add_target(&mut self, target: Target, role: &RoleName) -> Result<()> {
        self.metadata.add_target(target, role)
    }

    /// Make the next publish fail with `reason`.
    pub fn fail_next_publish(&mut self, reason: impl Into<String>) {
        self.publish_failure = Some(reason.into());
    }

    /// Number of times publish has been called.
    pub fn publish_attempts(&self) -> usize {
        self.publish_attempts
    }

    /// Published metadata.
    pub fn metadata(&self) -> &TrustMetadata {
        &self.metadata
    }

    /// Changes staged since the last publish.
    pub fn pending(&self) -> &ChangeList {
        &self.pending
    }
}

impl TrustRepository for MemoryRepository {
    fn gun(&self) -> &str {
        &self.gun
    }

    fn list_all_key_ids(&self) -> Result<KeyListing> {
        Ok(self.keys.clone())
    }

    fn delegation_roles(&self) -> Result<Vec<DelegationRole>> {
        Ok(self.metadata.delegations.clone())
    }

    fn target_by_name(&self, name: &str, roles: &[RoleName]) -> Result<TargetWithRole> {
        self.metadata
            .find_target(name, roles)
            .ok_or_else(|| TrustError::NoSuchTrustData(name.to_string()))
    }

    fn list_targets(&self, roles: &[RoleName]) -> Result<Vec<TargetWithRole>> {
        Ok(self.metadata.list_targets(roles))
    }

    fn remove_target(&mut self, name: &str, roles: &[RoleName]) -> Result<()> {
        self.pending.push_removal(name, roles.to_vec());
        Ok(())
    }

    fn publish(&mut self) -> Result<()> {
        self.publish_attempts += 1;
        let pending = std::mem::take(&mut self.pending);

        if let Some(reason) = self.publish_failure.take() {
            return Err(TrustError::StorageError(reason));
        }

        self.metadata = self.metadata.apply(&pending)?;
        debug!("published {} change(s) to {}", pending.len(), self.gun);
        Ok(())
    }

    fn discard_changes(&mut self) {
        self.pending.clear();
    }
}
