//! Trust repositories: the collaborator that owns roles, targets and keys.
//!
//! Resolution and revocation only talk to a repository through
//! [`TrustRepository`]. Two implementations share one metadata model:
//!
//! - [`memory`]: in-memory repository with publish failure injection.
//! - [`file`]: filesystem-backed repository rooted at a trust directory.
//!
//! Mutations are staged in a [`ChangeList`] and only become visible on
//! [`TrustRepository::publish`].

pub mod changelist;
pub mod file;
pub mod memory;
pub mod metadata;

pub use changelist::{Change, ChangeList};
pub use file::FileRepository;
pub use memory::MemoryRepository;
pub use metadata::TrustMetadata;

use crate::error::Result;
use crate::tuf::{DelegationRole, KeyListing, RoleName, TargetWithRole};

/// Read and mutate access to one trust repository (one GUN).
///
/// Handles are not synchronized; mutation takes `&mut self`, so callers
/// serialize access to a handle.
pub trait TrustRepository {
    /// Globally unique name of the repository.
    fn gun(&self) -> &str;

    /// Every key the caller holds for this repository, by canonical ID.
    fn list_all_key_ids(&self) -> Result<KeyListing>;

    /// All delegation roles, in repository order.
    fn delegation_roles(&self) -> Result<Vec<DelegationRole>>;

    /// Find a target by name, searching `roles` in priority order.
    ///
    /// An empty `roles` slice searches the canonical targets role.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::NoSuchTrustData` if no searched role has it.
    fn target_by_name(&self, name: &str, roles: &[RoleName]) -> Result<TargetWithRole>;

    /// List targets across `roles`; earlier roles win on name collisions.
    fn list_targets(&self, roles: &[RoleName]) -> Result<Vec<TargetWithRole>>;

    /// Stage removal of `name` from each of `roles`. No effect until publish.
    fn remove_target(&mut self, name: &str, roles: &[RoleName]) -> Result<()>;

    /// Commit all staged changes atomically.
    ///
    /// On failure nothing is applied and the staged changes are dropped.
    fn publish(&mut self) -> Result<()>;

    /// Drop all staged changes without publishing.
    fn discard_changes(&mut self);
}
