//! Trust metadata model: the pieces of a TUF repository this crate reads.
//!
//! The tuf module provides:
//! - Structured role names rooted at `targets`
//! - Delegation roles with key IDs and path restrictions
//! - Canonical and bare key identifiers, and local key ownership
//! - Targets with content hashes

pub mod keys;
pub mod role;
pub mod target;

pub use keys::{owned_key_ids, CanonicalKeyId, KeyId, KeyInfo, KeyListing};
pub use role::{DelegationRole, RoleName, CANONICAL_TARGETS_ROLE, RELEASES_ROLE};
pub use target::{Target, TargetWithRole};
