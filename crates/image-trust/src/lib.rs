//! ImageTrust — signable-role resolution and revocation for container
//! image trust metadata.
//!
//! Decides which delegation roles the caller can sign a tag into, given the
//! repository's delegation tree and the keys held locally, and revokes one
//! or all signed tags from every such role with a single atomic publish.

pub mod config;
pub mod confirm;
pub mod error;
pub mod reference;
pub mod repository;
pub mod resolve;
pub mod revoke;
pub mod time;
pub mod tuf;

// Re-export primary types
pub use config::{ConfigOverrides, TrustConfig};
pub use error::{Result, TrustError};
pub use reference::ImageReference;
pub use repository::{ChangeList, FileRepository, MemoryRepository, TrustRepository};
pub use resolve::{resolve_signable_roles, SignableRoles};
pub use revoke::{revoke, RevocationReport, RevocationRequest, RevocationScope};
pub use tuf::{CanonicalKeyId, DelegationRole, KeyId, RoleName, Target, TargetWithRole};
