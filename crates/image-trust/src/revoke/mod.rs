//! Revocation of signed tags from every role the caller can sign for.
//!
//! The revoke module provides:
//! - Revocation requests for a single tag or all tags
//! - Planning: target lookup in priority order plus role resolution
//! - A single atomic publish of all planned removals

pub mod engine;
pub mod types;

pub use engine::{plan_revocation, revoke};
pub use types::{
    RemovedTarget, RevocationPhase, RevocationReport, RevocationRequest, RevocationScope,
};
