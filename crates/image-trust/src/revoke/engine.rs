//! Revocation engine: remove signed tags from every role that can sign them.
//!
//! A revocation runs through `resolving → removing → publishing` and ends
//! `committed` or `aborted`. All removals are planned into one
//! [`ChangeList`] before the repository is touched, then committed with a
//! single publish. A failure at any point leaves the repository's published
//! state unchanged.

use log::{debug, info, warn};

use crate::error::{Result, TrustError};
use crate::repository::{ChangeList, TrustRepository};
use crate::resolve::{resolve_signable_roles, SignableRoles};
use crate::tuf::{RoleName, Target};

use super::types::{
    RemovedTarget, RevocationPhase, RevocationReport, RevocationRequest, RevocationScope,
};

/// Revoke signatures as described by `request` and publish once.
///
/// # Errors
///
/// - `TrustError::NoSuchTrustData` if a single tag is not in the releases
///   role or `targets`; nothing is published.
/// - `TrustError::NoSigningKeysForDelegations` if any target has no role the
///   caller can sign for; the whole revocation is abandoned.
/// - `TrustError::PublishFailed` if the final publish fails.
/// - `TrustError::Repository` for other repository failures.
pub fn revoke<R>(repo: &mut R, request: &RevocationRequest) -> Result<RevocationReport>
where
    R: TrustRepository + ?Sized,
{
    let mut progress = Progress::new(&request.reference);

    let (changes, removed) = match plan_revocation(&*repo, request) {
        Ok(plan) => plan,
        Err(e) => return Err(progress.abort(e)),
    };

    progress.enter(RevocationPhase::Removing);
    if let Err(e) = changes.commit(repo, &request.reference) {
        return Err(progress.abort(e));
    }
    progress.enter(RevocationPhase::Committed);

    let report = RevocationReport {
        gun: repo.gun().to_string(),
        removed,
    };
    info!(
        "removed {} signature(s) across {} tag(s) for {}",
        report.removal_count(),
        report.removed.len(),
        request.reference
    );
    Ok(report)
}

/// Find the targets `request` covers and the roles to remove each from.
///
/// Reads the repository only; nothing is staged.
pub fn plan_revocation<R>(
    repo: &R,
    request: &RevocationRequest,
) -> Result<(ChangeList, Vec<RemovedTarget>)>
where
    R: TrustRepository + ?Sized,
{
    let reference = request.reference.as_str();
    let search_roles = request.search_roles();

    let targets: Vec<Target> = match &request.scope {
        RevocationScope::SingleTag(tag) => {
            let found = repo
                .target_by_name(tag, &search_roles)
                .map_err(|e| e.in_context(reference))?;
            debug!("found {tag} in {}", found.role);
            vec![found.target]
        }
        RevocationScope::AllTags => repo
            .list_targets(&search_roles)
            .map_err(|e| e.in_context(reference))?
            .into_iter()
            .map(|t| t.target)
            .collect(),
    };

    let mut changes = ChangeList::new();
    let mut removed = Vec::with_capacity(targets.len());
    for target in targets {
        let roles = resolve_signable_roles(repo, &target).map_err(|e| e.in_context(reference))?;
        let removed_from =
            roles_holding(repo, &target.name, &roles).map_err(|e| e.in_context(reference))?;
        debug!(
            "removing {} from {} role(s), {} holding it",
            target.name,
            roles.len(),
            removed_from.len()
        );
        changes.push_removal(target.name.clone(), roles.as_slice().to_vec());
        removed.push(RemovedTarget {
            name: target.name,
            roles,
            removed_from,
        });
    }

    Ok((changes, removed))
}

/// The subset of `roles` that currently hold a target called `name`.
fn roles_holding<R>(repo: &R, name: &str, roles: &SignableRoles) -> Result<Vec<RoleName>>
where
    R: TrustRepository + ?Sized,
{
    let mut holding = Vec::new();
    for role in roles {
        match repo.target_by_name(name, std::slice::from_ref(role)) {
            Ok(_) => holding.push(role.clone()),
            Err(TrustError::NoSuchTrustData(_)) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(holding)
}

/// Tracks and logs phase transitions for one revocation.
struct Progress<'a> {
    reference: &'a str,
    phase: RevocationPhase,
}

impl<'a> Progress<'a> {
    fn new(reference: &'a str) -> Self {
        debug!("revocation of {reference}: {}", RevocationPhase::Resolving);
        Self {
            reference,
            phase: RevocationPhase::Resolving,
        }
    }

    fn enter(&mut self, next: RevocationPhase) {
        debug!("revocation of {}: {} -> {}", self.reference, self.phase, next);
        self.phase = next;
    }

    fn abort(&mut self, err: TrustError) -> TrustError {
        if matches!(err, TrustError::PublishFailed { .. }) {
            self.enter(RevocationPhase::Publishing);
        }
        warn!(
            "revocation of {} aborted while {}: {err}",
            self.reference, self.phase
        );
        self.phase = RevocationPhase::Aborted;
        err
    }
}
