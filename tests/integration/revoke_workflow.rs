//! Integration test: signable-role resolution and revocation end to end.
//!
//! Exercises the public API against an in-memory repository:
//! 1. Resolve signable roles across delegation layouts
//! 2. Revoke a single tag from every role the caller can sign
//! 3. Revoke every tag in one publish
//! 4. Abort paths leave the published state untouched

use image_trust::repository::TrustRepository;
use image_trust::{
    resolve_signable_roles, revoke, DelegationRole, ImageReference, KeyId, MemoryRepository,
    RevocationRequest, RoleName, Target, TrustError,
};

const GUN: &str = "docker.io/library/alpine";

fn role(name: &str) -> RoleName {
    RoleName::parse(name).unwrap()
}

fn delegation(name: &str, keys: &[&str]) -> DelegationRole {
    DelegationRole::new(role(name), keys.iter().map(|k| KeyId::new(*k)).collect())
        .with_all_paths()
}

/// `targets/releases` (K1), `targets/qa` (K2), caller holds K1 and K2.
fn two_signer_repo() -> MemoryRepository {
    let mut repo = MemoryRepository::new(GUN);
    repo.add_delegation(delegation("targets/releases", &["K1"]))
        .unwrap();
    repo.add_delegation(delegation("targets/qa", &["K2"])).unwrap();
    repo.add_key(&KeyId::new("K1"));
    repo.add_key(&KeyId::new("K2"));
    repo
}

#[test]
fn no_delegations_signs_into_targets() {
    let mut repo = MemoryRepository::new(GUN);
    repo.add_key(&KeyId::new("K1"));

    let roles = resolve_signable_roles(&repo, &Target::from_content("latest", b"img")).unwrap();
    assert_eq!(roles.as_slice(), &[RoleName::targets()]);
}

#[test]
fn resolves_every_role_holding_a_local_key() {
    let repo = two_signer_repo();
    let roles = resolve_signable_roles(&repo, &Target::from_content("latest", b"img")).unwrap();

    assert_eq!(roles.len(), 2);
    assert!(roles.contains(&role("targets/releases")));
    assert!(roles.contains(&role("targets/qa")));
}

#[test]
fn path_restrictions_exclude_roles() {
    let mut repo = MemoryRepository::new(GUN);
    repo.add_delegation(delegation("targets/releases", &["K1"]))
        .unwrap();
    repo.add_delegation(
        DelegationRole::new(role("targets/nightly"), vec![KeyId::new("K1")])
            .with_paths(["nightly-"]),
    )
    .unwrap();
    repo.add_key(&KeyId::new("K1"));

    let roles = resolve_signable_roles(&repo, &Target::from_content("v1.0", b"img")).unwrap();
    assert_eq!(roles.as_slice(), &[role("targets/releases")]);

    let roles =
        resolve_signable_roles(&repo, &Target::from_content("nightly-42", b"img")).unwrap();
    assert_eq!(roles.len(), 2);
}

#[test]
fn nested_delegations_are_never_signable() {
    let mut repo = MemoryRepository::new(GUN);
    repo.add_delegation(delegation("targets/releases", &["K2"]))
        .unwrap();
    repo.add_delegation(delegation("targets/releases/team", &["K1"]))
        .unwrap();
    repo.add_key(&KeyId::new("K1"));

    // The caller holds a key for the nested role only.
    let err =
        resolve_signable_roles(&repo, &Target::from_content("latest", b"img")).unwrap_err();
    assert!(matches!(err, TrustError::NoSigningKeysForDelegations));
}

#[test]
fn disjoint_keys_report_no_signing_keys() {
    let mut repo = MemoryRepository::new(GUN);
    repo.add_delegation(delegation("targets/releases", &["K1"]))
        .unwrap();
    repo.add_key(&KeyId::new("K9"));

    let err =
        resolve_signable_roles(&repo, &Target::from_content("latest", b"img")).unwrap_err();
    assert_eq!(err.to_string(), "no valid signing keys for delegation roles");
}

#[test]
fn single_tag_revocation_removes_from_resolved_roles_only() {
    // ── Step 1: sign the tag into both delegations ─────────────────────
    let mut repo = two_signer_repo();
    repo.add_delegation(delegation("targets/audit", &["K7"]))
        .unwrap();
    let latest = Target::from_content("latest", b"img");
    for name in ["targets/releases", "targets/qa", "targets/audit"] {
        repo.add_target(latest.clone(), &role(name)).unwrap();
    }

    // ── Step 2: revoke through a parsed reference ──────────────────────
    let reference = ImageReference::parse("alpine:latest").unwrap();
    let request = RevocationRequest::from_reference(&reference).unwrap();
    let report = revoke(&mut repo, &request).unwrap();

    assert_eq!(report.gun, GUN);
    assert_eq!(report.removal_count(), 2);
    assert_eq!(repo.publish_attempts(), 1);

    // ── Step 3: the role without a local key keeps its signature ───────
    assert_eq!(
        repo.metadata().roles_containing("latest"),
        vec![role("targets/audit")]
    );
}

#[test]
fn revoke_all_tags_publishes_once() {
    let mut repo = two_signer_repo();
    for tag in ["1.0", "1.1", "latest"] {
        repo.add_target(Target::from_content(tag, tag.as_bytes()), &role("targets/releases"))
            .unwrap();
    }
    repo.add_target(Target::from_content("edge", b"edge"), &RoleName::targets())
        .unwrap();

    let reference = ImageReference::parse("alpine").unwrap();
    let request = RevocationRequest::from_reference(&reference).unwrap();
    assert!(request.requires_confirmation());

    let report = revoke(&mut repo, &request).unwrap();
    assert_eq!(report.removed.len(), 4);
    assert_eq!(report.removal_count(), 3);
    assert_eq!(repo.publish_attempts(), 1);

    let edge = report.removed.iter().find(|r| r.name == "edge").unwrap();
    assert_eq!(edge.roles.len(), 2);
    assert!(edge.removed_from.is_empty());

    // Removal only touches resolved roles, so the copy in `targets` stays.
    let remaining = repo.list_targets(&request.search_roles()).unwrap();
    assert_eq!(remaining.len(), 1, "left behind: {remaining:?}");
    assert_eq!(remaining[0].target.name, "edge");
    assert_eq!(remaining[0].role, RoleName::targets());
}

#[test]
fn revoke_all_aborts_on_first_unsignable_target() {
    let mut repo = MemoryRepository::new(GUN);
    repo.add_delegation(
        DelegationRole::new(role("targets/releases"), vec![KeyId::new("K1")])
            .with_paths(["v"]),
    )
    .unwrap();
    repo.add_key(&KeyId::new("K1"));
    repo.add_target(Target::from_content("v1", b"1"), &role("targets/releases"))
        .unwrap();
    repo.add_target(Target::from_content("other", b"2"), &RoleName::targets())
        .unwrap();

    let err = revoke(&mut repo, &RevocationRequest::all_tags("alpine")).unwrap_err();
    assert!(matches!(err, TrustError::NoSigningKeysForDelegations));
    assert_eq!(repo.publish_attempts(), 0);
    assert_eq!(
        repo.metadata().roles_containing("v1"),
        vec![role("targets/releases")]
    );
}

#[test]
fn publish_failure_leaves_state_unchanged() {
    let mut repo = two_signer_repo();
    let latest = Target::from_content("latest", b"img");
    repo.add_target(latest.clone(), &role("targets/releases"))
        .unwrap();
    repo.add_target(latest, &role("targets/qa")).unwrap();
    let before = repo.metadata().clone();

    repo.fail_next_publish("remote unavailable");
    let err = revoke(&mut repo, &RevocationRequest::single_tag("alpine:latest", "latest"))
        .unwrap_err();

    match &err {
        TrustError::PublishFailed { reference, .. } => assert_eq!(reference, "alpine:latest"),
        other => panic!("expected publish failure, got {other:?}"),
    }
    assert!(err.to_string().contains("remote unavailable"));
    assert_eq!(repo.metadata(), &before);
    assert!(repo.pending().is_empty());

    // A retry succeeds once the repository recovers.
    revoke(&mut repo, &RevocationRequest::single_tag("alpine:latest", "latest")).unwrap();
    assert!(repo.metadata().roles_containing("latest").is_empty());
}

#[test]
fn missing_tag_is_no_such_trust_data() {
    let mut repo = two_signer_repo();
    repo.add_target(Target::from_content("latest", b"img"), &role("targets/releases"))
        .unwrap();

    let err = revoke(&mut repo, &RevocationRequest::single_tag("alpine:foo", "foo")).unwrap_err();
    assert_eq!(err.to_string(), "No trust data for foo");
    assert_eq!(repo.publish_attempts(), 0);
}

#[test]
fn tag_only_in_targets_is_found() {
    let mut repo = MemoryRepository::new(GUN);
    repo.add_key(&KeyId::new("K1"));
    repo.add_target(Target::from_content("latest", b"img"), &RoleName::targets())
        .unwrap();

    let report =
        revoke(&mut repo, &RevocationRequest::single_tag("alpine:latest", "latest")).unwrap();
    assert_eq!(report.removed[0].roles.as_slice(), &[RoleName::targets()]);
    assert!(repo.metadata().roles_containing("latest").is_empty());
}

#[test]
fn digest_reference_is_rejected_before_lookup() {
    let reference = ImageReference::parse(
        "alpine@sha256:7dd55fd5ce3a1e9e5bdc8f4f0a7d8e4e6c2f1b5a3d9e0c7b6a5f4e3d2c1b0a99",
    )
    .unwrap();
    let err = RevocationRequest::from_reference(&reference).unwrap_err();
    assert_eq!(err.to_string(), "cannot remove signature for digest");
}
