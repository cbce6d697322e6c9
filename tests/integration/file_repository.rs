//! Integration test: filesystem-backed trust repository.
//!
//! Tests the on-disk lifecycle:
//! 1. Initialize trust data and import keys
//! 2. Sign tags into delegations
//! 3. Revoke and reopen to confirm the publish reached disk
//! 4. Delete trust data

use image_trust::repository::TrustRepository;
use image_trust::tuf::KeyInfo;
use image_trust::{
    revoke, DelegationRole, FileRepository, KeyId, RevocationRequest, RoleName, Target,
    TrustError,
};

const GUN: &str = "docker.io/library/alpine";

fn role(name: &str) -> RoleName {
    RoleName::parse(name).unwrap()
}

fn seeded(dir: &std::path::Path) -> FileRepository {
    let mut repo = FileRepository::init(dir, GUN).unwrap();
    repo.add_delegation(
        DelegationRole::new(role("targets/releases"), vec![KeyId::new("abc123")])
            .with_all_paths(),
    )
    .unwrap();
    repo.import_key(&KeyId::new("abc123"), &KeyInfo::for_role("targets/releases"))
        .unwrap();
    for tag in ["1.0", "latest"] {
        repo.add_target(Target::from_content(tag, tag.as_bytes()), &role("targets/releases"))
            .unwrap();
    }
    repo
}

#[test]
fn file_repository_revoke_lifecycle() {
    let dir = tempfile::tempdir().unwrap();

    // ── Step 1: seed trust data ─────────────────────────────────────────
    let repo = seeded(dir.path());
    assert!(repo.is_initialized());
    assert!(repo.published_at().is_none());
    assert!(dir
        .path()
        .join("tuf/docker.io/library/alpine/metadata.json")
        .exists());
    assert!(dir
        .path()
        .join("private/docker.io/library/alpine/abc123.key")
        .exists());

    // ── Step 2: keys are listed under their canonical IDs ──────────────
    let keys = repo.list_all_key_ids().unwrap();
    let canonical: Vec<&str> = keys.keys().map(|k| k.as_str()).collect();
    assert_eq!(canonical, vec!["docker.io/library/alpine/abc123"]);

    // ── Step 3: revoke one tag ─────────────────────────────────────────
    let mut repo = FileRepository::open(dir.path(), GUN).unwrap();
    let report = revoke(&mut repo, &RevocationRequest::single_tag("alpine:1.0", "1.0")).unwrap();
    assert_eq!(report.removed[0].roles.as_slice(), &[role("targets/releases")]);

    // ── Step 4: reopen and confirm the publish persisted ───────────────
    let reopened = FileRepository::open(dir.path(), GUN).unwrap();
    assert!(reopened.published_at().is_some());
    let err = reopened
        .target_by_name("1.0", &[role("targets/releases"), RoleName::targets()])
        .unwrap_err();
    assert!(matches!(err, TrustError::NoSuchTrustData(_)));
    assert!(reopened
        .target_by_name("latest", &[role("targets/releases")])
        .is_ok());

    // No temp file is left behind by the atomic write.
    assert!(!dir
        .path()
        .join("tuf/docker.io/library/alpine/metadata.json.tmp")
        .exists());
}

#[test]
fn revoke_all_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    seeded(dir.path());

    let mut repo = FileRepository::open(dir.path(), GUN).unwrap();
    let report = revoke(&mut repo, &RevocationRequest::all_tags("alpine")).unwrap();
    assert_eq!(report.removed.len(), 2);

    let reopened = FileRepository::open(dir.path(), GUN).unwrap();
    assert!(reopened
        .list_targets(&[role("targets/releases")])
        .unwrap()
        .is_empty());
}

#[test]
fn uninitialized_repository_is_reported_in_context() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileRepository::open(dir.path(), GUN).unwrap();
    assert!(!repo.is_initialized());

    let err = revoke(
        &mut repo,
        &RevocationRequest::single_tag("alpine:latest", "latest"),
    )
    .unwrap_err();
    match &err {
        TrustError::Repository { reference, source } => {
            assert_eq!(reference, "alpine:latest");
            assert!(matches!(**source, TrustError::NotInitialized(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "docker.io/library/alpine does not have trust data"
    );
}

#[test]
fn delete_trust_data_keeps_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = seeded(dir.path());

    repo.delete_trust_data().unwrap();
    assert!(!repo.is_initialized());

    let reopened = FileRepository::open(dir.path(), GUN).unwrap();
    assert!(!reopened.is_initialized());
    assert_eq!(reopened.list_all_key_ids().unwrap().len(), 1);
}

#[test]
fn rejects_gun_escaping_trust_dir() {
    let dir = tempfile::tempdir().unwrap();
    for gun in ["", "/etc", "docker.io/../../etc", "a//b"] {
        assert!(
            FileRepository::open(dir.path(), gun).is_err(),
            "accepted {gun:?}"
        );
    }
}

#[test]
fn malformed_metadata_is_invalid_file_format() {
    let dir = tempfile::tempdir().unwrap();
    let meta_dir = dir.path().join("tuf/docker.io/library/alpine");
    std::fs::create_dir_all(&meta_dir).unwrap();
    std::fs::write(meta_dir.join("metadata.json"), b"not json").unwrap();

    assert!(matches!(
        FileRepository::open(dir.path(), GUN),
        Err(TrustError::InvalidFileFormat(_))
    ));
}

#[test]
fn malformed_publish_timestamp_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    seeded(dir.path());

    let path = dir.path().join("tuf/docker.io/library/alpine/metadata.json");
    let json = std::fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"published_at\": null"));
    std::fs::write(
        &path,
        json.replace("\"published_at\": null", "\"published_at\": \"yesterday\""),
    )
    .unwrap();

    assert!(matches!(
        FileRepository::open(dir.path(), GUN),
        Err(TrustError::InvalidFileFormat(_))
    ));
}
