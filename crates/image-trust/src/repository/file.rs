//! Filesystem-backed trust repository.
//!
//! Stores published metadata and key descriptors under a trust directory:
//!
//! ```text
//! {trust_dir}/
//! ├── private/
//! │   └── {gun}/
//! │       └── {key_id}.key      — key descriptor (JSON)
//! └── tuf/
//!     └── {gun}/
//!         └── metadata.json     — delegations and signed targets
//! ```
//!
//! File format for metadata:
//! ```json
//! { "version": 1, "published_at": "…", "metadata": { ... TrustMetadata ... } }
//! ```
//!
//! Staged changes are held in memory and written on publish, atomically via
//! a temp file and rename.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};
use crate::tuf::{
    CanonicalKeyId, DelegationRole, KeyId, KeyInfo, KeyListing, RoleName, Target, TargetWithRole,
};

use super::changelist::ChangeList;
use super::metadata::TrustMetadata;
use super::TrustRepository;

// ── File format constants ─────────────────────────────────────────────────────

const METADATA_FILE_VERSION: u32 = 1;
const METADATA_FILE: &str = "metadata.json";
const KEY_EXTENSION: &str = "key";

const PRIVATE_DIR: &str = "private";
const TUF_DIR: &str = "tuf";

// ── On-disk structures ────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct MetadataFile {
    version: u32,
    #[serde(default)]
    published_at: Option<String>,
    metadata: TrustMetadata,
}

// ── FileRepository ────────────────────────────────────────────────────────────

/// Trust repository for one GUN, persisted under a trust directory.
#[derive(Debug)]
pub struct FileRepository {
    trust_dir: PathBuf,
    gun: String,
    metadata: Option<TrustMetadata>,
    published_at: Option<String>,
    pending: ChangeList,
}

impl FileRepository {
    /// Open the repository for `gun`. Missing metadata is not an error;
    /// reads will report the repository as having no trust data.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::StorageError` for an unusable GUN, or
    /// `TrustError::InvalidFileFormat` if the metadata file is malformed.
    pub fn open(trust_dir: impl Into<PathBuf>, gun: &str) -> Result<Self> {
        validate_gun(gun)?;
        let mut repo = Self {
            trust_dir: trust_dir.into(),
            gun: gun.to_string(),
            metadata: None,
            published_at: None,
            pending: ChangeList::new(),
        };

        let path = repo.metadata_path();
        if path.exists() {
            let file = read_metadata_file(&path)?;
            repo.metadata = Some(file.metadata);
            repo.published_at = file.published_at;
        }
        Ok(repo)
    }

    /// Open the repository, creating empty metadata if none exists.
    pub fn init(trust_dir: impl Into<PathBuf>, gun: &str) -> Result<Self> {
        let mut repo = Self::open(trust_dir, gun)?;
        if repo.metadata.is_none() {
            let metadata = TrustMetadata::new();
            repo.write_metadata(&metadata, None)?;
            repo.metadata = Some(metadata);
            info!("initialized trust data for {gun}");
        }
        Ok(repo)
    }

    pub fn is_initialized(&self) -> bool {
        self.metadata.is_some()
    }

    pub fn metadata(&self) -> Option<&TrustMetadata> {
        self.metadata.as_ref()
    }

    /// Time of the last successful publish, RFC 3339.
    pub fn published_at(&self) -> Option<&str> {
        self.published_at.as_deref()
    }

    /// Add or replace a delegation and write it immediately.
    pub fn add_delegation(&mut self, role: DelegationRole) -> Result<()> {
        let mut next = self.require_metadata()?.clone();
        next.add_delegation(role)?;
        self.write_metadata(&next, self.published_at.clone())?;
        self.metadata = Some(next);
        Ok(())
    }

    /// Sign a target into `role` and write it immediately.
    pub fn add_target(&mut self, target: Target, role: &RoleName) -> Result<()> {
        let mut next = self.require_metadata()?.clone();
        next.add_target(target, role)?;
        self.write_metadata(&next, self.published_at.clone())?;
        self.metadata = Some(next);
        Ok(())
    }

    /// Record a locally held key descriptor for this repository.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidKeyId` if the key ID is not a plain file
    /// name.
    pub fn import_key(&self, key_id: &KeyId, info: &KeyInfo) -> Result<CanonicalKeyId> {
        validate_key_id(key_id)?;
        let dir = self.key_dir();
        std::fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(info)
            .map_err(|e| TrustError::SerializationError(e.to_string()))?;
        let path = dir.join(format!("{}.{KEY_EXTENSION}", key_id.as_str()));
        std::fs::write(&path, json.as_bytes())?;

        Ok(CanonicalKeyId::qualified(&self.gun, key_id))
    }

    /// Delete all local trust data for this repository. Keys are kept.
    pub fn delete_trust_data(&mut self) -> Result<()> {
        let dir = self.metadata_dir();
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        self.metadata = None;
        self.published_at = None;
        self.pending.clear();
        info!("deleted trust data for {}", self.gun);
        Ok(())
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn require_metadata(&self) -> Result<&TrustMetadata> {
        self.metadata
            .as_ref()
            .ok_or_else(|| TrustError::NotInitialized(self.gun.clone()))
    }

    fn key_dir(&self) -> PathBuf {
        self.trust_dir.join(PRIVATE_DIR).join(&self.gun)
    }

    fn metadata_dir(&self) -> PathBuf {
        self.trust_dir.join(TUF_DIR).join(&self.gun)
    }

    fn metadata_path(&self) -> PathBuf {
        self.metadata_dir().join(METADATA_FILE)
    }

    /// Write metadata via a sibling temp file and rename.
    fn write_metadata(&self, metadata: &TrustMetadata, published_at: Option<String>) -> Result<()> {
        let file = MetadataFile {
            version: METADATA_FILE_VERSION,
            published_at,
            metadata: metadata.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| TrustError::SerializationError(e.to_string()))?;

        let path = self.metadata_path();
        std::fs::create_dir_all(self.metadata_dir())?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json.as_bytes())?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl TrustRepository for FileRepository {
    fn gun(&self) -> &str {
        &self.gun
    }

    fn list_all_key_ids(&self) -> Result<KeyListing> {
        let dir = self.key_dir();
        let mut listing = KeyListing::new();
        if !dir.exists() {
            return Ok(listing);
        }

        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(KEY_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let bytes = std::fs::read(&path)?;
            let info: KeyInfo = serde_json::from_slice(&bytes).map_err(|e| {
                TrustError::InvalidFileFormat(format!(
                    "failed to parse key file {}: {e}",
                    path.display()
                ))
            })?;
            listing.insert(CanonicalKeyId::qualified(&self.gun, &KeyId::new(stem)), info);
        }

        Ok(listing)
    }

    fn delegation_roles(&self) -> Result<Vec<DelegationRole>> {
        Ok(self.require_metadata()?.delegations.clone())
    }

    fn target_by_name(&self, name: &str, roles: &[RoleName]) -> Result<TargetWithRole> {
        self.require_metadata()?
            .find_target(name, roles)
            .ok_or_else(|| TrustError::NoSuchTrustData(name.to_string()))
    }

    fn list_targets(&self, roles: &[RoleName]) -> Result<Vec<TargetWithRole>> {
        Ok(self.require_metadata()?.list_targets(roles))
    }

    fn remove_target(&mut self, name: &str, roles: &[RoleName]) -> Result<()> {
        self.pending.push_removal(name, roles.to_vec());
        Ok(())
    }

    fn publish(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        let next = self.require_metadata()?.apply(&pending)?;

        let published_at = crate::time::now_rfc3339();
        self.write_metadata(&next, Some(published_at.clone()))?;

        debug!("published {} change(s) to {}", pending.len(), self.gun);
        self.metadata = Some(next);
        self.published_at = Some(published_at);
        Ok(())
    }

    fn discard_changes(&mut self) {
        self.pending.clear();
    }
}

fn read_metadata_file(path: &Path) -> Result<MetadataFile> {
    let bytes = std::fs::read(path)?;
    let file: MetadataFile = serde_json::from_slice(&bytes).map_err(|e| {
        TrustError::InvalidFileFormat(format!(
            "failed to parse metadata file {}: {e}",
            path.display()
        ))
    })?;
    if file.version != METADATA_FILE_VERSION {
        return Err(TrustError::InvalidFileFormat(format!(
            "unsupported metadata version {} in {}",
            file.version,
            path.display()
        )));
    }
    if let Some(ts) = &file.published_at {
        if crate::time::parse_rfc3339(ts).is_none() {
            return Err(TrustError::InvalidFileFormat(format!(
                "bad published_at {ts:?} in {}",
                path.display()
            )));
        }
    }
    Ok(file)
}

/// GUNs become directory names; refuse anything that escapes the trust dir.
fn validate_gun(gun: &str) -> Result<()> {
    let bad = gun.is_empty()
        || gun.starts_with('/')
        || gun.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(TrustError::StorageError(format!(
            "invalid repository name: {gun:?}"
        )));
    }
    Ok(())
}

/// Key IDs become file names under the key directory.
fn validate_key_id(key_id: &KeyId) -> Result<()> {
    let id = key_id.as_str();
    let bad = id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']);
    if bad {
        return Err(TrustError::InvalidKeyId(format!("{id:?}")));
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
