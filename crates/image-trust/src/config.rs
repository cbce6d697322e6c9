//! Configuration for trust operations.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults (`$HOME/.image-trust`, `targets/releases`)
//! 2. `IMAGE_TRUST_DIR` (selects the trust directory)
//! 3. `{trust_dir}/config.json`, if present
//! 4. `IMAGE_TRUST_RELEASES_ROLE`
//! 5. Explicit overrides (command-line flags)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};
use crate::tuf::RoleName;

pub const TRUST_DIR_ENV: &str = "IMAGE_TRUST_DIR";
pub const RELEASES_ROLE_ENV: &str = "IMAGE_TRUST_RELEASES_ROLE";
pub const CONFIG_FILE: &str = "config.json";

const DEFAULT_DIR_NAME: &str = ".image-trust";

/// Resolved trust configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustConfig {
    /// Root of local trust data.
    pub trust_dir: PathBuf,
    /// Role searched for signed tags before `targets`.
    pub releases_role: RoleName,
}

/// Fields of `config.json`; all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    releases_role: Option<RoleName>,
}

/// Explicit overrides, typically from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub trust_dir: Option<PathBuf>,
    pub releases_role: Option<RoleName>,
}

impl TrustConfig {
    /// Defaults rooted at `trust_dir`.
    pub fn with_trust_dir(trust_dir: impl Into<PathBuf>) -> Self {
        Self {
            trust_dir: trust_dir.into(),
            releases_role: RoleName::releases(),
        }
    }

    /// Resolve configuration from the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve configuration using `env` to look up variables.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidFileFormat` for a malformed
    /// `config.json`, or `TrustError::InvalidRoleName` for a bad role in the
    /// environment.
    pub fn resolve_with<F>(overrides: ConfigOverrides, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let trust_dir = overrides
            .trust_dir
            .or_else(|| env(TRUST_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| default_trust_dir(&env));

        let mut config = Self::with_trust_dir(trust_dir);

        if let Some(file) = load_config_file(&config.trust_dir.join(CONFIG_FILE))? {
            if let Some(role) = file.releases_role {
                config.releases_role = role;
            }
        }
        if let Some(role) = env(RELEASES_ROLE_ENV) {
            config.releases_role = RoleName::parse(&role)?;
        }
        if let Some(role) = overrides.releases_role {
            config.releases_role = role;
        }

        Ok(config)
    }
}

fn default_trust_dir<F>(env: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    env("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

fn load_config_file(path: &Path) -> Result<Option<ConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path)?;
    let file = serde_json::from_slice(&bytes).map_err(|e| {
        TrustError::InvalidFileFormat(format!(
            "failed to parse config file {}: {e}",
            path.display()
        ))
    })?;
    Ok(Some(file))
}
