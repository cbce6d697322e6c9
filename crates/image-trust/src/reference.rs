//! Image references: `name[:tag][@digest]`.
//!
//! Parsing and normalization follow the distribution reference grammar via
//! [`oci_distribution::Reference`]; this wrapper adds the GUN form of the
//! name (`alpine` → `docker.io/library/alpine`) and maps parse failures
//! onto [`TrustError::InvalidReference`].

use std::fmt;

use oci_distribution::{ParseError, Reference};

use crate::error::{Result, TrustError};

const DEFAULT_DOMAIN: &str = "docker.io";
const LEGACY_DEFAULT_DOMAIN: &str = "index.docker.io";

/// A parsed image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    original: String,
    name: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageReference {
    /// Parse and normalize an image reference.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidReference` for malformed references,
    /// uppercase repository names, or a bare 64-character hex string.
    pub fn parse(reference: &str) -> Result<Self> {
        if is_hex_id(reference) {
            return Err(TrustError::InvalidReference(format!(
                "invalid repository name ({reference}), cannot specify 64-byte hexadecimal strings"
            )));
        }

        let parsed: Reference = reference.parse().map_err(invalid_reference)?;

        let registry = match parsed.registry() {
            LEGACY_DEFAULT_DOMAIN => DEFAULT_DOMAIN,
            other => other,
        };
        let name = format!("{registry}/{}", parsed.repository());

        // Only keep a tag the user actually wrote, never an implied default.
        let named = reference.split('@').next().unwrap_or(reference);
        let tag = parsed
            .tag()
            .filter(|t| named.ends_with(&format!(":{t}")))
            .map(str::to_string);

        Ok(Self {
            original: reference.to_string(),
            name,
            tag,
            digest: parsed.digest().map(str::to_string),
        })
    }

    /// Fully qualified repository name; used as the GUN.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    pub fn is_digested(&self) -> bool {
        self.digest.is_some()
    }

    /// The reference as the user typed it.
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

fn invalid_reference(err: ParseError) -> TrustError {
    let message = match err {
        ParseError::NameContainsUppercase => {
            "invalid reference format: repository name must be lowercase".to_string()
        }
        ParseError::ReferenceInvalidFormat => "invalid reference format".to_string(),
        other => format!("invalid reference format: {other}"),
    };
    TrustError::InvalidReference(message)
}

fn is_hex_id(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
