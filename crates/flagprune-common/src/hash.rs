use sha2::{Digest, Sha256};

use crate::config::types::FlagConfig;

/// Error returned when a [`FlagConfig`] cannot be hashed.
///
/// Wraps the underlying serialization error without exposing `serde_json` as
/// a public dependency of this crate.
#[derive(Debug)]
pub struct HashError(serde_json::Error);

impl std::fmt::Display for HashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for HashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<serde_json::Error> for HashError {
    fn from(e: serde_json::Error) -> Self {
        Self(e)
    }
}

/// Compute a deterministic SHA-256 content hash for a [`FlagConfig`].
///
/// Two configs that are logically identical (same fields, same values)
/// produce the same hash regardless of TOML whitespace or key ordering,
/// because the hash is derived from canonical JSON serialization. Used to
/// tag a [`crate::result::TransformationResult`] with the config version
/// that produced it.
///
/// # Errors
///
/// Returns a [`HashError`] if `config` cannot be serialized to JSON (should
/// not happen for well-formed `FlagConfig` values, but callers must handle
/// it).
pub fn canonical_hash(config: &FlagConfig) -> Result<String, HashError> {
    let json = serde_json::to_vec(config)?;
    let digest = Sha256::digest(&json);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}
