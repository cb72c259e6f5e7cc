use std::path::Path;

use flagprune_common::FlagConfig;
use flagprune_core::EngineError;

/// Load and validate a [`FlagConfig`] from `path`.
///
/// TOML (the primary surface) is tried first, and plain JSON is tried if
/// TOML parsing fails.
///
/// # Errors
///
/// Returns [`EngineError::ConfigInvalid`] if the file can't be read, parsed
/// by either syntax, or fails the structural checks in
/// [`FlagConfig::validate_now`] (empty flag set, empty flag name, or a
/// name/alias shared by two flags). Expired flags never fail validation —
/// they come back as warning strings in the returned `Vec`.
pub fn load_config(path: &Path) -> Result<(FlagConfig, Vec<String>), EngineError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        EngineError::ConfigInvalid(format!("cannot read {}: {e}", path.display()))
    })?;

    let mut config: FlagConfig = toml::from_str(&raw).or_else(|toml_err| {
        serde_json::from_str(&raw).map_err(|json_err| {
            EngineError::ConfigInvalid(format!(
                "{} is neither valid TOML ({toml_err}) nor valid JSON ({json_err})",
                path.display()
            ))
        })
    })?;

    let warnings = config
        .validate_now()
        .map_err(|e| EngineError::ConfigInvalid(e.to_string()))?;

    Ok((config, warnings))
}
