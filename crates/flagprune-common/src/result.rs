use std::collections::HashSet;

/// Outcome of running the engine against one file.
///
/// Callers (the CLI, or a server-side publish check) compare
/// `original_source` against `transformed_source` and report `warnings`
/// without needing to re-derive any of this from the source text
/// themselves. `config_hash` (see [`crate::hash::canonical_hash`]) tags the
/// result with the config version that produced it, so a caller caching
/// results across runs can tell whether a stale result was produced by the
/// config currently on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationResult {
    pub original_source: String,
    pub transformed_source: String,
    pub removed_flag_names: HashSet<String>,
    pub removed_import_uris: HashSet<String>,
    pub lines_removed: i64,
    pub warnings: Vec<String>,
    pub config_hash: String,
}

impl TransformationResult {
    /// True if the transformed source differs from the original byte-for-byte.
    pub fn has_changes(&self) -> bool {
        self.original_source != self.transformed_source
    }

    /// A one-line human summary: `"N flag(s) removed, M import(s) removed, K
    /// line(s) removed"`.
    pub fn summary(&self) -> String {
        format!(
            "{} flag(s) removed, {} import(s) removed, {} line(s) removed",
            self.removed_flag_names.len(),
            self.removed_import_uris.len(),
            self.lines_removed
        )
    }

    /// An unchanged result for a file the engine declined to touch (e.g. no
    /// configured flag appears in it). `config_hash` is left empty; callers
    /// that need it set should assign it after construction, since a failed
    /// parse means the config that would have produced this result was
    /// never actually consulted.
    pub fn unchanged(source: String) -> Self {
        Self {
            original_source: source.clone(),
            transformed_source: source,
            removed_flag_names: HashSet::new(),
            removed_import_uris: HashSet::new(),
            lines_removed: 0,
            warnings: Vec::new(),
            config_hash: String::new(),
        }
    }
}
