use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

/// Compile a comma-separated list of glob patterns (the CLI's `-e/--exclude`
/// value) into a [`GlobSet`].
///
/// An empty or all-whitespace pattern list compiles to an empty, never-
/// matching set.
///
/// # Errors
///
/// Returns an error if any individual pattern is not a valid glob.
pub fn build_exclude_set(patterns: &str) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Discover the files `target` names, respecting `excludes`.
///
/// `target` may be a single file (returned as its own one-element result
/// unless excluded) or a directory (walked recursively with `walkdir`).
/// Unreadable directory entries are silently skipped rather than aborting
/// the whole walk.
pub fn discover_files(target: &Path, excludes: &GlobSet) -> Vec<PathBuf> {
    if target.is_file() {
        return if excludes.is_match(target) {
            Vec::new()
        } else {
            vec![target.to_path_buf()]
        };
    }

    WalkDir::new(target)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| !excludes.is_match(path))
        .collect()
}
