use std::collections::HashSet;

use flagprune_common::{FlagConfig, TransformationResult};

use crate::definitions;
use crate::edit::EditBuffer;
use crate::error::EngineError;
use crate::imports;
use crate::parser::ParsedUnit;
use crate::rewrite;
use crate::scanner;

/// An opaque, pluggable pretty-printer: `source -> Result<formatted, reason>`.
/// Reformatting itself is out of this crate's scope (spec.md §1 lists it as
/// an external collaborator) — this is only the interface C9 calls into.
pub type Formatter = fn(&str) -> Result<String, String>;

/// Run the full pipeline over one file's source text: parse, scan for flag
/// references, eliminate dead branches, remove flag definitions, then drop
/// imports left with no surviving usage.
///
/// Per-file failures (a parse that does not succeed) are reported as a
/// no-op result with a warning rather than an `Err` — only `ConfigInvalid`
/// and IO errors at the file-read boundary are fatal to a run.
///
/// Equivalent to [`transform_with_formatter`] with no formatter installed.
pub fn transform(source: &str, config: &FlagConfig) -> TransformationResult {
    transform_with_formatter(source, config, None)
}

/// As [`transform`], but additionally runs `formatter` over the final
/// source when `config.settings.format_output` is set (spec.md §4.7 step
/// 6). A formatter failure never aborts the file: `source_3` is kept as-is
/// and the failure is recorded as a warning. Requesting `format_output`
/// with no formatter installed is likewise a warning, not an error.
pub fn transform_with_formatter(
    source: &str,
    config: &FlagConfig,
    formatter: Option<Formatter>,
) -> TransformationResult {
    let config_hash = flagprune_common::hash::canonical_hash(config).unwrap_or_default();

    let unit = match ParsedUnit::parse(source) {
        Ok(unit) => unit,
        Err(err) => {
            let mut result = TransformationResult::unchanged(source.to_string());
            result.warnings.push(format!("parse failed: {err}"));
            result.config_hash = config_hash;
            return result;
        }
    };

    // Step 2: C4/C5 over the single initial parse, just to learn whether any
    // definitions are eligible for removal later. C6 is deferred to step 5,
    // where it runs on the post-elimination tree so usage sites reflect
    // what actually survived.
    let scan_result = scanner::scan(&unit, config);
    let had_definitions = !definitions::scan(&unit, config, &scan_result.bindings).is_empty();

    // Step 3: C7+C8 eliminate dead branches.
    let outcome = rewrite::plan(&unit, &scan_result.references);
    let mut removed_flag_names: HashSet<String> = outcome.removed_flag_names;
    let source_1 = match EditBuffer::apply(unit.source(), &outcome.edits) {
        Ok(applied) => applied,
        Err(err) => {
            // An internal planner bug producing overlapping edits: abort
            // the file with the original source unchanged.
            let mut result = TransformationResult::unchanged(source.to_string());
            result.warnings.push(format!("edit planning failed: {err}"));
            result.config_hash = config_hash;
            return result;
        }
    };

    let mut warnings = Vec::new();

    // Step 4: mandatory re-parse, then remove flag-definition declarations.
    let source_2 = if had_definitions {
        match remove_definitions(&source_1, config, &mut removed_flag_names) {
            Ok(next) => next,
            Err(err) => {
                warnings.push(format!("skipped definition removal: {err}"));
                source_1.clone()
            }
        }
    } else {
        source_1.clone()
    };

    // Step 5: re-parse once more and drop now-dead flag-service imports.
    let (source_3, removed_import_uris) = match remove_dead_imports(&source_2, config) {
        Ok(result) => result,
        Err(err) => {
            warnings.push(format!("skipped import cleanup: {err}"));
            (source_2.clone(), HashSet::new())
        }
    };

    // Step 6: optionally invoke the external formatter.
    let source_4 = if config.settings.format_output {
        match formatter {
            Some(format) => match format(&source_3) {
                Ok(formatted) => formatted,
                Err(reason) => {
                    warnings.push(format!("formatter failed: {reason}"));
                    source_3
                }
            },
            None => {
                warnings.push("format_output is set but no formatter is installed".to_string());
                source_3
            }
        }
    } else {
        source_3
    };

    let lines_removed =
        i64::try_from(source.lines().count()).unwrap_or(i64::MAX) - i64::try_from(source_4.lines().count()).unwrap_or(i64::MAX);

    TransformationResult {
        original_source: source.to_string(),
        transformed_source: source_4,
        removed_flag_names,
        removed_import_uris,
        lines_removed,
        warnings,
        config_hash,
    }
}

fn remove_definitions(
    source_1: &str,
    config: &FlagConfig,
    removed_flag_names: &mut HashSet<String>,
) -> Result<String, EngineError> {
    let unit_2 = ParsedUnit::parse(source_1)?;
    let fresh_bindings = scanner::scan(&unit_2, config).bindings;
    let locations = definitions::scan(&unit_2, config, &fresh_bindings);

    let edits: Vec<crate::edit::Edit> = locations
        .iter()
        .map(|loc| {
            removed_flag_names.insert(loc.flag_name.clone());
            crate::edit::Edit {
                offset: loc.offset,
                length: loc.length,
                replacement: String::new(),
            }
        })
        .collect();

    EditBuffer::apply(unit_2.source(), &edits)
}

fn remove_dead_imports(source_2: &str, config: &FlagConfig) -> Result<(String, HashSet<String>), EngineError> {
    let unit_3 = ParsedUnit::parse(source_2)?;
    let records = imports::scan(&unit_3);

    let mut removed_uris = HashSet::new();
    let edits: Vec<crate::edit::Edit> = records
        .iter()
        .filter(|record| record.is_dead(config, &[]))
        .map(|record| {
            removed_uris.insert(record.uri.clone());
            crate::edit::Edit {
                offset: record.directive_node.start_byte(),
                length: record.directive_node.end_byte() - record.directive_node.start_byte(),
                replacement: String::new(),
            }
        })
        .collect();

    let source_3 = EditBuffer::apply(unit_3.source(), &edits)?;
    Ok((source_3, removed_uris))
}
