use std::collections::{HashMap, HashSet};

use tree_sitter::Node;

use crate::edit::Edit;
use crate::parser::ParsedUnit;
use crate::reachability::{self, Decision};
use crate::scanner::FlagReference;

/// The edits produced for one file's branch-elimination pass, plus the
/// canonical names of flags that were actually acted on (i.e. whose
/// decision was not [`Decision::KeepBoth`]).
pub struct RewriteOutcome {
    pub edits: Vec<Edit>,
    pub removed_flag_names: HashSet<String>,
}

/// Group references by enclosing construct, resolve each group to one
/// [`Decision`], and materialize an edit batch.
///
/// Multiple references sharing a construct are only ever the product of one
/// flag appearing twice in the same condition (e.g. both sides of an `&&`);
/// distinct flags under the same construct are conservatively left alone.
pub fn plan<'a>(unit: &ParsedUnit, references: &[FlagReference<'a>]) -> RewriteOutcome {
    let mut by_construct: HashMap<Option<(usize, usize)>, Vec<&FlagReference<'a>>> = HashMap::new();
    for reference in references {
        let key = reference
            .parent_control_flow
            .map(|c| (c.start_byte(), c.end_byte()));
        by_construct.entry(key).or_default().push(reference);
    }

    let mut decisions: Vec<(Decision<'a>, &str)> = Vec::new();
    for (key, group) in &by_construct {
        if key.is_none() {
            for reference in group {
                decisions.push((reachability::analyze(reference), reference.flag_name.as_str()));
            }
            continue;
        }

        let distinct_flags: HashSet<&str> = group.iter().map(|r| r.flag_name.as_str()).collect();
        if group.len() > 1 && distinct_flags.len() > 1 {
            decisions.push((Decision::KeepBoth, group[0].flag_name.as_str()));
            continue;
        }
        decisions.push((reachability::analyze(group[0]), group[0].flag_name.as_str()));
    }

    plan_edits(unit, &decisions)
}

/// Convert a list of `(Decision, flag_name)` pairs into a flat edit batch.
fn plan_edits<'a>(unit: &ParsedUnit, decisions: &[(Decision<'a>, &str)]) -> RewriteOutcome {
    let mut edits = Vec::new();
    let mut removed_flag_names = HashSet::new();

    for (decision, flag_name) in decisions {
        match decision {
            Decision::KeepBoth => {}

            Decision::SubstituteLiteral { node, value } => {
                edits.push(whole_node_edit(*node, value.to_string()));
                removed_flag_names.insert((*flag_name).to_string());
            }

            Decision::RemoveAll { construct } => {
                edits.push(whole_node_edit(*construct, String::new()));
                removed_flag_names.insert((*flag_name).to_string());
            }

            Decision::SimplifyCondition { condition, replacement, .. } => {
                edits.push(whole_node_edit(*condition, unit.text(*replacement).to_string()));
                removed_flag_names.insert((*flag_name).to_string());
            }

            Decision::KeepThenRemoveElse { construct } => {
                let Some(branch) = construct.child_by_field_name("consequence") else {
                    continue;
                };
                edits.push(promote_or_remove(unit, *construct, branch));
                removed_flag_names.insert((*flag_name).to_string());
            }

            Decision::RemoveThenKeepElse { construct } => {
                let Some(alternative) = construct.child_by_field_name("alternative") else {
                    edits.push(whole_node_edit(*construct, String::new()));
                    removed_flag_names.insert((*flag_name).to_string());
                    continue;
                };
                let branch = unwrap_else_clause(alternative);
                edits.push(promote_or_remove(unit, *construct, branch));
                removed_flag_names.insert((*flag_name).to_string());
            }
        }
    }

    RewriteOutcome { edits, removed_flag_names }
}

fn whole_node_edit(node: Node<'_>, replacement: String) -> Edit {
    Edit {
        offset: node.start_byte(),
        length: node.end_byte() - node.start_byte(),
        replacement,
    }
}

/// An `if`'s `alternative` field is an `else_clause` wrapping the actual
/// branch statement; a ternary's `alternative` is the branch expression
/// directly.
fn unwrap_else_clause(node: Node<'_>) -> Node<'_> {
    if node.kind() == "else_clause" {
        let mut cursor = node.walk();
        if let Some(inner) = node.named_children(&mut cursor).next() {
            return inner;
        }
    }
    node
}

/// Promote `branch`'s contents into `construct`'s position, re-indented to
/// the parent's column. Degrades to deleting `construct` entirely if the
/// branch is an empty block.
fn promote_or_remove<'a>(unit: &ParsedUnit, construct: Node<'a>, branch: Node<'a>) -> Edit {
    match promoted_content(unit, construct, branch) {
        Some(replacement) => whole_node_edit(construct, replacement),
        None => whole_node_edit(construct, String::new()),
    }
}

fn promoted_content(unit: &ParsedUnit, construct: Node<'_>, branch: Node<'_>) -> Option<String> {
    let source = unit.source();

    let (content_start, content_end) = if branch.kind() == "statement_block" {
        let mut cursor = branch.walk();
        let statements: Vec<Node<'_>> = branch.named_children(&mut cursor).collect();
        let first = statements.first()?;
        let last = statements.last()?;
        (first.start_byte(), last.end_byte())
    } else {
        (branch.start_byte(), branch.end_byte())
    };

    let parent_indent = line_indent(source, construct.start_byte());
    let block_indent = line_indent(source, content_start);
    let content = &source[content_start..content_end];

    let mut lines = Vec::new();
    for (i, line) in content.split('\n').enumerate() {
        if line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        if i == 0 {
            lines.push(line.to_string());
        } else {
            let dedented = line.strip_prefix(block_indent).unwrap_or(line.trim_start());
            lines.push(format!("{parent_indent}{dedented}"));
        }
    }

    Some(lines.join("\n"))
}

fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn line_indent(source: &str, node_start: usize) -> &str {
    let start = line_start(source, node_start);
    let bytes = source.as_bytes();
    let mut i = start;
    while i < node_start && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    &source[start..i]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::edit::EditBuffer;
    use crate::scanner;
    use flagprune_common::{FlagConfig, FlagDefinition, Patterns, Settings};

    fn config_with(flag: &str, value: bool) -> FlagConfig {
        let mut flags = HashMap::new();
        flags.insert(
            flag.to_string(),
            FlagDefinition {
                name: flag.to_string(),
                value,
                remove_definition: true,
                aliases: HashSet::new(),
                description: None,
                ticket: None,
                owner: None,
                expire: None,
            },
        );
        FlagConfig {
            version: String::new(),
            patterns: Patterns {
                methods: vec!["*.isEnabled".to_string()],
                classes: vec![],
            },
            flags,
            settings: Settings::default(),
        }
    }

    fn run(source: &str, flag: &str, value: bool) -> String {
        let unit = ParsedUnit::parse(source).unwrap();
        let config = config_with(flag, value);
        let result = scanner::scan(&unit, &config);
        let outcome = plan(&unit, &result.references);
        EditBuffer::apply(unit.source(), &outcome.edits).unwrap()
    }

    #[test]
    fn s1_simple_if_true_promotes_then_branch() {
        let out = run(
            "if (FeatureFlagService.isEnabled('new_feature')) { doNew(); } else { doOld(); }",
            "new_feature",
            true,
        );
        assert_eq!(out, "doNew();");
    }

    #[test]
    fn s2_simple_if_false_no_else_removes_all() {
        let out = run("if (flags.isEnabled('experimental')) { runX(); }", "experimental", false);
        assert_eq!(out, "");
    }

    #[test]
    fn s3_negation_false_flag_keeps_then() {
        let out = run(
            "if (!flags.isEnabled('experimental')) { useStable(); } else { useExp(); }",
            "experimental",
            false,
        );
        assert_eq!(out, "useStable();");
    }

    #[test]
    fn s4_and_true_simplifies_condition() {
        let out = run(
            "if (flags.isEnabled('improved') && userCondition()) { opt(); }",
            "improved",
            true,
        );
        assert_eq!(out, "if (userCondition()) { opt(); }");
    }

    #[test]
    fn s5_ternary_false_picks_else_branch() {
        let out = run("const x = flags.isEnabled('legacy') ? old() : modern();", "legacy", false);
        assert_eq!(out, "const x = modern();");
    }

    #[test]
    fn s6_or_true_keeps_then_removes_else() {
        let out = run("if (flags.isEnabled('ui_new') || fallback()) { run(); }", "ui_new", true);
        assert_eq!(out, "run();");
    }

    #[test]
    fn promotion_reindents_multi_statement_block() {
        let source = "  if (flags.isEnabled('x')) {\n    a();\n    b();\n  }";
        let out = run(source, "x", true);
        assert_eq!(out, "  a();\n  b();");
    }
}
