#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Cross-cutting invariants (offset consistency, idempotence, semantic
//! identity on unmatched input, alias uniqueness) exercised end-to-end
//! through `flagprune_core::transform`.

use std::collections::{HashMap, HashSet};

use flagprune_common::{FlagConfig, FlagDefinition, Patterns, Settings};
use flagprune_core::edit::{Edit, EditBuffer};
use flagprune_core::error::EngineError;

fn config(flag: &str, value: bool) -> FlagConfig {
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

// --- Invariant 1: offset consistency ---

#[test]
fn descending_offset_application_is_order_independent_of_input_order() {
    let source = "aaaa bbbb cccc dddd";
    let edits_in_order = vec![
        Edit { offset: 0, length: 4, replacement: "W".to_string() },
        Edit { offset: 5, length: 4, replacement: "X".to_string() },
        Edit { offset: 10, length: 4, replacement: "Y".to_string() },
        Edit { offset: 15, length: 4, replacement: "Z".to_string() },
    ];
    let mut shuffled = edits_in_order.clone();
    shuffled.reverse();
    shuffled.swap(0, 2);

    let a = EditBuffer::apply(source, &edits_in_order).unwrap();
    let b = EditBuffer::apply(source, &shuffled).unwrap();
    assert_eq!(a, b, "result must not depend on the caller's edit ordering");
    assert_eq!(a, "W X Y Z");
}

#[test]
fn overlapping_edits_are_always_rejected() {
    let source = "0123456789";
    let edits = vec![
        Edit { offset: 0, length: 5, replacement: String::new() },
        Edit { offset: 3, length: 5, replacement: String::new() },
    ];
    assert!(matches!(EditBuffer::apply(source, &edits), Err(EngineError::OverlappingEdits)));
}

// --- Invariant 2: idempotence ---

#[test]
fn transform_is_idempotent_on_its_own_output() {
    let cases: &[(&str, &str, bool)] = &[
        ("if (flags.isEnabled('x')) { a(); } else { b(); }", "x", true),
        ("if (flags.isEnabled('x')) { a(); }", "x", false),
        ("if (!flags.isEnabled('x')) { a(); } else { b(); }", "x", false),
        ("if (flags.isEnabled('x') && other()) { a(); }", "x", true),
        ("const r = flags.isEnabled('x') ? old() : modern();", "x", false),
        ("if (flags.isEnabled('x') || fallback()) { a(); }", "x", true),
    ];

    for (source, flag, value) in cases {
        let cfg = config(flag, *value);
        let first = flagprune_core::transform(source, &cfg);
        let second = flagprune_core::transform(&first.transformed_source, &cfg);
        assert_eq!(
            first.transformed_source, second.transformed_source,
            "not idempotent for input: {source}"
        );
    }
}

// --- Invariant 3: semantic identity on unmatched input ---

#[test]
fn source_with_no_configured_flag_is_returned_unchanged() {
    let cfg = config("unrelated_flag", true);
    let sources = [
        "if (other()) { a(); } else { b(); }",
        "function helper() { return 1 + 2; }",
        "class C { field: number = 1; }",
        "import { x } from 'y';",
    ];
    for source in sources {
        let result = flagprune_core::transform(source, &cfg);
        assert_eq!(result.transformed_source, source);
        assert!(!result.has_changes());
    }
}

// --- Invariant 6: alias uniqueness ---

#[test]
fn config_with_shared_alias_across_two_flags_fails_validation() {
    let toml = r#"
        [flags.a]
        value = true
        aliases = ["shared"]

        [flags.b]
        value = false
        aliases = ["shared"]
    "#;
    let mut cfg: FlagConfig = toml::from_str(toml).unwrap();
    assert!(cfg.validate_now().is_err());
}

#[test]
fn config_with_disjoint_aliases_validates_cleanly() {
    let toml = r#"
        [flags.a]
        value = true
        aliases = ["alpha"]

        [flags.b]
        value = false
        aliases = ["beta"]
    "#;
    let mut cfg: FlagConfig = toml::from_str(toml).unwrap();
    assert!(cfg.validate_now().is_ok());
}

// --- End-to-end scenarios ---

#[test]
fn scenario_s4_and_true_simplifies_to_user_condition() {
    let cfg = config("improved", true);
    let result = flagprune_core::transform(
        "if (flags.isEnabled('improved') && userCondition()) { opt(); }",
        &cfg,
    );
    assert_eq!(result.transformed_source, "if (userCondition()) { opt(); }");
}

#[test]
fn scenario_s6_or_true_keeps_then_drops_else() {
    let cfg = config("ui_new", true);
    let result =
        flagprune_core::transform("if (flags.isEnabled('ui_new') || fallback()) { run(); }", &cfg);
    assert_eq!(result.transformed_source, "run();");
}
