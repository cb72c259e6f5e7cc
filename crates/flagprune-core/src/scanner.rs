use std::collections::HashMap;

use tree_sitter::Node;

use flagprune_common::FlagConfig;

use crate::parser::{walk, ParsedUnit};
use crate::pattern::{self, MatchResult, Pattern};

/// A candidate flag-query use site.
pub struct FlagReference<'a> {
    pub flag_name: String,
    pub resolved_value: bool,
    /// The expression node to substitute — the call itself, or (when the
    /// reference is wrapped in one or more `!`) the outermost such prefix
    /// expression, so that `X == C` detection in C7 sees the whole negated
    /// expression as one unit.
    pub node: Node<'a>,
    pub offset: usize,
    pub length: usize,
    pub parent_control_flow: Option<Node<'a>>,
    pub is_negated: bool,
    pub variable_name: Option<String>,
}

impl FlagReference<'_> {
    /// `is_negated XOR resolved_value`.
    pub fn effective_value(&self) -> bool {
        self.is_negated ^ self.resolved_value
    }
}

/// A local variable bound to a flag query's result.
pub struct FlagVariableBinding<'a> {
    pub flag_name: String,
    pub resolved_value: bool,
    pub declaration_node: Node<'a>,
}

pub struct ScanResult<'a> {
    pub references: Vec<FlagReference<'a>>,
    pub bindings: HashMap<String, FlagVariableBinding<'a>>,
}

/// Walk `unit` once, producing the flag references and variable bindings
/// the rest of the pipeline builds on.
pub fn scan<'a>(unit: &'a ParsedUnit, config: &FlagConfig) -> ScanResult<'a> {
    let patterns: Vec<Pattern> = config
        .patterns
        .methods
        .iter()
        .map(|p| Pattern::parse(p))
        .collect();

    let mut bindings: HashMap<String, FlagVariableBinding<'a>> = HashMap::new();
    let mut references: Vec<FlagReference<'a>> = Vec::new();

    walk(unit.root(), &mut |node, ancestors| {
        if node.kind() == "call_expression" {
            if let MatchResult::Match { flag_name_node } = pattern::match_call(unit, node, &patterns) {
                let Some(key) = pattern::extract_flag_key(unit, flag_name_node) else {
                    return;
                };
                let Some(def) = config.find(&key) else {
                    return;
                };

                if let Some((var_name, decl_stmt)) = bound_variable_declarator(unit, node, ancestors) {
                    bindings.insert(
                        var_name,
                        FlagVariableBinding {
                            flag_name: def.name.clone(),
                            resolved_value: def.value,
                            declaration_node: decl_stmt,
                        },
                    );
                    return;
                }

                if let Some(parent_control_flow) = condition_frame(node, ancestors) {
                    let (effective_node, negated) = climb_negations(node, ancestors);
                    references.push(FlagReference {
                        flag_name: def.name.clone(),
                        resolved_value: def.value,
                        node: effective_node,
                        offset: effective_node.start_byte(),
                        length: effective_node.end_byte() - effective_node.start_byte(),
                        parent_control_flow,
                        is_negated: negated,
                        variable_name: None,
                    });
                }
            }
            return;
        }

        if node.kind() == "identifier" && !is_declarator_name(node, ancestors) {
            let name = unit.text(node);
            if let Some(binding) = bindings.get(name) {
                if let Some(parent_control_flow) = condition_frame(node, ancestors) {
                    let (effective_node, negated) = climb_negations(node, ancestors);
                    references.push(FlagReference {
                        flag_name: binding.flag_name.clone(),
                        resolved_value: binding.resolved_value,
                        node: effective_node,
                        offset: effective_node.start_byte(),
                        length: effective_node.end_byte() - effective_node.start_byte(),
                        parent_control_flow,
                        is_negated: negated,
                        variable_name: Some(name.to_string()),
                    });
                }
            }
        }
    });

    ScanResult { references, bindings }
}

/// If `call` is the initializer of a `let`/`const` declarator, returns the
/// bound variable's name and the enclosing declaration *statement* (the
/// smallest node whose removal leaves the surrounding block syntactically
/// valid).
fn bound_variable_declarator<'a>(
    unit: &ParsedUnit,
    call: Node<'a>,
    ancestors: &[Node<'a>],
) -> Option<(String, Node<'a>)> {
    let parent = *ancestors.last()?;
    if parent.kind() != "variable_declarator" {
        return None;
    }
    let value = parent.child_by_field_name("value")?;
    if value != call {
        return None;
    }
    let name_node = parent.child_by_field_name("name")?;
    let statement = ancestors
        .iter()
        .rev()
        .find(|a| a.kind() == "lexical_declaration" || a.kind() == "variable_declaration")
        .copied()?;
    Some((unit.text(name_node).to_string(), statement))
}

fn is_declarator_name(node: Node<'_>, ancestors: &[Node<'_>]) -> bool {
    ancestors.last().is_some_and(|parent| {
        parent.kind() == "variable_declarator"
            && parent.child_by_field_name("name") == Some(node)
    })
}

/// Climb from `node` through any wrapping prefix `!` expressions, toggling
/// negation each time. Returns the outermost such node (or `node` itself if
/// unwrapped) and whether the net number of `!` layers is odd.
fn climb_negations<'a>(node: Node<'a>, ancestors: &[Node<'a>]) -> (Node<'a>, bool) {
    let mut current = node;
    let mut negated = false;
    let mut idx = ancestors.len();

    while idx > 0 {
        let parent = ancestors[idx - 1];
        let is_bang = parent.kind() == "unary_expression"
            && parent
                .child_by_field_name("operator")
                .is_some_and(|op| op.kind() == "!")
            && parent.child_by_field_name("argument") == Some(current);
        if !is_bang {
            break;
        }
        negated = !negated;
        current = parent;
        idx -= 1;
    }
    (current, negated)
}

/// Find the nearest enclosing `if_statement`/`ternary_expression` whose
/// `condition` field transitively contains `node`. Returns `Some(owner)` if
/// `node` is in a condition owned by an if/ternary, `None` if `node` is in a
/// condition-like frame that isn't if/ternary (e.g. a `while` test — still
/// "in a condition", just with no control-flow construct to eliminate), and
/// short-circuits entirely (not in any condition) if the
/// nearest recognizable frame turns out to hold `node` in its *body*.
fn condition_frame<'a>(node: Node<'a>, ancestors: &[Node<'a>]) -> Option<Option<Node<'a>>> {
    for anc in ancestors.iter().rev() {
        match anc.kind() {
            "if_statement" | "ternary_expression" => {
                let Some(condition) = anc.child_by_field_name("condition") else {
                    return None;
                };
                return if in_range(condition, node) {
                    Some(Some(*anc))
                } else {
                    None
                };
            }
            "while_statement" | "do_statement" => {
                let Some(condition) = anc.child_by_field_name("condition") else {
                    return None;
                };
                return if in_range(condition, node) { Some(None) } else { None };
            }
            "switch_statement" => {
                let Some(value) = anc.child_by_field_name("value") else {
                    return None;
                };
                return if in_range(value, node) { Some(None) } else { None };
            }
            "statement_block" | "program" | "function_declaration" | "method_definition" => {
                return None;
            }
            _ => {}
        }
    }
    None
}

fn in_range(container: Node<'_>, node: Node<'_>) -> bool {
    container.start_byte() <= node.start_byte() && node.end_byte() <= container.end_byte()
}
