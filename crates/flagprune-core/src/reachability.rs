use tree_sitter::Node;

use crate::scanner::FlagReference;

/// The fate of a flag reference's enclosing construct.
pub enum Decision<'a> {
    /// Replace the whole construct with its then-branch contents.
    KeepThenRemoveElse { construct: Node<'a> },
    /// Replace the whole construct with its else-branch contents.
    RemoveThenKeepElse { construct: Node<'a> },
    /// Delete the whole construct.
    RemoveAll { construct: Node<'a> },
    /// Replace `condition` (the construct's condition expression, with any
    /// wrapping parens stripped) with `replacement`, a sub-expression of
    /// that condition.
    SimplifyCondition {
        construct: Node<'a>,
        condition: Node<'a>,
        replacement: Node<'a>,
    },
    /// The reference was not inside an if/ternary (e.g. a `while`/`switch`
    /// condition, or a bound-variable use with no enclosing construct):
    /// substitute its textual `true`/`false` form directly.
    SubstituteLiteral { node: Node<'a>, value: bool },
    /// Make no change — the conservative fallback for anything the analyzer
    /// cannot prove equivalent.
    KeepBoth,
}

/// Decide the fate of one [`FlagReference`]'s enclosing construct.
pub fn analyze<'a>(reference: &FlagReference<'a>) -> Decision<'a> {
    let Some(construct) = reference.parent_control_flow else {
        return Decision::SubstituteLiteral {
            node: reference.node,
            value: reference.effective_value(),
        };
    };

    let Some(condition_field) = construct.child_by_field_name("condition") else {
        return Decision::KeepBoth;
    };
    let condition = unwrap_parens(condition_field);
    let v = reference.effective_value();
    let is_ternary = construct.kind() == "ternary_expression";
    let has_else = construct.child_by_field_name("alternative").is_some();

    // Rule 1: the whole condition (modulo parens/negation) is the flag.
    if node_range_eq(condition, reference.node) {
        return whole_condition_decision(construct, is_ternary, has_else, v);
    }

    // Rules 2/3: `X` is one operand of a top-level `&&`/`||`.
    if let Some((operator, left, right)) = binary_parts(condition) {
        let matched_other = if node_range_eq(left, reference.node) {
            Some(right)
        } else if node_range_eq(right, reference.node) {
            Some(left)
        } else {
            None
        };

        if let Some(other) = matched_other {
            return match operator {
                "&&" => {
                    if v {
                        Decision::SimplifyCondition { construct, condition, replacement: other }
                    } else if has_else {
                        Decision::RemoveThenKeepElse { construct }
                    } else {
                        Decision::RemoveAll { construct }
                    }
                }
                "||" => {
                    if v {
                        Decision::KeepThenRemoveElse { construct }
                    } else {
                        Decision::SimplifyCondition { construct, condition, replacement: other }
                    }
                }
                _ => Decision::KeepBoth,
            };
        }
    }

    // Rule 5: anything more complex — stay conservative.
    Decision::KeepBoth
}

fn whole_condition_decision(construct: Node<'_>, is_ternary: bool, has_else: bool, v: bool) -> Decision<'_> {
    if is_ternary {
        return if v {
            Decision::KeepThenRemoveElse { construct }
        } else {
            Decision::RemoveThenKeepElse { construct }
        };
    }
    if has_else {
        if v {
            Decision::KeepThenRemoveElse { construct }
        } else {
            Decision::RemoveThenKeepElse { construct }
        }
    } else if v {
        Decision::KeepThenRemoveElse { construct }
    } else {
        Decision::RemoveAll { construct }
    }
}

/// Descend through `parenthesized_expression` wrappers to the inner
/// expression.
fn unwrap_parens(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while current.kind() == "parenthesized_expression" {
        let mut cursor = current.walk();
        let Some(inner) = current.named_children(&mut cursor).next() else {
            break;
        };
        current = inner;
    }
    current
}

fn node_range_eq(a: Node<'_>, b: Node<'_>) -> bool {
    let a = unwrap_parens(a);
    a.start_byte() == b.start_byte() && a.end_byte() == b.end_byte()
}

/// If `node` is a top-level `&&`/`||` binary expression, returns its
/// operator text and operand nodes.
fn binary_parts<'a>(node: Node<'a>) -> Option<(&'static str, Node<'a>, Node<'a>)> {
    if node.kind() != "binary_expression" {
        return None;
    }
    let left = node.child_by_field_name("left")?;
    let right = node.child_by_field_name("right")?;
    let mut cursor = node.walk();
    let operator_node = node
        .children(&mut cursor)
        .find(|c| c.kind() == "&&" || c.kind() == "||")?;
    let operator = if operator_node.kind() == "&&" { "&&" } else { "||" };
    Some((operator, left, right))
}
