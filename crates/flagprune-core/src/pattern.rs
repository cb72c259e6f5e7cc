use tree_sitter::Node;

use crate::parser::ParsedUnit;

/// A configured call pattern, parsed once from its TOML string form into a
/// closed tagged variant rather than a string comparison repeated per node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// `"Class.method"` — receiver must be the identifier `Class`.
    ClassMethod { class: String, method: String },
    /// `"*.method"` — any receiver.
    AnyReceiverMethod { method: String },
    /// `"method"` — bare method name, call or no receiver.
    BareMethod { method: String },
    /// `"Outer.outerMethod(innerMethod"` — nested container lookup.
    NestedCall {
        outer_class: Option<String>,
        outer_method: String,
        inner_method: String,
    },
}

impl Pattern {
    /// Parse one configured pattern string.
    pub fn parse(raw: &str) -> Self {
        if let Some(paren) = raw.find('(') {
            let outer = &raw[..paren];
            let inner = raw[paren + 1..].trim_end_matches(')').trim().to_string();
            let (outer_class, outer_method) = split_receiver_method(outer);
            return Self::NestedCall {
                outer_class,
                outer_method,
                inner_method: inner,
            };
        }

        let (receiver, method) = split_receiver_method(raw);
        match receiver {
            None => Self::BareMethod { method },
            Some(r) if r == "*" => Self::AnyReceiverMethod { method },
            Some(class) => Self::ClassMethod { class, method },
        }
    }
}

/// Splits `"Class.method"` into `(Some("Class"), "method")`, or a bare
/// `"method"` into `(None, "method")`.
fn split_receiver_method(s: &str) -> (Option<String>, String) {
    s.rfind('.').map_or_else(
        || (None, s.trim().to_string()),
        |dot| {
            (
                Some(s[..dot].trim().to_string()),
                s[dot + 1..].trim().to_string(),
            )
        },
    )
}

/// Default patterns used when no `patterns.methods` are configured.
pub const DEFAULT_BARE_METHODS: [&str; 3] = ["isEnabled", "check", "isFeatureEnabled"];

/// Result of attempting to match a call-expression node against the
/// configured patterns.
pub enum MatchResult<'a> {
    NoMatch,
    /// `flag_name_node` is the node whose first argument carries the flag
    /// key — the call itself, except for [`Pattern::NestedCall`] where it is
    /// the nested inner call.
    Match { flag_name_node: Node<'a> },
}

/// Decide whether `call` (a `call_expression` node) matches any configured
/// pattern, trying each in order and returning on the first match.
pub fn match_call<'a>(unit: &ParsedUnit, call: Node<'a>, patterns: &[Pattern]) -> MatchResult<'a> {
    if call.kind() != "call_expression" {
        return MatchResult::NoMatch;
    }

    let effective: Vec<Pattern> = if patterns.is_empty() {
        DEFAULT_BARE_METHODS
            .iter()
            .map(|m| Pattern::BareMethod {
                method: (*m).to_string(),
            })
            .collect()
    } else {
        patterns.to_vec()
    };

    for pattern in &effective {
        if let Some(result) = try_match_one(unit, call, pattern) {
            return result;
        }
    }
    MatchResult::NoMatch
}

fn try_match_one<'a>(
    unit: &ParsedUnit,
    call: Node<'a>,
    pattern: &Pattern,
) -> Option<MatchResult<'a>> {
    match pattern {
        Pattern::ClassMethod { class, method } => {
            let (receiver, name) = call_receiver_and_method(unit, call)?;
            (receiver.as_deref() == Some(class.as_str()) && name == *method)
                .then_some(MatchResult::Match { flag_name_node: call })
        }
        Pattern::AnyReceiverMethod { method } => {
            let (receiver, name) = call_receiver_and_method(unit, call)?;
            (receiver.is_some() && name == *method)
                .then_some(MatchResult::Match { flag_name_node: call })
        }
        Pattern::BareMethod { method } => {
            let (_, name) = call_receiver_and_method(unit, call)?;
            (name == *method).then_some(MatchResult::Match { flag_name_node: call })
        }
        Pattern::NestedCall {
            outer_class,
            outer_method,
            inner_method,
        } => {
            let (receiver, name) = call_receiver_and_method(unit, call)?;
            if name != *outer_method {
                return None;
            }
            if let Some(class) = outer_class
                && receiver.as_deref() != Some(class.as_str())
            {
                return None;
            }
            let first_arg = first_argument(call)?;
            if first_arg.kind() != "call_expression" {
                return None;
            }
            let (_, inner_name) = call_receiver_and_method(unit, first_arg)?;
            (inner_name == *inner_method).then_some(MatchResult::Match {
                flag_name_node: first_arg,
            })
        }
    }
}

/// Returns `(receiver_text, method_name)` for a call expression, where
/// `receiver_text` is `None` for a bare call (`method(...)`) and `Some` for
/// a member call (`receiver.method(...)`).
fn call_receiver_and_method<'a>(unit: &ParsedUnit, call: Node<'a>) -> Option<(Option<String>, String)> {
    let function = call.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some((None, unit.text(function).to_string())),
        "member_expression" => {
            let object = function.child_by_field_name("object")?;
            let property = function.child_by_field_name("property")?;
            Some((
                Some(unit.text(object).to_string()),
                unit.text(property).to_string(),
            ))
        }
        _ => None,
    }
}

fn first_argument(call: Node<'_>) -> Option<Node<'_>> {
    let args = call.child_by_field_name("arguments")?;
    let mut cursor = args.walk();
    args.named_children(&mut cursor).next()
}

/// Extract the flag key from `node`'s first argument: a string literal, or a
/// single-part template/interpolated string, or a bare identifier's own
/// spelling. No cross-unit constant resolution is performed.
pub fn extract_flag_key(unit: &ParsedUnit, node: Node<'_>) -> Option<String> {
    let arg = first_argument(node)?;
    match arg.kind() {
        "string" => {
            let text = unit.text(arg);
            Some(text.trim_matches(|c| c == '\'' || c == '"' || c == '`').to_string())
        }
        "template_string" => {
            let mut cursor = arg.walk();
            let fragments: Vec<Node<'_>> = arg
                .named_children(&mut cursor)
                .filter(|c| c.kind() == "string_fragment")
                .collect();
            if fragments.len() == 1 {
                Some(unit.text(fragments[0]).to_string())
            } else {
                None
            }
        }
        "identifier" => Some(unit.text(arg).to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_class_method_pattern() {
        assert_eq!(
            Pattern::parse("Class.method"),
            Pattern::ClassMethod {
                class: "Class".to_string(),
                method: "method".to_string()
            }
        );
    }

    #[test]
    fn parses_any_receiver_pattern() {
        assert_eq!(
            Pattern::parse("*.isEnabled"),
            Pattern::AnyReceiverMethod {
                method: "isEnabled".to_string()
            }
        );
    }

    #[test]
    fn parses_bare_method_pattern() {
        assert_eq!(
            Pattern::parse("isEnabled"),
            Pattern::BareMethod {
                method: "isEnabled".to_string()
            }
        );
    }

    #[test]
    fn parses_nested_call_pattern() {
        assert_eq!(
            Pattern::parse("registry.read(flagProvider"),
            Pattern::NestedCall {
                outer_class: Some("registry".to_string()),
                outer_method: "read".to_string(),
                inner_method: "flagProvider".to_string(),
            }
        );
    }

    fn find_call<'a>(unit: &'a ParsedUnit) -> Node<'a> {
        let mut found = None;
        crate::parser::walk(unit.root(), &mut |node, _| {
            if found.is_none() && node.kind() == "call_expression" {
                found = Some(node);
            }
        });
        found.expect("fixture must contain a call expression")
    }

    #[test]
    fn matches_class_method_call() {
        let unit = ParsedUnit::parse("flags.isEnabled('x');").unwrap();
        let call = find_call(&unit);
        let patterns = vec![Pattern::parse("flags.isEnabled")];
        assert!(matches!(
            match_call(&unit, call, &patterns),
            MatchResult::Match { .. }
        ));
    }

    #[test]
    fn any_receiver_matches_regardless_of_receiver_name() {
        let unit = ParsedUnit::parse("anything.isEnabled('x');").unwrap();
        let call = find_call(&unit);
        let patterns = vec![Pattern::parse("*.isEnabled")];
        assert!(matches!(
            match_call(&unit, call, &patterns),
            MatchResult::Match { .. }
        ));
    }

    #[test]
    fn bare_method_matches_with_or_without_receiver() {
        let unit = ParsedUnit::parse("isEnabled('x');").unwrap();
        let call = find_call(&unit);
        let patterns = vec![Pattern::parse("isEnabled")];
        assert!(matches!(
            match_call(&unit, call, &patterns),
            MatchResult::Match { .. }
        ));
    }

    #[test]
    fn nested_call_returns_inner_node_as_flag_name_node() {
        let unit = ParsedUnit::parse("registry.read(flagProvider('x'));").unwrap();
        let call = find_call(&unit);
        let patterns = vec![Pattern::parse("registry.read(flagProvider")];
        match match_call(&unit, call, &patterns) {
            MatchResult::Match { flag_name_node } => {
                assert_eq!(unit.text(flag_name_node), "flagProvider('x')");
            }
            MatchResult::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn default_patterns_match_known_bare_names() {
        let unit = ParsedUnit::parse("check('x');").unwrap();
        let call = find_call(&unit);
        assert!(matches!(match_call(&unit, call, &[]), MatchResult::Match { .. }));
    }

    #[test]
    fn extract_flag_key_from_string_literal() {
        let unit = ParsedUnit::parse("isEnabled('new_feature');").unwrap();
        let call = find_call(&unit);
        assert_eq!(
            extract_flag_key(&unit, call).as_deref(),
            Some("new_feature")
        );
    }
}
