use std::collections::HashMap;

use tree_sitter::Node;

use flagprune_common::FlagConfig;

use crate::parser::{walk, ParsedUnit};
use crate::scanner::FlagVariableBinding;

/// What kind of declaration a [`DefinitionLocation`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Constant,
    ClassField,
    EnumValue,
    Variable,
}

/// A flag-definition declaration eligible for removal.
pub struct DefinitionLocation<'a> {
    pub flag_name: String,
    pub node: Node<'a>,
    pub offset: usize,
    pub length: usize,
    pub kind: DefinitionKind,
}

/// Enumerate top-level constants, class fields, and enum members whose
/// identifier matches a flag with `remove_definition = true`, plus the
/// flag-bound local variable declarations already discovered in the
/// scanner's `bindings` table.
pub fn scan<'a>(
    unit: &'a ParsedUnit,
    config: &FlagConfig,
    bindings: &HashMap<String, FlagVariableBinding<'a>>,
) -> Vec<DefinitionLocation<'a>> {
    let mut locations = Vec::new();

    walk(unit.root(), &mut |node, ancestors| match node.kind() {
        "lexical_declaration" | "variable_declaration" => {
            if !ancestors.last().is_some_and(|p| p.kind() == "program") {
                return;
            }
            push_from_declaration(unit, config, node, DefinitionKind::Constant, &mut locations);
        }
        "public_field_definition" => {
            push_from_named_field(unit, config, node, DefinitionKind::ClassField, &mut locations);
        }
        "property_identifier" => {
            if ancestors.last().is_some_and(|p| p.kind() == "enum_body") {
                push_identifier_definition(unit, config, node, DefinitionKind::EnumValue, &mut locations);
            }
        }
        "enum_assignment" => {
            push_from_named_field(unit, config, node, DefinitionKind::EnumValue, &mut locations);
        }
        _ => {}
    });

    for binding in bindings.values() {
        let Some(def) = config.find(&binding.flag_name) else {
            continue;
        };
        if !def.remove_definition {
            continue;
        }
        push_location(
            &mut locations,
            def.name.clone(),
            binding.declaration_node,
            DefinitionKind::Variable,
        );
    }

    locations
}

fn push_from_declaration<'a>(
    unit: &ParsedUnit,
    config: &FlagConfig,
    declaration: Node<'a>,
    kind: DefinitionKind,
    out: &mut Vec<DefinitionLocation<'a>>,
) {
    let mut cursor = declaration.walk();
    for child in declaration.named_children(&mut cursor) {
        if child.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = child.child_by_field_name("name") else {
            continue;
        };
        let name = unit.text(name_node);
        let Some(def) = config.find(name) else {
            continue;
        };
        if !def.remove_definition {
            continue;
        }
        push_location(out, def.name.clone(), declaration, kind);
    }
}

fn push_from_named_field<'a>(
    unit: &ParsedUnit,
    config: &FlagConfig,
    node: Node<'a>,
    kind: DefinitionKind,
    out: &mut Vec<DefinitionLocation<'a>>,
) {
    let Some(name_node) = node
        .child_by_field_name("property")
        .or_else(|| node.child_by_field_name("name"))
    else {
        return;
    };
    let name = unit.text(name_node);
    let Some(def) = config.find(name) else {
        return;
    };
    if !def.remove_definition {
        return;
    }
    push_location(out, def.name.clone(), node, kind);
}

fn push_identifier_definition<'a>(
    unit: &ParsedUnit,
    config: &FlagConfig,
    identifier: Node<'a>,
    kind: DefinitionKind,
    out: &mut Vec<DefinitionLocation<'a>>,
) {
    let name = unit.text(identifier);
    let Some(def) = config.find(name) else {
        return;
    };
    if !def.remove_definition {
        return;
    }
    push_location(out, def.name.clone(), identifier, kind);
}

fn push_location<'a>(
    out: &mut Vec<DefinitionLocation<'a>>,
    flag_name: String,
    node: Node<'a>,
    kind: DefinitionKind,
) {
    let offset = node.start_byte();
    let end = node.end_byte();
    if end <= offset {
        // Guards against zero/negative offsets.
        return;
    }
    out.push(DefinitionLocation {
        flag_name,
        node,
        offset,
        length: end - offset,
        kind,
    });
}
