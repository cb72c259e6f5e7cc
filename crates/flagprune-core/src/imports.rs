use std::collections::HashMap;

use tree_sitter::Node;

use flagprune_common::FlagConfig;

use crate::parser::{walk, ParsedUnit};

/// One use of a name introduced by an import.
#[derive(Debug, Clone)]
pub struct UsageSite {
    pub offset: usize,
    pub length: usize,
    pub symbol_name: String,
}

/// One `import` directive and everywhere its introduced names are used.
pub struct ImportRecord<'a> {
    pub directive_node: Node<'a>,
    pub uri: String,
    pub prefix: Option<String>,
    pub shown_names: Vec<String>,
    pub hidden_names: Vec<String>,
    pub usage_sites: Vec<UsageSite>,
}

impl ImportRecord<'_> {
    /// An import is classified "flag-service" when its URI contains any
    /// configured flag-service class name, or — unless `strict_imports` is
    /// set — the substrings `flag`/`feature`.
    pub fn is_flag_service(&self, config: &FlagConfig) -> bool {
        if config
            .patterns
            .classes
            .iter()
            .any(|class| self.uri.contains(class.as_str()))
        {
            return true;
        }
        if config.settings.strict_imports {
            return false;
        }
        let lower = self.uri.to_lowercase();
        lower.contains("flag") || lower.contains("feature")
    }

    /// True if this import is a flag-service import AND every usage site
    /// falls inside one of `removed_ranges` — i.e. it is truly dead once
    /// those byte ranges are excised.
    ///
    /// An import with zero usage sites is vacuously dead.
    pub fn is_dead(&self, config: &FlagConfig, removed_ranges: &[(usize, usize)]) -> bool {
        self.is_flag_service(config)
            && self.usage_sites.iter().all(|site| {
                removed_ranges
                    .iter()
                    .any(|(start, end)| *start <= site.offset && site.offset + site.length <= *end)
            })
    }
}

/// Record every import directive and every identifier-resolved-to-imported
/// symbol usage site, including prefixed (namespace) accesses.
pub fn scan<'a>(unit: &'a ParsedUnit) -> Vec<ImportRecord<'a>> {
    let mut records: Vec<ImportRecord<'a>> = Vec::new();
    let mut import_directive_ranges: Vec<(usize, usize)> = Vec::new();

    walk(unit.root(), &mut |node, _ancestors| {
        if node.kind() != "import_statement" {
            return;
        }
        import_directive_ranges.push((node.start_byte(), node.end_byte()));

        let Some(source) = node.child_by_field_name("source") else {
            return;
        };
        let uri = unit
            .text(source)
            .trim_matches(|c| c == '\'' || c == '"' || c == '`')
            .to_string();

        let mut shown_names = Vec::new();
        let mut prefix = None;

        if let Some(clause) = node.child_by_field_name("import") {
            collect_import_names(unit, clause, &mut shown_names, &mut prefix);
        }

        records.push(ImportRecord {
            directive_node: node,
            uri,
            prefix,
            shown_names,
            hidden_names: Vec::new(),
            usage_sites: Vec::new(),
        });
    });

    let mut occurrences: HashMap<String, Vec<UsageSite>> = HashMap::new();
    walk(unit.root(), &mut |node, _ancestors| {
        if node.kind() != "identifier" && node.kind() != "property_identifier" {
            return;
        }
        let start = node.start_byte();
        let end = node.end_byte();
        if import_directive_ranges
            .iter()
            .any(|(s, e)| *s <= start && end <= *e)
        {
            return;
        }
        let name = unit.text(node).to_string();
        occurrences.entry(name.clone()).or_default().push(UsageSite {
            offset: start,
            length: end - start,
            symbol_name: name,
        });
    });

    for record in &mut records {
        for name in &record.shown_names {
            if let Some(sites) = occurrences.get(name) {
                record.usage_sites.extend(sites.iter().cloned());
            }
        }
    }

    records
}

fn collect_import_names(
    unit: &ParsedUnit,
    clause: Node<'_>,
    shown_names: &mut Vec<String>,
    prefix: &mut Option<String>,
) {
    match clause.kind() {
        "identifier" => shown_names.push(unit.text(clause).to_string()),
        "namespace_import" => {
            if let Some(ident) = clause.named_child(0) {
                let name = unit.text(ident).to_string();
                *prefix = Some(name.clone());
                shown_names.push(name);
            }
        }
        "named_imports" => {
            let mut cursor = clause.walk();
            for spec in clause.named_children(&mut cursor) {
                if spec.kind() != "import_specifier" {
                    continue;
                }
                let bound = spec
                    .child_by_field_name("alias")
                    .or_else(|| spec.child_by_field_name("name"));
                if let Some(bound) = bound {
                    shown_names.push(unit.text(bound).to_string());
                }
            }
        }
        "import_clause" => {
            let mut cursor = clause.walk();
            for child in clause.named_children(&mut cursor) {
                collect_import_names(unit, child, shown_names, prefix);
            }
        }
        _ => {}
    }
}
