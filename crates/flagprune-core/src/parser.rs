use tree_sitter::{Node, Parser, Tree};

use crate::error::EngineError;

/// A parsed source file: the syntax tree plus the source text it was parsed
/// from, and the byte-offset helpers every other component relies on.
pub struct ParsedUnit {
    source: String,
    tree: Tree,
}

impl ParsedUnit {
    /// Parse `source` with the `tree-sitter-typescript` grammar.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ParseFailed`] if the grammar can't be loaded
    /// (should never happen — it's statically linked) or if the resulting
    /// tree's root node reports a syntax error.
    pub fn parse(source: &str) -> Result<Self, EngineError> {
        let mut parser = Parser::new();
        let language = tree_sitter_typescript::language_typescript();
        parser
            .set_language(language)
            .map_err(|e| EngineError::ParseFailed(e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| EngineError::ParseFailed("tree-sitter returned no tree".to_string()))?;

        if tree.root_node().has_error() {
            return Err(EngineError::ParseFailed(
                "source contains a syntax error".to_string(),
            ));
        }

        Ok(Self {
            source: source.to_string(),
            tree,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// The source text spanned by `node`.
    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

/// Depth-first pre-order walk over `root`'s subtree, calling `visit` with
/// each node and its ancestor chain (innermost last).
///
/// `tree-sitter` nodes carry a parent pointer (`Node::parent`), but every
/// component in this crate walks via this explicit stack instead, so the
/// same traversal code would port unchanged to a parser whose nodes don't.
pub fn walk<'a>(root: Node<'a>, visit: &mut impl FnMut(Node<'a>, &[Node<'a>])) {
    let mut stack: Vec<Node<'a>> = Vec::new();
    walk_inner(root, &mut stack, visit);
}

fn walk_inner<'a>(
    node: Node<'a>,
    ancestors: &mut Vec<Node<'a>>,
    visit: &mut impl FnMut(Node<'a>, &[Node<'a>]),
) {
    visit(node, ancestors);
    ancestors.push(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_inner(child, ancestors, visit);
    }
    ancestors.pop();
}
