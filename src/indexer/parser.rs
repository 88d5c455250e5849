use crate::error::{MapperError, Result};

/// A tree-sitter tree together with the source it was parsed from
pub struct ParsedFile<'src> {
    pub tree: tree_sitter::Tree,
    pub source: &'src str,
}

impl<'src> ParsedFile<'src> {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub fn node_text(&self, node: &tree_sitter::Node) -> &str {
        node.utf8_text(self.source_bytes()).unwrap_or("")
    }
}

/// Parses `source` with `language`. Trees that contain syntax errors are
/// rejected so callers never mistake a recovered tree for a valid one.
pub fn parse_source<'src>(
    source: &'src str,
    language: &tree_sitter::Language,
) -> Result<ParsedFile<'src>> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(language)
        .map_err(|e| MapperError::Parse(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| MapperError::Parse("Failed to parse source".to_string()))?;

    if tree.root_node().has_error() {
        let line = first_error(tree.root_node())
            .map(|node| node.start_position().row + 1)
            .unwrap_or(1);
        return Err(MapperError::Parse(format!("syntax error near line {}", line)));
    }

    Ok(ParsedFile { tree, source })
}

fn first_error(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }

    #[test]
    fn test_parse_valid_source() {
        let source = "def main():\n    return 1\n";
        let parsed = parse_source(source, &python()).unwrap();
        assert_eq!(parsed.root_node().kind(), "module");
        assert_eq!(parsed.source_bytes(), source.as_bytes());
    }

    #[test]
    fn test_parse_empty_source() {
        let parsed = parse_source("", &python()).unwrap();
        assert_eq!(parsed.root_node().named_child_count(), 0);
    }

    #[test]
    fn test_node_text() {
        let source = "x = 42";
        let parsed = parse_source(source, &python()).unwrap();
        let root = parsed.root_node();
        assert_eq!(parsed.node_text(&root), source);
    }

    #[test]
    fn test_syntax_error_is_rejected() {
        let err = parse_source("def broken(:\n    pass\n", &python()).err().unwrap();
        assert!(matches!(err, MapperError::Parse(_)));
        assert!(err.to_string().contains("syntax error"));
    }
}
