use once_cell::sync::Lazy;
use tree_sitter::Node;

use super::{FileAnalysis, LanguageStrategy};
use crate::error::Result;
use crate::index::FileStructure;
use crate::indexer::parser::{parse_source, ParsedFile};

pub const PYTHON: &str = "Python";

static PYTHON_LANGUAGE: Lazy<tree_sitter::Language> =
    Lazy::new(|| tree_sitter_python::LANGUAGE.into());

/// Full-parse strategy. Only direct children of the module are inspected, so
/// nested functions and class-level attributes are never reported.
pub struct PythonStrategy;

impl PythonStrategy {
    fn parse<'src>(&self, source: &'src str) -> Result<ParsedFile<'src>> {
        parse_source(source, &PYTHON_LANGUAGE)
    }
}

impl LanguageStrategy for PythonStrategy {
    fn name(&self) -> &'static str {
        PYTHON
    }

    fn extract_structure(&self, source: &str) -> Result<FileStructure> {
        let parsed = self.parse(source)?;
        Ok(structure_of(&parsed))
    }

    fn extract_doc(&self, source: &str) -> String {
        match self.parse(source) {
            Ok(parsed) => module_docstring(&parsed).unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    fn extract_imports(&self, source: &str) -> Vec<String> {
        match self.parse(source) {
            Ok(parsed) => imports_of(&parsed),
            Err(_) => Vec::new(),
        }
    }

    fn analyze(&self, source: &str) -> Result<FileAnalysis> {
        let parsed = self.parse(source)?;
        Ok(FileAnalysis {
            structure: structure_of(&parsed),
            description: module_docstring(&parsed).unwrap_or_default(),
            imports: imports_of(&parsed),
        })
    }
}

fn module_children<'t>(parsed: &'t ParsedFile<'_>) -> Vec<Node<'t>> {
    let root = parsed.root_node();
    let mut cursor = root.walk();
    let children = root.named_children(&mut cursor).collect();
    children
}

/// `@decorator` wrappers hide the definition one level down
fn unwrap_decorated(node: Node<'_>) -> Node<'_> {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition").unwrap_or(node)
    } else {
        node
    }
}

fn field_text<'a>(parsed: &'a ParsedFile<'_>, node: &Node<'_>, field: &str) -> Option<&'a str> {
    node.child_by_field_name(field)
        .map(|child| parsed.node_text(&child))
}

// =====================================================
// Structure
// =====================================================

fn structure_of(parsed: &ParsedFile<'_>) -> FileStructure {
    let mut structure = FileStructure::default();

    for child in module_children(parsed) {
        let node = unwrap_decorated(child);
        match node.kind() {
            "class_definition" => {
                let Some(name) = field_text(parsed, &node, "name") else {
                    continue;
                };
                structure.open_type(name);
                for method in class_methods(parsed, &node) {
                    structure.add_member(name, method);
                }
            }
            "function_definition" => {
                if let Some(name) = field_text(parsed, &node, "name") {
                    structure.functions.push(name.to_string());
                }
            }
            "expression_statement" => {
                let mut cursor = node.walk();
                for expr in node.named_children(&mut cursor) {
                    if expr.kind() == "assignment" {
                        collect_constants(parsed, expr, &mut structure.constants);
                    }
                }
            }
            _ => {}
        }
    }

    structure
}

fn class_methods(parsed: &ParsedFile<'_>, class: &Node<'_>) -> Vec<String> {
    let Some(body) = class.child_by_field_name("body") else {
        return Vec::new();
    };
    let mut cursor = body.walk();
    let methods = body
        .named_children(&mut cursor)
        .map(unwrap_decorated)
        .filter(|n| n.kind() == "function_definition")
        .filter_map(|n| field_text(parsed, &n, "name").map(str::to_string))
        .collect();
    methods
}

/// `A = B = 1` nests the second assignment on the right-hand side.
/// Annotated assignments (`X: int = 1`, bare `X: int`) are not constants.
fn collect_constants(parsed: &ParsedFile<'_>, assignment: Node<'_>, out: &mut Vec<String>) {
    if assignment.child_by_field_name("type").is_some() {
        return;
    }
    if let Some(left) = assignment.child_by_field_name("left") {
        if left.kind() == "identifier" {
            let name = parsed.node_text(&left);
            if is_upper(name) {
                out.push(name.to_string());
            }
        }
    }
    if let Some(right) = assignment.child_by_field_name("right") {
        if right.kind() == "assignment" {
            collect_constants(parsed, right, out);
        }
    }
}

/// Same rule as `str.isupper`: at least one cased character, none lower-case
pub fn is_upper(name: &str) -> bool {
    let mut cased = false;
    for c in name.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

// =====================================================
// Docstring
// =====================================================

fn module_docstring(parsed: &ParsedFile<'_>) -> Option<String> {
    let first = module_children(parsed)
        .into_iter()
        .find(|n| n.kind() != "comment")?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    let literal = first.named_child(0)?;
    if literal.kind() != "string" {
        return None;
    }
    let body = string_body(parsed.node_text(&literal))?;
    let cleaned = clean_doc(body);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Strips the prefix and quotes. f-strings and bytes are not docstrings.
fn string_body(literal: &str) -> Option<&str> {
    let quote_start = literal.find(['"', '\''])?;
    let prefix = &literal[..quote_start];
    if prefix.chars().any(|c| matches!(c, 'f' | 'F' | 'b' | 'B')) {
        return None;
    }

    let rest = &literal[quote_start..];
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if rest.len() >= 2 * quote.len() && rest.starts_with(quote) && rest.ends_with(quote) {
            return Some(&rest[quote.len()..rest.len() - quote.len()]);
        }
    }
    None
}

/// Indentation cleanup in the manner of `inspect.cleandoc`
pub fn clean_doc(doc: &str) -> String {
    let expanded = expand_tabs(doc);
    let lines: Vec<&str> = expanded.split('\n').collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if idx == 0 {
            cleaned.push(line.trim_start().to_string());
        } else {
            cleaned.push(line.chars().skip(margin).collect::<String>().trim_end().to_string());
        }
    }

    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    let leading_blank = cleaned.iter().take_while(|l| l.trim().is_empty()).count();
    cleaned.drain(..leading_blank);

    cleaned.join("\n")
}

fn expand_tabs(text: &str) -> String {
    const TAB_SIZE: usize = 8;
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for c in text.chars() {
        match c {
            '\t' => {
                let pad = TAB_SIZE - (column % TAB_SIZE);
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

// =====================================================
// Imports
// =====================================================

fn imports_of(parsed: &ParsedFile<'_>) -> Vec<String> {
    let mut imports = Vec::new();

    for node in module_children(parsed) {
        match node.kind() {
            "import_statement" => {
                for name in named_field_children(&node, "name") {
                    imports.push(imported_name(parsed, &name, None));
                }
            }
            "import_from_statement" => {
                let module = node
                    .child_by_field_name("module_name")
                    .map(|m| module_path(parsed, &m))
                    .unwrap_or_default();

                let mut cursor = node.walk();
                let wildcard = node
                    .named_children(&mut cursor)
                    .any(|child| child.kind() == "wildcard_import");
                if wildcard {
                    imports.push(format!("{}.*", module));
                }

                for name in named_field_children(&node, "name") {
                    imports.push(imported_name(parsed, &name, Some(module.as_str())));
                }
            }
            "future_import_statement" => {
                for name in named_field_children(&node, "name") {
                    imports.push(imported_name(parsed, &name, Some("__future__")));
                }
            }
            _ => {}
        }
    }

    imports
}

fn named_field_children<'t>(node: &Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let children = node.children_by_field_name(field, &mut cursor).collect();
    children
}

/// The alias wins; otherwise the dotted name, qualified by the module for
/// `from` imports.
fn imported_name(parsed: &ParsedFile<'_>, node: &Node<'_>, module: Option<&str>) -> String {
    if node.kind() == "aliased_import" {
        if let Some(alias) = field_text(parsed, node, "alias") {
            return alias.to_string();
        }
    }

    let name = if node.kind() == "aliased_import" {
        field_text(parsed, node, "name").unwrap_or("")
    } else {
        parsed.node_text(node)
    };

    match module {
        Some(module) => format!("{}.{}", module, name),
        None => name.to_string(),
    }
}

/// `from ..pkg import x` refers to module `pkg`; the dots are dropped
fn module_path(parsed: &ParsedFile<'_>, node: &Node<'_>) -> String {
    if node.kind() == "relative_import" {
        let mut cursor = node.walk();
        let dotted = node
            .named_children(&mut cursor)
            .find(|child| child.kind() == "dotted_name");
        return dotted
            .map(|d| parsed.node_text(&d).to_string())
            .unwrap_or_default();
    }
    parsed.node_text(node).to_string()
}
