use once_cell::sync::Lazy;
use regex::Regex;

use super::pattern::{Capture, DocStyle, PatternGrammar, CLASS_DECL};

pub const JAVASCRIPT: &str = "JavaScript";
pub const TYPESCRIPT: &str = "TypeScript";

static METHOD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*\(").unwrap());
static FUNCTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"function\s+(\w+)\s*\(").unwrap());
static CONSTANT: Lazy<Regex> = Lazy::new(|| Regex::new(r"const\s+(\w+)\s*=").unwrap());
static IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"import\s+.*?\s+from\s+['"]([\w./]+)['"];"#).unwrap());

/// Shared by JavaScript and TypeScript. Inside a class any `name(` counts as
/// a method, so call sites in method bodies are picked up too.
pub fn grammar(name: &'static str) -> PatternGrammar {
    PatternGrammar {
        name,
        type_decl: Some(Capture::new(&CLASS_DECL, 1)),
        member: Some(Capture::new(&METHOD, 1)),
        function: Some(Capture::new(&FUNCTION, 1)),
        constant: Some(Capture::new(&CONSTANT, 1)),
        import: Some(Capture::new(&IMPORT, 1)),
        doc: DocStyle::CStyle,
    }
}
