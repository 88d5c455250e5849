use once_cell::sync::Lazy;
use regex::Regex;

use super::pattern::{Capture, DocStyle, PatternGrammar, CLASS_DECL};

pub const JAVA: &str = "Java";

static METHOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(public|protected|private)\s+\w+\s+(\w+)\s*\(").unwrap());
static CONSTANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"public\s+static\s+final\s+\w+\s+(\w+)\s*=").unwrap());
static IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"import\s+([\w\.]+);").unwrap());

/// Visibility-qualified methods; the same rule yields free functions outside a class.
pub fn grammar() -> PatternGrammar {
    PatternGrammar {
        name: JAVA,
        type_decl: Some(Capture::new(&CLASS_DECL, 1)),
        member: Some(Capture::new(&METHOD, 2)),
        function: Some(Capture::new(&METHOD, 2)),
        constant: Some(Capture::new(&CONSTANT, 1)),
        import: Some(Capture::new(&IMPORT, 1)),
        doc: DocStyle::CStyle,
    }
}
