use once_cell::sync::Lazy;
use regex::Regex;

use super::pattern::{Capture, DocStyle, PatternGrammar, CLASS_DECL};

pub const CSHARP: &str = "C#";

static METHOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(public|protected|private)\s+\w+\s+(\w+)\s*\(").unwrap());
static CONSTANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"public\s+const\s+\w+\s+(\w+)\s*=").unwrap());
static USING: Lazy<Regex> = Lazy::new(|| Regex::new(r"using\s+([\w\.]+);").unwrap());

pub fn grammar() -> PatternGrammar {
    PatternGrammar {
        name: CSHARP,
        type_decl: Some(Capture::new(&CLASS_DECL, 1)),
        member: Some(Capture::new(&METHOD, 2)),
        function: Some(Capture::new(&METHOD, 2)),
        constant: Some(Capture::new(&CONSTANT, 1)),
        import: Some(Capture::new(&USING, 1)),
        doc: DocStyle::CStyle,
    }
}
