//! Languages that only contribute documentation (and, for PHP, imports).

use once_cell::sync::Lazy;
use regex::Regex;

use super::pattern::{Capture, DocStyle, PatternGrammar};

pub const CPP: &str = "C++";
pub const GO: &str = "Go";
pub const PHP: &str = "PHP";
pub const RUBY: &str = "Ruby";

static PHP_USE: Lazy<Regex> = Lazy::new(|| Regex::new(r"use\s+([\w\\]+);").unwrap());

fn comments_only(name: &'static str, doc: DocStyle) -> PatternGrammar {
    PatternGrammar {
        doc,
        ..PatternGrammar::empty(name)
    }
}

pub fn cpp() -> PatternGrammar {
    comments_only(CPP, DocStyle::CStyle)
}

pub fn go() -> PatternGrammar {
    comments_only(GO, DocStyle::CStyle)
}

pub fn php() -> PatternGrammar {
    PatternGrammar {
        import: Some(Capture::new(&PHP_USE, 1)),
        ..comments_only(PHP, DocStyle::CStyle)
    }
}

pub fn ruby() -> PatternGrammar {
    comments_only(RUBY, DocStyle::Hash)
}
