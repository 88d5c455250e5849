//! Line-oriented extraction for languages without a full parser.
//!
//! Structure is recovered by a two-state scanner. A type-declaration match
//! moves the scanner into `InsideType(name)`; member matches are attributed to
//! that type, and anything matching the function rule at the top level is a
//! free function. Constants are collected regardless of state. There is no
//! brace tracking, so once a type opens every later member belongs to it
//! until the next type declaration.

use once_cell::sync::Lazy;
use regex::Regex;

use super::LanguageStrategy;
use crate::error::Result;
use crate::index::FileStructure;

pub static CLASS_DECL: Lazy<Regex> = Lazy::new(|| Regex::new(r"class\s+(\w+)").unwrap());

static C_STYLE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*//\s*(.*)|^\s*/\*\*\s*(.*?)\s*\*/").unwrap());

static HASH_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*#\s*(.*)").unwrap());

/// A pattern plus the capture group holding the name
#[derive(Clone, Copy)]
pub struct Capture {
    pattern: &'static Lazy<Regex>,
    group: usize,
}

impl Capture {
    pub const fn new(pattern: &'static Lazy<Regex>, group: usize) -> Self {
        Self { pattern, group }
    }

    /// First match on the line, if any
    pub fn find(&self, line: &str) -> Option<String> {
        self.pattern
            .captures(line)
            .and_then(|caps| caps.get(self.group))
            .map(|m| m.as_str().to_string())
    }
}

/// How documentation comments are written in a language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocStyle {
    None,
    /// `// line` and single-line `/** block */`
    CStyle,
    /// `# line` (shebangs excluded)
    Hash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    TopLevel,
    InsideType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    TypeOpened(String),
    Member { owner: String, name: String },
    Function(String),
    Constant(String),
}

/// Data-driven strategy: a language is just a set of rules.
pub struct PatternGrammar {
    pub name: &'static str,
    pub type_decl: Option<Capture>,
    pub member: Option<Capture>,
    pub function: Option<Capture>,
    pub constant: Option<Capture>,
    pub import: Option<Capture>,
    pub doc: DocStyle,
}

impl PatternGrammar {
    /// A grammar with no rules at all
    pub fn empty(name: &'static str) -> Self {
        Self {
            name,
            type_decl: None,
            member: None,
            function: None,
            constant: None,
            import: None,
            doc: DocStyle::None,
        }
    }

    /// Advances the scanner over one line.
    ///
    /// A type declaration consumes the whole line; otherwise at most one
    /// member-or-function event and one constant event are produced.
    pub fn step(&self, state: ScanState, line: &str) -> (ScanState, Vec<ScanEvent>) {
        if let Some(name) = self.type_decl.and_then(|c| c.find(line)) {
            return (
                ScanState::InsideType(name.clone()),
                vec![ScanEvent::TypeOpened(name)],
            );
        }

        let mut events = Vec::new();

        match &state {
            ScanState::InsideType(owner) => {
                if let Some(name) = self.member.and_then(|c| c.find(line)) {
                    events.push(ScanEvent::Member {
                        owner: owner.clone(),
                        name,
                    });
                }
            }
            ScanState::TopLevel => {
                if let Some(name) = self.function.and_then(|c| c.find(line)) {
                    events.push(ScanEvent::Function(name));
                }
            }
        }

        if let Some(name) = self.constant.and_then(|c| c.find(line)) {
            events.push(ScanEvent::Constant(name));
        }

        (state, events)
    }

    pub fn scan<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> FileStructure {
        let mut structure = FileStructure::default();
        let mut state = ScanState::TopLevel;

        for line in lines {
            let (next, events) = self.step(state, line);
            state = next;
            for event in events {
                apply_event(&mut structure, event);
            }
        }

        structure
    }
}

fn apply_event(structure: &mut FileStructure, event: ScanEvent) {
    match event {
        ScanEvent::TypeOpened(name) => structure.open_type(&name),
        ScanEvent::Member { owner, name } => structure.add_member(&owner, name),
        ScanEvent::Function(name) => structure.functions.push(name),
        ScanEvent::Constant(name) => structure.constants.push(name),
    }
}

impl LanguageStrategy for PatternGrammar {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract_structure(&self, source: &str) -> Result<FileStructure> {
        if self.type_decl.is_none() && self.function.is_none() && self.constant.is_none() {
            return Ok(FileStructure::default());
        }
        Ok(self.scan(source.lines()))
    }

    fn extract_doc(&self, source: &str) -> String {
        match self.doc {
            DocStyle::None => String::new(),
            DocStyle::CStyle => collect_comments(&C_STYLE_COMMENT, source, |_| true),
            DocStyle::Hash => collect_comments(&HASH_COMMENT, source, |text| !text.starts_with('!')),
        }
    }

    fn extract_imports(&self, source: &str) -> Vec<String> {
        match self.import {
            Some(rule) => source.lines().filter_map(|line| rule.find(line)).collect(),
            None => Vec::new(),
        }
    }
}

/// Joins every matching comment in the file, not only the leading block.
fn collect_comments(pattern: &Regex, source: &str, keep: impl Fn(&str) -> bool) -> String {
    pattern
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim())
        .filter(|text| !text.is_empty() && keep(text))
        .collect::<Vec<_>>()
        .join(" ")
}
