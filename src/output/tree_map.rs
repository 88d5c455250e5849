use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::index::FileRecord;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const BLANK: &str = "    ";
const FOOTER: &str = "└────────────── ";

/// Renders the record list as an indented tree inside a markdown code fence
pub fn render_tree_map(records: &[FileRecord], repo_name: &str) -> String {
    let mut out = String::new();
    out.push_str("# Repository Map\n\n");
    out.push_str("```markdown\n");
    let _ = writeln!(out, "/ ({})", repo_name);

    for (i, record) in records.iter().enumerate() {
        let is_last = i + 1 == records.len();
        render_record(&mut out, record, is_last);
    }

    let _ = writeln!(out, "{}", FOOTER);
    out.push_str("```\n");
    out
}

fn render_record(out: &mut String, record: &FileRecord, is_last: bool) {
    let prefix = PIPE.repeat(record.depth);
    let connector = if is_last { LAST_BRANCH } else { BRANCH };

    if record.is_directory() {
        let _ = writeln!(out, "{}{}{}/", prefix, connector, record.name);
        return;
    }

    let language = record.language.as_deref().unwrap_or("None");
    let _ = writeln!(out, "{}{}{} ({})", prefix, connector, record.name, language);

    let detail = format!("{}{}{}", prefix, if is_last { BLANK } else { PIPE }, BRANCH);
    if let Some(description) = record.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "{}Description: {}", detail, description);
    }
    if let Some(consideration) = record.enrichment.as_deref().filter(|c| !c.is_empty()) {
        let _ = writeln!(out, "{}Developer Consideration: \"{}\"", detail, consideration);
    }
    if !record.imports_or_empty().is_empty() {
        let _ = writeln!(out, "{}Imports: {}", detail, format_list(record.imports_or_empty()));
    }
    if !record.functions_or_empty().is_empty() {
        let _ = writeln!(out, "{}Functions: {}", detail, format_list(record.functions_or_empty()));
    }
}

/// `['a', 'b']`
fn format_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("'{}'", item)).collect();
    format!("[{}]", quoted.join(", "))
}

pub fn save_tree_map(records: &[FileRecord], repo_name: &str, path: &Path) -> Result<()> {
    fs::write(path, render_tree_map(records, repo_name))?;
    tracing::info!("Repository map saved to {}", path.display());
    Ok(())
}
