use once_cell::sync::Lazy;
use regex::Regex;

static DESCRIPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"Description:\s*(.*)").unwrap());
static CONSIDERATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"Developer Consideration:\s*"(.*?)""#).unwrap());

/// Fields recovered from one completion. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub description: Option<String>,
    pub consideration: Option<String>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.consideration.is_none()
    }
}

/// The two markers are located independently; the description runs to the
/// end of its line and the consideration is the first quoted span.
pub fn parse_response(text: &str) -> Enrichment {
    let capture = |re: &Regex| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    };

    Enrichment {
        description: capture(&DESCRIPTION),
        consideration: capture(&CONSIDERATION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_markers() {
        let text = "Description: Handles checkout.  \nDeveloper Consideration: \"Keep prices in cents.\"\n";
        let parsed = parse_response(text);
        assert_eq!(parsed.description.as_deref(), Some("Handles checkout."));
        assert_eq!(parsed.consideration.as_deref(), Some("Keep prices in cents."));
    }

    #[test]
    fn test_description_only() {
        let parsed = parse_response("Some preamble\nDescription: Parses config files\n");
        assert_eq!(parsed.description.as_deref(), Some("Parses config files"));
        assert!(parsed.consideration.is_none());
    }

    #[test]
    fn test_neither_marker() {
        let parsed = parse_response("I cannot help with that.");
        assert!(parsed.is_empty());
        assert!(parse_response("").is_empty());
    }

    #[test]
    fn test_unquoted_consideration_is_ignored() {
        let parsed = parse_response("Developer Consideration: no quotes here");
        assert!(parsed.consideration.is_none());
    }

    #[test]
    fn test_consideration_stops_at_first_closing_quote() {
        let parsed = parse_response("Developer Consideration: \"first\" and \"second\"");
        assert_eq!(parsed.consideration.as_deref(), Some("first"));
    }

    #[test]
    fn test_markers_in_any_order() {
        let text = "Developer Consideration: \"Watch the locks\"\nDescription: Worker pool";
        let parsed = parse_response(text);
        assert_eq!(parsed.description.as_deref(), Some("Worker pool"));
        assert_eq!(parsed.consideration.as_deref(), Some("Watch the locks"));
    }
}
