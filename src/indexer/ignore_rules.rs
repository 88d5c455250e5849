use std::fs;
use std::path::{Component, Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::config::{repo_name, MAP_FILE_SUFFIX};

pub const GITIGNORE_FILE: &str = ".gitignore";

/// Artifacts the mapper writes into the analyzed root, plus version control
/// metadata. Applied even when the repository has no `.gitignore`.
pub const BUILTIN_PATTERNS: &[&str] = &[
    ".git/",
    ".repo_map_structure.json",
    ".repo-map-cache.db",
    ".repo-map-cache.db-wal",
    ".repo-map-cache.db-shm",
    "*.pkl",
];

struct ScopedMatcher {
    root: PathBuf,
    gitignore: Gitignore,
}

/// Layered gitignore matcher. Each `.gitignore` is scoped to the directory it
/// lives in; deeper files are consulted after shallower ones.
pub struct IgnoreMatcher {
    scopes: Vec<ScopedMatcher>,
}

impl IgnoreMatcher {
    /// Built-in patterns plus the rendered map of this root
    pub fn new(root: &Path) -> Self {
        Self::with_artifacts(root, &[])
    }

    /// Like [`IgnoreMatcher::new`], plus an anchored literal rule for every
    /// artifact path that lies under `root`. Paths outside it are dropped.
    pub fn with_artifacts(root: &Path, artifacts: &[PathBuf]) -> Self {
        let mut patterns: Vec<String> = BUILTIN_PATTERNS.iter().map(|p| p.to_string()).collect();
        patterns.push(format!(
            "/{}{}",
            escape_glob(&repo_name(root)),
            MAP_FILE_SUFFIX
        ));
        patterns.extend(artifacts.iter().filter_map(|path| anchored_literal(root, path)));
        Self::from_patterns(root, &patterns)
    }

    /// Single-scope matcher rooted at `root` built from exactly `patterns`
    pub fn from_patterns<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            if let Err(e) = builder.add_line(None, pattern.as_ref()) {
                tracing::warn!("Invalid ignore pattern {:?}: {}", pattern.as_ref(), e);
            }
        }

        let mut matcher = Self { scopes: Vec::new() };
        matcher.push_scope(root, builder);
        matcher
    }

    /// Loads `dir/.gitignore` when present. Malformed lines are skipped.
    pub fn add_gitignore(&mut self, dir: &Path) -> bool {
        let file = dir.join(GITIGNORE_FILE);
        if !file.is_file() {
            return false;
        }

        let mut builder = GitignoreBuilder::new(dir);
        if let Some(e) = builder.add(&file) {
            tracing::warn!("Problem reading {}: {}", file.display(), e);
        }
        self.push_scope(dir, builder);
        true
    }

    fn push_scope(&mut self, root: &Path, builder: GitignoreBuilder) {
        let gitignore = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Cannot build ignore rules for {}: {}", root.display(), e);
            Gitignore::empty()
        });
        self.scopes.push(ScopedMatcher {
            root: root.to_path_buf(),
            gitignore,
        });
    }

    /// True when the last decisive rule for `path` is an ignore rule
    pub fn matches(&self, path: &Path, is_dir: bool) -> bool {
        let mut ignored = false;

        for scope in self.scopes_for(path) {
            let matched = scope.gitignore.matched(path, is_dir);
            if matched.is_ignore() {
                ignored = true;
            } else if matched.is_whitelist() {
                ignored = false;
            }
        }

        ignored
    }

    /// Scopes are pushed in traversal order, so ancestors come before
    /// descendants; sorting by depth keeps that order stable for siblings.
    fn scopes_for<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a ScopedMatcher> + 'a {
        let mut applicable: Vec<&ScopedMatcher> = self
            .scopes
            .iter()
            .filter(|scope| path.starts_with(&scope.root) && path != scope.root)
            .collect();
        applicable.sort_by_key(|scope| scope.root.components().count());
        applicable.into_iter()
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

/// `/<escaped relative path>` for a path under `root`. The parent is
/// canonicalized so a path spelled through `..` or a symlink still matches.
fn anchored_literal(root: &Path, path: &Path) -> Option<String> {
    let name = path.file_name()?;
    let relative = match path.parent().and_then(|parent| fs::canonicalize(parent).ok()) {
        Some(parent) => parent.strip_prefix(root).ok()?.join(name),
        None => path.strip_prefix(root).ok()?.to_path_buf(),
    };

    let parts = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => Some(escape_glob(&part.to_string_lossy())),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    if parts.is_empty() {
        return None;
    }
    Some(format!("/{}", parts.join("/")))
}

fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\' | '!' | '#') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_patterns() {
        let root = Path::new("/repo");
        let matcher = IgnoreMatcher::new(root);

        assert!(matcher.matches(&root.join(".git"), true));
        assert!(matcher.matches(&root.join(".repo_map_structure.json"), false));
        assert!(matcher.matches(&root.join(".repo-map-cache.db"), false));
        assert!(matcher.matches(&root.join(".repo-map-cache.db-wal"), false));
        assert!(matcher.matches(&root.join("models/weights.pkl"), false));
        assert!(matcher.matches(&root.join("repo_repo_map.md"), false));
        assert!(!matcher.matches(&root.join("docs/repo_repo_map.md"), false));
        assert!(!matcher.matches(&root.join("src/main.py"), false));
        assert!(!matcher.matches(&root.join(".gitignore"), false));
    }

    #[test]
    fn test_directory_only_pattern() {
        let root = Path::new("/repo");
        let matcher = IgnoreMatcher::from_patterns(root, &["build/"]);

        assert!(matcher.matches(&root.join("build"), true));
        assert!(matcher.matches(&root.join("nested/build"), true));
        assert!(!matcher.matches(&root.join("build"), false));
    }

    #[test]
    fn test_anchored_pattern() {
        let root = Path::new("/repo");
        let matcher = IgnoreMatcher::from_patterns(root, &["/dist", "docs/*.html"]);

        assert!(matcher.matches(&root.join("dist"), true));
        assert!(!matcher.matches(&root.join("pkg/dist"), true));
        assert!(matcher.matches(&root.join("docs/index.html"), false));
        assert!(!matcher.matches(&root.join("other/docs/index.html"), false));
    }

    #[test]
    fn test_negation_within_one_file() {
        let root = Path::new("/repo");
        let matcher = IgnoreMatcher::from_patterns(root, &["*.log", "!keep.log"]);

        assert!(matcher.matches(&root.join("debug.log"), false));
        assert!(!matcher.matches(&root.join("keep.log"), false));
    }

    #[test]
    fn test_nested_gitignore_is_scoped_to_its_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let sub = root.join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(GITIGNORE_FILE), "*.tmp\n").unwrap();

        let mut matcher = IgnoreMatcher::new(root);
        assert!(!matcher.add_gitignore(root));
        assert!(matcher.add_gitignore(&sub));
        assert_eq!(matcher.scope_count(), 2);

        assert!(matcher.matches(&sub.join("a.tmp"), false));
        assert!(!matcher.matches(&root.join("a.tmp"), false));
    }

    #[test]
    fn test_deeper_negation_wins() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let sub = root.join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(root.join(GITIGNORE_FILE), "*.gen\n").unwrap();
        fs::write(sub.join(GITIGNORE_FILE), "!keep.gen\n").unwrap();

        let mut matcher = IgnoreMatcher::new(root);
        matcher.add_gitignore(root);
        matcher.add_gitignore(&sub);

        assert!(matcher.matches(&root.join("x.gen"), false));
        assert!(matcher.matches(&sub.join("x.gen"), false));
        assert!(!matcher.matches(&sub.join("keep.gen"), false));
    }

    #[test]
    fn test_map_name_with_glob_characters_is_literal() {
        let root = Path::new("/work/[draft]");
        let matcher = IgnoreMatcher::new(root);

        assert!(matcher.matches(&root.join("[draft]_repo_map.md"), false));
        assert!(!matcher.matches(&root.join("d_repo_map.md"), false));
    }

    #[test]
    fn test_artifacts_under_root_are_ignored_literally() {
        let temp = TempDir::new().unwrap();
        let root = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir_all(root.join("state")).unwrap();
        let artifacts = vec![
            root.join("custom.db"),
            root.join("custom.db-wal"),
            root.join("state").join("run[1].json"),
            root.join("state").join("..").join("spelled.db"),
        ];

        let matcher = IgnoreMatcher::with_artifacts(&root, &artifacts);

        assert!(matcher.matches(&root.join("custom.db"), false));
        assert!(matcher.matches(&root.join("custom.db-wal"), false));
        assert!(matcher.matches(&root.join("state/run[1].json"), false));
        assert!(matcher.matches(&root.join("spelled.db"), false));
        assert!(!matcher.matches(&root.join("state/custom.db"), false));
        assert!(!matcher.matches(&root.join("state/run1.json"), false));
        assert!(!matcher.matches(&root.join("custom.db-shm"), false));
    }

    #[test]
    fn test_artifacts_outside_root_add_no_rules() {
        let repo = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let root = fs::canonicalize(repo.path()).unwrap();
        let outside = fs::canonicalize(elsewhere.path()).unwrap().join("cache.db");

        assert_eq!(anchored_literal(&root, &outside), None);
        let matcher = IgnoreMatcher::with_artifacts(&root, &[outside]);
        assert!(!matcher.matches(&root.join("cache.db"), false));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let root = Path::new("/repo");
        let matcher = IgnoreMatcher::from_patterns(root, &["# comment", "", "secret.txt"]);

        assert!(matcher.matches(&root.join("secret.txt"), false));
        assert!(!matcher.matches(&root.join("# comment"), false));
    }
}
