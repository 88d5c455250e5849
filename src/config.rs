use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CACHE_FILE: &str = ".repo-map-cache.db";
/// SQLite keeps these next to a WAL-mode database
pub const CACHE_SIDE_FILE_SUFFIXES: &[&str] = &["-wal", "-shm"];
pub const SNAPSHOT_FILE: &str = ".repo_map_structure.json";
pub const MAP_FILE_SUFFIX: &str = "_repo_map.md";

pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1";

/// Checked in order; the first non-empty value wins
pub const API_KEY_ENV_VARS: &[&str] = &["REPO_MAP_API_KEY", "OPENROUTER_API_KEY"];

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait before the second attempt; doubles after each failure
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay after the `failed`-th consecutive failure (1-based)
    pub fn backoff_after(&self, failed: u32) -> Duration {
        let mut backoff = self.initial_backoff;
        for _ in 1..failed {
            backoff = (backoff * 2).min(self.max_backoff);
        }
        backoff.min(self.max_backoff)
    }

    pub fn no_wait(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }
}

/// Runtime configuration for one mapping run
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub cache_file: PathBuf,
    pub snapshot_file: String,
    pub map_file_suffix: String,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub retry: RetryPolicy,
    pub timeout: Duration,
    pub enrich: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            cache_file: PathBuf::from(CACHE_FILE),
            snapshot_file: SNAPSHOT_FILE.to_string(),
            map_file_suffix: MAP_FILE_SUFFIX.to_string(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(60),
            enrich: true,
        }
    }
}

impl MapConfig {
    /// Relative cache paths are resolved against the analyzed root
    pub fn cache_path(&self, root: &Path) -> PathBuf {
        if self.cache_file.is_absolute() {
            self.cache_file.clone()
        } else {
            root.join(&self.cache_file)
        }
    }

    pub fn snapshot_path(&self, root: &Path) -> PathBuf {
        root.join(&self.snapshot_file)
    }

    /// `<root dir name><suffix>` inside the root
    pub fn map_path(&self, root: &Path) -> PathBuf {
        root.join(format!("{}{}", repo_name(root), self.map_file_suffix))
    }

    /// Every file a run writes for `root`: the cache with its WAL side files,
    /// the snapshot and the map.
    pub fn artifact_paths(&self, root: &Path) -> Vec<PathBuf> {
        let cache = self.cache_path(root);
        let mut paths = vec![cache.clone()];
        for suffix in CACHE_SIDE_FILE_SUFFIXES {
            let mut side = cache.clone().into_os_string();
            side.push(suffix);
            paths.push(PathBuf::from(side));
        }
        paths.push(self.snapshot_path(root));
        paths.push(self.map_path(root));
        paths
    }

    /// Enrichment needs both the switch and a key
    pub fn enrichment_enabled(&self) -> bool {
        self.enrich && self.api_key.is_some()
    }
}

pub fn repo_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string())
}

pub fn resolve_api_key() -> Option<String> {
    resolve_api_key_with(|name| std::env::var(name).ok())
}

pub fn resolve_api_key_with(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_ENV_VARS.iter().find_map(|name| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 6,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
        };
        assert_eq!(policy.backoff_after(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_after(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_after(3), Duration::from_millis(350));
        assert_eq!(policy.backoff_after(10), Duration::from_millis(350));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert!(policy.initial_backoff <= policy.max_backoff);
    }

    #[test]
    fn test_paths_are_inside_root() {
        let config = MapConfig::default();
        let root = Path::new("/work/shop");

        assert_eq!(config.cache_path(root), PathBuf::from("/work/shop/.repo-map-cache.db"));
        assert_eq!(
            config.snapshot_path(root),
            PathBuf::from("/work/shop/.repo_map_structure.json")
        );
        assert_eq!(config.map_path(root), PathBuf::from("/work/shop/shop_repo_map.md"));
    }

    #[test]
    fn test_absolute_cache_override() {
        let config = MapConfig {
            cache_file: PathBuf::from("/tmp/elsewhere.db"),
            ..MapConfig::default()
        };
        assert_eq!(
            config.cache_path(Path::new("/work/shop")),
            PathBuf::from("/tmp/elsewhere.db")
        );
    }

    #[test]
    fn test_artifact_paths_follow_cache_override() {
        let config = MapConfig {
            cache_file: PathBuf::from("state/custom.db"),
            ..MapConfig::default()
        };
        let root = Path::new("/work/shop");

        assert_eq!(
            config.artifact_paths(root),
            vec![
                PathBuf::from("/work/shop/state/custom.db"),
                PathBuf::from("/work/shop/state/custom.db-wal"),
                PathBuf::from("/work/shop/state/custom.db-shm"),
                PathBuf::from("/work/shop/.repo_map_structure.json"),
                PathBuf::from("/work/shop/shop_repo_map.md"),
            ]
        );
    }

    #[test]
    fn test_api_key_precedence() {
        let env: HashMap<&str, &str> =
            [("REPO_MAP_API_KEY", "primary"), ("OPENROUTER_API_KEY", "fallback")].into();
        let key = resolve_api_key_with(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(key.as_deref(), Some("primary"));

        let env: HashMap<&str, &str> =
            [("REPO_MAP_API_KEY", "  "), ("OPENROUTER_API_KEY", "fallback")].into();
        let key = resolve_api_key_with(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(key.as_deref(), Some("fallback"));

        assert!(resolve_api_key_with(|_| None).is_none());
    }

    #[test]
    fn test_enrichment_enabled() {
        let mut config = MapConfig::default();
        assert!(!config.enrichment_enabled());
        config.api_key = Some("k".to_string());
        assert!(config.enrichment_enabled());
        config.enrich = false;
        assert!(!config.enrichment_enabled());
    }
}
