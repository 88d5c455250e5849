use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{repo_name, MapConfig};
use crate::enrich::{enrich_records, ChatClientConfig, ChatDescriber, Describer, EnrichStats};
use crate::error::{MapperError, Result};
use crate::index::{FileRecord, SqliteCache};
use crate::indexer::{RepoWalker, WalkStats};
use crate::languages::LanguageRegistry;
use crate::output::{save_snapshot, save_tree_map};

/// Result of one end-to-end run
#[derive(Debug, Clone)]
pub struct MapRun {
    pub root: PathBuf,
    pub records: Vec<FileRecord>,
    pub walk: WalkStats,
    pub enrich: Option<EnrichStats>,
    pub snapshot_path: PathBuf,
    pub map_path: PathBuf,
}

/// The root must exist and be a directory; it is returned in canonical form
pub fn validate_root(root: &Path) -> Result<PathBuf> {
    let canonical = fs::canonicalize(root)
        .map_err(|e| MapperError::InvalidRoot(format!("{}: {}", root.display(), e)))?;
    if !canonical.is_dir() {
        return Err(MapperError::InvalidRoot(format!(
            "{} is not a valid directory",
            root.display()
        )));
    }
    Ok(canonical)
}

/// Runs the pipeline, enriching through the configured chat endpoint when a key is present
pub async fn run(root: &Path, config: &MapConfig) -> Result<MapRun> {
    if !config.enrich {
        return run_with(root, config, None::<&ChatDescriber>).await;
    }
    if config.api_key.is_none() {
        tracing::info!("No API key found; skipping enrichment");
        return run_with(root, config, None::<&ChatDescriber>).await;
    }

    let describer = ChatDescriber::new(ChatClientConfig::from(config))?;
    run_with(root, config, Some(&describer)).await
}

/// Cache, walk, snapshot, optional enrichment, tree map. Output files that
/// cannot be written are logged; only an invalid root or an unusable cache
/// fails the run.
pub async fn run_with<D: Describer>(
    root: &Path,
    config: &MapConfig,
    describer: Option<&D>,
) -> Result<MapRun> {
    let root = validate_root(root)?;

    let cache_path = config.cache_path(&root);
    let cache = SqliteCache::open(&cache_path).map_err(|e| {
        MapperError::Cache(format!("cannot open {}: {}", cache_path.display(), e))
    })?;

    match cache.len() {
        Ok(rows) => tracing::debug!("Cache {} holds {} entries", cache_path.display(), rows),
        Err(e) => tracing::warn!("Cannot count cache entries: {}", e),
    }

    tracing::info!("Generating repository summary for {}", root.display());
    let walker = RepoWalker::new(LanguageRegistry::new(), &cache)
        .with_artifacts(config.artifact_paths(&root));
    let output = walker.walk(&root)?;

    let snapshot_path = config.snapshot_path(&root);
    if let Err(e) = save_snapshot(&output.records, &snapshot_path) {
        tracing::error!("Error saving {}: {}", snapshot_path.display(), e);
    }

    let (records, enrich) = match describer {
        Some(describer) => {
            let result =
                enrich_records(output.records, &cache, describer, &config.model, &config.retry)
                    .await;
            (result.records, Some(result.stats))
        }
        None => (output.records, None),
    };

    let map_path = config.map_path(&root);
    if let Err(e) = save_tree_map(&records, &repo_name(&root), &map_path) {
        tracing::error!("Error saving repository map: {}", e);
    }

    Ok(MapRun {
        root,
        records,
        walk: output.stats,
        enrich,
        snapshot_path,
        map_path,
    })
}
