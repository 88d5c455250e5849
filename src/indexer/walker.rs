use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MapperError, Result};
use crate::index::{CacheEntry, FileRecord, SqliteCache};
use crate::indexer::hasher::{hash_bytes, hash_file, UNHASHABLE};
use crate::indexer::ignore_rules::IgnoreMatcher;
use crate::languages::{FileAnalysis, LanguageRegistry, LanguageStrategy};

/// Counters for one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub directories: usize,
    pub files: usize,
    /// Files loaded whole for extraction
    pub sources_read: usize,
    pub cache_hits: usize,
    pub extractions: usize,
    pub parse_failures: usize,
    pub unreadable: usize,
    pub cache_writes: usize,
    pub cache_write_failures: usize,
}

#[derive(Debug, Clone)]
pub struct WalkOutput {
    pub records: Vec<FileRecord>,
    pub stats: WalkStats,
}

/// Depth-first traversal that turns a directory tree into a flat, ordered
/// record list, consulting the cache before running any extractor.
pub struct RepoWalker<'c> {
    registry: LanguageRegistry,
    cache: &'c SqliteCache,
    artifacts: Vec<PathBuf>,
}

struct Listing {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl<'c> RepoWalker<'c> {
    pub fn new(registry: LanguageRegistry, cache: &'c SqliteCache) -> Self {
        Self {
            registry,
            cache,
            artifacts: Vec::new(),
        }
    }

    /// Files this run writes itself. Any of them under the root is skipped.
    pub fn with_artifacts(mut self, artifacts: Vec<PathBuf>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn walk(&self, root: &Path) -> Result<WalkOutput> {
        let root = fs::canonicalize(root)
            .map_err(|e| MapperError::InvalidRoot(format!("{}: {}", root.display(), e)))?;
        if !root.is_dir() {
            return Err(MapperError::InvalidRoot(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        fs::read_dir(&root)
            .map_err(|e| MapperError::InvalidRoot(format!("{}: {}", root.display(), e)))?;

        let mut matcher = IgnoreMatcher::with_artifacts(&root, &self.artifacts);
        tracing::debug!(
            "Extracting structure for: {}",
            self.registry.extracting_languages().join(", ")
        );
        let mut records = Vec::new();
        let mut stats = WalkStats::default();

        self.visit_dir(&root, 0, &mut matcher, &mut records, &mut stats);

        tracing::info!(
            "Walked {}: {} directories, {} files ({} cached, {} extracted, {} parse failures, {} unreadable)",
            root.display(),
            stats.directories,
            stats.files,
            stats.cache_hits,
            stats.extractions,
            stats.parse_failures,
            stats.unreadable
        );

        Ok(WalkOutput { records, stats })
    }

    fn visit_dir(
        &self,
        dir: &Path,
        depth: usize,
        matcher: &mut IgnoreMatcher,
        records: &mut Vec<FileRecord>,
        stats: &mut WalkStats,
    ) {
        matcher.add_gitignore(dir);

        let Some(listing) = list_dir(dir, matcher, stats) else {
            return;
        };

        for file in &listing.files {
            stats.files += 1;
            records.push(self.process_file(file, depth, stats));
        }

        for sub in &listing.dirs {
            stats.directories += 1;
            records.push(FileRecord::directory(sub, depth));
            self.visit_dir(sub, depth + 1, matcher, records, stats);
        }
    }

    fn process_file(&self, path: &Path, depth: usize, stats: &mut WalkStats) -> FileRecord {
        let language = self.registry.classify_path(path);
        let mut record = FileRecord::file(path, depth, language);
        let Some(language) = language else {
            return record;
        };

        // Only files with an extractor are loaded whole, and their hash is
        // taken from the same bytes the extractor sees.
        let strategy = self.registry.strategy_for(language);
        let (hash, source) = match strategy {
            Some(_) => match fs::read(path) {
                Ok(bytes) => {
                    stats.sources_read += 1;
                    (hash_bytes(&bytes), Some(bytes))
                }
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                    stats.unreadable += 1;
                    return record;
                }
            },
            None => (hash_file(path), None),
        };
        if hash == UNHASHABLE {
            stats.unreadable += 1;
            return record;
        }

        match self.cache.lookup(&record.path) {
            Ok(Some(entry)) if entry.is_fresh_for(&hash) => {
                tracing::debug!("Cache hit: {}", record.path);
                record.content_hash = Some(hash);
                record.apply_cache_entry(&entry);
                stats.cache_hits += 1;
                return record;
            }
            Ok(Some(_)) => tracing::debug!("Cache stale: {}", record.path),
            Ok(None) => tracing::debug!("Cache miss: {}", record.path),
            Err(e) => tracing::warn!("Cache lookup failed for {}: {}", record.path, e),
        }
        record.content_hash = Some(hash);

        // Languages without a strategy still get (empty) structural fields
        let analysis = match (strategy, source) {
            (Some(strategy), Some(bytes)) => {
                analyze(strategy.as_ref(), &String::from_utf8_lossy(&bytes), path, stats)
            }
            _ => FileAnalysis::default(),
        };
        stats.extractions += 1;
        record.apply_extraction(analysis.structure, analysis.description, analysis.imports);

        if let Some(entry) = CacheEntry::from_record(&record) {
            match self.cache.upsert(&entry) {
                Ok(()) => stats.cache_writes += 1,
                Err(e) => {
                    tracing::warn!("Cache write failed for {}: {}", record.path, e);
                    stats.cache_write_failures += 1;
                }
            }
        }

        record
    }
}

fn analyze(
    strategy: &dyn LanguageStrategy,
    source: &str,
    path: &Path,
    stats: &mut WalkStats,
) -> FileAnalysis {
    match strategy.analyze(source) {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            stats.parse_failures += 1;
            FileAnalysis::default()
        }
    }
}

/// Splits a directory into sorted, non-ignored files and subdirectories.
/// Symlinked directories are not followed.
fn list_dir(dir: &Path, matcher: &IgnoreMatcher, stats: &mut WalkStats) -> Option<Listing> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot list {}: {}", dir.display(), e);
            stats.unreadable += 1;
            return None;
        }
    };

    let mut listing = Listing {
        files: Vec::new(),
        dirs: Vec::new(),
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Unreadable entry in {}: {}", dir.display(), e);
                stats.unreadable += 1;
                continue;
            }
        };
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                tracing::warn!("Cannot stat {}: {}", entry.path().display(), e);
                stats.unreadable += 1;
                continue;
            }
        };

        let path = entry.path();
        let is_dir = if file_type.is_symlink() {
            if path.is_dir() {
                tracing::debug!("Skipping symlinked directory {}", path.display());
                continue;
            }
            false
        } else {
            file_type.is_dir()
        };

        if matcher.matches(&path, is_dir) {
            tracing::debug!("Ignored: {}", path.display());
            continue;
        }

        if is_dir {
            listing.dirs.push(path);
        } else {
            listing.files.push(path);
        }
    }

    listing.files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    listing.dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Some(listing)
}
