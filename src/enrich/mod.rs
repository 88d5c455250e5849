pub mod client;
pub mod response;
pub mod retry;
pub mod summary;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{ChatClientConfig, ChatDescriber, Describer};
pub use response::{parse_response, Enrichment};
pub use retry::{describe_with_retry, EnrichmentOutcome};
pub use summary::FileSummary;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::RetryPolicy;
use crate::index::{CacheEntry, FileRecord, SqliteCache};

/// Fields to overwrite on the record at `index`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentPatch {
    pub index: usize,
    pub description: Option<String>,
    pub enrichment: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    pub eligible: usize,
    pub enriched: usize,
    pub skipped: usize,
    pub cache_writes: usize,
}

#[derive(Debug, Clone)]
pub struct EnrichResult {
    pub records: Vec<FileRecord>,
    pub patches: Vec<EnrichmentPatch>,
    pub stats: EnrichStats,
}

/// Files with a language and a hash that expose something worth describing
/// and were not enriched on an earlier run. A row counts as enriched once a
/// response was recorded for its current hash, even if it carried no
/// consideration.
pub fn is_eligible(record: &FileRecord) -> bool {
    let Some(hash) = record.content_hash.as_deref().filter(|h| !h.is_empty()) else {
        return false;
    };
    record.is_file()
        && record.language.is_some()
        && (!record.imports_or_empty().is_empty() || !record.functions_or_empty().is_empty())
        && record.enrichment.as_deref().map_or(true, str::is_empty)
        && record.enriched_hash.as_deref() != Some(hash)
}

/// Describes eligible records one at a time and persists each result before
/// moving on. Failures are logged and leave the record untouched.
pub async fn enrich_records<D: Describer>(
    records: Vec<FileRecord>,
    cache: &SqliteCache,
    describer: &D,
    model: &str,
    policy: &RetryPolicy,
) -> EnrichResult {
    let eligible: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| is_eligible(record))
        .map(|(index, _)| index)
        .collect();

    let mut stats = EnrichStats {
        eligible: eligible.len(),
        ..EnrichStats::default()
    };
    let mut patches = Vec::new();

    let progress = ProgressBar::new(eligible.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        progress.set_style(style);
    }

    for &index in &eligible {
        let record = &records[index];
        progress.set_message(record.name.clone());
        let summary = FileSummary::from_record(record);

        match describe_with_retry(describer, &summary, model, policy).await {
            EnrichmentOutcome::Enriched(enrichment) => {
                let patch = EnrichmentPatch {
                    index,
                    description: enrichment.description,
                    enrichment: enrichment.consideration,
                };

                let mut patched = record.clone();
                apply_patch(&mut patched, &patch);
                if let Some(entry) = CacheEntry::from_record(&patched) {
                    match cache.upsert(&entry) {
                        Ok(()) => stats.cache_writes += 1,
                        Err(e) => tracing::warn!("Cache write failed for {}: {}", record.path, e),
                    }
                }

                stats.enriched += 1;
                patches.push(patch);
            }
            EnrichmentOutcome::Skipped { attempts, reason } => {
                tracing::warn!(
                    "Skipping enrichment for {} after {} attempts: {}",
                    record.name,
                    attempts,
                    reason
                );
                stats.skipped += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    tracing::info!(
        "Enriched {} of {} eligible files ({} skipped)",
        stats.enriched,
        stats.eligible,
        stats.skipped
    );

    EnrichResult {
        records: apply_patches(records, &patches),
        patches,
        stats,
    }
}

fn apply_patch(record: &mut FileRecord, patch: &EnrichmentPatch) {
    record.enriched_hash = record.content_hash.clone();
    if let Some(description) = &patch.description {
        record.description = Some(description.clone());
    }
    if let Some(enrichment) = &patch.enrichment {
        record.enrichment = Some(enrichment.clone());
    }
}

/// Patches are keyed by position in the input list
pub fn apply_patches(mut records: Vec<FileRecord>, patches: &[EnrichmentPatch]) -> Vec<FileRecord> {
    for patch in patches {
        if let Some(record) = records.get_mut(patch.index) {
            apply_patch(record, patch);
        }
    }
    records
}
