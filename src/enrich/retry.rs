use super::client::Describer;
use super::response::{parse_response, Enrichment};
use super::summary::FileSummary;
use crate::config::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Enriched(Enrichment),
    Skipped { attempts: u32, reason: String },
}

/// Calls the describer until it succeeds or the policy runs out of attempts.
/// Transport errors, non-success statuses and malformed bodies all count as
/// failed attempts.
pub async fn describe_with_retry<D: Describer>(
    describer: &D,
    summary: &FileSummary,
    model: &str,
    policy: &RetryPolicy,
) -> EnrichmentOutcome {
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            let backoff = policy.backoff_after(attempt - 1);
            tracing::debug!(
                "enrich: retry {}/{} for {} after {:?}",
                attempt,
                max_attempts,
                summary.name,
                backoff
            );
            tokio::time::sleep(backoff).await;
        }

        match describer.describe(summary, model).await {
            Ok(text) => return EnrichmentOutcome::Enriched(parse_response(&text)),
            Err(e) => {
                tracing::debug!("enrich: attempt {} for {} failed: {}", attempt, summary.name, e);
                last_error = e.to_string();
            }
        }
    }

    EnrichmentOutcome::Skipped {
        attempts: max_attempts,
        reason: last_error,
    }
}
