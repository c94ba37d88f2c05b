//! External judge: delegates scoring and hiring classification to a remote
//! text-generation provider, with the heuristic as a per-item fallback.
//!
//! `Judge` implementations return explicit errors; the `*_with_fallback` drivers
//! decide what to do with them (substitute the heuristic, record a warning).
//! Only provider configuration errors are surfaced to callers.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{ClassificationResult, Criteria, Listing, ScoreResult, ScoreSource};
use crate::scoring::{classify_listing, score_listing};

pub mod client;
pub mod prompts;
pub mod provider;

pub use client::HttpJudge;
pub use provider::{ConfigError, ProviderConfig, ProviderKind, ResolvedProvider};

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider returned empty content")]
    EmptyContent,

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Provider unavailable after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

/// A remote judge for listing batches.
///
/// Each returned vector has one slot per input listing, in input order; `None`
/// marks an item the provider did not answer usably.
#[async_trait]
pub trait Judge: Send + Sync {
    fn name(&self) -> &str;

    async fn score_chunk(
        &self,
        listings: &[Listing],
        criteria: &Criteria,
    ) -> Result<Vec<Option<ScoreResult>>, JudgeError>;

    async fn classify_chunk(&self, listings: &[Listing]) -> Result<Vec<Option<bool>>, JudgeError>;
}

/// How listings are batched when sent to a judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub chunk_size: usize,
    /// Pause between consecutive chunks.
    pub chunk_delay: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            chunk_size: 5,
            chunk_delay: Duration::from_millis(500),
        }
    }
}

/// Results in input order plus any failures that forced a heuristic fallback.
#[derive(Debug, Clone)]
pub struct JudgedBatch<T> {
    pub results: Vec<(T, ScoreSource)>,
    pub warnings: Vec<String>,
}

/// Scores every listing through the judge, substituting the heuristic score for
/// any chunk that fails and any item the judge answered unusably.
pub async fn score_with_fallback(
    judge: &dyn Judge,
    listings: &[Listing],
    criteria: &Criteria,
    settings: BatchSettings,
) -> JudgedBatch<ScoreResult> {
    run_chunked(
        judge.name(),
        listings,
        settings,
        |chunk| judge.score_chunk(chunk, criteria),
        |listing| score_listing(listing, criteria),
    )
    .await
}

/// Classifies every listing through the judge, falling back to keyword
/// classification the same way as [`score_with_fallback`].
pub async fn classify_with_fallback(
    judge: &dyn Judge,
    listings: &[Listing],
    settings: BatchSettings,
) -> JudgedBatch<ClassificationResult> {
    let batch = run_chunked(
        judge.name(),
        listings,
        settings,
        |chunk| judge.classify_chunk(chunk),
        |listing| classify_listing(listing).is_hiring_post,
    )
    .await;

    JudgedBatch {
        results: batch
            .results
            .into_iter()
            .map(|(is_hiring_post, source)| (ClassificationResult { is_hiring_post }, source))
            .collect(),
        warnings: batch.warnings,
    }
}

async fn run_chunked<'a, T, F, Fut>(
    judge_name: &str,
    listings: &'a [Listing],
    settings: BatchSettings,
    mut call: F,
    fallback: impl Fn(&Listing) -> T,
) -> JudgedBatch<T>
where
    F: FnMut(&'a [Listing]) -> Fut,
    Fut: Future<Output = Result<Vec<Option<T>>, JudgeError>>,
{
    let mut results = Vec::with_capacity(listings.len());
    let mut warnings = Vec::new();

    for (index, chunk) in listings.chunks(settings.chunk_size.max(1)).enumerate() {
        if index > 0 && !settings.chunk_delay.is_zero() {
            tokio::time::sleep(settings.chunk_delay).await;
        }

        match call(chunk).await {
            Ok(verdicts) => {
                let mut verdicts = verdicts.into_iter();
                let mut recovered = 0usize;
                for listing in chunk {
                    match verdicts.next().flatten() {
                        Some(verdict) => results.push((verdict, ScoreSource::Judge)),
                        None => {
                            recovered += 1;
                            results.push((fallback(listing), ScoreSource::Heuristic));
                        }
                    }
                }
                if recovered > 0 {
                    warnings.push(format!(
                        "chunk {index}: {judge_name} returned {recovered} unusable verdict(s); used heuristic"
                    ));
                }
                debug!(
                    "Judge {judge_name} chunk {index}: {} listing(s), {recovered} recovered locally",
                    chunk.len()
                );
            }
            Err(e) => {
                warn!("Judge {judge_name} chunk {index} failed, using heuristic: {e}");
                warnings.push(format!("chunk {index}: {e}; used heuristic"));
                results.extend(chunk.iter().map(|l| (fallback(l), ScoreSource::Heuristic)));
            }
        }
    }

    info!(
        "Judge {judge_name} processed {} listing(s) with {} warning(s)",
        listings.len(),
        warnings.len()
    );

    JudgedBatch { results, warnings }
}
