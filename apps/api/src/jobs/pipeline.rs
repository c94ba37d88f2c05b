//! Listing pipeline: orchestrates classification, scoring and filtering.
//!
//! Flow: build filters → (optional) hiring pre-filter → score (judge with
//!       heuristic fallback, or heuristic only) → annotate → structured filters.
//!
//! Judge failures never abort the pipeline; they come back as `warnings`.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::filters::{FilterError, FilterSet, ListingFilter};
use crate::judge::{classify_with_fallback, score_with_fallback, BatchSettings, Judge};
use crate::models::{ClassifiedListing, Criteria, Listing, ScoreSource, ScoredListing};
use crate::scoring::{classify_listing, score_listing};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOptions {
    /// Drop listings that do not look like active hiring posts before scoring.
    #[serde(default)]
    pub hiring_only: bool,
    #[serde(default)]
    pub filters: ListingFilter,
}

/// Annotated listings plus any judge failures that forced a fallback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub listings: Vec<ScoredListing>,
    pub total: usize,
    pub kept: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationReport {
    pub listings: Vec<ClassifiedListing>,
    pub total: usize,
    pub hiring_posts: usize,
    pub warnings: Vec<String>,
}

/// Scores every listing, in order. Uses the judge when one is given.
pub async fn score_listings(
    listings: Vec<Listing>,
    criteria: &Criteria,
    judge: Option<&dyn Judge>,
    settings: BatchSettings,
) -> (Vec<ScoredListing>, Vec<String>) {
    let (results, warnings) = match judge {
        Some(judge) => {
            let batch = score_with_fallback(judge, &listings, criteria, settings).await;
            (batch.results, batch.warnings)
        }
        None => (
            listings
                .iter()
                .map(|l| (score_listing(l, criteria), ScoreSource::Heuristic))
                .collect(),
            Vec::new(),
        ),
    };

    let scored = listings
        .into_iter()
        .zip(results)
        .map(|(listing, (result, source))| ScoredListing::new(listing, result, source))
        .collect();

    (scored, warnings)
}

/// Flags every listing as hiring post or not, in order.
pub async fn classify_listings(
    listings: Vec<Listing>,
    judge: Option<&dyn Judge>,
    settings: BatchSettings,
) -> ClassificationReport {
    let (results, warnings) = match judge {
        Some(judge) => {
            let batch = classify_with_fallback(judge, &listings, settings).await;
            (batch.results, batch.warnings)
        }
        None => (
            listings
                .iter()
                .map(|l| (classify_listing(l), ScoreSource::Heuristic))
                .collect(),
            Vec::new(),
        ),
    };

    let total = listings.len();
    let listings: Vec<ClassifiedListing> = listings
        .into_iter()
        .zip(results)
        .map(|(listing, (result, source))| ClassifiedListing::new(listing, result, source))
        .collect();
    let hiring_posts = listings.iter().filter(|l| l.is_hiring_post).count();

    ClassificationReport {
        listings,
        total,
        hiring_posts,
        warnings,
    }
}

/// Runs the full pipeline. Only invalid filter options are an error; an empty
/// result is a valid outcome.
pub async fn run_pipeline(
    listings: Vec<Listing>,
    criteria: &Criteria,
    options: &PipelineOptions,
    judge: Option<&dyn Judge>,
    settings: BatchSettings,
) -> Result<PipelineReport, FilterError> {
    let filters = FilterSet::new(&options.filters, criteria)?;
    let total = listings.len();
    let mut warnings = Vec::new();

    let (candidates, hiring_flags) = if options.hiring_only {
        let report = classify_listings(listings, judge, settings).await;
        warnings.extend(report.warnings);
        let hiring: Vec<ClassifiedListing> = report
            .listings
            .into_iter()
            .filter(|l| l.is_hiring_post)
            .collect();
        info!("Hiring pre-filter kept {}/{total} listing(s)", hiring.len());
        let flags = vec![true; hiring.len()];
        (hiring.into_iter().map(|l| l.listing).collect(), Some(flags))
    } else {
        (listings, None)
    };

    let (mut scored, score_warnings) = score_listings(candidates, criteria, judge, settings).await;
    warnings.extend(score_warnings);

    if let Some(flags) = hiring_flags {
        for (listing, flag) in scored.iter_mut().zip(flags) {
            listing.is_hiring_post = Some(flag);
        }
    }

    let listings = filters.apply(scored);
    info!(
        "Pipeline kept {}/{total} listing(s) ({} warning(s))",
        listings.len(),
        warnings.len()
    );

    Ok(PipelineReport {
        kept: listings.len(),
        listings,
        total,
        warnings,
    })
}
