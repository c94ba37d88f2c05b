//! Axum route handlers for the Jobs API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::jobs::pipeline::{
    classify_listings, run_pipeline, score_listings, ClassificationReport, PipelineOptions,
    PipelineReport,
};
use crate::judge::{HttpJudge, Judge, ProviderConfig};
use crate::models::{Criteria, Listing, ScoredListing};
use crate::state::AppState;

/// Upper bound on listings per request.
pub const MAX_LISTINGS: usize = 500;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub criteria: Criteria,
    /// Overrides the server's default provider for this call.
    #[serde(default)]
    pub provider: Option<ProviderConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub listings: Vec<ScoredListing>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiringFilterRequest {
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub provider: Option<ProviderConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub criteria: Criteria,
    #[serde(flatten)]
    pub options: PipelineOptions,
    #[serde(default)]
    pub provider: Option<ProviderConfig>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/analyze
///
/// Scores every listing against the criteria and returns them annotated, in order.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    check_batch(&request.listings)?;
    let judge = state.judge_for(request.provider.as_ref())?;

    let (listings, warnings) = score_listings(
        request.listings,
        &request.criteria,
        as_judge(&judge),
        state.config.batch,
    )
    .await;

    Ok(Json(AnalyzeResponse { listings, warnings }))
}

/// POST /api/v1/jobs/hiring-filter
///
/// Returns only the listings that look like active hiring posts.
pub async fn handle_hiring_filter(
    State(state): State<AppState>,
    Json(request): Json<HiringFilterRequest>,
) -> Result<Json<ClassificationReport>, AppError> {
    check_batch(&request.listings)?;
    let judge = state.judge_for(request.provider.as_ref())?;

    let mut report =
        classify_listings(request.listings, as_judge(&judge), state.config.batch).await;
    report.listings.retain(|l| l.is_hiring_post);
    info!(
        "Hiring filter kept {}/{} listing(s)",
        report.hiring_posts, report.total
    );

    Ok(Json(report))
}

/// POST /api/v1/jobs/filter
///
/// Full pipeline: optional hiring pre-filter → scoring → structured filters.
pub async fn handle_filter(
    State(state): State<AppState>,
    Json(request): Json<FilterRequest>,
) -> Result<Json<PipelineReport>, AppError> {
    check_batch(&request.listings)?;
    let judge = state.judge_for(request.provider.as_ref())?;

    let report = run_pipeline(
        request.listings,
        &request.criteria,
        &request.options,
        as_judge(&judge),
        state.config.batch,
    )
    .await?;

    Ok(Json(report))
}

fn check_batch(listings: &[Listing]) -> Result<(), AppError> {
    if listings.len() > MAX_LISTINGS {
        return Err(AppError::Validation(format!(
            "at most {MAX_LISTINGS} listings per request, got {}",
            listings.len()
        )));
    }
    Ok(())
}

fn as_judge(judge: &Option<HttpJudge>) -> Option<&dyn Judge> {
    judge.as_ref().map(|j| j as &dyn Judge)
}
