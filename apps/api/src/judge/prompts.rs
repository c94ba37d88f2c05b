// Prompt constants for the external judge.

use serde_json::{json, Value};

use crate::models::{Criteria, Listing};

/// Longest description excerpt sent per listing.
const DESCRIPTION_EXCERPT_CHARS: usize = 1000;

/// System prompt shared by every judge call. Enforces JSON-only output.
pub const JUDGE_SYSTEM: &str = "You are an expert recruiter screening job listings. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Scoring prompt. Replace `{criteria}` and `{listings}` before sending.
pub const SCORE_PROMPT_TEMPLATE: &str = r#"Rate how well each job listing matches the candidate's criteria.

Candidate criteria:
{criteria}

Listings (the "index" field identifies each one):
{listings}

Return a JSON array with one object per listing and this EXACT schema:
[
  {"index": 0, "score": 72, "reasons": ["Title matches the search", "Remote role"]}
]

Rules:
- "score" is an integer from 0 (irrelevant) to 100 (perfect match).
- "reasons" lists short human-readable justifications, most important first.
- Return exactly one object per listing, keeping each listing's "index"."#;

/// Hiring-post classification prompt. Replace `{listings}` before sending.
pub const HIRING_PROMPT_TEMPLATE: &str = r#"Decide whether each post below is an active hiring announcement
(a company or recruiter looking to fill a position right now).

Posts (the "index" field identifies each one):
{listings}

Return a JSON array with one object per post and this EXACT schema:
[
  {"index": 0, "isHiringPost": true}
]"#;

pub fn build_score_prompt(listings: &[Listing], criteria: &Criteria) -> String {
    let criteria = json!({
        "query": criteria.user_query,
        "location": criteria.location,
        "skills": criteria.skills,
        "experience": criteria.experience,
        "minSalary": criteria.min_salary,
        "jobTypes": criteria.job_types,
    });
    SCORE_PROMPT_TEMPLATE
        .replace("{criteria}", &criteria.to_string())
        .replace("{listings}", &listings_payload(listings).to_string())
}

pub fn build_hiring_prompt(listings: &[Listing]) -> String {
    HIRING_PROMPT_TEMPLATE.replace("{listings}", &listings_payload(listings).to_string())
}

fn listings_payload(listings: &[Listing]) -> Value {
    Value::Array(
        listings
            .iter()
            .enumerate()
            .map(|(index, listing)| {
                json!({
                    "index": index,
                    "title": listing.title,
                    "company": listing.company,
                    "location": listing.location,
                    "salary": listing.salary,
                    "type": listing.job_type,
                    "description": excerpt(
                        listing.content().unwrap_or(&listing.description),
                    ),
                })
            })
            .collect(),
    )
}

fn excerpt(text: &str) -> String {
    text.chars().take(DESCRIPTION_EXCERPT_CHARS).collect()
}
