use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Keys the service writes onto annotated listings. Stale copies sent back by
/// callers are dropped from `extra` so each key is serialized once.
const DERIVED_FIELDS: &[&str] = &[
    "score",
    "reasons",
    "passes",
    "isHiringPost",
    "scoredBy",
    "classifiedBy",
];

/// A single job posting under evaluation.
///
/// Unknown fields sent by callers (provider- or UI-specific) are kept in `extra`
/// and round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "null_as_empty")]
    pub job_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing {
    /// Free-form post body carried in the extended metadata (social-post style listings).
    pub fn content(&self) -> Option<&str> {
        self.extra.get("content").and_then(Value::as_str)
    }

    /// Drops previously derived annotations carried in `extra`.
    pub fn without_derived(mut self) -> Self {
        for key in DERIVED_FIELDS {
            self.extra.remove(*key);
        }
        self
    }
}

/// Scraped listings often send `null` for text fields; treat it as empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// User preferences a listing is scored against. Every field is optional;
/// an absent (or blank) field means the dimension is not evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Comma-separated skill list, e.g. `"rust, tokio, postgres"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_types: Option<Vec<String>>,
}

/// Match score for one (listing, criteria) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Always within 0 to 100.
    pub score: u8,
    /// One entry per rule that fired, in rule-evaluation order.
    pub reasons: Vec<String>,
    pub passes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub is_hiring_post: bool,
}

/// Which backend produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Heuristic,
    Judge,
}

/// A listing annotated with its derived fields, as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredListing {
    #[serde(flatten)]
    pub listing: Listing,
    pub score: u8,
    pub reasons: Vec<String>,
    pub passes: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hiring_post: Option<bool>,
    pub scored_by: ScoreSource,
}

impl ScoredListing {
    pub fn new(listing: Listing, result: ScoreResult, scored_by: ScoreSource) -> Self {
        Self {
            listing: listing.without_derived(),
            score: result.score,
            reasons: result.reasons,
            passes: result.passes,
            is_hiring_post: None,
            scored_by,
        }
    }
}

/// A listing annotated with its hiring-post flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedListing {
    #[serde(flatten)]
    pub listing: Listing,
    pub is_hiring_post: bool,
    pub classified_by: ScoreSource,
}

impl ClassifiedListing {
    pub fn new(
        listing: Listing,
        result: ClassificationResult,
        classified_by: ScoreSource,
    ) -> Self {
        Self {
            listing: listing.without_derived(),
            is_hiring_post: result.is_hiring_post,
            classified_by,
        }
    }
}
