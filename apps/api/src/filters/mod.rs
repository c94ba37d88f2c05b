//! Structured filters applied to annotated listings, independently of the score
//! rules: location, salary bounds, publication date, source, job type, and a
//! minimum score.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Criteria, ScoredListing};
use crate::scoring::parse_salary;

/// Filter options as received from callers. Absent fields disable their test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_salary: Option<u64>,
    /// Inclusive, RFC 3339 or `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    /// Inclusive, RFC 3339 or `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    /// Search engine / site the listing came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Invalid date '{0}': expected RFC 3339 or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Salary bounds are inverted: min {min} > max {max}")]
    InvertedSalaryBounds { min: u64, max: u64 },
}

/// A validated, normalized [`ListingFilter`].
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    location: Option<String>,
    min_salary: Option<u64>,
    max_salary: Option<u64>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    source: Option<String>,
    job_types: Vec<String>,
    min_score: Option<u8>,
}

impl FilterSet {
    /// Builds the filter set. Job types fall back to `criteria.job_types` when the
    /// filter does not name any.
    pub fn new(filter: &ListingFilter, criteria: &Criteria) -> Result<Self, FilterError> {
        if let (Some(min), Some(max)) = (filter.min_salary, filter.max_salary) {
            if min > max {
                return Err(FilterError::InvertedSalaryBounds { min, max });
            }
        }

        let job_types: Vec<String> = filter
            .job_types
            .as_ref()
            .filter(|types| !types.is_empty())
            .or(criteria.job_types.as_ref())
            .map(|types| {
                types
                    .iter()
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            location: lowered(filter.location.as_deref()),
            min_salary: filter.min_salary,
            max_salary: filter.max_salary,
            date_from: date_bound(filter.date_from.as_deref())?,
            date_to: date_bound(filter.date_to.as_deref())?,
            source: lowered(filter.source.as_deref()),
            job_types,
            min_score: filter.min_score,
        })
    }

    pub fn matches(&self, scored: &ScoredListing) -> bool {
        let listing = &scored.listing;

        if let Some(location) = &self.location {
            if !listing.location.to_lowercase().contains(location) {
                return false;
            }
        }

        if self.min_salary.is_some() || self.max_salary.is_some() {
            let Some(salary) = listing.salary.as_deref().and_then(parse_salary) else {
                return false;
            };
            if self.min_salary.is_some_and(|min| salary < min)
                || self.max_salary.is_some_and(|max| salary > max)
            {
                return false;
            }
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(published) = listing.published_date.as_deref().and_then(parse_date) else {
                return false;
            };
            if self.date_from.is_some_and(|from| published < from)
                || self.date_to.is_some_and(|to| published > to)
            {
                return false;
            }
        }

        if let Some(source) = &self.source {
            let matches_source = listing
                .source
                .as_deref()
                .is_some_and(|s| s.trim().eq_ignore_ascii_case(source));
            if !matches_source {
                return false;
            }
        }

        if !self.job_types.is_empty()
            && !self
                .job_types
                .iter()
                .any(|t| listing.job_type.trim().eq_ignore_ascii_case(t))
        {
            return false;
        }

        self.min_score.map_or(true, |min| scored.score >= min)
    }

    /// Keeps the listings that pass every active filter, in order.
    pub fn apply(&self, scored: Vec<ScoredListing>) -> Vec<ScoredListing> {
        scored.into_iter().filter(|s| self.matches(s)).collect()
    }
}

/// Parses an RFC 3339 timestamp (reduced to its UTC date) or a bare `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

fn date_bound(raw: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => parse_date(r)
            .map(Some)
            .ok_or_else(|| FilterError::InvalidDate(r.to_string())),
        None => Ok(None),
    }
}

fn lowered(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Listing, ScoreResult, ScoreSource};

    fn scored(listing: Listing, score: u8) -> ScoredListing {
        ScoredListing::new(
            listing,
            ScoreResult {
                score,
                reasons: vec![],
                passes: score >= 60,
            },
            ScoreSource::Heuristic,
        )
    }

    fn sample() -> Vec<ScoredListing> {
        vec![
            scored(
                Listing {
                    id: "a".to_string(),
                    location: "Berlin, Germany".to_string(),
                    salary: Some("€70,000".to_string()),
                    job_type: "Full-time".to_string(),
                    published_date: Some("2024-03-10T08:30:00Z".to_string()),
                    source: Some("LinkedIn".to_string()),
                    ..Default::default()
                },
                80,
            ),
            scored(
                Listing {
                    id: "b".to_string(),
                    location: "Remote".to_string(),
                    salary: Some("Competitive".to_string()),
                    job_type: "contract".to_string(),
                    published_date: Some("2024-01-02".to_string()),
                    source: Some("indeed".to_string()),
                    ..Default::default()
                },
                55,
            ),
            scored(
                Listing {
                    id: "c".to_string(),
                    location: "berlin".to_string(),
                    salary: Some("$40,000".to_string()),
                    job_type: "full-time".to_string(),
                    published_date: None,
                    source: None,
                    ..Default::default()
                },
                62,
            ),
        ]
    }

    fn ids(listings: &[ScoredListing]) -> Vec<&str> {
        listings.iter().map(|s| s.listing.id.as_str()).collect()
    }

    fn apply(filter: ListingFilter) -> Vec<ScoredListing> {
        FilterSet::new(&filter, &Criteria::default())
            .unwrap()
            .apply(sample())
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        assert_eq!(ids(&apply(ListingFilter::default())), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_location_is_case_insensitive_substring() {
        let kept = apply(ListingFilter {
            location: Some("BERLIN".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&kept), vec!["a", "c"]);
    }

    #[test]
    fn test_salary_bounds_exclude_unparsable_salaries() {
        let kept = apply(ListingFilter {
            min_salary: Some(50_000),
            ..Default::default()
        });
        assert_eq!(ids(&kept), vec!["a"]);

        let kept = apply(ListingFilter {
            max_salary: Some(50_000),
            ..Default::default()
        });
        assert_eq!(ids(&kept), vec!["c"]);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let kept = apply(ListingFilter {
            date_from: Some("2024-01-02".to_string()),
            date_to: Some("2024-03-10".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&kept), vec!["a", "b"]);

        let kept = apply(ListingFilter {
            date_from: Some("2024-02-01T00:00:00+00:00".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&kept), vec!["a"]);
    }

    #[test]
    fn test_invalid_date_bound_is_rejected() {
        let filter = ListingFilter {
            date_to: Some("last tuesday".to_string()),
            ..Default::default()
        };
        assert_eq!(
            FilterSet::new(&filter, &Criteria::default()).unwrap_err(),
            FilterError::InvalidDate("last tuesday".to_string())
        );
    }

    #[test]
    fn test_inverted_salary_bounds_are_rejected() {
        let filter = ListingFilter {
            min_salary: Some(10),
            max_salary: Some(5),
            ..Default::default()
        };
        assert!(matches!(
            FilterSet::new(&filter, &Criteria::default()),
            Err(FilterError::InvertedSalaryBounds { min: 10, max: 5 })
        ));
    }

    #[test]
    fn test_source_matches_engine_case_insensitively() {
        let kept = apply(ListingFilter {
            source: Some("linkedin".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&kept), vec!["a"]);
    }

    #[test]
    fn test_job_types_fall_back_to_criteria() {
        let criteria = Criteria {
            job_types: Some(vec!["Full-Time".to_string()]),
            ..Default::default()
        };
        let kept = FilterSet::new(&ListingFilter::default(), &criteria)
            .unwrap()
            .apply(sample());
        assert_eq!(ids(&kept), vec!["a", "c"]);

        let filter = ListingFilter {
            job_types: Some(vec!["contract".to_string()]),
            ..Default::default()
        };
        let kept = FilterSet::new(&filter, &criteria).unwrap().apply(sample());
        assert_eq!(ids(&kept), vec!["b"]);
    }

    #[test]
    fn test_min_score_threshold() {
        let kept = apply(ListingFilter {
            min_score: Some(60),
            ..Default::default()
        });
        assert_eq!(ids(&kept), vec!["a", "c"]);
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let kept = apply(ListingFilter {
            location: Some("Tokyo".to_string()),
            ..Default::default()
        });
        assert!(kept.is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 10);
        assert_eq!(parse_date("2024-03-10"), expected);
        assert_eq!(
            parse_date("2024-03-10T23:30:00-02:00"),
            NaiveDate::from_ymd_opt(2024, 3, 11)
        );
        assert_eq!(parse_date("March 10"), None);
    }
}
