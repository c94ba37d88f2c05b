//! Heuristic scorer: additive weighted rules over a (listing, criteria) pair.
//!
//! Algorithm (base 50, rules applied in this order):
//! 1. query/title token overlap      +30 × fraction
//! 2. location substring             +15
//! 3. skills/description overlap     +25 × fraction
//! 4. experience keyword             +10
//! 5. salary vs minimum              +15 / −10
//! 6. reputable company              +10
//! 7. remote work                    +5
//!
//! The total is clamped to 0 to 100 and rounded. A rule that cannot be evaluated
//! (absent criteria, empty token list, non-numeric salary) is skipped.

use crate::models::{Criteria, Listing, ScoreResult};
use crate::scoring::PASS_THRESHOLD;

const BASE_SCORE: f64 = 50.0;
const TITLE_WEIGHT: f64 = 30.0;
const LOCATION_BONUS: f64 = 15.0;
const SKILLS_WEIGHT: f64 = 25.0;
const EXPERIENCE_BONUS: f64 = 10.0;
const SALARY_BONUS: f64 = 15.0;
const SALARY_PENALTY: f64 = 10.0;
const COMPANY_BONUS: f64 = 10.0;
const REMOTE_BONUS: f64 = 5.0;

pub const REPUTABLE_COMPANIES: &[&str] = &[
    "google",
    "microsoft",
    "apple",
    "amazon",
    "meta",
    "netflix",
    "tesla",
    "uber",
    "airbnb",
];

/// Reason recorded when no rule fired.
pub const FALLBACK_REASON: &str = "Basic analysis completed";

/// Scores one listing against the given criteria.
pub fn score_listing(listing: &Listing, criteria: &Criteria) -> ScoreResult {
    let title = listing.title.to_lowercase();
    let location = listing.location.to_lowercase();
    let description = listing.description.to_lowercase();

    let mut score = BASE_SCORE;
    let mut reasons = Vec::new();

    if let Some(query) = non_blank(criteria.user_query.as_deref()) {
        let query = query.to_lowercase();
        let tokens: Vec<&str> = query.split_whitespace().collect();
        if let Some((matched, total)) = token_overlap(&tokens, &title) {
            score += matched as f64 / total as f64 * TITLE_WEIGHT;
            reasons.push(format!("Title matches {matched}/{total} search terms"));
        }
    }

    if let Some(wanted) = non_blank(criteria.location.as_deref()) {
        if location.contains(&wanted.trim().to_lowercase()) {
            score += LOCATION_BONUS;
            reasons.push(format!("Location matches \"{}\"", wanted.trim()));
        }
    }

    if let Some(skills) = non_blank(criteria.skills.as_deref()) {
        let skills = skills.to_lowercase();
        let tokens: Vec<&str> = skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if let Some((matched, total)) = token_overlap(&tokens, &description) {
            score += matched as f64 / total as f64 * SKILLS_WEIGHT;
            reasons.push(format!("Skills match {matched}/{total}"));
        }
    }

    if let Some(level) = non_blank(criteria.experience.as_deref()) {
        if let Some(matched) = experience_match(&level.to_lowercase(), &description) {
            score += EXPERIENCE_BONUS;
            reasons.push(format!("Experience level matches ({matched})"));
        }
    }

    if let (Some(min_raw), Some(offered_raw)) = (
        non_blank(criteria.min_salary.as_deref()),
        non_blank(listing.salary.as_deref()),
    ) {
        if let (Some(min), Some(offered)) = (parse_salary(min_raw), parse_salary(offered_raw)) {
            if offered >= min {
                score += SALARY_BONUS;
                reasons.push(format!("Salary {offered_raw} meets minimum {min_raw}"));
            } else {
                score -= SALARY_PENALTY;
                reasons.push(format!("Salary {offered_raw} below minimum {min_raw}"));
            }
        }
    }

    let company = listing.company.to_lowercase();
    if REPUTABLE_COMPANIES.iter().any(|c| company.contains(c)) {
        score += COMPANY_BONUS;
        reasons.push(format!("Reputable company ({})", listing.company.trim()));
    }

    if location.contains("remote") || description.contains("remote") {
        score += REMOTE_BONUS;
        reasons.push("Remote work available".to_string());
    }

    if reasons.is_empty() {
        reasons.push(FALLBACK_REASON.to_string());
    }

    let score = score.clamp(0.0, 100.0).round() as u8;

    ScoreResult {
        score,
        reasons,
        passes: score >= PASS_THRESHOLD,
    }
}

/// Strips every non-digit character and parses what remains.
///
/// `"$120,000"` → `Some(120000)`; `"competitive"` → `None`.
pub fn parse_salary(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Returns `(matched, total)` when at least one token is a substring of `haystack`.
fn token_overlap(tokens: &[&str], haystack: &str) -> Option<(usize, usize)> {
    if tokens.is_empty() {
        return None;
    }
    let matched = tokens.iter().filter(|t| haystack.contains(*t)).count();
    (matched > 0).then_some((matched, tokens.len()))
}

/// First matching level wins: entry, then senior, then mid.
fn experience_match(level: &str, description: &str) -> Option<&'static str> {
    if level.contains("entry") && (description.contains("entry") || description.contains("junior"))
    {
        Some("entry")
    } else if level.contains("senior") && description.contains("senior") {
        Some("senior")
    } else if level.contains("mid")
        && (description.contains("mid") || description.contains("intermediate"))
    {
        Some("mid")
    } else {
        None
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
