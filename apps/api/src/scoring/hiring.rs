//! Hiring-post classifier: a cheap keyword test for "is this an active hiring call".

use crate::models::{ClassificationResult, Listing};

pub const HIRING_KEYWORDS: &[&str] = &[
    "hiring",
    "recruiting",
    "looking for",
    "seeking",
    "join our team",
    "we are hiring",
    "now hiring",
    "immediate opening",
    "urgent requirement",
    "apply now",
    "send resume",
    "send cv",
    "job opening",
    "vacancy",
    "position available",
    "career opportunity",
];

/// Returns true when `text` contains any hiring keyword, case-insensitively.
pub fn is_hiring_text(text: &str) -> bool {
    let text = text.to_lowercase();
    HIRING_KEYWORDS.iter().any(|k| text.contains(k))
}

/// Classifies a listing from its title, company, description and any `content` body.
pub fn classify_listing(listing: &Listing) -> ClassificationResult {
    let text = [
        listing.title.as_str(),
        listing.company.as_str(),
        listing.description.as_str(),
        listing.content().unwrap_or_default(),
    ]
    .join(" ");

    ClassificationResult {
        is_hiring_post: is_hiring_text(&text),
    }
}
