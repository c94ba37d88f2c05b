//! Rule-based listing evaluation: relevance scoring and hiring-post detection.
//!
//! Both are pure functions over their inputs and safe to call from any task.

pub mod heuristic;
pub mod hiring;

pub use heuristic::{parse_salary, score_listing};
pub use hiring::{classify_listing, is_hiring_text};

/// Minimum score for a listing to be considered a match.
pub const PASS_THRESHOLD: u8 = 60;
