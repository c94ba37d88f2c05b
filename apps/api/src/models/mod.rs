pub mod listing;

pub use listing::{
    ClassificationResult, ClassifiedListing, Criteria, Listing, ScoreResult, ScoreSource,
    ScoredListing,
};
