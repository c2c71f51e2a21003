pub mod charity_points;
pub mod summary;

pub use charity_points::{ScoredMatch, ScoringEngine};
pub use summary::MatchSummary;
