use crate::api::models::{MatchRecord, MatchStats};
use serde::Serialize;

const KILL_WEIGHT: i64 = 2;
const WIN_FACTOR: i64 = 2;
const LOSS_FACTOR: i64 = 1;

/// A match together with the charity points it earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredMatch {
    pub match_id: Option<String>,
    pub stats: MatchStats,
    pub charity_points: u64,
}

pub struct ScoringEngine;

impl ScoringEngine {
    /// Charity points for one match:
    /// - factor = 2 on a win, 1 on a loss
    /// - raw = factor × (2 × kills + assists − deaths)
    /// - points = max(raw, 0), so a bad game never takes points away
    pub fn points(stats: &MatchStats) -> u64 {
        let factor = if stats.win { WIN_FACTOR } else { LOSS_FACTOR };
        let raw = factor
            * (KILL_WEIGHT * i64::from(stats.kills) + i64::from(stats.assists)
                - i64::from(stats.deaths));

        raw.max(0) as u64
    }

    pub fn score(record: &MatchRecord) -> ScoredMatch {
        ScoredMatch {
            match_id: record.match_id.clone(),
            stats: record.stats,
            charity_points: Self::points(&record.stats),
        }
    }

    /// Scores every match, keeping the list's length and order.
    pub fn score_all(records: &[MatchRecord]) -> Vec<ScoredMatch> {
        records.iter().map(Self::score).collect()
    }
}
