use super::charity_points::ScoredMatch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub matches: usize,
    pub wins: usize,
    pub total_points: u64,
}

impl MatchSummary {
    pub fn from_matches(matches: &[ScoredMatch]) -> Self {
        matches.iter().fold(MatchSummary::default(), |mut summary, m| {
            summary.matches += 1;
            if m.stats.win {
                summary.wins += 1;
            }
            summary.total_points += m.charity_points;
            summary
        })
    }

    pub fn losses(&self) -> usize {
        self.matches - self.wins
    }

    pub fn win_rate(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.wins as f64 / self.matches as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ScoringEngine;
    use crate::api::models::{MatchRecord, MatchStats};

    #[test]
    fn totals_points_and_results() {
        let records: Vec<MatchRecord> = [(4, 5, 14, true), (1, 5, 9, false), (2, 6, 1, false), (1, 2, 4, true)]
            .into_iter()
            .map(|(kills, deaths, assists, win)| MatchRecord {
                match_id: None,
                stats: MatchStats { kills, deaths, assists, win },
            })
            .collect();

        let summary = MatchSummary::from_matches(&ScoringEngine::score_all(&records));

        assert_eq!(summary.matches, 4);
        assert_eq!(summary.wins, 2);
        assert_eq!(summary.losses(), 2);
        assert_eq!(summary.total_points, 34 + 6 + 0 + 8);
        assert!((summary.win_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_history_has_zero_win_rate() {
        let summary = MatchSummary::from_matches(&[]);
        assert_eq!(summary, MatchSummary::default());
        assert_eq!(summary.win_rate(), 0.0);
    }
}
