use crate::error::AppError;
use crate::session::Session;

use super::models::{Charity, CharityKey, LeaderboardEntry, LeaderboardSize, MatchRecord, UserProfile};

/// The backend contract the dashboard consumes.
///
/// Implementations must be shareable across worker threads: the selection
/// controller runs its fetches and writes off the owning thread.
pub trait CharityBackend: Send + Sync + 'static {
    fn fetch_catalog(&self) -> Result<Vec<Charity>, AppError>;

    fn fetch_profile(&self, session: &Session) -> Result<UserProfile, AppError>;

    /// Writes the selection. `profile` is the last known profile, echoed back
    /// alongside the new charity; `None` when it never loaded.
    fn persist_selection(
        &self,
        session: &Session,
        profile: Option<&UserProfile>,
        charity: &CharityKey,
    ) -> Result<(), AppError>;

    fn fetch_match_history(&self, session: &Session) -> Result<Vec<MatchRecord>, AppError>;

    fn fetch_leaderboard(&self, size: LeaderboardSize) -> Result<Vec<LeaderboardEntry>, AppError>;
}
