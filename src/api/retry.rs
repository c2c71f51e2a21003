use crate::error::AppError;
use crate::session::Session;
use std::thread;
use std::time::Duration;
use tracing::warn;

use super::backend::CharityBackend;
use super::models::{Charity, CharityKey, LeaderboardEntry, LeaderboardSize, MatchRecord, UserProfile};

/// Retry policy layered over any backend. Only transient (network) failures
/// are retried; malformed responses fail straight away.
pub struct Retrying<B> {
    inner: B,
    retries: u32,
    backoff: Duration,
}

impl<B: CharityBackend> Retrying<B> {
    pub fn new(inner: B, retries: u32, backoff: Duration) -> Self {
        Retrying {
            inner,
            retries,
            backoff,
        }
    }

    fn run<T>(&self, what: &str, mut call: impl FnMut(&B) -> Result<T, AppError>) -> Result<T, AppError> {
        let mut attempt = 0;

        loop {
            match call(&self.inner) {
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    let wait = self.backoff * attempt;
                    warn!(
                        operation = what,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "request failed, retrying"
                    );
                    thread::sleep(wait);
                }
                result => return result,
            }
        }
    }
}

impl<B: CharityBackend> CharityBackend for Retrying<B> {
    fn fetch_catalog(&self) -> Result<Vec<Charity>, AppError> {
        self.run("fetch_catalog", |b| b.fetch_catalog())
    }

    fn fetch_profile(&self, session: &Session) -> Result<UserProfile, AppError> {
        self.run("fetch_profile", |b| b.fetch_profile(session))
    }

    fn persist_selection(
        &self,
        session: &Session,
        profile: Option<&UserProfile>,
        charity: &CharityKey,
    ) -> Result<(), AppError> {
        self.run("persist_selection", |b| b.persist_selection(session, profile, charity))
    }

    fn fetch_match_history(&self, session: &Session) -> Result<Vec<MatchRecord>, AppError> {
        self.run("fetch_match_history", |b| b.fetch_match_history(session))
    }

    fn fetch_leaderboard(&self, size: LeaderboardSize) -> Result<Vec<LeaderboardEntry>, AppError> {
        self.run("fetch_leaderboard", |b| b.fetch_leaderboard(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the catalog fetch with `error` until `failures` calls have been made.
    struct Flaky {
        calls: AtomicU32,
        failures: u32,
        error: AppError,
    }

    impl Flaky {
        fn new(failures: u32, error: AppError) -> Self {
            Flaky {
                calls: AtomicU32::new(0),
                failures,
                error,
            }
        }
    }

    impl CharityBackend for Flaky {
        fn fetch_catalog(&self) -> Result<Vec<Charity>, AppError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(self.error.clone())
            } else {
                Ok(Vec::new())
            }
        }

        fn fetch_profile(&self, _: &Session) -> Result<UserProfile, AppError> {
            Err(AppError::NetworkFailure("offline".into()))
        }

        fn persist_selection(&self, _: &Session, _: Option<&UserProfile>, _: &CharityKey) -> Result<(), AppError> {
            Ok(())
        }

        fn fetch_match_history(&self, _: &Session) -> Result<Vec<MatchRecord>, AppError> {
            Ok(Vec::new())
        }

        fn fetch_leaderboard(&self, _: LeaderboardSize) -> Result<Vec<LeaderboardEntry>, AppError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn retries_network_failures_until_success() {
        let backend = Retrying::new(
            Flaky::new(2, AppError::NetworkFailure("reset".into())),
            3,
            Duration::ZERO,
        );

        assert_eq!(backend.fetch_catalog(), Ok(Vec::new()));
        assert_eq!(backend.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn gives_up_after_the_configured_retries() {
        let backend = Retrying::new(
            Flaky::new(10, AppError::NetworkFailure("reset".into())),
            2,
            Duration::ZERO,
        );

        assert!(backend.fetch_catalog().is_err());
        assert_eq!(backend.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn malformed_responses_are_not_retried() {
        let backend = Retrying::new(
            Flaky::new(10, AppError::MalformedResponse("eof".into())),
            5,
            Duration::ZERO,
        );

        assert!(backend.fetch_catalog().is_err());
        assert_eq!(backend.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_retries_is_a_single_attempt() {
        let backend = Retrying::new(
            Flaky::new(1, AppError::NetworkFailure("reset".into())),
            0,
            Duration::ZERO,
        );

        assert!(backend.fetch_catalog().is_err());
        assert_eq!(backend.inner.calls.load(Ordering::SeqCst), 1);
    }
}
