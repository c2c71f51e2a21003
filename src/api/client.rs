use crate::config::Config;
use crate::error::AppError;
use crate::session::Session;
use governor::{Quota, RateLimiter, state::{InMemoryState, NotKeyed}, clock::DefaultClock};
use serde_json::Value;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use super::backend::CharityBackend;
use super::endpoints::build_url;
use super::models::*;

const USER_AGENT: &str = concat!("charitable_gaming/", env!("CARGO_PKG_VERSION"));

/// HTTP implementation of [`CharityBackend`].
pub struct BackendClient {
    config: Config,
    agent: ureq::Agent,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    throttle_interval: Duration,
}

impl BackendClient {
    pub fn new(config: Config) -> Self {
        let quota = Quota::per_second(config.requests_per_second);
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build();

        BackendClient {
            throttle_interval: quota.replenish_interval(),
            rate_limiter: RateLimiter::direct(quota),
            agent,
            config,
        }
    }

    fn url(&self, path: &str, session: Option<&Session>) -> String {
        build_url(&self.config.base_url, path, session)
    }

    // Client-side throttle: wait for the quota instead of failing the request.
    fn throttle(&self) {
        while self.rate_limiter.check().is_err() {
            thread::sleep(self.throttle_interval);
        }
    }

    fn execute(&self, request: ureq::Request, body: Option<&Value>) -> Result<String, AppError> {
        self.throttle();

        let method = request.method().to_string();
        let url = request.url().to_string();
        debug!(%method, %url, "sending request");

        let response = match body {
            Some(json) => request
                .set("Content-Type", "application/json")
                .send_json(json),
            None => request.call(),
        };

        match response {
            Ok(resp) => resp.into_string().map_err(|e| {
                AppError::NetworkFailure(format!("{} {}: {}", method, url, e))
            }),
            Err(ureq::Error::Status(code, _)) => Err(AppError::NetworkFailure(format!(
                "{} {} returned HTTP {}",
                method, url, code
            ))),
            Err(e) => Err(AppError::NetworkFailure(format!("{} {}: {}", method, url, e))),
        }
    }

    fn get(&self, url: &str) -> Result<String, AppError> {
        let request = self.agent.get(url).set("Accept", "application/json");
        self.execute(request, None)
    }
}

impl CharityBackend for BackendClient {
    fn fetch_catalog(&self) -> Result<Vec<Charity>, AppError> {
        let body = self.get(&self.url(&self.config.endpoints.catalog, None))?;
        parse_catalog(&body)
    }

    fn fetch_profile(&self, session: &Session) -> Result<UserProfile, AppError> {
        let body = self.get(&self.url(&self.config.endpoints.profile, Some(session)))?;
        parse_profile(&body)
    }

    fn persist_selection(
        &self,
        session: &Session,
        profile: Option<&UserProfile>,
        charity: &CharityKey,
    ) -> Result<(), AppError> {
        let url = self.url(&self.config.endpoints.selection, Some(session));
        let request = self
            .agent
            .request(self.config.selection_method.as_str(), &url)
            .set("Accept", "application/json");

        // The response body carries nothing the dashboard needs.
        let body = selection_body(self.config.selection_method, profile, charity);
        self.execute(request, Some(&body))?;
        info!(charity = %charity, user = session.user(), "selection persisted");
        Ok(())
    }

    fn fetch_match_history(&self, session: &Session) -> Result<Vec<MatchRecord>, AppError> {
        let body = self.get(&self.url(&self.config.endpoints.matches, Some(session)))?;
        parse_match_history(&body)
    }

    fn fetch_leaderboard(&self, size: LeaderboardSize) -> Result<Vec<LeaderboardEntry>, AppError> {
        let url = self.url(&self.config.endpoints.leaderboard, None);
        let request = self
            .agent
            .get(&url)
            .set("Accept", "application/json")
            .query("game", &self.config.game.replace(' ', "_"))
            .query("num_of_choices", size.as_query());

        let body = self.execute(request, None)?;
        parse_leaderboard(&body)
    }
}
