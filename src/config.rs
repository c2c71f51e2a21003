use crate::api::endpoints::{Endpoints, WriteMethod};
use crate::error::AppError;
use std::env;
use std::num::NonZeroU32;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_GAME: &str = "League of Legends";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUESTS_PER_SECOND: u32 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub endpoints: Endpoints,
    pub selection_method: WriteMethod,
    pub timeout: Duration,
    pub requests_per_second: NonZeroU32,
    pub game: String,
    pub log_level: String,
    pub user: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoints: Endpoints::default(),
            selection_method: WriteMethod::Post,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            requests_per_second: NonZeroU32::new(DEFAULT_REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN),
            game: DEFAULT_GAME.to_string(),
            log_level: "warn".to_string(),
            user: "me".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(base_url) = lookup("CHARITY_API_BASE_URL") {
            if base_url.trim().is_empty() {
                return Err(AppError::ConfigError(
                    "CHARITY_API_BASE_URL must not be empty".to_string(),
                ));
            }
            config.base_url = base_url.trim().to_string();
        }

        let paths = [
            ("CHARITY_CATALOG_PATH", &mut config.endpoints.catalog),
            ("CHARITY_PROFILE_PATH", &mut config.endpoints.profile),
            ("CHARITY_SELECTION_PATH", &mut config.endpoints.selection),
            ("CHARITY_MATCHES_PATH", &mut config.endpoints.matches),
            ("CHARITY_LEADERBOARD_PATH", &mut config.endpoints.leaderboard),
        ];
        for (key, slot) in paths {
            if let Some(path) = lookup(key) {
                *slot = path.trim().to_string();
            }
        }

        if let Some(method) = lookup("CHARITY_SELECTION_METHOD") {
            config.selection_method = WriteMethod::parse(&method).ok_or_else(|| {
                AppError::ConfigError(format!(
                    "CHARITY_SELECTION_METHOD must be POST or PUT, got '{}'",
                    method
                ))
            })?;
        }

        if let Some(secs) = lookup("CHARITY_API_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                AppError::ConfigError(format!("CHARITY_API_TIMEOUT_SECS is not a number: '{}'", secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(rps) = lookup("CHARITY_API_RPS") {
            config.requests_per_second = rps
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(NonZeroU32::new)
                .ok_or_else(|| {
                    AppError::ConfigError(format!(
                        "CHARITY_API_RPS must be a positive integer, got '{}'",
                        rps
                    ))
                })?;
        }

        if let Some(game) = lookup("CHARITY_GAME") {
            config.game = game;
        }
        if let Some(level) = lookup("CHARITY_LOG") {
            config.log_level = level;
        }
        if let Some(user) = lookup("CHARITY_USER") {
            config.user = validate_user(&user)?;
        }

        Ok(config)
    }
}

/// The user id is substituted into endpoint paths as-is, so it is limited to
/// URL-unreserved characters (`A-Z a-z 0-9 - . _ ~`).
pub fn validate_user(user: &str) -> Result<String, AppError> {
    let user = user.trim();
    let usable = !user.is_empty()
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'));

    if usable {
        Ok(user.to_string())
    } else {
        Err(AppError::ConfigError(format!(
            "user '{}' may only contain letters, digits, '-', '.', '_' and '~'",
            user
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_follow_the_flask_server() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.endpoints, Endpoints::default());
        assert_eq!(config.selection_method, WriteMethod::Post);
        assert_eq!(config.requests_per_second.get(), 20);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides_paths_and_method() {
        let config = Config::from_lookup(lookup_from(&[
            ("CHARITY_API_BASE_URL", "http://localhost:8000"),
            ("CHARITY_CATALOG_PATH", "/charities"),
            ("CHARITY_PROFILE_PATH", "/users/{user}"),
            ("CHARITY_SELECTION_PATH", "/users/{user}"),
            ("CHARITY_SELECTION_METHOD", "put"),
            ("CHARITY_USER", "1"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.endpoints.catalog, "/charities");
        assert_eq!(config.endpoints.selection, "/users/{user}");
        assert_eq!(config.selection_method, WriteMethod::Put);
        assert_eq!(config.user, "1");
    }

    #[test]
    fn rejects_invalid_values() {
        let zero_rps = Config::from_lookup(lookup_from(&[("CHARITY_API_RPS", "0")]));
        assert!(matches!(zero_rps, Err(AppError::ConfigError(_))));

        let bad_method = Config::from_lookup(lookup_from(&[("CHARITY_SELECTION_METHOD", "PATCH")]));
        assert!(matches!(bad_method, Err(AppError::ConfigError(_))));

        let bad_timeout = Config::from_lookup(lookup_from(&[("CHARITY_API_TIMEOUT_SECS", "soon")]));
        assert!(matches!(bad_timeout, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn rejects_users_that_would_break_the_url() {
        for user in ["a/b", "me?admin=1", "two words", "", "50%"] {
            let config = Config::from_lookup(lookup_from(&[("CHARITY_USER", user)]));
            assert!(
                matches!(config, Err(AppError::ConfigError(_))),
                "accepted user {:?}",
                user
            );
        }

        assert_eq!(validate_user(" xK9_f-2.q~ ").unwrap(), "xK9_f-2.q~");
    }
}
