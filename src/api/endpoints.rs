// Backend endpoint paths. Defaults match the charitable gaming Flask server;
// other deployments override them through the environment.

use crate::session::Session;

pub const CATALOG_PATH: &str = "/api/get_all_charities";
pub const PROFILE_PATH: &str = "/api/get_user_data";
pub const SELECTION_PATH: &str = "/api/set_charity";
pub const MATCHES_PATH: &str = "/api/get_user_league_games";
pub const LEADERBOARD_PATH: &str = "/api/get_leaderboard";

const USER_PLACEHOLDER: &str = "{user}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub catalog: String,
    pub profile: String,
    pub selection: String,
    pub matches: String,
    pub leaderboard: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            catalog: CATALOG_PATH.to_string(),
            profile: PROFILE_PATH.to_string(),
            selection: SELECTION_PATH.to_string(),
            matches: MATCHES_PATH.to_string(),
            leaderboard: LEADERBOARD_PATH.to_string(),
        }
    }
}

/// HTTP verb used for the "set selection" write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethod {
    Post,
    Put,
}

impl WriteMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMethod::Post => "POST",
            WriteMethod::Put => "PUT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "POST" => Some(WriteMethod::Post),
            "PUT" => Some(WriteMethod::Put),
            _ => None,
        }
    }
}

/// Joins `base` and `path`, substituting `{user}` with the session's user.
pub fn build_url(base: &str, path: &str, session: Option<&Session>) -> String {
    let path = match session {
        Some(session) => path.replace(USER_PLACEHOLDER, session.user()),
        None => path.to_string(),
    };
    let base = base.trim_end_matches('/');

    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_path_with_a_single_slash() {
        assert_eq!(
            build_url("http://localhost:8080/", CATALOG_PATH, None),
            "http://localhost:8080/api/get_all_charities"
        );
        assert_eq!(
            build_url("http://localhost:8000", "charities", None),
            "http://localhost:8000/charities"
        );
    }

    #[test]
    fn substitutes_the_session_user() {
        let session = Session::new("42");
        assert_eq!(
            build_url("http://localhost:8000", "/users/{user}", Some(&session)),
            "http://localhost:8000/users/42"
        );
    }

    #[test]
    fn parses_write_methods_case_insensitively() {
        assert_eq!(WriteMethod::parse("put"), Some(WriteMethod::Put));
        assert_eq!(WriteMethod::parse(" POST "), Some(WriteMethod::Post));
        assert_eq!(WriteMethod::parse("PATCH"), None);
    }
}
