use crate::api::endpoints::WriteMethod;
use crate::error::AppError;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Canonical charity identity: the trimmed charity name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CharityKey(String);

impl CharityKey {
    pub fn new(name: impl AsRef<str>) -> Self {
        CharityKey(name.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharityKey {
    fn from(name: &str) -> Self {
        CharityKey::new(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Charity {
    pub name: String,
    pub description: String,
    pub founded_year: Option<i32>,
    pub location: String,
    pub category: Option<String>,
    pub id: Option<i64>,
}

impl Charity {
    pub fn key(&self) -> CharityKey {
        CharityKey::new(&self.name)
    }
}

// Catalog entry as the backend sends it. Older deployments call the founding
// year `foundedYear` and the id `charity_id`.
#[derive(Debug, Deserialize)]
struct CharityDto {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    location: String,
    #[serde(default, alias = "foundedYear", alias = "founded_year")]
    year: Option<YearDto>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, alias = "charity_id")]
    id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YearDto {
    Number(i32),
    Text(String),
}

impl YearDto {
    fn into_year(self, charity: &str) -> Result<Option<i32>, AppError> {
        match self {
            YearDto::Number(year) => Ok(Some(year)),
            YearDto::Text(text) if text.trim().is_empty() => Ok(None),
            YearDto::Text(text) => text.trim().parse().map(Some).map_err(|_| {
                AppError::MalformedResponse(format!(
                    "charity '{}' has a non-numeric founding year '{}'",
                    charity, text
                ))
            }),
        }
    }
}

/// Parses and validates the charity catalog. Names are the identity key, so an
/// empty or repeated name rejects the whole catalog.
pub fn parse_catalog(body: &str) -> Result<Vec<Charity>, AppError> {
    let entries: Vec<CharityDto> = serde_json::from_str(body)?;
    let mut seen = HashSet::new();
    let mut catalog = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let name = entry.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::MalformedResponse(format!(
                "charity at position {} has an empty name",
                index
            )));
        }
        if !seen.insert(name.clone()) {
            return Err(AppError::MalformedResponse(format!(
                "charity '{}' appears more than once in the catalog",
                name
            )));
        }

        let founded_year = match entry.year {
            Some(year) => year.into_year(&name)?,
            None => None,
        };

        catalog.push(Charity {
            name,
            description: entry.description,
            founded_year,
            location: entry.location,
            category: entry.category,
            id: entry.id,
        });
    }

    Ok(catalog)
}

/// The signed-in user's profile. Fields other than `charity` are kept verbatim
/// so a selection write can send them back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub charity: Option<CharityKey>,
    fields: Map<String, Value>,
}

impl UserProfile {
    pub fn new(charity: Option<CharityKey>, fields: Map<String, Value>) -> Self {
        UserProfile { charity, fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn gamer_handle(&self) -> Option<&str> {
        self.fields.get("gamer_handle").and_then(Value::as_str)
    }

    pub fn user_region(&self) -> Option<&str> {
        self.fields.get("user_region").and_then(Value::as_str)
    }

    pub fn charity_points(&self) -> Option<u64> {
        self.fields.get("charity_points").and_then(Value::as_u64)
    }
}

pub fn parse_profile(body: &str) -> Result<UserProfile, AppError> {
    let value: Value = serde_json::from_str(body)?;
    let Value::Object(mut fields) = value else {
        return Err(AppError::MalformedResponse(
            "user profile is not a JSON object".to_string(),
        ));
    };

    let charity = match fields.remove("charity") {
        None => {
            return Err(AppError::MalformedResponse(
                "user profile has no 'charity' field".to_string(),
            ))
        }
        Some(Value::Null) => None,
        Some(Value::String(name)) if name.trim().is_empty() => None,
        Some(Value::String(name)) => Some(CharityKey::new(name)),
        Some(other) => {
            return Err(AppError::MalformedResponse(format!(
                "user profile 'charity' must be a charity name, got {}",
                other
            )))
        }
    };

    Ok(UserProfile::new(charity, fields))
}

/// Body of the "set selection" write.
///
/// `POST` targets the Flask `set_charity` route, which only reads
/// `charity_name`. `PUT` replaces the whole user record, so the profile's
/// fields go back with the new `charity`.
pub fn selection_body(
    method: WriteMethod,
    profile: Option<&UserProfile>,
    charity: &CharityKey,
) -> Value {
    match method {
        WriteMethod::Post => serde_json::json!({ "charity_name": charity.as_str() }),
        WriteMethod::Put => {
            let mut body = profile.map(|p| p.fields.clone()).unwrap_or_default();
            body.insert("charity".to_string(), Value::String(charity.to_string()));
            Value::Object(body)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    #[serde(deserialize_with = "deserialize_win")]
    pub win: bool,
}

// Riot match stats replace a falsy `win` with 0, so a loss may arrive as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum WinDto {
    Flag(bool),
    Number(u64),
}

fn deserialize_win<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match WinDto::deserialize(deserializer)? {
        WinDto::Flag(win) => Ok(win),
        WinDto::Number(0) => Ok(false),
        WinDto::Number(1) => Ok(true),
        WinDto::Number(other) => Err(de::Error::custom(format!(
            "win must be true, false, 0 or 1, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub match_id: Option<String>,
    pub stats: MatchStats,
}

/// Accepts either `[stats, ...]` or `{ "<match id>": stats, ... }`, keeping
/// the backend's order.
pub fn parse_match_history(body: &str) -> Result<Vec<MatchRecord>, AppError> {
    let value: Value = serde_json::from_str(body)?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| -> Result<MatchRecord, AppError> {
                Ok(MatchRecord {
                    match_id: None,
                    stats: serde_json::from_value(item)?,
                })
            })
            .collect(),
        Value::Object(entries) => entries
            .into_iter()
            .map(|(match_id, item)| -> Result<MatchRecord, AppError> {
                let stats = serde_json::from_value(item).map_err(|e| {
                    AppError::MalformedResponse(format!("match {}: {}", match_id, e))
                })?;
                Ok(MatchRecord {
                    match_id: Some(match_id),
                    stats,
                })
            })
            .collect(),
        other => Err(AppError::MalformedResponse(format!(
            "match history must be a list or an object, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardSize {
    Mini,
    Complete,
}

impl LeaderboardSize {
    pub fn as_query(&self) -> &'static str {
        match self {
            LeaderboardSize::Mini => "mini",
            LeaderboardSize::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub player: String,
    pub charity_points: u64,
}

/// Leaderboard rows arrive as single-key objects: `[{"topo": 692}, ...]`.
pub fn parse_leaderboard(body: &str) -> Result<Vec<LeaderboardEntry>, AppError> {
    let rows: Vec<Map<String, Value>> = serde_json::from_str(body)?;

    rows.into_iter()
        .enumerate()
        .map(|(rank, row)| -> Result<LeaderboardEntry, AppError> {
            let mut entries = row.into_iter();
            match (entries.next(), entries.next()) {
                (Some((player, points)), None) => {
                    let charity_points = points.as_u64().ok_or_else(|| {
                        AppError::MalformedResponse(format!(
                            "leaderboard points for '{}' are not a non-negative integer",
                            player
                        ))
                    })?;
                    Ok(LeaderboardEntry {
                        player,
                        charity_points,
                    })
                }
                _ => Err(AppError::MalformedResponse(format!(
                    "leaderboard row {} must have exactly one player",
                    rank + 1
                ))),
            }
        })
        .collect()
}
