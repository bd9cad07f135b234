use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ============ Field Coercions ============

/// Parses a provider coordinate string into a float.
///
/// Coordinates arrive as strings, sometimes with thousands-separator commas
/// (`"41,902,782"`). An empty string is `None`; an unparsable value is logged
/// and coerced to `None` instead of aborting the batch.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return None;
    }
    match raw.replace(',', "").parse::<f64>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!("Could not parse coordinate {:?}: {}", raw, e);
            None
        }
    }
}

fn de_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_coordinate(&s),
        Some(other) => {
            tracing::error!("Unexpected coordinate value: {}", other);
            None
        }
    })
}

/// `%Y-%m-%d` date that may be absent, null, or an empty string.
fn de_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn de_nullable_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

// ============ Fixtures ============

/// A fixture with its requested includes, plus the fields derived during
/// normalization. Provider fields the pipeline does not touch pass through
/// the `extra` map unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    /// Provider identifier; the sink's merge key.
    pub id: i64,
    #[serde(default)]
    pub season_id: Option<i64>,
    /// Kickoff time as delivered, `"%Y-%m-%d %H:%M:%S"`.
    #[serde(default)]
    pub starting_at: Option<String>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub scores: Vec<ScoreEntry>,
    #[serde(default)]
    pub events: Vec<FixtureEvent>,
    #[serde(default)]
    pub statistics: Vec<FixtureStatistic>,
    /// Derived from the home participant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_team_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_team_image: Option<String>,
    /// Derived from the away participant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_team_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_team_image: Option<String>,
    /// Absent when no participant is flagged as the winner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_team_id: Option<i64>,
    /// Goals from the `CURRENT` score entry; 0 when none exists.
    #[serde(default)]
    pub home_score: i64,
    #[serde(default)]
    pub away_score: i64,
    /// Always `"<home_score> - <away_score>"` after normalization.
    #[serde(default)]
    pub score: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One side of a fixture, from the `participants` include.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub image_path: Option<String>,
    pub meta: ParticipantMeta,
    /// Stamped from the parent fixture during normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantMeta {
    /// `home` or `away`; anything else counts as home.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub winner: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the `scores` include; only `CURRENT` entries feed the
/// derived score fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(default)]
    pub description: String,
    pub score: ScoreDetails,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreDetails {
    #[serde(default)]
    pub participant: String,
    #[serde(default)]
    pub goals: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A match event; `timestamp` is derived from the fixture kickoff plus the
/// minute offsets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureEvent {
    #[serde(default)]
    pub minute: Option<i64>,
    #[serde(default)]
    pub extra_minute: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureStatistic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============ Players ============

/// A player with the derived `date_of_birth` and `age` fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    /// Null when the provider has no (or an empty) birth date.
    #[serde(default, deserialize_with = "de_optional_date")]
    pub date_of_birth: Option<NaiveDate>,
    /// Whole calendar years since birth; no day/month adjustment.
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============ Geo entities ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    #[serde(default, deserialize_with = "de_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "de_coordinate")]
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    #[serde(default, deserialize_with = "de_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "de_coordinate")]
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============ Seasons ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    pub id: i64,
    /// Rewritten to `"<league name> <season name>"` by the statistics extractor.
    #[serde(default)]
    pub name: String,
    /// Provider flag marking the season currently in play.
    #[serde(default, deserialize_with = "de_nullable_bool")]
    pub games_in_current_week: bool,
    #[serde(default, deserialize_with = "de_optional_date")]
    pub starting_at: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_optional_date")]
    pub ending_at: Option<NaiveDate>,
    /// Present only when requested via the `league` include.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<League>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============ Passthrough entities ============
// These carry no derived fields; the structs pin down the merge key and let
// everything else flow through.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeEntry {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadMember {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopScorer {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedFixture {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
