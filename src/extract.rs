//! Per-entity extractors.
//!
//! Each extractor issues one or more paginated fetches through
//! [`SportmonksClient`], decodes the raw records into the typed models, and
//! applies the entity's normalization before handing the batch to the sink.

use crate::client::SportmonksClient;
use crate::errors::AppError;
use crate::models::{
    City, Country, ExpectedFixture, Fixture, Player, Prediction, Season, SquadMember, Stage, Team,
    TopScorer, TypeEntry, Venue,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Related data requested with every fixture page.
const FIXTURE_INCLUDES: &str =
    "events;lineups;statistics;scores;periods;participants;pressure;ballCoordinates";

/// Kickoff times arrive as `"2024-03-01 15:00:00"`.
const KICKOFF_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn decode<T: DeserializeOwned>(records: Vec<Value>, entity: &str) -> Result<Vec<T>, AppError> {
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record)
                .map_err(|e| AppError::InvalidData(format!("bad {} record: {}", entity, e)))
        })
        .collect()
}

/// Fetches fixtures, optionally scoped to a `[start, end]` date window, and
/// derives the participant, score and event fields on each.
pub async fn fixtures(
    api: &SportmonksClient,
    window: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<Fixture>, AppError> {
    let endpoint = match window {
        Some((start, end)) => format!(
            "v3/football/fixtures/between/{}/{}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ),
        None => "v3/football/fixtures".to_string(),
    };
    let raw = api
        .fetch(
            &endpoint,
            &[("per_page", "50"), ("include", FIXTURE_INCLUDES)],
            None,
        )
        .await?;
    let mut fixtures: Vec<Fixture> = decode(raw, "fixture")?;
    for fixture in &mut fixtures {
        normalize_fixture(fixture)?;
    }
    Ok(fixtures)
}

fn normalize_fixture(fixture: &mut Fixture) -> Result<(), AppError> {
    for participant in &mut fixture.participants {
        participant.fixture_id = Some(fixture.id);
        if participant.meta.location.as_deref() == Some("away") {
            fixture.away_team_name = Some(participant.name.clone());
            fixture.away_team_image = participant.image_path.clone();
            fixture.away_team_id = Some(participant.id);
        } else {
            fixture.home_team_name = Some(participant.name.clone());
            fixture.home_team_image = participant.image_path.clone();
            fixture.home_team_id = Some(participant.id);
        }
        if participant.meta.winner.unwrap_or(false) {
            // If the feed flags both sides, the last participant in list
            // order wins.
            fixture.winning_team = Some(participant.name.clone());
            fixture.winning_team_id = Some(participant.id);
        }
    }

    fixture.home_score = 0;
    fixture.away_score = 0;
    for entry in &fixture.scores {
        if entry.description == "CURRENT" {
            if entry.score.participant == "home" {
                fixture.home_score = entry.score.goals;
            } else {
                fixture.away_score = entry.score.goals;
            }
        }
    }
    fixture.score = format!("{} - {}", fixture.home_score, fixture.away_score);

    if !fixture.events.is_empty() {
        let kickoff = fixture.starting_at.as_deref().ok_or_else(|| {
            AppError::InvalidData(format!("fixture {} has events but no starting_at", fixture.id))
        })?;
        let kickoff = NaiveDateTime::parse_from_str(kickoff, KICKOFF_FORMAT).map_err(|e| {
            AppError::InvalidData(format!(
                "fixture {} has an unparsable starting_at {:?}: {}",
                fixture.id, kickoff, e
            ))
        })?;
        let season_id = fixture.season_id;
        for event in &mut fixture.events {
            let minute = event.minute.unwrap_or(0);
            let extra_minute = event.extra_minute.unwrap_or(0);
            event.minute = Some(minute);
            event.extra_minute = Some(extra_minute);
            event.timestamp = Some(kickoff + Duration::minutes(minute + extra_minute));
            event.season_id = season_id;
        }
    }

    let season_id = fixture.season_id;
    for statistic in &mut fixture.statistics {
        statistic.season_id = season_id;
    }

    Ok(())
}

pub async fn types(api: &SportmonksClient) -> Result<Vec<TypeEntry>, AppError> {
    let raw = api
        .fetch("v3/core/types", &[("filter", "populate")], None)
        .await?;
    decode(raw, "type")
}

pub async fn countries(api: &SportmonksClient) -> Result<Vec<Country>, AppError> {
    let raw = api
        .fetch("v3/core/countries", &[("filter", "populate")], None)
        .await?;
    decode(raw, "country")
}

pub async fn stages(api: &SportmonksClient) -> Result<Vec<Stage>, AppError> {
    let raw = api
        .fetch("v3/football/stages", &[("filter", "populate")], None)
        .await?;
    decode(raw, "stage")
}

pub async fn teams(api: &SportmonksClient) -> Result<Vec<Team>, AppError> {
    let raw = api
        .fetch(
            "v3/football/teams",
            &[("per_page", "50"), ("include", "players")],
            None,
        )
        .await?;
    decode(raw, "team")
}

/// Cities carry coordinates as comma-grouped strings; the coercion to float
/// happens in the [`City`] deserializer.
pub async fn cities(api: &SportmonksClient) -> Result<Vec<City>, AppError> {
    let raw = api
        .fetch("v3/core/cities", &[("filter", "populate")], None)
        .await?;
    decode(raw, "city")
}

pub async fn venues(api: &SportmonksClient) -> Result<Vec<Venue>, AppError> {
    let raw = api
        .fetch("v3/football/venues", &[("filter", "populate")], None)
        .await?;
    decode(raw, "venue")
}

fn derive_age(date_of_birth: Option<NaiveDate>, current_year: i32) -> Option<i32> {
    date_of_birth.map(|dob| current_year - dob.year())
}

pub async fn players(api: &SportmonksClient) -> Result<Vec<Player>, AppError> {
    let raw = api
        .fetch("v3/football/players", &[("filter", "populate")], None)
        .await?;
    let mut players: Vec<Player> = decode(raw, "player")?;
    let current_year = Utc::now().year();
    for player in &mut players {
        player.age = derive_age(player.date_of_birth, current_year);
    }
    Ok(players)
}

/// Lists all seasons; also the source of season ids for the all-seasons
/// modes of [`top_scorers`] and of the current-season selection.
pub async fn seasons(api: &SportmonksClient) -> Result<Vec<Season>, AppError> {
    let raw = api
        .fetch("v3/football/seasons", &[("filter", "populate")], None)
        .await?;
    decode(raw, "season")
}

/// Top scorers for one season, or for every season when no id is given.
pub async fn top_scorers(
    api: &SportmonksClient,
    season_id: Option<i64>,
) -> Result<Vec<TopScorer>, AppError> {
    let season_ids: Vec<i64> = match season_id {
        Some(id) => vec![id],
        None => seasons(api).await?.into_iter().map(|s| s.id).collect(),
    };
    let mut scorers = Vec::new();
    for id in season_ids {
        let raw = api
            .fetch(
                &format!("v3/football/topscorers/seasons/{}", id),
                &[("filter", "populate")],
                None,
            )
            .await?;
        scorers.extend(decode::<TopScorer>(raw, "top scorer")?);
    }
    Ok(scorers)
}

/// Two-phase fetch: all team ids first, then one squad request per team,
/// concatenated in team order.
pub async fn squads(api: &SportmonksClient) -> Result<Vec<SquadMember>, AppError> {
    let raw = api
        .fetch("v3/football/teams", &[("filter", "populate")], None)
        .await?;
    let team_ids: Vec<i64> = decode::<Team>(raw, "team")?.into_iter().map(|t| t.id).collect();

    let mut members = Vec::new();
    for team_id in team_ids {
        let raw = api
            .fetch(
                &format!("v3/football/squads/teams/{}", team_id),
                &[("filter", "populate")],
                None,
            )
            .await?;
        members.extend(decode::<SquadMember>(raw, "squad member")?);
    }
    Ok(members)
}

// The expected-goals and prediction endpoints take the plural `filters` key.

pub async fn expected(api: &SportmonksClient) -> Result<Vec<ExpectedFixture>, AppError> {
    let raw = api
        .fetch(
            "v3/football/expected/fixtures",
            &[("filters", "populate")],
            None,
        )
        .await?;
    decode(raw, "expected fixture")
}

pub async fn predictions(api: &SportmonksClient) -> Result<Vec<Prediction>, AppError> {
    let raw = api
        .fetch(
            "v3/football/predictions/probabilities",
            &[("filters", "populate")],
            None,
        )
        .await?;
    decode(raw, "prediction")
}

/// Season records with their statistics include. A single requested season
/// arrives as a bare object and flows through the fetcher as a one-element
/// list, so both modes yield the same shape. Every season's `name` is
/// rewritten to `"<league name> <season name>"`.
pub async fn season_statistics(
    api: &SportmonksClient,
    season_id: Option<i64>,
) -> Result<Vec<Season>, AppError> {
    let endpoint = match season_id {
        Some(id) => format!("v3/football/seasons/{}", id),
        None => "v3/football/seasons".to_string(),
    };
    let raw = api
        .fetch(
            &endpoint,
            &[("per_page", "50"), ("include", "statistics;league")],
            None,
        )
        .await?;
    let mut seasons: Vec<Season> = decode(raw, "season")?;
    for season in &mut seasons {
        let league = season.league.as_ref().ok_or_else(|| {
            AppError::InvalidData(format!("season {} is missing its league include", season.id))
        })?;
        season.name = format!("{} {}", league.name, season.name);
    }
    Ok(seasons)
}
