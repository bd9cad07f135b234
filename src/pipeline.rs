//! Load strategies: full historical load and current-season refresh.

use crate::client::SportmonksClient;
use crate::errors::{AppError, ResultExt};
use crate::extract;
use crate::models::Season;
use crate::storage::SyncStorage;

/// Loads every entity the pipeline knows about.
pub async fn full_load(api: &SportmonksClient, storage: &SyncStorage) -> Result<(), AppError> {
    // Semi-live
    let fixtures = extract::fixtures(api, None).await.context("extracting fixtures")?;
    storage.run(&fixtures, "fixtures").await?;
    let top_scorers = extract::top_scorers(api, None)
        .await
        .context("extracting top scorers")?;
    storage.run(&top_scorers, "top_scorers").await?;
    let season_stats = extract::season_statistics(api, None)
        .await
        .context("extracting season statistics")?;
    storage.run(&season_stats, "seasons").await?;
    let predictions = extract::predictions(api).await.context("extracting predictions")?;
    storage.run(&predictions, "predictions").await?;
    let expected = extract::expected(api).await.context("extracting expected goals")?;
    storage.run(&expected, "expected").await?;

    // Once a day
    let types = extract::types(api).await.context("extracting types")?;
    storage.run(&types, "types").await?;
    let countries = extract::countries(api).await.context("extracting countries")?;
    storage.run(&countries, "countries").await?;
    let cities = extract::cities(api).await.context("extracting cities")?;
    storage.run(&cities, "cities").await?;
    let stages = extract::stages(api).await.context("extracting stages")?;
    storage.run(&stages, "stages").await?;
    let teams = extract::teams(api).await.context("extracting teams")?;
    storage.run(&teams, "teams").await?;
    let players = extract::players(api).await.context("extracting players")?;
    storage.run(&players, "players").await?;
    let squads = extract::squads(api).await.context("extracting squads")?;
    storage.run(&squads, "squads").await?;
    let venues = extract::venues(api).await.context("extracting venues")?;
    storage.run(&venues, "venues").await?;

    Ok(())
}

/// Picks the season the provider flags as currently in play.
///
/// No matching season is a fatal error; a refresh without a current season
/// has nothing to scope to.
pub fn current_season(seasons: &[Season]) -> Result<&Season, AppError> {
    seasons
        .iter()
        .find(|s| s.games_in_current_week)
        .ok_or_else(|| {
            AppError::NotFound("no season with games_in_current_week set".to_string())
        })
}

/// Only loads data for the current season (to speed up refreshes).
pub async fn load_season(api: &SportmonksClient, storage: &SyncStorage) -> Result<(), AppError> {
    let seasons = extract::seasons(api).await.context("listing seasons")?;
    let current = current_season(&seasons)?;
    let window = match (current.starting_at, current.ending_at) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(AppError::InvalidData(format!(
                "season {} has no date window",
                current.id
            )))
        }
    };
    let season_id = current.id;
    tracing::info!(
        "Refreshing current season {} ({} to {})",
        season_id,
        window.0,
        window.1
    );

    let fixtures = extract::fixtures(api, Some(window))
        .await
        .context("extracting fixtures")?;
    storage.run(&fixtures, "fixtures").await?;
    let top_scorers = extract::top_scorers(api, Some(season_id))
        .await
        .context("extracting top scorers")?;
    storage.run(&top_scorers, "top_scorers").await?;
    let season_stats = extract::season_statistics(api, Some(season_id))
        .await
        .context("extracting season statistics")?;
    storage.run(&season_stats, "seasons").await?;
    let predictions = extract::predictions(api).await.context("extracting predictions")?;
    storage.run(&predictions, "predictions").await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn season(id: i64, current: bool) -> Season {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("2024/2025 #{}", id),
            "games_in_current_week": current,
            "starting_at": "2024-08-01",
            "ending_at": "2025-05-31"
        }))
        .unwrap()
    }

    #[test]
    fn picks_the_flagged_season() {
        let seasons = vec![season(1, false), season(2, true), season(3, false)];
        assert_eq!(current_season(&seasons).unwrap().id, 2);
    }

    #[test]
    fn first_flagged_season_wins() {
        let seasons = vec![season(1, true), season(2, true)];
        assert_eq!(current_season(&seasons).unwrap().id, 1);
    }

    #[test]
    fn no_current_season_is_fatal() {
        let seasons = vec![season(1, false)];
        let err = current_season(&seasons).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(matches!(current_season(&[]), Err(AppError::NotFound(_))));
    }
}
