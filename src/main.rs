use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sportmonks_sync::client::SportmonksClient;
use sportmonks_sync::config::Config;
use sportmonks_sync::db::Database;
use sportmonks_sync::pipeline;
use sportmonks_sync::storage::SyncStorage;

/// Entry point: `--full` runs the full historical load, otherwise only the
/// current season is refreshed. Exit code is non-zero on any fatal error.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sportmonks_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    let api = SportmonksClient::from_config(&config)?;
    let storage = SyncStorage::new(db.pool.clone());

    let full = std::env::args().any(|arg| arg == "--full");
    if full {
        tracing::info!("Starting full load");
        pipeline::full_load(&api, &storage).await?;
    } else {
        tracing::info!("Starting current-season refresh");
        pipeline::load_season(&api, &storage).await?;
    }

    tracing::info!("Sync complete");
    Ok(())
}
