use crate::errors::AppError;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;

/// Merge-upsert sink for extracted entity batches.
///
/// Destination tables share one shape: the provider id as primary key and
/// the full record as JSONB. Tables are created on first use.
pub struct SyncStorage {
    pool: PgPool,
}

impl SyncStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Merges a batch of records into `table`, keyed on the provider `id`.
    ///
    /// Re-running with the same records is idempotent; records with no
    /// integer `id` are logged and skipped. Returns the number of records
    /// written.
    pub async fn run<T: Serialize>(&self, records: &[T], table: &str) -> Result<u64, AppError> {
        self.ensure_table(table).await?;

        let mut written = 0u64;
        for record in records {
            let value = serde_json::to_value(record).map_err(|e| {
                AppError::InvalidData(format!("record for {} does not serialize: {}", table, e))
            })?;
            let id = match value.get("id").and_then(Value::as_i64) {
                Some(id) => id,
                None => {
                    tracing::warn!("Skipping record without an integer id for {}", table);
                    continue;
                }
            };

            sqlx::query(&format!(
                "INSERT INTO {} (id, record, loaded_at) VALUES ($1, $2, now()) \
                 ON CONFLICT (id) DO UPDATE SET record = EXCLUDED.record, loaded_at = now()",
                table
            ))
            .bind(id)
            .bind(&value)
            .execute(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;
            written += 1;
        }

        tracing::info!("Merged {} records into {}", written, table);
        Ok(written)
    }

    async fn ensure_table(&self, table: &str) -> Result<(), AppError> {
        // Identifiers cannot be bound as parameters; only the orchestrator's
        // snake_case table names are accepted.
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
            return Err(AppError::InvalidData(format!(
                "invalid table name {:?}",
                table
            )));
        }
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             id BIGINT PRIMARY KEY, \
             record JSONB NOT NULL, \
             loaded_at TIMESTAMPTZ NOT NULL DEFAULT now())",
            table
        ))
        .execute(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;
        Ok(())
    }
}
