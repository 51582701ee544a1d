use crate::sync::SchemaConnection;
use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::warn;

/// PostgreSQL connection used by the sync tool.
#[derive(Clone)]
pub struct PostgresSchema {
    pool: PgPool,
}

impl PostgresSchema {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl SchemaConnection for PostgresSchema {
    async fn table_columns(&mut self, table: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT column_name::text
             FROM information_schema.columns
             WHERE table_schema = current_schema() AND table_name = $1
             ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to describe table {}", table))?;

        Ok(rows.into_iter().map(|(column,)| column).collect())
    }

    async fn add_column(&mut self, table: &str, column: &str, sql: &str) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        match sqlx::query(sql).execute(&mut *tx).await {
            Ok(_) => {
                tx.commit()
                    .await
                    .with_context(|| format!("Failed to commit column {}.{}", table, column))?;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, table, column, "Rollback failed");
                }
                Err(e).with_context(|| format!("Failed to add column {}.{}", table, column))
            }
        }
    }
}
