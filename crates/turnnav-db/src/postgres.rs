//! Postgres-backed [`PlanStore`].
//!
//! Plans live in a single `plans` table with a jsonb `details` column; the
//! storage-form document is written with full decimal digit tokens and read
//! back through [`DocValue::from_json`], so numeric precision survives the
//! round trip.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::document::DocValue;
use crate::models::{PlanRecord, PlanStatus};
use crate::store::{PlanStore, StoreError};

/// Store implementation over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row image; `details` is converted separately because jsonb decodes to
/// plain JSON, not storage form.
#[derive(FromRow)]
struct PlanRow {
    id: Uuid,
    title: String,
    status: PlanStatus,
    details: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PlanRow> for PlanRecord {
    type Error = StoreError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let details = DocValue::from_json(&row.details).map_err(|e| StoreError::Corrupt {
            id: row.id,
            reason: e.to_string(),
        })?;
        Ok(PlanRecord {
            id: row.id,
            title: row.title,
            status: row.status,
            details,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn put(&self, record: &PlanRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO plans (id, title, status, details, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE \
             SET title = EXCLUDED.title, \
                 status = EXCLUDED.status, \
                 details = EXCLUDED.details, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(record.status)
        .bind(record.details.to_stored())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PlanRecord>, StoreError> {
        let row = sqlx::query_as::<_, PlanRow>(
            "SELECT id, title, status, details, created_at, updated_at \
             FROM plans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PlanRecord::try_from).transpose()
    }

    async fn scan(&self, limit: usize) -> Result<Vec<PlanRecord>, StoreError> {
        let rows = sqlx::query_as::<_, PlanRow>(
            "SELECT id, title, status, details, created_at, updated_at \
             FROM plans \
             ORDER BY created_at DESC, id \
             LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PlanRecord::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
