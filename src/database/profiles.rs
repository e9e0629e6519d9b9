//! Profile Repository - trust score reads and writes

use sqlx::{PgPool, Row};
use tracing::debug;

use crate::database::has_code;
use crate::error::{StoreError, StoreResult};
use crate::models::ProfileId;

/// Postgres error code for a call to a function that does not exist
const UNDEFINED_FUNCTION: &str = "42883";

pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Call the `increment_trust_score` procedure.
    /// Deployments that never installed it get `StoreError::Unsupported`.
    pub async fn increment_trust_score(&self, id: ProfileId, delta: i64) -> StoreResult<Option<i64>> {
        let row = sqlx::query("SELECT increment_trust_score($1, $2) AS trust_score")
            .bind(id)
            .bind(delta)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if has_code(&e, UNDEFINED_FUNCTION) {
                    StoreError::Unsupported("increment_trust_score")
                } else {
                    StoreError::Database(e)
                }
            })?;

        let score: Option<i64> = row.try_get("trust_score")?;
        debug!(profile_id = %id, delta = delta, "Trust score incremented atomically");
        Ok(score)
    }

    pub async fn get_trust_score(&self, id: ProfileId) -> StoreResult<Option<i64>> {
        let row = sqlx::query("SELECT trust_score FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("trust_score")?)),
            None => Ok(None),
        }
    }

    pub async fn compare_and_set_trust_score(
        &self,
        id: ProfileId,
        expected: i64,
        new: i64,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE profiles SET trust_score = $3 WHERE id = $1 AND trust_score = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(new.max(0))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
