//! Rumour Repository - rumour rows, tallies and status transitions

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::models::{Rumour, RumourCategory, RumourId, RumourStatus, VoteTally};

const RUMOUR_COLUMNS: &str = "id, creator_id, player_name, from_club, to_club, category, status, votes_up, votes_down, created_at";

pub struct RumourRepository {
    pool: PgPool,
}

impl RumourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_rumour(&self, id: RumourId) -> StoreResult<Option<Rumour>> {
        let row = sqlx::query(&format!("SELECT {} FROM rumours WHERE id = $1", RUMOUR_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(rumour_from_row).transpose()
    }

    pub async fn latest_pending_rumour(&self) -> StoreResult<Option<Rumour>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM rumours WHERE status = 'pending' ORDER BY created_at DESC LIMIT 1",
            RUMOUR_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(rumour_from_row).transpose()
    }

    pub async fn compare_and_set_tally(
        &self,
        id: RumourId,
        expected: VoteTally,
        new: VoteTally,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE rumours SET votes_up = $4, votes_down = $5
            WHERE id = $1 AND votes_up = $2 AND votes_down = $3
            "#,
        )
        .bind(id)
        .bind(expected.votes_up)
        .bind(expected.votes_down)
        .bind(new.votes_up)
        .bind(new.votes_down)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn overwrite_tally(&self, id: RumourId, tally: VoteTally) -> StoreResult<()> {
        sqlx::query("UPDATE rumours SET votes_up = $2, votes_down = $3 WHERE id = $1")
            .bind(id)
            .bind(tally.votes_up)
            .bind(tally.votes_down)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn transition_status(
        &self,
        id: RumourId,
        from: RumourStatus,
        to: RumourStatus,
    ) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE rumours SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(&self.pool)
            .await?;

        let applied = result.rows_affected() == 1;
        debug!(rumour_id = %id, from = from.as_str(), to = to.as_str(), applied = applied, "Status transition");
        Ok(applied)
    }
}

fn rumour_from_row(row: &PgRow) -> StoreResult<Rumour> {
    let status: String = row.try_get("status")?;
    let status = RumourStatus::from_db(&status).ok_or(StoreError::InvalidValue {
        field: "rumours.status",
        value: status.clone(),
    })?;
    let category: String = row.try_get("category")?;

    Ok(Rumour {
        id: row.try_get("id")?,
        creator_id: row.try_get("creator_id")?,
        player_name: row.try_get("player_name")?,
        from_club: row.try_get("from_club")?,
        to_club: row.try_get("to_club")?,
        category: RumourCategory::from_db(&category),
        status,
        votes_up: row.try_get("votes_up")?,
        votes_down: row.try_get("votes_down")?,
        created_at: row.try_get("created_at")?,
    })
}
