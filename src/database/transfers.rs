//! Transfer Repository - runs on the elevated (service role) pool

use sqlx::{PgPool, Row};
use tracing::debug;

use crate::database::has_code;
use crate::error::{StoreError, StoreResult};
use crate::models::{RumourId, Transfer, TransferCategory};

/// Postgres error code for a unique constraint violation
const UNIQUE_VIOLATION: &str = "23505";

pub struct TransferRepository {
    pool: PgPool,
}

impl TransferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_transfer(&self, transfer: &Transfer) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO transfers
            (id, player_name, from_club, to_club, category, confirmed_at, rumour_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(transfer.id)
        .bind(&transfer.player_name)
        .bind(&transfer.from_club)
        .bind(&transfer.to_club)
        .bind(transfer.category.as_str())
        .bind(transfer.confirmed_at)
        .bind(transfer.rumour_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if has_code(&e, UNIQUE_VIOLATION) {
                StoreError::already_exists("transfer for rumour", transfer.rumour_id)
            } else {
                StoreError::Database(e)
            }
        })?;

        debug!(transfer_id = %transfer.id, rumour_id = %transfer.rumour_id, "Transfer inserted");
        Ok(())
    }

    pub async fn get_transfer_for_rumour(&self, rumour_id: RumourId) -> StoreResult<Option<Transfer>> {
        let row = sqlx::query(
            r#"
            SELECT id, player_name, from_club, to_club, category, confirmed_at, rumour_id
            FROM transfers
            WHERE rumour_id = $1
            "#,
        )
        .bind(rumour_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let category: String = row.try_get("category")?;
        let category = TransferCategory::from_db(&category).ok_or(StoreError::InvalidValue {
            field: "transfers.category",
            value: category.clone(),
        })?;

        Ok(Some(Transfer {
            id: row.try_get("id")?,
            player_name: row.try_get("player_name")?,
            from_club: row.try_get("from_club")?,
            to_club: row.try_get("to_club")?,
            category,
            confirmed_at: row.try_get("confirmed_at")?,
            rumour_id: row.try_get("rumour_id")?,
        }))
    }

    pub async fn delete_transfer_for_rumour(&self, rumour_id: RumourId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM transfers WHERE rumour_id = $1")
            .bind(rumour_id)
            .execute(&self.pool)
            .await?;

        debug!(rumour_id = %rumour_id, removed = result.rows_affected(), "Transfer removed");
        Ok(result.rows_affected() > 0)
    }
}
