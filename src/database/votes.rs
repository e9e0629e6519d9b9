//! Vote Repository - one row per (rumour, user)

use sqlx::{PgPool, Row};

use crate::error::StoreResult;
use crate::models::{RumourId, UserId, Vote, VoteDirection, VoteTally};

pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_vote(&self, rumour_id: RumourId, user_id: UserId) -> StoreResult<Option<Vote>> {
        let row = sqlx::query(
            "SELECT is_upvote FROM rumour_votes WHERE rumour_id = $1 AND user_id = $2",
        )
        .bind(rumour_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let is_upvote: bool = row.try_get("is_upvote")?;
                Ok(Some(Vote::new(
                    rumour_id,
                    user_id,
                    VoteDirection::from_is_upvote(is_upvote),
                )))
            }
            None => Ok(None),
        }
    }

    /// Write the vote and return the direction the row held before.
    ///
    /// `ON CONFLICT DO NOTHING` waits out a concurrent insert of the same
    /// row, and the `FOR UPDATE` read holds the row until commit, so two
    /// overlapping calls for one user never both see the same prior state.
    pub async fn upsert_vote(&self, vote: &Vote) -> StoreResult<Option<VoteDirection>> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO rumour_votes (rumour_id, user_id, is_upvote)
            VALUES ($1, $2, $3)
            ON CONFLICT (rumour_id, user_id) DO NOTHING
            "#,
        )
        .bind(vote.rumour_id)
        .bind(vote.user_id)
        .bind(vote.direction.is_up())
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 1 {
            tx.commit().await?;
            return Ok(None);
        }

        let row = sqlx::query(
            "SELECT is_upvote FROM rumour_votes WHERE rumour_id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(vote.rumour_id)
        .bind(vote.user_id)
        .fetch_one(&mut *tx)
        .await?;
        let previous = VoteDirection::from_is_upvote(row.try_get("is_upvote")?);

        if previous != vote.direction {
            sqlx::query(
                r#"
                UPDATE rumour_votes SET is_upvote = $3, updated_at = NOW()
                WHERE rumour_id = $1 AND user_id = $2
                "#,
            )
            .bind(vote.rumour_id)
            .bind(vote.user_id)
            .bind(vote.direction.is_up())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(previous))
    }

    pub async fn count_votes(&self, rumour_id: RumourId) -> StoreResult<VoteTally> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) FILTER (WHERE is_upvote) AS votes_up,
                   COUNT(*) FILTER (WHERE NOT is_upvote) AS votes_down
            FROM rumour_votes
            WHERE rumour_id = $1
            "#,
        )
        .bind(rumour_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(VoteTally::new(row.try_get("votes_up")?, row.try_get("votes_down")?))
    }
}
