//! Database Connection Pools using sqlx
//!
//! Two handles: the primary pool runs with the caller's privileges, the
//! service pool bypasses row-level security and is used only to write
//! transfers on behalf of a rumour's creator.

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::{redact_connection_string, EngineConfig};
use crate::database::profiles::ProfileRepository;
use crate::database::rumours::RumourRepository;
use crate::database::transfers::TransferRepository;
use crate::database::votes::VoteRepository;
use crate::error::StoreResult;

pub struct DatabasePool {
    service_pool: PgPool,
    profiles: ProfileRepository,
    rumours: RumourRepository,
    votes: VoteRepository,
    transfers: TransferRepository,
}

impl DatabasePool {
    pub async fn connect(config: &EngineConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.postgres_url)
            .await?;

        info!(
            "Connected to PostgreSQL at {}",
            redact_connection_string(&config.database.postgres_url)
        );

        let service_pool = match config.database.service_postgres_url.as_deref() {
            Some(url) => {
                let service_pool = PgPoolOptions::new()
                    .max_connections(config.database.max_connections)
                    .connect(url)
                    .await?;
                info!("Connected elevated handle at {}", redact_connection_string(url));
                service_pool
            }
            None => pool.clone(),
        };

        Ok(Self::from_pools(pool, service_pool))
    }

    pub fn from_pools(pool: PgPool, service_pool: PgPool) -> Self {
        Self {
            profiles: ProfileRepository::new(pool.clone()),
            rumours: RumourRepository::new(pool.clone()),
            votes: VoteRepository::new(pool.clone()),
            transfers: TransferRepository::new(service_pool.clone()),
            service_pool,
        }
    }

    /// Create tables, constraints and the `increment_trust_score` procedure
    pub async fn init_schema(&self) -> StoreResult<()> {
        info!("Initializing database schema...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id UUID PRIMARY KEY,
                trust_score BIGINT NOT NULL DEFAULT 0 CHECK (trust_score >= 0),
                created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.service_pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rumours (
                id UUID PRIMARY KEY,
                creator_id UUID REFERENCES profiles(id) ON DELETE SET NULL,
                player_name TEXT NOT NULL,
                from_club TEXT NOT NULL,
                to_club TEXT NOT NULL,
                category TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'confirmed', 'denied')),
                votes_up BIGINT NOT NULL DEFAULT 0 CHECK (votes_up >= 0),
                votes_down BIGINT NOT NULL DEFAULT 0 CHECK (votes_down >= 0),
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.service_pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rumour_votes (
                rumour_id UUID NOT NULL REFERENCES rumours(id),
                user_id UUID NOT NULL,
                is_upvote BOOLEAN NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
                PRIMARY KEY (rumour_id, user_id)
            )
            "#,
        )
        .execute(&self.service_pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transfers (
                id UUID PRIMARY KEY,
                player_name TEXT NOT NULL,
                from_club TEXT NOT NULL,
                to_club TEXT NOT NULL,
                category TEXT NOT NULL,
                confirmed_at TIMESTAMP WITH TIME ZONE NOT NULL,
                rumour_id UUID NOT NULL UNIQUE REFERENCES rumours(id)
            )
            "#,
        )
        .execute(&self.service_pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_rumours_pending_created ON rumours(created_at DESC) WHERE status = 'pending'",
        )
        .execute(&self.service_pool)
        .await?;

        sqlx::query(
            r#"
            CREATE OR REPLACE FUNCTION increment_trust_score(profile_id UUID, delta BIGINT)
            RETURNS BIGINT
            LANGUAGE sql
            AS $$
                UPDATE profiles
                SET trust_score = GREATEST(0, trust_score + delta)
                WHERE id = profile_id
                RETURNING trust_score
            $$
            "#,
        )
        .execute(&self.service_pool)
        .await?;

        info!("Database schema initialized");
        Ok(())
    }

    pub fn profiles(&self) -> &ProfileRepository {
        &self.profiles
    }

    pub fn rumours(&self) -> &RumourRepository {
        &self.rumours
    }

    pub fn votes(&self) -> &VoteRepository {
        &self.votes
    }

    pub fn transfers(&self) -> &TransferRepository {
        &self.transfers
    }
}
