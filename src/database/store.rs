//! Store trait implementations over the PostgreSQL repositories

use async_trait::async_trait;
use std::sync::Arc;

use crate::database::DatabasePool;
use crate::error::StoreResult;
use crate::models::{
    ProfileId, Rumour, RumourId, RumourStatus, Transfer, UserId, Vote, VoteDirection, VoteTally,
};
use crate::store::{ProfileStore, RumourStore, TransferStore};

/// Serves every store role; transfer writes go through the elevated pool
#[derive(Clone)]
pub struct PgStore {
    db: Arc<DatabasePool>,
}

impl PgStore {
    pub fn new(db: Arc<DatabasePool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RumourStore for PgStore {
    async fn get_rumour(&self, id: RumourId) -> StoreResult<Option<Rumour>> {
        self.db.rumours().get_rumour(id).await
    }

    async fn latest_pending_rumour(&self) -> StoreResult<Option<Rumour>> {
        self.db.rumours().latest_pending_rumour().await
    }

    async fn compare_and_set_tally(
        &self,
        id: RumourId,
        expected: VoteTally,
        new: VoteTally,
    ) -> StoreResult<bool> {
        self.db.rumours().compare_and_set_tally(id, expected, new).await
    }

    async fn overwrite_tally(&self, id: RumourId, tally: VoteTally) -> StoreResult<()> {
        self.db.rumours().overwrite_tally(id, tally).await
    }

    async fn transition_status(
        &self,
        id: RumourId,
        from: RumourStatus,
        to: RumourStatus,
    ) -> StoreResult<bool> {
        self.db.rumours().transition_status(id, from, to).await
    }

    async fn get_vote(&self, rumour_id: RumourId, user_id: UserId) -> StoreResult<Option<Vote>> {
        self.db.votes().get_vote(rumour_id, user_id).await
    }

    async fn upsert_vote(&self, vote: &Vote) -> StoreResult<Option<VoteDirection>> {
        self.db.votes().upsert_vote(vote).await
    }

    async fn count_votes(&self, rumour_id: RumourId) -> StoreResult<VoteTally> {
        self.db.votes().count_votes(rumour_id).await
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn increment_trust_score(&self, id: ProfileId, delta: i64) -> StoreResult<Option<i64>> {
        self.db.profiles().increment_trust_score(id, delta).await
    }

    async fn get_trust_score(&self, id: ProfileId) -> StoreResult<Option<i64>> {
        self.db.profiles().get_trust_score(id).await
    }

    async fn compare_and_set_trust_score(
        &self,
        id: ProfileId,
        expected: i64,
        new: i64,
    ) -> StoreResult<bool> {
        self.db
            .profiles()
            .compare_and_set_trust_score(id, expected, new)
            .await
    }
}

#[async_trait]
impl TransferStore for PgStore {
    async fn insert_transfer(&self, transfer: &Transfer) -> StoreResult<()> {
        self.db.transfers().insert_transfer(transfer).await
    }

    async fn get_transfer_for_rumour(&self, rumour_id: RumourId) -> StoreResult<Option<Transfer>> {
        self.db.transfers().get_transfer_for_rumour(rumour_id).await
    }

    async fn delete_transfer_for_rumour(&self, rumour_id: RumourId) -> StoreResult<bool> {
        self.db.transfers().delete_transfer_for_rumour(rumour_id).await
    }
}
