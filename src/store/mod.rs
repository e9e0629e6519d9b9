//! Store interfaces
//!
//! The engine reaches the persistent store only through these traits.
//! `RumourStore` and `ProfileStore` run with the caller's privileges;
//! `TransferStore` is the elevated handle that may write on behalf of a
//! rumour's creator.
//!
//! Implementations:
//! - `database::PgStore` - PostgreSQL
//! - `MemoryStore` - in-process maps, used by tests

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{
    ProfileId, Rumour, RumourId, RumourStatus, Transfer, UserId, Vote, VoteDirection, VoteTally,
};

pub use memory::{MemoryStore, StoreFault};

#[async_trait]
pub trait RumourStore: Send + Sync {
    async fn get_rumour(&self, id: RumourId) -> StoreResult<Option<Rumour>>;

    /// Most recently created rumour still pending
    async fn latest_pending_rumour(&self) -> StoreResult<Option<Rumour>>;

    /// Write the tally only if the stored counts still equal `expected`.
    /// Returns `false` when the counts moved (or the rumour vanished).
    async fn compare_and_set_tally(
        &self,
        id: RumourId,
        expected: VoteTally,
        new: VoteTally,
    ) -> StoreResult<bool>;

    /// Unconditional tally write, used when recounting from vote rows
    async fn overwrite_tally(&self, id: RumourId, tally: VoteTally) -> StoreResult<()>;

    /// Move `from` -> `to` only if the rumour is still in `from`
    async fn transition_status(
        &self,
        id: RumourId,
        from: RumourStatus,
        to: RumourStatus,
    ) -> StoreResult<bool>;

    async fn get_vote(&self, rumour_id: RumourId, user_id: UserId) -> StoreResult<Option<Vote>>;

    /// Insert, or flip the direction of the existing (rumour, user) row.
    ///
    /// Returns the direction the row held before the call, read and written
    /// as one step so overlapping calls for the same user serialize. A row
    /// already holding `vote.direction` is left untouched.
    async fn upsert_vote(&self, vote: &Vote) -> StoreResult<Option<VoteDirection>>;

    /// Count vote rows per direction
    async fn count_votes(&self, rumour_id: RumourId) -> StoreResult<VoteTally>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Optional server-side atomic increment, clamped at zero.
    /// Returns the new score, or `None` if the profile does not exist.
    /// Deployments without the capability return `StoreError::Unsupported`.
    async fn increment_trust_score(&self, id: ProfileId, delta: i64) -> StoreResult<Option<i64>>;

    async fn get_trust_score(&self, id: ProfileId) -> StoreResult<Option<i64>>;

    /// Write `new` only if the score still equals `expected`
    async fn compare_and_set_trust_score(
        &self,
        id: ProfileId,
        expected: i64,
        new: i64,
    ) -> StoreResult<bool>;
}

#[async_trait]
pub trait TransferStore: Send + Sync {
    /// Fails with `StoreError::AlreadyExists` if the rumour already has a transfer
    async fn insert_transfer(&self, transfer: &Transfer) -> StoreResult<()>;

    async fn get_transfer_for_rumour(&self, rumour_id: RumourId) -> StoreResult<Option<Transfer>>;

    /// Remove a rumour's transfer; returns whether one existed
    async fn delete_transfer_for_rumour(&self, rumour_id: RumourId) -> StoreResult<bool>;
}
