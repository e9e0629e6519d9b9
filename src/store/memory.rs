//! In-memory store
//!
//! Each method takes its map lock once, so individual calls are atomic the
//! way single statements are in PostgreSQL. Faults can be injected per
//! operation class, and the atomic increment capability can be switched off
//! to exercise the fallback path.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{ProfileStore, RumourStore, TransferStore};
use crate::error::{StoreError, StoreResult};
use crate::models::profile::clamped_score;
use crate::models::{
    Profile, ProfileId, Rumour, RumourId, RumourStatus, Transfer, UserId, Vote, VoteDirection,
    VoteTally,
};

/// Operation classes that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreFault {
    TransferWrite,
    StatusWrite,
    TallyWrite,
    VoteWrite,
    ScoreRead,
    ScoreWrite,
}

pub struct MemoryStore {
    profiles: RwLock<HashMap<ProfileId, i64>>,
    rumours: RwLock<HashMap<RumourId, Rumour>>,
    votes: RwLock<HashMap<(RumourId, UserId), Vote>>,
    transfers: RwLock<HashMap<RumourId, Transfer>>,
    atomic_increment: AtomicBool,
    faults: RwLock<HashSet<StoreFault>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            rumours: RwLock::new(HashMap::new()),
            votes: RwLock::new(HashMap::new()),
            transfers: RwLock::new(HashMap::new()),
            atomic_increment: AtomicBool::new(true),
            faults: RwLock::new(HashSet::new()),
        }
    }

    /// Store without the atomic increment procedure
    pub fn without_atomic_increment() -> Self {
        let store = Self::new();
        store.set_atomic_increment(false);
        store
    }

    pub fn set_atomic_increment(&self, available: bool) {
        self.atomic_increment.store(available, Ordering::SeqCst);
    }

    pub async fn inject_fault(&self, fault: StoreFault) {
        self.faults.write().await.insert(fault);
    }

    pub async fn clear_fault(&self, fault: StoreFault) {
        self.faults.write().await.remove(&fault);
    }

    async fn check(&self, fault: StoreFault) -> StoreResult<()> {
        if self.faults.read().await.contains(&fault) {
            return Err(StoreError::Unavailable(format!("injected {:?} fault", fault)));
        }
        Ok(())
    }

    pub async fn insert_profile(&self, profile: Profile) {
        self.profiles.write().await.insert(profile.id, profile.trust_score);
    }

    pub async fn insert_rumour(&self, rumour: Rumour) {
        self.rumours.write().await.insert(rumour.id, rumour);
    }

    /// Seed a vote row without touching tallies
    pub async fn insert_vote(&self, vote: Vote) {
        self.votes.write().await.insert((vote.rumour_id, vote.user_id), vote);
    }

    pub async fn profile(&self, id: ProfileId) -> Option<Profile> {
        self.profiles
            .read()
            .await
            .get(&id)
            .map(|score| Profile { id, trust_score: *score })
    }

    pub async fn rumour(&self, id: RumourId) -> Option<Rumour> {
        self.rumours.read().await.get(&id).cloned()
    }

    pub async fn transfers(&self) -> Vec<Transfer> {
        self.transfers.read().await.values().cloned().collect()
    }

    pub async fn votes_for(&self, rumour_id: RumourId) -> Vec<Vote> {
        self.votes
            .read()
            .await
            .values()
            .filter(|v| v.rumour_id == rumour_id)
            .cloned()
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RumourStore for MemoryStore {
    async fn get_rumour(&self, id: RumourId) -> StoreResult<Option<Rumour>> {
        Ok(self.rumours.read().await.get(&id).cloned())
    }

    async fn latest_pending_rumour(&self) -> StoreResult<Option<Rumour>> {
        let rumours = self.rumours.read().await;
        Ok(rumours
            .values()
            .filter(|r| r.is_pending())
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn compare_and_set_tally(
        &self,
        id: RumourId,
        expected: VoteTally,
        new: VoteTally,
    ) -> StoreResult<bool> {
        self.check(StoreFault::TallyWrite).await?;
        let mut rumours = self.rumours.write().await;
        match rumours.get_mut(&id) {
            Some(rumour) if rumour.tally() == expected => {
                rumour.votes_up = new.votes_up;
                rumour.votes_down = new.votes_down;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn overwrite_tally(&self, id: RumourId, tally: VoteTally) -> StoreResult<()> {
        self.check(StoreFault::TallyWrite).await?;
        let mut rumours = self.rumours.write().await;
        if let Some(rumour) = rumours.get_mut(&id) {
            rumour.votes_up = tally.votes_up;
            rumour.votes_down = tally.votes_down;
        }
        Ok(())
    }

    async fn transition_status(
        &self,
        id: RumourId,
        from: RumourStatus,
        to: RumourStatus,
    ) -> StoreResult<bool> {
        self.check(StoreFault::StatusWrite).await?;
        let mut rumours = self.rumours.write().await;
        match rumours.get_mut(&id) {
            Some(rumour) if rumour.status == from => {
                rumour.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_vote(&self, rumour_id: RumourId, user_id: UserId) -> StoreResult<Option<Vote>> {
        Ok(self.votes.read().await.get(&(rumour_id, user_id)).cloned())
    }

    async fn upsert_vote(&self, vote: &Vote) -> StoreResult<Option<VoteDirection>> {
        self.check(StoreFault::VoteWrite).await?;
        let previous = self
            .votes
            .write()
            .await
            .insert((vote.rumour_id, vote.user_id), vote.clone());
        Ok(previous.map(|v| v.direction))
    }

    async fn count_votes(&self, rumour_id: RumourId) -> StoreResult<VoteTally> {
        let votes = self.votes.read().await;
        let tally = votes
            .values()
            .filter(|v| v.rumour_id == rumour_id)
            .fold(VoteTally::default(), |tally, v| match v.direction {
                VoteDirection::Up => VoteTally::new(tally.votes_up + 1, tally.votes_down),
                VoteDirection::Down => VoteTally::new(tally.votes_up, tally.votes_down + 1),
            });
        Ok(tally)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn increment_trust_score(&self, id: ProfileId, delta: i64) -> StoreResult<Option<i64>> {
        if !self.atomic_increment.load(Ordering::SeqCst) {
            return Err(StoreError::Unsupported("increment_trust_score"));
        }
        self.check(StoreFault::ScoreWrite).await?;
        let mut profiles = self.profiles.write().await;
        Ok(profiles.get_mut(&id).map(|score| {
            *score = clamped_score(*score, delta);
            *score
        }))
    }

    async fn get_trust_score(&self, id: ProfileId) -> StoreResult<Option<i64>> {
        self.check(StoreFault::ScoreRead).await?;
        Ok(self.profiles.read().await.get(&id).copied())
    }

    async fn compare_and_set_trust_score(
        &self,
        id: ProfileId,
        expected: i64,
        new: i64,
    ) -> StoreResult<bool> {
        self.check(StoreFault::ScoreWrite).await?;
        let mut profiles = self.profiles.write().await;
        match profiles.get_mut(&id) {
            Some(score) if *score == expected => {
                *score = new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl TransferStore for MemoryStore {
    async fn insert_transfer(&self, transfer: &Transfer) -> StoreResult<()> {
        self.check(StoreFault::TransferWrite).await?;
        let mut transfers = self.transfers.write().await;
        if transfers.contains_key(&transfer.rumour_id) {
            return Err(StoreError::already_exists("transfer for rumour", transfer.rumour_id));
        }
        transfers.insert(transfer.rumour_id, transfer.clone());
        Ok(())
    }

    async fn get_transfer_for_rumour(&self, rumour_id: RumourId) -> StoreResult<Option<Transfer>> {
        Ok(self.transfers.read().await.get(&rumour_id).cloned())
    }

    async fn delete_transfer_for_rumour(&self, rumour_id: RumourId) -> StoreResult<bool> {
        self.check(StoreFault::TransferWrite).await?;
        Ok(self.transfers.write().await.remove(&rumour_id).is_some())
    }
}
