//! Reputation Engine - Main Orchestrator
//!
//! Wires the store handles, trust score adjuster and point policy into the
//! vote ledger and confirmation workflow, and exposes every public
//! operation. Cheap to clone; clones share the same components.

use std::sync::Arc;
use tracing::debug;

use crate::config::ConsistencyConfig;
use crate::confirmation::ConfirmationWorkflow;
use crate::error::{AdjustResult, EngineResult};
use crate::models::{ProfileId, RumourId, UserId, VoteDirection, VoteTally};
use crate::reputation::{
    GamificationPolicy, Outcome, ScoreAdjuster, ScoreAdjustment, StoreScoreAdjuster,
};
use crate::store::{ProfileStore, RumourStore, TransferStore};
use crate::voting::VoteLedger;

#[derive(Clone)]
pub struct ReputationEngine {
    ledger: Arc<VoteLedger>,
    workflow: Arc<ConfirmationWorkflow>,
    adjuster: Arc<dyn ScoreAdjuster>,
}

impl ReputationEngine {
    /// Build over a single store serving every role
    pub fn new<S>(store: Arc<S>, policy: GamificationPolicy, consistency: &ConsistencyConfig) -> Self
    where
        S: RumourStore + ProfileStore + TransferStore + 'static,
    {
        Self::with_stores(store.clone(), store.clone(), store, policy, consistency)
    }

    /// Build over separate handles, e.g. an elevated `transfers` handle
    pub fn with_stores(
        rumours: Arc<dyn RumourStore>,
        profiles: Arc<dyn ProfileStore>,
        transfers: Arc<dyn TransferStore>,
        policy: GamificationPolicy,
        consistency: &ConsistencyConfig,
    ) -> Self {
        let adjuster: Arc<dyn ScoreAdjuster> = Arc::new(
            StoreScoreAdjuster::new(profiles)
                .with_atomic_increment(consistency.atomic_increment_enabled)
                .with_max_write_attempts(consistency.max_write_attempts),
        );
        Self::with_adjuster(rumours, transfers, adjuster, policy, consistency)
    }

    /// Build with a caller-supplied adjuster
    pub fn with_adjuster(
        rumours: Arc<dyn RumourStore>,
        transfers: Arc<dyn TransferStore>,
        adjuster: Arc<dyn ScoreAdjuster>,
        policy: GamificationPolicy,
        consistency: &ConsistencyConfig,
    ) -> Self {
        let ledger = VoteLedger::new(rumours.clone(), adjuster.clone(), policy.clone())
            .with_max_write_attempts(consistency.max_write_attempts);
        let workflow = ConfirmationWorkflow::new(rumours, transfers, adjuster.clone(), policy);

        debug!(
            atomic_increment = consistency.atomic_increment_enabled,
            max_write_attempts = consistency.max_write_attempts,
            "Reputation engine initialized"
        );

        Self {
            ledger: Arc::new(ledger),
            workflow: Arc::new(workflow),
            adjuster,
        }
    }

    /// Record or switch a vote; returns the rumour's new tally
    pub async fn vote(
        &self,
        rumour_id: RumourId,
        user_id: UserId,
        direction: VoteDirection,
    ) -> EngineResult<Outcome<VoteTally>> {
        self.ledger.vote(rumour_id, user_id, direction).await
    }

    pub async fn upvote(&self, rumour_id: RumourId, user_id: UserId) -> EngineResult<Outcome<VoteTally>> {
        self.vote(rumour_id, user_id, VoteDirection::Up).await
    }

    pub async fn downvote(&self, rumour_id: RumourId, user_id: UserId) -> EngineResult<Outcome<VoteTally>> {
        self.vote(rumour_id, user_id, VoteDirection::Down).await
    }

    pub async fn current_vote(
        &self,
        rumour_id: RumourId,
        user_id: UserId,
    ) -> EngineResult<Option<VoteDirection>> {
        self.ledger.current_vote(rumour_id, user_id).await
    }

    pub async fn reconcile_tally(&self, rumour_id: RumourId) -> EngineResult<VoteTally> {
        self.ledger.reconcile_tally(rumour_id).await
    }

    pub async fn confirm(&self, rumour_id: RumourId) -> EngineResult<Outcome<()>> {
        self.workflow.confirm(rumour_id).await
    }

    pub async fn confirm_latest_pending(&self) -> EngineResult<Outcome<RumourId>> {
        self.workflow.confirm_latest_pending().await
    }

    pub async fn deny(&self, rumour_id: RumourId) -> EngineResult<()> {
        self.workflow.deny(rumour_id).await
    }

    /// Direct trust score adjustment, for callers outside the vote/confirm flows
    pub async fn adjust_trust_score(
        &self,
        profile_id: Option<ProfileId>,
        delta: i64,
    ) -> AdjustResult<ScoreAdjustment> {
        self.adjuster.adjust(profile_id, delta).await
    }
}
