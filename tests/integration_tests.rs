//! Integration tests for the rumour reputation engine
//!
//! These tests drive the public `ReputationEngine` against the in-memory
//! store: vote recording and switching, tally consistency, confirmation
//! into transfers, trust score bonuses on both the atomic and fallback
//! paths, and behavior under concurrent voters.

use async_trait::async_trait;
use rumour_ledger::config::ConsistencyConfig;
use rumour_ledger::{
    AdjustError, BonusOutcome, EngineError, GamificationPolicy, MemoryStore, Profile, ProfileId,
    ReputationEngine, Rumour, RumourCategory, RumourId, RumourStatus, ScoreAdjuster,
    ScoreAdjustment, SkipReason, StoreFault, TransferCategory, VoteDirection, VoteTally,
};
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// Test Helpers
// ============================================================================

/// Engine over a fresh store, with one creator profile and one pending rumour
struct Scenario {
    store: Arc<MemoryStore>,
    engine: ReputationEngine,
    rumour_id: RumourId,
    creator: ProfileId,
}

async fn create_scenario(store: MemoryStore, creator_score: i64, consistency: ConsistencyConfig) -> Scenario {
    let store = Arc::new(store);
    let creator = Uuid::new_v4();
    store.insert_profile(Profile::new(creator, creator_score)).await;

    let rumour = Rumour::new(
        Some(creator),
        "Marco Verratti",
        "Paris Saint-Germain",
        "Al-Arabi",
        RumourCategory::PlayerTransfer,
    );
    let rumour_id = rumour.id;
    store.insert_rumour(rumour).await;

    let engine = ReputationEngine::new(store.clone(), GamificationPolicy::default(), &consistency);

    Scenario {
        store,
        engine,
        rumour_id,
        creator,
    }
}

async fn default_scenario() -> Scenario {
    create_scenario(MemoryStore::new(), 10, ConsistencyConfig::default()).await
}

async fn trust_score(store: &MemoryStore, id: ProfileId) -> i64 {
    store.profile(id).await.expect("profile exists").trust_score
}

async fn tally(store: &MemoryStore, id: RumourId) -> VoteTally {
    store.rumour(id).await.expect("rumour exists").tally()
}

// ============================================================================
// End-to-End Scenario
// ============================================================================

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn test_vote_switch_and_confirm_flow() {
        let s = default_scenario().await;
        let voter = Uuid::new_v4();

        // Fresh upvote: tally 1/0, creator 10 -> 11
        let outcome = s.engine.upvote(s.rumour_id, voter).await.unwrap();
        assert_eq!(outcome.value, VoteTally::new(1, 0));
        assert_eq!(trust_score(&s.store, s.creator).await, 11);

        // Same direction again: rejected, nothing changes
        let err = s.engine.upvote(s.rumour_id, voter).await.unwrap_err();
        assert!(matches!(err, EngineError::DuplicateVote(_)));
        assert!(err.is_user_rejection());
        assert_eq!(tally(&s.store, s.rumour_id).await, VoteTally::new(1, 0));
        assert_eq!(trust_score(&s.store, s.creator).await, 11);

        // Switch to down: 0/1, score untouched
        let outcome = s.engine.downvote(s.rumour_id, voter).await.unwrap();
        assert_eq!(outcome.value, VoteTally::new(0, 1));
        assert_eq!(outcome.bonus, BonusOutcome::Skipped(SkipReason::NotFreshUpvote));
        assert_eq!(trust_score(&s.store, s.creator).await, 11);

        // Confirm: status confirmed, one transfer, creator 11 -> 16
        let outcome = s.engine.confirm(s.rumour_id).await.unwrap();
        assert!(outcome.bonus.is_applied());

        let rumour = s.store.rumour(s.rumour_id).await.unwrap();
        assert_eq!(rumour.status, RumourStatus::Confirmed);

        let transfers = s.store.transfers().await;
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].rumour_id, s.rumour_id);
        assert_eq!(transfers[0].player_name, "Marco Verratti");
        assert_eq!(transfers[0].category, TransferCategory::Player);
        assert_eq!(trust_score(&s.store, s.creator).await, 16);
    }

    #[tokio::test]
    async fn test_same_flow_without_atomic_increment() {
        let s = create_scenario(
            MemoryStore::without_atomic_increment(),
            10,
            ConsistencyConfig::default(),
        )
        .await;
        let voter = Uuid::new_v4();

        let outcome = s.engine.upvote(s.rumour_id, voter).await.unwrap();
        assert!(matches!(
            outcome.bonus,
            BonusOutcome::Applied {
                adjustment: ScoreAdjustment::Fallback { previous: 10, new_score: 11 },
                ..
            }
        ));

        s.engine.confirm(s.rumour_id).await.unwrap();
        assert_eq!(trust_score(&s.store, s.creator).await, 16);
    }
}

// ============================================================================
// Vote Ledger Properties
// ============================================================================

mod voting {
    use super::*;

    #[tokio::test]
    async fn test_one_vote_row_per_user_reflecting_last_direction() {
        let s = default_scenario().await;
        let voter = Uuid::new_v4();

        s.engine.upvote(s.rumour_id, voter).await.unwrap();
        s.engine.downvote(s.rumour_id, voter).await.unwrap();
        s.engine.upvote(s.rumour_id, voter).await.unwrap();
        let _ = s.engine.upvote(s.rumour_id, voter).await;

        let votes = s.store.votes_for(s.rumour_id).await;
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].direction, VoteDirection::Up);
        assert_eq!(
            s.engine.current_vote(s.rumour_id, voter).await.unwrap(),
            Some(VoteDirection::Up)
        );
    }

    #[tokio::test]
    async fn test_tally_matches_vote_rows() {
        let s = default_scenario().await;
        let voters: Vec<_> = (0..6).map(|_| Uuid::new_v4()).collect();

        for (i, voter) in voters.iter().enumerate() {
            let direction = if i % 3 == 0 { VoteDirection::Down } else { VoteDirection::Up };
            s.engine.vote(s.rumour_id, *voter, direction).await.unwrap();
        }
        // Two voters change their minds
        s.engine.upvote(s.rumour_id, voters[0]).await.unwrap();
        s.engine.downvote(s.rumour_id, voters[1]).await.unwrap();

        let stored = tally(&s.store, s.rumour_id).await;
        assert_eq!(stored.total(), s.store.votes_for(s.rumour_id).await.len() as i64);
        assert_eq!(stored, VoteTally::new(4, 2));
        assert_eq!(s.engine.reconcile_tally(s.rumour_id).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn test_switch_never_double_counts() {
        let s = default_scenario().await;
        let voter = Uuid::new_v4();

        s.engine.downvote(s.rumour_id, voter).await.unwrap();
        let outcome = s.engine.upvote(s.rumour_id, voter).await.unwrap();
        assert_eq!(outcome.value, VoteTally::new(1, 0));
    }

    #[tokio::test]
    async fn test_downvote_never_changes_score() {
        let s = default_scenario().await;

        let outcome = s.engine.downvote(s.rumour_id, Uuid::new_v4()).await.unwrap();
        assert_eq!(outcome.bonus, BonusOutcome::Skipped(SkipReason::Downvote));
        assert_eq!(trust_score(&s.store, s.creator).await, 10);
    }

    #[tokio::test]
    async fn test_vote_on_missing_rumour() {
        let s = default_scenario().await;
        let err = s.engine.upvote(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, EngineError::RumourNotFound(_)));
    }

    #[tokio::test]
    async fn test_reconcile_repairs_tally_after_failed_write() {
        let s = default_scenario().await;

        // Vote row lands, tally write fails
        s.store.inject_fault(StoreFault::TallyWrite).await;
        let err = s.engine.upvote(s.rumour_id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));
        assert!(!err.is_user_rejection());
        assert_eq!(tally(&s.store, s.rumour_id).await, VoteTally::new(0, 0));

        s.store.clear_fault(StoreFault::TallyWrite).await;
        let repaired = s.engine.reconcile_tally(s.rumour_id).await.unwrap();
        assert_eq!(repaired, VoteTally::new(1, 0));
        assert_eq!(tally(&s.store, s.rumour_id).await, VoteTally::new(1, 0));
    }
}

// ============================================================================
// Confirmation Workflow Properties
// ============================================================================

mod confirmation {
    use super::*;

    #[tokio::test]
    async fn test_confirmation_is_idempotent() {
        let s = default_scenario().await;

        s.engine.confirm(s.rumour_id).await.unwrap();
        for _ in 0..3 {
            let err = s.engine.confirm(s.rumour_id).await.unwrap_err();
            assert!(matches!(err, EngineError::NotPending { status: RumourStatus::Confirmed, .. }));
        }

        assert_eq!(s.store.transfers().await.len(), 1);
        assert_eq!(trust_score(&s.store, s.creator).await, 15);
    }

    #[tokio::test]
    async fn test_failed_transfer_insert_leaves_rumour_pending() {
        let s = default_scenario().await;
        s.store.inject_fault(StoreFault::TransferWrite).await;

        assert!(s.engine.confirm(s.rumour_id).await.is_err());
        assert_eq!(s.store.rumour(s.rumour_id).await.unwrap().status, RumourStatus::Pending);
        assert!(s.store.transfers().await.is_empty());

        s.store.clear_fault(StoreFault::TransferWrite).await;
        s.engine.confirm(s.rumour_id).await.unwrap();
        assert_eq!(s.store.transfers().await.len(), 1);
    }

    #[tokio::test]
    async fn test_bonus_failure_does_not_block_confirmation() {
        let s = default_scenario().await;
        s.store.inject_fault(StoreFault::ScoreWrite).await;

        let outcome = s.engine.confirm(s.rumour_id).await.unwrap();
        assert!(outcome.bonus.is_failed());
        assert_eq!(s.store.rumour(s.rumour_id).await.unwrap().status, RumourStatus::Confirmed);
        assert_eq!(s.store.transfers().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_status_write_then_retry() {
        let s = default_scenario().await;

        s.store.inject_fault(StoreFault::StatusWrite).await;
        assert!(s.engine.confirm(s.rumour_id).await.is_err());
        assert_eq!(s.store.transfers().await.len(), 1);
        assert_eq!(trust_score(&s.store, s.creator).await, 10);

        s.store.clear_fault(StoreFault::StatusWrite).await;
        s.engine.confirm(s.rumour_id).await.unwrap();
        assert_eq!(s.store.transfers().await.len(), 1);
        assert_eq!(s.store.rumour(s.rumour_id).await.unwrap().status, RumourStatus::Confirmed);
        assert_eq!(trust_score(&s.store, s.creator).await, 15);
    }

    #[tokio::test]
    async fn test_deny_after_interrupted_confirmation_is_refused() {
        let s = default_scenario().await;

        s.store.inject_fault(StoreFault::StatusWrite).await;
        assert!(s.engine.confirm(s.rumour_id).await.is_err());
        s.store.clear_fault(StoreFault::StatusWrite).await;

        let err = s.engine.deny(s.rumour_id).await.unwrap_err();
        assert!(matches!(err, EngineError::TransferRecorded(_)));
        assert_eq!(s.store.rumour(s.rumour_id).await.unwrap().status, RumourStatus::Pending);
        assert_eq!(s.store.transfers().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_category_confirms_as_player() {
        let store = Arc::new(MemoryStore::new());
        let rumour = Rumour::new(
            None,
            "Some Scout",
            "Club A",
            "Club B",
            RumourCategory::from_db("scout_transfer"),
        );
        let rumour_id = rumour.id;
        store.insert_rumour(rumour).await;
        let engine = ReputationEngine::new(store.clone(), GamificationPolicy::default(), &ConsistencyConfig::default());

        let outcome = engine.confirm(rumour_id).await.unwrap();
        assert_eq!(outcome.bonus, BonusOutcome::Skipped(SkipReason::NoCreator));
        assert_eq!(store.transfers().await[0].category, TransferCategory::Player);
    }

    #[tokio::test]
    async fn test_confirm_latest_pending() {
        let s = default_scenario().await;

        let outcome = s.engine.confirm_latest_pending().await.unwrap();
        assert_eq!(outcome.value, s.rumour_id);

        let err = s.engine.confirm_latest_pending().await.unwrap_err();
        assert!(matches!(err, EngineError::NoPendingRumour));
    }

    #[tokio::test]
    async fn test_denied_rumour_cannot_be_confirmed() {
        let s = default_scenario().await;

        s.engine.deny(s.rumour_id).await.unwrap();
        let err = s.engine.confirm(s.rumour_id).await.unwrap_err();
        assert!(matches!(err, EngineError::NotPending { status: RumourStatus::Denied, .. }));
        assert!(s.store.transfers().await.is_empty());
    }

    struct FailingAdjuster;

    #[async_trait]
    impl ScoreAdjuster for FailingAdjuster {
        async fn adjust(
            &self,
            profile_id: Option<ProfileId>,
            _delta: i64,
        ) -> Result<ScoreAdjustment, AdjustError> {
            Err(AdjustError::UpdateFailed {
                profile_id: profile_id.unwrap_or_default(),
                reason: "score service down".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_custom_adjuster_failure_is_advisory() {
        let store = Arc::new(MemoryStore::new());
        let creator = Uuid::new_v4();
        store.insert_profile(Profile::new(creator, 3)).await;
        let rumour = Rumour::new(Some(creator), "X", "A", "B", RumourCategory::TrainerTransfer);
        let rumour_id = rumour.id;
        store.insert_rumour(rumour).await;

        let engine = ReputationEngine::with_adjuster(
            store.clone(),
            store.clone(),
            Arc::new(FailingAdjuster),
            GamificationPolicy::default(),
            &ConsistencyConfig::default(),
        );

        let vote = engine.upvote(rumour_id, Uuid::new_v4()).await.unwrap();
        assert!(vote.bonus.is_failed());
        assert_eq!(vote.value, VoteTally::new(1, 0));

        let confirm = engine.confirm(rumour_id).await.unwrap();
        assert!(matches!(
            confirm.bonus,
            BonusOutcome::Failed { ref reason, .. } if reason.contains("score service down")
        ));
        assert_eq!(store.transfers().await[0].category, TransferCategory::Trainer);
        assert_eq!(trust_score(&store, creator).await, 3);
    }
}

// ============================================================================
// Trust Score Adjuster
// ============================================================================

mod trust_score {
    use super::*;

    #[tokio::test]
    async fn test_negative_delta_clamps_to_zero_on_both_paths() {
        for atomic in [true, false] {
            let store = Arc::new(MemoryStore::new());
            store.set_atomic_increment(atomic);
            let id = Uuid::new_v4();
            store.insert_profile(Profile::new(id, 4)).await;
            let engine = ReputationEngine::new(store.clone(), GamificationPolicy::default(), &ConsistencyConfig::default());

            engine.adjust_trust_score(Some(id), -9).await.unwrap();
            assert_eq!(trust_score(&store, id).await, 0, "atomic = {}", atomic);
        }
    }

    #[tokio::test]
    async fn test_missing_profile_reported_on_fallback() {
        let store = Arc::new(MemoryStore::without_atomic_increment());
        let engine = ReputationEngine::new(store, GamificationPolicy::default(), &ConsistencyConfig::default());

        let err = engine.adjust_trust_score(Some(Uuid::new_v4()), 1).await.unwrap_err();
        assert!(matches!(err, AdjustError::ProfileNotFound(_)));
        assert_eq!(engine.adjust_trust_score(None, 1).await.unwrap(), ScoreAdjustment::NoOp);
    }

    #[tokio::test]
    async fn test_disabled_atomic_path_uses_fallback() {
        let consistency = ConsistencyConfig {
            atomic_increment_enabled: false,
            ..ConsistencyConfig::default()
        };
        let s = create_scenario(MemoryStore::new(), 10, consistency).await;

        let adjustment = s.engine.adjust_trust_score(Some(s.creator), 2).await.unwrap();
        assert_eq!(adjustment, ScoreAdjustment::Fallback { previous: 10, new_score: 12 });
    }
}

// ============================================================================
// Concurrency
// ============================================================================

mod concurrency {
    use super::*;
    use rumour_ledger::{RumourStore, StoreResult, UserId, Vote};
    use std::time::Duration;

    const VOTERS: usize = 20;

    async fn concurrent_upvotes(store: MemoryStore) {
        let consistency = ConsistencyConfig {
            max_write_attempts: 64,
            ..ConsistencyConfig::default()
        };
        let s = create_scenario(store, 10, consistency).await;

        let handles: Vec<_> = (0..VOTERS)
            .map(|_| {
                let engine = s.engine.clone();
                let rumour_id = s.rumour_id;
                tokio::spawn(async move { engine.upvote(rumour_id, Uuid::new_v4()).await })
            })
            .collect();

        for handle in handles {
            let outcome = handle.await.expect("task completed").expect("vote accepted");
            assert!(outcome.bonus.is_applied());
        }

        assert_eq!(tally(&s.store, s.rumour_id).await, VoteTally::new(VOTERS as i64, 0));
        assert_eq!(s.store.votes_for(s.rumour_id).await.len(), VOTERS);
        assert_eq!(trust_score(&s.store, s.creator).await, 10 + VOTERS as i64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upvotes_atomic_path() {
        concurrent_upvotes(MemoryStore::new()).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upvotes_fallback_path() {
        concurrent_upvotes(MemoryStore::without_atomic_increment()).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_confirmations_create_one_transfer() {
        let s = default_scenario().await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = s.engine.clone();
                let rumour_id = s.rumour_id;
                tokio::spawn(async move { engine.confirm(rumour_id).await })
            })
            .collect();

        let mut confirmed = 0;
        for handle in handles {
            match handle.await.expect("task completed") {
                Ok(_) => confirmed += 1,
                Err(e) => assert!(matches!(e, EngineError::NotPending { .. }), "unexpected error: {}", e),
            }
        }

        assert_eq!(confirmed, 1);
        assert_eq!(s.store.transfers().await.len(), 1);
        assert_eq!(trust_score(&s.store, s.creator).await, 15);
    }

    /// Rumour reads that take a while, so overlapping calls interleave
    struct SlowRumours {
        inner: Arc<MemoryStore>,
        delay: Duration,
    }

    #[async_trait]
    impl RumourStore for SlowRumours {
        async fn get_rumour(&self, id: RumourId) -> StoreResult<Option<Rumour>> {
            tokio::time::sleep(self.delay).await;
            self.inner.get_rumour(id).await
        }

        async fn latest_pending_rumour(&self) -> StoreResult<Option<Rumour>> {
            self.inner.latest_pending_rumour().await
        }

        async fn compare_and_set_tally(&self, id: RumourId, expected: VoteTally, new: VoteTally) -> StoreResult<bool> {
            self.inner.compare_and_set_tally(id, expected, new).await
        }

        async fn overwrite_tally(&self, id: RumourId, tally: VoteTally) -> StoreResult<()> {
            self.inner.overwrite_tally(id, tally).await
        }

        async fn transition_status(&self, id: RumourId, from: RumourStatus, to: RumourStatus) -> StoreResult<bool> {
            self.inner.transition_status(id, from, to).await
        }

        async fn get_vote(&self, rumour_id: RumourId, user_id: UserId) -> StoreResult<Option<Vote>> {
            tokio::time::sleep(self.delay).await;
            self.inner.get_vote(rumour_id, user_id).await
        }

        async fn upsert_vote(&self, vote: &Vote) -> StoreResult<Option<VoteDirection>> {
            self.inner.upsert_vote(vote).await
        }

        async fn count_votes(&self, rumour_id: RumourId) -> StoreResult<VoteTally> {
            self.inner.count_votes(rumour_id).await
        }
    }

    fn slow_engine(s: &Scenario) -> ReputationEngine {
        let rumours = Arc::new(SlowRumours {
            inner: s.store.clone(),
            delay: Duration::from_millis(20),
        });
        ReputationEngine::with_stores(
            rumours,
            s.store.clone(),
            s.store.clone(),
            GamificationPolicy::default(),
            &ConsistencyConfig::default(),
        )
    }

    fn count_duplicates(results: &[Result<VoteTally, EngineError>]) -> usize {
        results
            .iter()
            .filter(|r| matches!(r, Err(EngineError::DuplicateVote(_))))
            .count()
    }

    #[tokio::test]
    async fn test_overlapping_upvotes_from_one_voter_count_once() {
        let s = default_scenario().await;
        let engine = slow_engine(&s);
        let voter = Uuid::new_v4();

        let (first, second) = tokio::join!(
            engine.upvote(s.rumour_id, voter),
            engine.upvote(s.rumour_id, voter)
        );
        let results = [first.map(|o| o.value), second.map(|o| o.value)];

        assert_eq!(count_duplicates(&results), 1);
        assert!(results.iter().any(|r| matches!(r, Ok(t) if *t == VoteTally::new(1, 0))));
        assert_eq!(tally(&s.store, s.rumour_id).await, VoteTally::new(1, 0));
        assert_eq!(s.store.votes_for(s.rumour_id).await.len(), 1);
        assert_eq!(trust_score(&s.store, s.creator).await, 11);
    }

    #[tokio::test]
    async fn test_overlapping_switches_from_one_voter_count_once() {
        let s = default_scenario().await;
        let engine = slow_engine(&s);
        let voter = Uuid::new_v4();
        engine.upvote(s.rumour_id, voter).await.unwrap();

        let (first, second) = tokio::join!(
            engine.downvote(s.rumour_id, voter),
            engine.downvote(s.rumour_id, voter)
        );
        let results = [first.map(|o| o.value), second.map(|o| o.value)];

        assert_eq!(count_duplicates(&results), 1);
        assert_eq!(tally(&s.store, s.rumour_id).await, VoteTally::new(0, 1));
        assert_eq!(trust_score(&s.store, s.creator).await, 11);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_confirm_racing_deny_never_strands_a_transfer() {
        for _ in 0..20 {
            let s = default_scenario().await;
            let engine = slow_engine(&s);

            let confirm = {
                let engine = engine.clone();
                let rumour_id = s.rumour_id;
                tokio::spawn(async move { engine.confirm(rumour_id).await.map(|_| ()) })
            };
            let deny = {
                let engine = engine.clone();
                let rumour_id = s.rumour_id;
                tokio::spawn(async move { engine.deny(rumour_id).await })
            };

            let confirmed = confirm.await.expect("task completed");
            let denied = deny.await.expect("task completed");
            assert!(confirmed.is_ok() != denied.is_ok(), "exactly one of confirm/deny wins");

            let status = s.store.rumour(s.rumour_id).await.unwrap().status;
            let transfers = s.store.transfers().await.len();
            match status {
                RumourStatus::Confirmed => {
                    assert_eq!(transfers, 1);
                    assert_eq!(trust_score(&s.store, s.creator).await, 15);
                }
                RumourStatus::Denied => {
                    assert_eq!(transfers, 0);
                    assert_eq!(trust_score(&s.store, s.creator).await, 10);
                }
                RumourStatus::Pending => panic!("rumour left pending"),
            }
        }
    }
}
