//! Vote recording and tally maintenance

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{Rumour, RumourId, UserId, Vote, VoteDirection, VoteTally};
use crate::reputation::{
    award_bonus, BonusOutcome, GamificationPolicy, Outcome, PointEvent, ScoreAdjuster, SkipReason,
    DEFAULT_MAX_WRITE_ATTEMPTS,
};
use crate::store::RumourStore;

/// What a vote request does to the caller's vote row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoteChange {
    Fresh,
    Switch,
}

impl VoteChange {
    fn apply(self, tally: VoteTally, direction: VoteDirection) -> VoteTally {
        match self {
            VoteChange::Fresh => tally.with_new_vote(direction),
            VoteChange::Switch => tally.with_switched_vote(direction),
        }
    }
}

pub struct VoteLedger {
    rumours: Arc<dyn RumourStore>,
    adjuster: Arc<dyn ScoreAdjuster>,
    policy: GamificationPolicy,
    max_write_attempts: u32,
}

impl VoteLedger {
    pub fn new(
        rumours: Arc<dyn RumourStore>,
        adjuster: Arc<dyn ScoreAdjuster>,
        policy: GamificationPolicy,
    ) -> Self {
        Self {
            rumours,
            adjuster,
            policy,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }

    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts.max(1);
        self
    }

    /// Record or switch `user_id`'s vote on a rumour and return the new tally.
    ///
    /// A fresh upvote awards the creator the upvote bonus; switches and
    /// downvotes never touch trust scores.
    pub async fn vote(
        &self,
        rumour_id: RumourId,
        user_id: UserId,
        direction: VoteDirection,
    ) -> EngineResult<Outcome<VoteTally>> {
        let rumour = self.load_rumour(rumour_id).await?;

        // The row write reports what it replaced; that, not an earlier read,
        // decides fresh vs switch vs duplicate.
        let change = match self
            .rumours
            .upsert_vote(&Vote::new(rumour_id, user_id, direction))
            .await?
        {
            Some(previous) if previous == direction => {
                debug!(rumour_id = %rumour_id, user_id = %user_id, "Duplicate vote rejected");
                return Err(EngineError::DuplicateVote(rumour_id));
            }
            Some(_) => VoteChange::Switch,
            None => VoteChange::Fresh,
        };

        let tally = self.write_tally(&rumour, change, direction).await?;

        debug!(
            rumour_id = %rumour_id,
            user_id = %user_id,
            direction = ?direction,
            change = ?change,
            votes_up = tally.votes_up,
            votes_down = tally.votes_down,
            "Vote recorded"
        );

        let bonus = self.upvote_bonus(&rumour, user_id, direction, change).await;
        Ok(Outcome::new(tally, bonus))
    }

    /// The caller's current vote on a rumour, if any
    pub async fn current_vote(
        &self,
        rumour_id: RumourId,
        user_id: UserId,
    ) -> EngineResult<Option<VoteDirection>> {
        Ok(self
            .rumours
            .get_vote(rumour_id, user_id)
            .await?
            .map(|v| v.direction))
    }

    /// Recount vote rows and overwrite the rumour's denormalized tally
    pub async fn reconcile_tally(&self, rumour_id: RumourId) -> EngineResult<VoteTally> {
        let rumour = self.load_rumour(rumour_id).await?;
        let counted = self.rumours.count_votes(rumour_id).await?;

        if counted != rumour.tally() {
            info!(
                rumour_id = %rumour_id,
                stored_up = rumour.votes_up,
                stored_down = rumour.votes_down,
                counted_up = counted.votes_up,
                counted_down = counted.votes_down,
                "Repairing drifted vote tally"
            );
            self.rumours.overwrite_tally(rumour_id, counted).await?;
        }

        Ok(counted)
    }

    async fn load_rumour(&self, rumour_id: RumourId) -> EngineResult<Rumour> {
        self.rumours
            .get_rumour(rumour_id)
            .await?
            .ok_or(EngineError::RumourNotFound(rumour_id))
    }

    /// Conditional tally write; re-reads and re-applies the change when a
    /// concurrent vote moved the counts first.
    async fn write_tally(
        &self,
        rumour: &Rumour,
        change: VoteChange,
        direction: VoteDirection,
    ) -> EngineResult<VoteTally> {
        let mut current = rumour.tally();

        for attempt in 1..=self.max_write_attempts {
            let next = change.apply(current, direction);
            if self
                .rumours
                .compare_and_set_tally(rumour.id, current, next)
                .await?
            {
                return Ok(next);
            }

            debug!(rumour_id = %rumour.id, attempt = attempt, "Tally moved during vote, retrying");
            current = self.load_rumour(rumour.id).await?.tally();
        }

        error!(
            rumour_id = %rumour.id,
            attempts = self.max_write_attempts,
            "Vote row written but tally update kept losing; reconcile the tally"
        );
        Err(EngineError::Contention {
            id: rumour.id,
            attempts: self.max_write_attempts,
        })
    }

    async fn upvote_bonus(
        &self,
        rumour: &Rumour,
        voter: UserId,
        direction: VoteDirection,
        change: VoteChange,
    ) -> BonusOutcome {
        if change != VoteChange::Fresh {
            return BonusOutcome::Skipped(SkipReason::NotFreshUpvote);
        }
        if direction != VoteDirection::Up {
            return BonusOutcome::Skipped(SkipReason::Downvote);
        }
        let Some(creator) = rumour.creator_id else {
            return BonusOutcome::Skipped(SkipReason::NoCreator);
        };
        if rumour.is_created_by(&voter) && !self.policy.reward_self_votes {
            return BonusOutcome::Skipped(SkipReason::SelfVote);
        }

        let delta = self.policy.points_for(PointEvent::FreshUpvote);
        award_bonus(self.adjuster.as_ref(), creator, delta).await
    }
}
