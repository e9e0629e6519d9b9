//! Trust Score Adjuster
//!
//! Applies a signed delta to a profile's trust score, floored at zero.
//!
//! Primary path: the store's atomic increment. Any failure there is taken
//! to mean the capability is missing in this deployment and triggers the
//! fallback.
//!
//! Fallback path: read the score, compute `max(0, current + delta)`, and
//! write it back conditionally on the score not having moved. A lost race
//! re-reads and tries again, so concurrent fallback writers cannot drop
//! each other's updates.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::outcome::{BonusOutcome, ScoreAdjustment};
use crate::error::{AdjustError, AdjustResult, StoreError};
use crate::models::profile::clamped_score;
use crate::models::ProfileId;
use crate::store::ProfileStore;

pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 16;

#[async_trait]
pub trait ScoreAdjuster: Send + Sync {
    /// `None` profile or zero delta is a successful no-op
    async fn adjust(&self, profile_id: Option<ProfileId>, delta: i64) -> AdjustResult<ScoreAdjustment>;
}

/// Atomic-then-fallback adjuster over a `ProfileStore`
pub struct StoreScoreAdjuster {
    profiles: Arc<dyn ProfileStore>,
    atomic_enabled: bool,
    max_write_attempts: u32,
}

impl StoreScoreAdjuster {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            profiles,
            atomic_enabled: true,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }

    /// Skip the atomic attempt in deployments known to lack it
    pub fn with_atomic_increment(mut self, enabled: bool) -> Self {
        self.atomic_enabled = enabled;
        self
    }

    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts.max(1);
        self
    }

    async fn adjust_fallback(&self, profile_id: ProfileId, delta: i64) -> AdjustResult<ScoreAdjustment> {
        for attempt in 1..=self.max_write_attempts {
            let previous = self
                .profiles
                .get_trust_score(profile_id)
                .await
                .map_err(|e| AdjustError::UpdateFailed {
                    profile_id,
                    reason: e.to_string(),
                })?
                .ok_or(AdjustError::ProfileNotFound(profile_id))?;

            let new_score = clamped_score(previous, delta);

            let written = self
                .profiles
                .compare_and_set_trust_score(profile_id, previous, new_score)
                .await
                .map_err(|e| AdjustError::UpdateFailed {
                    profile_id,
                    reason: e.to_string(),
                })?;

            if written {
                return Ok(ScoreAdjustment::Fallback { previous, new_score });
            }

            debug!(
                profile_id = %profile_id,
                attempt = attempt,
                "Trust score moved during fallback update, retrying"
            );
        }

        Err(AdjustError::UpdateFailed {
            profile_id,
            reason: format!(
                "score kept changing, gave up after {} attempts",
                self.max_write_attempts
            ),
        })
    }
}

#[async_trait]
impl ScoreAdjuster for StoreScoreAdjuster {
    async fn adjust(&self, profile_id: Option<ProfileId>, delta: i64) -> AdjustResult<ScoreAdjustment> {
        let profile_id = match profile_id {
            Some(id) if delta != 0 => id,
            _ => return Ok(ScoreAdjustment::NoOp),
        };

        if self.atomic_enabled {
            match self.profiles.increment_trust_score(profile_id, delta).await {
                Ok(Some(new_score)) => {
                    debug!(profile_id = %profile_id, delta = delta, new_score = new_score, "Trust score incremented");
                    return Ok(ScoreAdjustment::Atomic { new_score });
                }
                Ok(None) => {
                    debug!(profile_id = %profile_id, "Atomic increment found no profile, falling back");
                }
                Err(StoreError::Unsupported(_)) => {
                    debug!(profile_id = %profile_id, "Atomic increment not installed, falling back");
                }
                Err(e) => {
                    warn!(profile_id = %profile_id, error = %e, "Atomic increment failed, falling back");
                }
            }
        }

        self.adjust_fallback(profile_id, delta).await
    }
}

/// Apply a bonus as an advisory side effect. Failures are logged, not returned.
pub async fn award_bonus(
    adjuster: &dyn ScoreAdjuster,
    profile_id: ProfileId,
    delta: i64,
) -> BonusOutcome {
    match adjuster.adjust(Some(profile_id), delta).await {
        Ok(adjustment) => BonusOutcome::Applied {
            profile_id,
            delta,
            adjustment,
        },
        Err(e) => {
            warn!(profile_id = %profile_id, delta = delta, error = %e, "Failed to apply trust score bonus");
            BonusOutcome::Failed {
                profile_id,
                delta,
                reason: e.to_string(),
            }
        }
    }
}
