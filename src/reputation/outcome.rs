//! Two-tier operation results
//!
//! The primary write (vote recorded, rumour confirmed) is authoritative.
//! The reputation bonus that follows is advisory: its failure is reported
//! here, never as an error.

use serde::{Deserialize, Serialize};

use crate::models::ProfileId;

/// How a trust score change was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreAdjustment {
    /// Zero delta or no profile
    NoOp,
    /// Server-side atomic increment
    Atomic { new_score: i64 },
    /// Read-modify-write
    Fallback { previous: i64, new_score: i64 },
}

/// Why no bonus was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Vote switches never earn points
    NotFreshUpvote,
    /// Downvotes never earn points
    Downvote,
    /// Rumour author was anonymized
    NoCreator,
    /// Creator voted on their own rumour
    SelfVote,
}

/// Result of the advisory reputation side effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusOutcome {
    Skipped(SkipReason),
    Applied {
        profile_id: ProfileId,
        delta: i64,
        adjustment: ScoreAdjustment,
    },
    Failed {
        profile_id: ProfileId,
        delta: i64,
        reason: String,
    },
}

impl BonusOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, BonusOutcome::Applied { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BonusOutcome::Failed { .. })
    }
}

/// Primary result plus the advisory bonus outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub value: T,
    pub bonus: BonusOutcome,
}

impl<T> Outcome<T> {
    pub fn new(value: T, bonus: BonusOutcome) -> Self {
        Self { value, bonus }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            bonus: self.bonus,
        }
    }
}
