//! Gamification Policy
//!
//! Point values awarded for reputation events. Tuning them never touches
//! ledger or workflow logic.

use serde::{Deserialize, Serialize};

/// Awarded to a rumour's creator when the rumour is confirmed
pub const CONFIRMATION_BONUS: i64 = 5;

/// Awarded to a rumour's creator for each fresh upvote
pub const UPVOTE_BONUS: i64 = 1;

/// Events that move a trust score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointEvent {
    RumourConfirmed,
    FreshUpvote,
}

/// Configurable point table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationPolicy {
    pub confirmation_bonus: i64,
    pub upvote_bonus: i64,

    /// Whether a creator upvoting their own rumour earns the upvote bonus
    pub reward_self_votes: bool,
}

impl GamificationPolicy {
    pub fn points_for(&self, event: PointEvent) -> i64 {
        match event {
            PointEvent::RumourConfirmed => self.confirmation_bonus,
            PointEvent::FreshUpvote => self.upvote_bonus,
        }
    }
}

impl Default for GamificationPolicy {
    fn default() -> Self {
        Self {
            confirmation_bonus: CONFIRMATION_BONUS,
            upvote_bonus: UPVOTE_BONUS,
            reward_self_votes: false,
        }
    }
}
