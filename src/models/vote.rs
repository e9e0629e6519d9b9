//! Vote model

use serde::{Deserialize, Serialize};

use super::{RumourId, UserId};

/// Direction of a credibility vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Stored as the `is_upvote` boolean column
    pub fn is_up(&self) -> bool {
        matches!(self, VoteDirection::Up)
    }

    pub fn from_is_upvote(is_upvote: bool) -> Self {
        if is_upvote {
            VoteDirection::Up
        } else {
            VoteDirection::Down
        }
    }
}

/// A single user's vote on a rumour. Unique per (rumour, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub rumour_id: RumourId,
    pub user_id: UserId,
    pub direction: VoteDirection,
}

impl Vote {
    pub fn new(rumour_id: RumourId, user_id: UserId, direction: VoteDirection) -> Self {
        Self {
            rumour_id,
            user_id,
            direction,
        }
    }
}
