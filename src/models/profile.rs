//! Profile model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile identifier. Profiles share their id with the authenticated user.
pub type ProfileId = Uuid;

/// Authenticated caller identity, resolved outside this crate.
pub type UserId = Uuid;

/// A user's public reputation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,

    /// Never below zero
    pub trust_score: i64,
}

impl Profile {
    pub fn new(id: ProfileId, trust_score: i64) -> Self {
        Self {
            id,
            trust_score: trust_score.max(0),
        }
    }
}

/// Apply a signed delta to a score, flooring the result at zero.
pub fn clamped_score(current: i64, delta: i64) -> i64 {
    current.saturating_add(delta).max(0)
}
