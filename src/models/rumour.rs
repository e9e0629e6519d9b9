//! Rumour model, category/status enums and the denormalized vote tally

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{ProfileId, VoteDirection};

pub type RumourId = Uuid;

/// What kind of move a rumour claims
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RumourCategory {
    PlayerTransfer,
    TrainerTransfer,
    PlayerRetirement,
    TrainerRetirement,
    /// Category string this version does not know about
    Unknown(String),
}

impl RumourCategory {
    pub fn as_str(&self) -> &str {
        match self {
            RumourCategory::PlayerTransfer => "player_transfer",
            RumourCategory::TrainerTransfer => "trainer_transfer",
            RumourCategory::PlayerRetirement => "player_retirement",
            RumourCategory::TrainerRetirement => "trainer_retirement",
            RumourCategory::Unknown(raw) => raw,
        }
    }

    /// Parse a stored category. Never fails; unrecognised values are kept verbatim.
    pub fn from_db(raw: &str) -> Self {
        match raw {
            "player_transfer" => RumourCategory::PlayerTransfer,
            "trainer_transfer" => RumourCategory::TrainerTransfer,
            "player_retirement" => RumourCategory::PlayerRetirement,
            "trainer_retirement" => RumourCategory::TrainerRetirement,
            other => RumourCategory::Unknown(other.to_string()),
        }
    }
}

/// Lifecycle of a rumour. Anything but `Pending` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RumourStatus {
    Pending,
    Confirmed,
    Denied,
}

impl RumourStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RumourStatus::Pending => "pending",
            RumourStatus::Confirmed => "confirmed",
            RumourStatus::Denied => "denied",
        }
    }

    pub fn from_db(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(RumourStatus::Pending),
            "confirmed" => Some(RumourStatus::Confirmed),
            "denied" => Some(RumourStatus::Denied),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RumourStatus::Pending)
    }
}

impl fmt::Display for RumourStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate vote counts stored on the rumour row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteTally {
    pub votes_up: i64,
    pub votes_down: i64,
}

impl VoteTally {
    pub fn new(votes_up: i64, votes_down: i64) -> Self {
        Self {
            votes_up: votes_up.max(0),
            votes_down: votes_down.max(0),
        }
    }

    pub fn total(&self) -> i64 {
        self.votes_up + self.votes_down
    }

    /// Tally after a first vote in `direction`
    pub fn with_new_vote(self, direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => Self::new(self.votes_up + 1, self.votes_down),
            VoteDirection::Down => Self::new(self.votes_up, self.votes_down + 1),
        }
    }

    /// Tally after an existing vote flips to `direction`.
    /// The old side is floored at zero to absorb earlier drift.
    pub fn with_switched_vote(self, direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => Self::new(self.votes_up + 1, (self.votes_down - 1).max(0)),
            VoteDirection::Down => Self::new((self.votes_up - 1).max(0), self.votes_down + 1),
        }
    }
}

/// A claim about a transfer or retirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rumour {
    pub id: RumourId,

    /// None once the author account has been anonymized
    pub creator_id: Option<ProfileId>,

    pub player_name: String,
    pub from_club: String,
    pub to_club: String,
    pub category: RumourCategory,
    pub status: RumourStatus,
    pub votes_up: i64,
    pub votes_down: i64,
    pub created_at: DateTime<Utc>,
}

impl Rumour {
    /// A fresh pending rumour with no votes
    pub fn new(
        creator_id: Option<ProfileId>,
        player_name: impl Into<String>,
        from_club: impl Into<String>,
        to_club: impl Into<String>,
        category: RumourCategory,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            creator_id,
            player_name: player_name.into(),
            from_club: from_club.into(),
            to_club: to_club.into(),
            category,
            status: RumourStatus::Pending,
            votes_up: 0,
            votes_down: 0,
            created_at: Utc::now(),
        }
    }

    pub fn tally(&self) -> VoteTally {
        VoteTally::new(self.votes_up, self.votes_down)
    }

    pub fn is_pending(&self) -> bool {
        self.status == RumourStatus::Pending
    }

    pub fn is_created_by(&self, user_id: &ProfileId) -> bool {
        self.creator_id.as_ref() == Some(user_id)
    }
}
