//! Transfer model - the permanent record of a confirmed rumour

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Rumour, RumourCategory, RumourId};

/// Category vocabulary of the transfers table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferCategory {
    Player,
    Trainer,
    PlayerRetirement,
    TrainerRetirement,
}

impl TransferCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferCategory::Player => "player",
            TransferCategory::Trainer => "trainer",
            TransferCategory::PlayerRetirement => "player_retirement",
            TransferCategory::TrainerRetirement => "trainer_retirement",
        }
    }

    pub fn from_db(raw: &str) -> Option<Self> {
        match raw {
            "player" => Some(TransferCategory::Player),
            "trainer" => Some(TransferCategory::Trainer),
            "player_retirement" => Some(TransferCategory::PlayerRetirement),
            "trainer_retirement" => Some(TransferCategory::TrainerRetirement),
            _ => None,
        }
    }
}

/// Total mapping: categories added later confirm as player transfers.
impl From<&RumourCategory> for TransferCategory {
    fn from(category: &RumourCategory) -> Self {
        match category {
            RumourCategory::PlayerTransfer => TransferCategory::Player,
            RumourCategory::TrainerTransfer => TransferCategory::Trainer,
            RumourCategory::PlayerRetirement => TransferCategory::PlayerRetirement,
            RumourCategory::TrainerRetirement => TransferCategory::TrainerRetirement,
            RumourCategory::Unknown(_) => TransferCategory::Player,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Uuid,
    pub player_name: String,
    pub from_club: String,
    pub to_club: String,
    pub category: TransferCategory,
    pub confirmed_at: DateTime<Utc>,

    /// At most one transfer per rumour
    pub rumour_id: RumourId,
}

impl Transfer {
    /// Derive the transfer record for a rumour being confirmed now
    pub fn from_rumour(rumour: &Rumour) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_name: rumour.player_name.clone(),
            from_club: rumour.from_club.clone(),
            to_club: rumour.to_club.clone(),
            category: TransferCategory::from(&rumour.category),
            confirmed_at: Utc::now(),
            rumour_id: rumour.id,
        }
    }
}
