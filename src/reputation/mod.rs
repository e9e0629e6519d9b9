//! Reputation: trust score adjustment and point policy
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────────┐     ┌──────────────┐
//! │ VoteLedger   │────►│ ScoreAdjuster       │◄────│ Confirmation │
//! │ (+1 upvote)  │     │ atomic ─► fallback  │     │ (+5 confirm) │
//! └──────────────┘     └─────────────────────┘     └──────────────┘
//!                                │
//!                                ▼
//!                        ┌──────────────────┐
//!                        │ ProfileStore     │
//!                        └──────────────────┘
//! ```
//!
//! Bonuses are advisory: a failed bonus never undoes the vote or
//! confirmation that earned it.

mod adjuster;
mod outcome;
mod policy;

pub use adjuster::{award_bonus, ScoreAdjuster, StoreScoreAdjuster, DEFAULT_MAX_WRITE_ATTEMPTS};
pub use outcome::{BonusOutcome, Outcome, ScoreAdjustment, SkipReason};
pub use policy::{GamificationPolicy, PointEvent, CONFIRMATION_BONUS, UPVOTE_BONUS};
