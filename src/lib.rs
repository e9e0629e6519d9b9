//! Rumour Ledger
//!
//! Reputation and voting consistency engine for a transfer-rumour
//! community: one vote per user per rumour, denormalized tallies,
//! exactly-once confirmation of rumours into transfers, and trust score
//! bonuses for rumour creators.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs          - Crate root with re-exports
//! ├── main.rs         - Ops entrypoint (schema, confirm, deny, reconcile)
//! ├── config.rs       - Configuration management
//! ├── engine.rs       - Orchestrator exposing every operation
//! ├── error.rs        - Engine, store and adjuster errors
//! ├── models/         - Profiles, rumours, votes, transfers
//! ├── voting/         - Vote ledger (votes + tallies)
//! ├── confirmation/   - Pending -> confirmed/denied workflow
//! ├── reputation/     - Trust score adjuster, point policy, outcomes
//! ├── store/          - Store traits + in-memory store
//! └── database/       - PostgreSQL persistence
//! ```

pub mod config;
pub mod confirmation;
pub mod database;
pub mod engine;
pub mod error;
pub mod models;
pub mod reputation;
pub mod store;
pub mod voting;

// Re-export main types for convenience
pub use config::EngineConfig;
pub use confirmation::ConfirmationWorkflow;
pub use database::{DatabasePool, PgStore};
pub use engine::ReputationEngine;
pub use error::{AdjustError, EngineError, EngineResult, StoreError, StoreResult};
pub use models::{
    Profile, ProfileId, Rumour, RumourCategory, RumourId, RumourStatus, Transfer,
    TransferCategory, UserId, Vote, VoteDirection, VoteTally,
};
pub use reputation::{
    BonusOutcome, GamificationPolicy, Outcome, PointEvent, ScoreAdjuster, ScoreAdjustment,
    SkipReason, StoreScoreAdjuster, CONFIRMATION_BONUS, UPVOTE_BONUS,
};
pub use store::{MemoryStore, ProfileStore, RumourStore, StoreFault, TransferStore};
pub use voting::VoteLedger;
