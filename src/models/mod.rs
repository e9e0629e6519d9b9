//! Domain models
//!
//! Rows the engine reads and writes:
//! - Profiles (trust score holders)
//! - Rumours and their vote tallies
//! - Votes (one per user per rumour)
//! - Transfers derived from confirmed rumours

pub mod profile;
pub mod rumour;
pub mod transfer;
pub mod vote;

pub use profile::{Profile, ProfileId, UserId};
pub use rumour::{Rumour, RumourCategory, RumourId, RumourStatus, VoteTally};
pub use transfer::{Transfer, TransferCategory};
pub use vote::{Vote, VoteDirection};
