//! Vote Ledger
//!
//! One vote per (user, rumour). Switching direction moves a single vote
//! between the up and down tallies; voting the same way twice is rejected.

mod ledger;

pub use ledger::VoteLedger;
