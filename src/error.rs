//! Engine errors
//!
//! Three tiers:
//! - user rejections (`DuplicateVote`, `RumourNotFound`, `NotPending`,
//!   `NoPendingRumour`, `TransferRecorded`)
//! - store faults, propagated untouched
//! - score adjustment faults, which callers treat as advisory

use thiserror::Error;

use crate::models::{ProfileId, RumourId, RumourStatus};

/// Errors surfaced by vote and confirmation operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Already voted this way on rumour {0}")]
    DuplicateVote(RumourId),

    #[error("Rumour not found: {0}")]
    RumourNotFound(RumourId),

    #[error("Rumour {id} is already {status}")]
    NotPending { id: RumourId, status: RumourStatus },

    #[error("No pending rumour to confirm")]
    NoPendingRumour,

    #[error("Rumour {0} already has a recorded transfer; confirm it to finish")]
    TransferRecorded(RumourId),

    #[error("Rumour {id} kept changing underneath us, gave up after {attempts} attempts")]
    Contention { id: RumourId, attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Expected, user-facing rejections. Never logged as faults.
    pub fn is_user_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::DuplicateVote(_)
                | EngineError::RumourNotFound(_)
                | EngineError::NotPending { .. }
                | EngineError::NoPendingRumour
                | EngineError::TransferRecorded(_)
        )
    }
}

/// Failures of the persistent store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store lacks an optional capability (e.g. the atomic increment procedure)
    #[error("Unsupported store operation: {0}")]
    Unsupported(&'static str),

    /// A uniqueness constraint rejected the write
    #[error("Record already exists: {entity} {id}")]
    AlreadyExists { entity: &'static str, id: String },

    #[error("Invalid stored value: {field} = {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn already_exists(entity: &'static str, id: impl ToString) -> Self {
        StoreError::AlreadyExists {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

/// Failures of the trust score adjuster
#[derive(Debug, Error)]
pub enum AdjustError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(ProfileId),

    #[error("Failed to update trust score for {profile_id}: {reason}")]
    UpdateFailed { profile_id: ProfileId, reason: String },
}

pub type AdjustResult<T> = Result<T, AdjustError>;
