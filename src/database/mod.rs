//! PostgreSQL Database Module
//!
//! Repositories for profiles, rumours, votes and transfers, and `PgStore`,
//! which serves them to the engine through the store traits.

pub mod pool;
pub mod profiles;
pub mod rumours;
pub mod store;
pub mod transfers;
pub mod votes;

pub use pool::DatabasePool;
pub use profiles::ProfileRepository;
pub use rumours::RumourRepository;
pub use store::PgStore;
pub use transfers::TransferRepository;
pub use votes::VoteRepository;

/// Whether a sqlx error carries the given Postgres SQLSTATE code
pub(crate) fn has_code(error: &sqlx::Error, code: &str) -> bool {
    match error {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(code),
        _ => false,
    }
}
