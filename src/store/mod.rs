//! Health record store
//!
//! The ordered, append-only collection of per-user observations that every
//! view reads from. The store is an injected trait so the dashboard, health
//! form, and assistant never reach into the persistence medium directly; the
//! SQLite implementation is the durable backend and the in-memory one keeps
//! tests hermetic.

mod memory;
mod sqlite;

use thiserror::Error;

use crate::db::DbError;
use crate::models::{Observation, ObservationDraft, ValidationError};

pub use memory::MemoryObservationStore;
pub use sqlite::SqliteObservationStore;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed or out-of-range input; the store is left untouched
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The persistence medium rejected a read or write
    #[error("storage failure: {0}")]
    Storage(#[from] DbError),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Ordered, append-only per-user observation storage
pub trait ObservationStore {
    /// Validate and durably persist one observation.
    ///
    /// Fails with `StoreError::Validation` when a required field is missing,
    /// a numeric field lies outside its device bound, or the timestamp is
    /// earlier than the user's latest recorded observation. Atomic from the
    /// caller's perspective: on any failure the store is unchanged.
    fn append(&self, draft: ObservationDraft) -> StoreResult<Observation>;

    /// The most recent observation for a user, if any
    fn latest(&self, user_id: &str) -> StoreResult<Option<Observation>>;

    /// Full chronological history for a user; callers treat it as read-only
    fn history(&self, user_id: &str) -> StoreResult<Vec<Observation>>;
}

/// Pure projection of one user's observations, preserving relative order
pub fn filter_by_user(records: &[Observation], user_id: &str) -> Vec<Observation> {
    records
        .iter()
        .filter(|obs| obs.user_id == user_id)
        .cloned()
        .collect()
}

/// Reject a draft whose timestamp precedes the user's latest observation.
///
/// Insertion order is the chronological order every reader depends on, so
/// both store implementations share this check.
pub(crate) fn check_monotonic(
    draft_ts: &str,
    latest: Option<&Observation>,
) -> Result<(), ValidationError> {
    let Some(latest) = latest else {
        return Ok(());
    };
    let (Some(new_ts), Some(latest_ts)) = (
        chrono::DateTime::parse_from_rfc3339(draft_ts).ok(),
        latest.parsed_timestamp(),
    ) else {
        return Ok(());
    };
    if new_ts < latest_ts {
        return Err(ValidationError::OutOfOrder {
            newer: draft_ts.to_string(),
            latest: latest.timestamp.clone(),
        });
    }
    Ok(())
}
