//! In-memory observation store
//!
//! Backs tests and ephemeral sessions with the same contract as the durable
//! store: validated, append-only, per-user chronological sequences.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{check_monotonic, ObservationStore, StoreResult};
use crate::models::{Observation, ObservationDraft};

/// Observation store held entirely in memory
#[derive(Default)]
pub struct MemoryObservationStore {
    records: Mutex<HashMap<String, Vec<Observation>>>,
}

impl MemoryObservationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObservationStore for MemoryObservationStore {
    fn append(&self, draft: ObservationDraft) -> StoreResult<Observation> {
        let obs = draft.validate()?;

        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let sequence = records.entry(obs.user_id.clone()).or_default();
        check_monotonic(&obs.timestamp, sequence.last())?;
        sequence.push(obs.clone());

        Ok(obs)
    }

    fn latest(&self, user_id: &str) -> StoreResult<Option<Observation>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(user_id).and_then(|seq| seq.last().cloned()))
    }

    fn history(&self, user_id: &str) -> StoreResult<Vec<Observation>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(user_id).cloned().unwrap_or_default())
    }
}
