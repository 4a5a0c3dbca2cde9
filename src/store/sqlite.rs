//! SQLite-backed observation store
//!
//! Durable implementation over the pooled connection wrapper. One row per
//! observation; per-user chronological order is insertion order, which the
//! append path enforces.

use std::path::Path;

use rusqlite::params;
use tracing::debug;

use super::{check_monotonic, ObservationStore, StoreResult};
use crate::db::{migrations, Database, DbResult};
use crate::models::{Observation, ObservationDraft, Reminder};

/// Observation store persisted to a local SQLite database
#[derive(Clone)]
pub struct SqliteObservationStore {
    db: Database,
}

impl SqliteObservationStore {
    /// Wrap an already-migrated database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (or create) a store at the given path and run migrations
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = Database::new(path)?;
        db.with_conn(migrations::run_migrations)?;
        Ok(Self { db })
    }

    fn latest_row(&self, user_id: &str) -> DbResult<Option<Observation>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM observations WHERE user_id = ?1 ORDER BY id DESC LIMIT 1",
            )?;
            let result = stmt.query_row([user_id], Observation::from_row);
            match result {
                Ok(obs) => Ok(Some(obs)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// List a user's reminders in creation order
    pub fn reminders(&self, user_id: &str) -> DbResult<Vec<Reminder>> {
        self.db.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM reminders WHERE user_id = ?1 ORDER BY id")?;
            let reminders = stmt
                .query_map([user_id], Reminder::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(reminders)
        })
    }

    /// Persist a reminder for a user
    pub fn add_reminder(&self, user_id: &str, reminder: &Reminder) -> DbResult<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reminders (user_id, message, time, kind) VALUES (?1, ?2, ?3, ?4)",
                params![user_id, reminder.message, reminder.time, reminder.kind.as_str()],
            )?;
            Ok(())
        })
    }
}

impl ObservationStore for SqliteObservationStore {
    fn append(&self, draft: ObservationDraft) -> StoreResult<Observation> {
        let obs = draft.validate()?;
        check_monotonic(&obs.timestamp, self.latest_row(&obs.user_id)?.as_ref())?;

        self.db.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO observations (
                    user_id, timestamp, heart_rate, bp_systolic, bp_diastolic,
                    oxygen_level, temperature, glucose_level, sleep_hours,
                    activity_level, took_medication, pain_level, mood, notes
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
                params![
                    obs.user_id,
                    obs.timestamp,
                    obs.heart_rate,
                    obs.blood_pressure.map(|bp| bp.systolic),
                    obs.blood_pressure.map(|bp| bp.diastolic),
                    obs.oxygen_level,
                    obs.temperature,
                    obs.glucose_level,
                    obs.sleep_hours,
                    obs.activity_level.map(|a| a.as_str()),
                    obs.took_medication,
                    obs.pain_level,
                    obs.mood,
                    obs.notes,
                ],
            )?;
            Ok(())
        })?;

        debug!(user_id = %obs.user_id, timestamp = %obs.timestamp, "observation appended");
        Ok(obs)
    }

    fn latest(&self, user_id: &str) -> StoreResult<Option<Observation>> {
        Ok(self.latest_row(user_id)?)
    }

    fn history(&self, user_id: &str) -> StoreResult<Vec<Observation>> {
        let history = self.db.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM observations WHERE user_id = ?1 ORDER BY id")?;
            let observations = stmt
                .query_map([user_id], Observation::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(observations)
        })?;
        Ok(history)
    }
}
