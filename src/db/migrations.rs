//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- OBSERVATIONS
        -- One vital-signs snapshot per row, per user
        -- ============================================
        CREATE TABLE observations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            timestamp TEXT NOT NULL,             -- RFC 3339

            -- Headline vitals
            heart_rate REAL,                     -- bpm
            bp_systolic REAL,                    -- mmHg
            bp_diastolic REAL,                   -- mmHg
            oxygen_level REAL,                   -- percent
            temperature REAL,                    -- degrees F
            glucose_level REAL,                  -- mg/dL

            -- Wellbeing
            sleep_hours REAL,
            activity_level TEXT CHECK(activity_level IN
                ('sedentary', 'light', 'moderate', 'active', 'very_active')),
            took_medication INTEGER,             -- boolean
            pain_level INTEGER,                  -- 0-10
            mood INTEGER,                        -- 0-5
            notes TEXT,

            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_observations_user ON observations(user_id);
        CREATE INDEX idx_observations_user_ts ON observations(user_id, timestamp);

        -- ============================================
        -- REMINDERS
        -- Daily scheduled events shown on the dashboard
        -- ============================================
        CREATE TABLE reminders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            message TEXT NOT NULL,
            time TEXT NOT NULL,                  -- clock time "HH:MM"
            kind TEXT NOT NULL DEFAULT 'event',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_reminders_user ON reminders(user_id);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        // A second run sees the recorded version and applies nothing.
        run_migrations(&conn).unwrap();

        let version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, 1);

        let tables: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('observations', 'reminders')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
