//! SQLite storage for session state

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ChefError, Result};
use crate::suggestions::{PairingLedger, SkillTier, SuggestionResult};

use super::{SessionRecord, StateStore, StoredSession, UpdateFn};

/// Schema steps, applied in order and tracked by `PRAGMA user_version`.
const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS session_state (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        interaction_count INTEGER NOT NULL,
        skill_tier TEXT NOT NULL,
        history_count INTEGER NOT NULL,
        confidence REAL NOT NULL DEFAULT 0,
        saved_at TEXT
     );
     CREATE TABLE IF NOT EXISTS suggestions (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        template_id INTEGER NOT NULL,
        confidence REAL NOT NULL,
        created_at TEXT NOT NULL,
        payload TEXT NOT NULL
     );
     CREATE TABLE IF NOT EXISTS pairings (
        a TEXT NOT NULL,
        b TEXT NOT NULL,
        score REAL NOT NULL,
        PRIMARY KEY (a, b)
     );
     CREATE TABLE IF NOT EXISTS rated (
        result_id TEXT PRIMARY KEY
     );",
    "ALTER TABLE session_state ADD COLUMN feedback_count INTEGER NOT NULL DEFAULT 0;",
];

pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;

/// SQLite database holding one session.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: PathBuf,
    schema_version: u32,
}

impl SqliteStore {
    /// Open (creating if needed) the database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| ChefError::persistence("create database directory", err))?;
        }

        let conn = Connection::open(path)
            .map_err(|err| ChefError::persistence(&format!("open {}", path.display()), err))?;
        Self::configure_pragmas(&conn)?;
        let schema_version = run_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
            schema_version,
        })
    }

    /// Current schema version after migrations.
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|err| ChefError::persistence("configure database", err))
    }

    fn load_inner(conn: &Connection) -> Result<Option<StoredSession>> {
        let row = conn
            .query_row(
                "SELECT interaction_count, skill_tier, history_count, confidence, saved_at, feedback_count
                 FROM session_state WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()?;
        let Some((interactions, tier, history_count, confidence, saved_at, feedback_count)) = row else {
            return Ok(None);
        };

        let record = SessionRecord {
            interaction_count: u64::try_from(interactions).unwrap_or(0),
            skill_tier: tier.parse::<SkillTier>()?,
            history_count: u64::try_from(history_count).unwrap_or(0),
            confidence,
        };
        let saved_at = saved_at
            .map(|raw| DateTime::parse_from_rfc3339(&raw).map(|ts| ts.with_timezone(&Utc)))
            .transpose()
            .map_err(|err| ChefError::Persistence(format!("bad saved_at: {err}")))?;

        let mut stmt = conn.prepare("SELECT payload FROM suggestions ORDER BY seq")?;
        let history = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|payload| Ok(serde_json::from_str::<SuggestionResult>(&payload?)?))
            .collect::<Result<Vec<_>>>()?;

        let mut stmt = conn.prepare("SELECT a, b, score FROM pairings")?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<std::result::Result<Vec<(String, String, f64)>, _>>()?;

        let mut stmt = conn.prepare("SELECT result_id FROM rated")?;
        let rated = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|raw| {
                Uuid::parse_str(&raw?).map_err(|err| ChefError::Persistence(format!("bad rated id: {err}")))
            })
            .collect::<Result<BTreeSet<_>>>()?;

        Ok(Some(StoredSession {
            record,
            history,
            pairings: PairingLedger::from_parts(pairs, rated, u64::try_from(feedback_count).unwrap_or(0)),
            saved_at,
        }))
    }

    /// Rewrite every table. Runs inside the caller's transaction.
    fn write_inner(tx: &Connection, session: &StoredSession) -> Result<()> {
        let record = &session.record;
        tx.execute(
            "INSERT INTO session_state
                (id, interaction_count, skill_tier, history_count, confidence, saved_at, feedback_count)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                interaction_count = excluded.interaction_count,
                skill_tier = excluded.skill_tier,
                history_count = excluded.history_count,
                confidence = excluded.confidence,
                saved_at = excluded.saved_at,
                feedback_count = excluded.feedback_count",
            params![
                i64::try_from(record.interaction_count).unwrap_or(i64::MAX),
                record.skill_tier.label(),
                i64::try_from(record.history_count).unwrap_or(i64::MAX),
                record.confidence,
                session.saved_at.map(|ts| ts.to_rfc3339()),
                i64::try_from(session.pairings.feedback_count()).unwrap_or(i64::MAX),
            ],
        )?;

        // History and pairings are small and bounded; rewrite them whole.
        tx.execute_batch("DELETE FROM suggestions; DELETE FROM pairings; DELETE FROM rated;")?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO suggestions (id, template_id, confidence, created_at, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for entry in &session.history {
                insert.execute(params![
                    entry.id.to_string(),
                    entry.template.id,
                    entry.confidence,
                    entry.created_at.to_rfc3339(),
                    serde_json::to_string(entry)?,
                ])?;
            }

            let mut insert = tx.prepare("INSERT INTO pairings (a, b, score) VALUES (?1, ?2, ?3)")?;
            for (a, b, score) in session.pairings.pairs() {
                insert.execute(params![a, b, score])?;
            }

            let mut insert = tx.prepare("INSERT INTO rated (result_id) VALUES (?1)")?;
            for id in session.pairings.rated() {
                insert.execute(params![id.to_string()])?;
            }
        }
        Ok(())
    }
}

impl StateStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn load(&self) -> Result<Option<StoredSession>> {
        let conn = self.conn.lock();
        Self::load_inner(&conn).map_err(|err| as_persistence("load session", err))
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        let mut conn = self.conn.lock();
        let written = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(ChefError::from)
            .and_then(|tx| {
                Self::write_inner(&tx, session)?;
                tx.commit()?;
                Ok(())
            });
        written.map_err(|err| as_persistence("save session", err))?;
        debug!(path = %self.path.display(), entries = session.history.len(), "state saved");
        Ok(())
    }

    fn update(&self, apply: &mut UpdateFn<'_>) -> Result<()> {
        let mut conn = self.conn.lock();
        // IMMEDIATE takes the write lock up front, so the read below is
        // already serialized against other writers.
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| ChefError::persistence("begin update", err))?;
        let latest = Self::load_inner(&tx).map_err(|err| as_persistence("load session", err));
        if let Some(next) = apply(latest) {
            Self::write_inner(&tx, &next).map_err(|err| as_persistence("save session", err))?;
        }
        tx.commit()
            .map_err(|err| ChefError::persistence("commit update", err))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.conn
            .lock()
            .execute_batch(
                "DELETE FROM session_state; DELETE FROM suggestions;
                 DELETE FROM pairings; DELETE FROM rated;",
            )
            .map_err(|err| ChefError::persistence("clear session", err))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

fn as_persistence(context: &str, err: ChefError) -> ChefError {
    match err {
        ChefError::Persistence(_) => err,
        other => ChefError::persistence(context, other),
    }
}

fn run_migrations(conn: &Connection) -> Result<u32> {
    let current: u32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|err| ChefError::persistence("read schema version", err))?;
    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let version = idx + 1;
        conn.execute_batch(&format!("BEGIN; {sql} PRAGMA user_version = {version}; COMMIT;"))
            .map_err(|err| ChefError::persistence(&format!("migration {version}"), err))?;
        debug!(version, "applied schema migration");
    }
    Ok(SCHEMA_VERSION.max(current))
}
