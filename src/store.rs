use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

use crate::types::Workout;

/// The whole workout list lives under this one key.
pub const WORKOUTS_KEY: &str = "workouts";

/// Small key-value store, the local equivalent of browser storage.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self> {
        let display = path.display();
        let conn =
            Connection::open(path).with_context(|| format!("Opening store: {display}"))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        )
        .context("Creating kv table")?;
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .with_context(|| format!("Reading key {key:?}"))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .with_context(|| format!("Writing key {key:?}"))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", [key])
            .with_context(|| format!("Removing key {key:?}"))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Serializes the workout list under [`WORKOUTS_KEY`] as a JSON array of
/// flat objects with a `type` discriminator. Derived metrics are stored
/// and reloaded verbatim, never recomputed.
pub struct WorkoutStore<S> {
    storage: S,
}

impl<S: Storage> WorkoutStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// An absent entry is an empty list; a malformed one is an error,
    /// surfaced to the caller instead of silently starting over.
    pub fn load(&self) -> Result<Vec<Workout>> {
        let Some(raw) = self.storage.get(WORKOUTS_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).context("Parsing stored workout list")
    }

    pub fn save(&mut self, list: &[Workout]) -> Result<()> {
        let raw = serde_json::to_string(list).context("Serializing workout list")?;
        self.storage.set(WORKOUTS_KEY, &raw)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove(WORKOUTS_KEY)
    }
}
