use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::MIGRATION_001_INITIAL;

/// Named entries in the slot table. Each slot is read and written independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Records,
    Categories,
    Budget,
}

impl Slot {
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Records => "offline_budget_expenses_v1",
            Slot::Categories => "offline_budget_categories_v1",
            Slot::Budget => "offline_budget_monthly_budget_v1",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Outcome of reading a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue<T> {
    /// Nothing has been stored yet
    Absent,
    /// Something is stored but it does not decode
    Corrupt(String),
    Present(T),
}

impl<T> SlotValue<T> {
    /// The stored value, or `fallback` when absent or corrupt.
    pub fn or(self, fallback: T) -> T {
        match self {
            SlotValue::Present(value) => value,
            SlotValue::Absent | SlotValue::Corrupt(_) => fallback,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, SlotValue::Corrupt(_))
    }
}

impl<T: Default> SlotValue<T> {
    pub fn or_default(self) -> T {
        self.or(T::default())
    }
}

/// Key/value store for the ledger state, backed by SQLite.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Create the slot table if it does not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Open (creating if needed) the database file at `path` and migrate it.
    pub async fn open(path: &str) -> Result<Self> {
        let repo = Self::connect(&format!("sqlite:{}?mode=rwc", path)).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Read the raw text stored in a slot.
    pub async fn read_raw(&self, slot: Slot) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM slots WHERE key = ?")
            .bind(slot.key())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read slot {}", slot))?;

        Ok(row.map(|row| row.get("value")))
    }

    /// Overwrite a slot with raw text.
    pub async fn write_raw(&self, slot: Slot, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO slots (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(slot.key())
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write slot {}", slot))?;
        Ok(())
    }

    /// Remove a slot entirely, so the next read reports it absent.
    pub async fn clear_slot(&self, slot: Slot) -> Result<()> {
        sqlx::query("DELETE FROM slots WHERE key = ?")
            .bind(slot.key())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to clear slot {}", slot))?;
        Ok(())
    }

    /// Decode a slot as JSON. Only database failures are errors; bad
    /// content is reported as `SlotValue::Corrupt`.
    pub async fn load_slot<T: DeserializeOwned>(&self, slot: Slot) -> Result<SlotValue<T>> {
        let value = match self.read_raw(slot).await? {
            None => SlotValue::Absent,
            Some(raw) if raw.trim().is_empty() => SlotValue::Absent,
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => SlotValue::Present(value),
                Err(e) => SlotValue::Corrupt(e.to_string()),
            },
        };
        debug!(slot = %slot, absent = matches!(value, SlotValue::Absent), "loaded slot");
        Ok(value)
    }

    /// Encode `value` as JSON and store it in `slot`.
    pub async fn save_slot<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("Failed to encode slot {}", slot))?;
        self.write_raw(slot, &json).await?;
        debug!(slot = %slot, bytes = json.len(), "saved slot");
        Ok(())
    }
}
