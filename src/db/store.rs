//! Key-value persistence capability.
//!
//! Settings and analytics are small JSON documents behind an async get/set
//! interface; everything above this module depends on the trait, so tests
//! swap in [`MemoryStore`] without touching SQLite.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{now_ms, Settings};

const KEY_SETTINGS: &str = "settings";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SQLite implementation
// ---------------------------------------------------------------------------

pub struct SqliteStore {
    pool: sqlx::SqlitePool,
}

impl SqliteStore {
    /// Creates the `kv` table on first run.
    pub async fn new(pool: sqlx::SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation (tests, dry runs)
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .inner
            .lock()
            .map_or(None, |map| map.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Settings record
// ---------------------------------------------------------------------------

/// Read the settings record; a missing or corrupt record yields defaults.
pub async fn load_settings(store: &dyn KeyValueStore) -> Settings {
    match store.get(KEY_SETTINGS).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
        _ => Settings::default(),
    }
}

pub async fn save_settings(store: &dyn KeyValueStore, settings: &Settings) -> Result<()> {
    let raw = serde_json::to_string(settings)?;
    store.set(KEY_SETTINGS, &raw).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn settings_round_trip() {
        let store = MemoryStore::default();
        let settings = Settings {
            min_amount: Some(1_000.0),
            max_amount: Some(5_000.0),
            currency: Some("UAH".to_string()),
            max_price: Some(41.8),
            pages_to_check: 3,
        };
        save_settings(&store, &settings).await.expect("saves");

        let loaded = load_settings(&store).await;
        assert_eq!(loaded.min_amount, Some(1_000.0));
        assert_eq!(loaded.currency.as_deref(), Some("UAH"));
        assert_eq!(loaded.pages_to_check, 3);
    }

    #[tokio::test]
    async fn missing_settings_default() {
        let store = MemoryStore::default();
        let loaded = load_settings(&store).await;
        assert!(loaded.min_amount.is_none());
        assert!(!loaded.has_amount_range());
        assert_eq!(loaded.pages_to_check, 2);
    }

    #[tokio::test]
    async fn memory_store_get_set() {
        let store = MemoryStore::default();
        assert!(store.get("k").await.expect("get").is_none());
        store.set("k", "v1").await.expect("set");
        store.set("k", "v2").await.expect("overwrite");
        assert_eq!(store.get("k").await.expect("get").as_deref(), Some("v2"));
    }
}
