use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use fangen_core::{Category, Rarity};
use rusqlite::{Connection, OptionalExtension, params};

use super::{
    Discovery, InventoryItem, ProgressStore, SettingsMap, StoreError, StoreResult, UserId,
    apply_delta,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
  user_id INTEGER PRIMARY KEY,
  settings TEXT NOT NULL DEFAULT '{}',
  joined_at TEXT NOT NULL,
  last_active TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_progress (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER NOT NULL,
  category TEXT NOT NULL,
  item_name TEXT NOT NULL,
  discovery_date TEXT NOT NULL,
  UNIQUE (user_id, category, item_name)
);

CREATE TABLE IF NOT EXISTS inventory (
  user_id INTEGER NOT NULL,
  item_name TEXT NOT NULL,
  quantity INTEGER NOT NULL,
  rarity TEXT NOT NULL,
  PRIMARY KEY (user_id, item_name)
);
"#;

/// A progress store backed by a SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "progress database opened");
        Self::init(conn)
    }

    /// A private database that disappears with the store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn touch_user(conn: &Connection, user: UserId) -> StoreResult<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO users (user_id, joined_at, last_active) VALUES (?1, ?2, ?2)
         ON CONFLICT(user_id) DO UPDATE SET last_active = excluded.last_active",
        params![user, now],
    )?;
    Ok(())
}

fn parse_category(value: &str) -> StoreResult<Category> {
    Category::parse(value).ok_or_else(|| StoreError::Corrupt(format!("category {value:?}")))
}

fn parse_rarity(value: &str) -> StoreResult<Rarity> {
    Rarity::parse(value).ok_or_else(|| StoreError::Corrupt(format!("rarity {value:?}")))
}

fn parse_time(value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| StoreError::Corrupt(format!("timestamp {value:?}")))
}

impl ProgressStore for SqliteStore {
    fn record_discovery(&self, user: UserId, category: Category, name: &str) -> StoreResult<bool> {
        let conn = self.conn.lock()?;
        touch_user(&conn, user)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO user_progress (user_id, category, item_name, discovery_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![user, category.as_str(), name, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted == 1)
    }

    fn is_discovered(&self, user: UserId, category: Category, name: &str) -> StoreResult<bool> {
        let conn = self.conn.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM user_progress WHERE user_id = ?1 AND category = ?2 AND item_name = ?3",
                params![user, category.as_str(), name],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn discoveries(&self, user: UserId) -> StoreResult<Vec<Discovery>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            "SELECT category, item_name, discovery_date FROM user_progress
             WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![user], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(category, name, date)| {
                Ok(Discovery {
                    category: parse_category(&category)?,
                    name,
                    discovered_at: parse_time(&date)?,
                })
            })
            .collect()
    }

    fn add_inventory_item(
        &self,
        user: UserId,
        name: &str,
        quantity: i64,
        rarity: Rarity,
    ) -> StoreResult<()> {
        let mut conn = self.conn.lock()?;
        let tx = conn.transaction()?;
        touch_user(&tx, user)?;

        let held: Option<i64> = tx
            .query_row(
                "SELECT quantity FROM inventory WHERE user_id = ?1 AND item_name = ?2",
                params![user, name],
                |row| row.get(0),
            )
            .optional()?;
        let current = held.map_or(0, |q| u32::try_from(q).unwrap_or(0));

        match (held, apply_delta(current, quantity)) {
            (None, 0) => {}
            (Some(_), 0) => {
                tx.execute(
                    "DELETE FROM inventory WHERE user_id = ?1 AND item_name = ?2",
                    params![user, name],
                )?;
            }
            (Some(_), left) => {
                tx.execute(
                    "UPDATE inventory SET quantity = ?3 WHERE user_id = ?1 AND item_name = ?2",
                    params![user, name, left],
                )?;
            }
            (None, left) => {
                tx.execute(
                    "INSERT INTO inventory (user_id, item_name, quantity, rarity) VALUES (?1, ?2, ?3, ?4)",
                    params![user, name, left, rarity.as_str()],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn inventory(&self, user: UserId) -> StoreResult<Vec<InventoryItem>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            "SELECT item_name, quantity, rarity FROM inventory WHERE user_id = ?1 ORDER BY item_name",
        )?;
        let rows = stmt
            .query_map(params![user], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(name, quantity, rarity)| {
                Ok(InventoryItem {
                    name,
                    quantity,
                    rarity: parse_rarity(&rarity)?,
                })
            })
            .collect()
    }

    fn settings(&self, user: UserId) -> StoreResult<SettingsMap> {
        let conn = self.conn.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT settings FROM users WHERE user_id = ?1",
                params![user],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(SettingsMap::new()),
        }
    }

    fn set_settings(&self, user: UserId, settings: &SettingsMap) -> StoreResult<()> {
        let json = serde_json::to_string(settings)?;
        let conn = self.conn.lock()?;
        touch_user(&conn, user)?;
        conn.execute(
            "UPDATE users SET settings = ?2 WHERE user_id = ?1",
            params![user, json],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[test]
    fn discoveries_are_idempotent() {
        contract::discoveries_are_idempotent(&SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn discoveries_keep_order() {
        contract::discoveries_keep_order(&SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn inventory_adds_and_clamps() {
        contract::inventory_adds_and_clamps(&SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn settings_roundtrip() {
        contract::settings_roundtrip(&SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn progress_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.record_discovery(3, Category::Items, "Moon Blade").unwrap();
            store.add_inventory_item(3, "Moon Blade", 1, Rarity::Legendary).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert!(store.is_discovered(3, Category::Items, "Moon Blade").unwrap());
        assert_eq!(store.inventory(3).unwrap()[0].rarity, Rarity::Legendary);
    }

    #[test]
    fn corrupt_rarity_is_reported() {
        let store = SqliteStore::open_in_memory().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO inventory (user_id, item_name, quantity, rarity) VALUES (1, 'X', 1, 'Mythic')",
                [],
            )
            .unwrap();
        }
        assert!(matches!(store.inventory(1), Err(StoreError::Corrupt(_))));
    }
}
