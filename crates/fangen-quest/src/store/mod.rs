//! Per-user progress: discoveries, inventory and settings.
//!
//! The engine only talks to the [`ProgressStore`] trait. [`MemoryStore`]
//! keeps everything in process; [`SqliteStore`] persists to a database file.

mod memory;
mod sqlite;

use std::sync::PoisonError;

use chrono::{DateTime, Utc};
use fangen_core::{Category, Rarity};
use serde::Serialize;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Identifies a user across sessions.
pub type UserId = i64;

/// Free-form user settings as stored.
pub type SettingsMap = serde_json::Map<String, serde_json::Value>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a progress store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected an operation.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored JSON could not be read or written.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value is not one this program writes.
    #[error("corrupt stored value: {0}")]
    Corrupt(String),

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(_: PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}

/// One inventory row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    /// Item name.
    pub name: String,
    /// How many the user holds. Always positive.
    pub quantity: u32,
    /// Item tier.
    pub rarity: Rarity,
}

/// A discovered lore entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    /// Category of the entry.
    pub category: Category,
    /// Entry name.
    pub name: String,
    /// When it was first discovered.
    pub discovered_at: DateTime<Utc>,
}

/// Durable per-user state used by the quest engine and the lore browser.
///
/// Implementations synchronize internally; every method takes `&self`.
pub trait ProgressStore: Send + Sync {
    /// Mark an entry as discovered. Returns `true` if it was not already.
    fn record_discovery(&self, user: UserId, category: Category, name: &str) -> StoreResult<bool>;

    /// Whether the user has discovered an entry.
    fn is_discovered(&self, user: UserId, category: Category, name: &str) -> StoreResult<bool>;

    /// Every discovery of a user, oldest first.
    fn discoveries(&self, user: UserId) -> StoreResult<Vec<Discovery>>;

    /// Add (positive) or remove (negative) items. Removing more than held
    /// leaves none, and a row that reaches zero is dropped. The rarity is
    /// only used when the row is created.
    fn add_inventory_item(
        &self,
        user: UserId,
        name: &str,
        quantity: i64,
        rarity: Rarity,
    ) -> StoreResult<()>;

    /// The user's inventory, sorted by name.
    fn inventory(&self, user: UserId) -> StoreResult<Vec<InventoryItem>>;

    /// Stored settings, empty if never set.
    fn settings(&self, user: UserId) -> StoreResult<SettingsMap>;

    /// Replace stored settings.
    fn set_settings(&self, user: UserId, settings: &SettingsMap) -> StoreResult<()>;

    /// How many of an item the user holds.
    fn quantity_of(&self, user: UserId, name: &str) -> StoreResult<u32> {
        Ok(self
            .inventory(user)?
            .into_iter()
            .find(|item| item.name == name)
            .map_or(0, |item| item.quantity))
    }
}

/// Quantity after applying a signed change, clamped to what fits a row.
pub(crate) fn apply_delta(held: u32, delta: i64) -> u32 {
    (i64::from(held) + delta).clamp(0, i64::from(u32::MAX)) as u32
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every store must share; run against each implementation.

    use super::*;

    pub fn discoveries_are_idempotent(store: &dyn ProgressStore) {
        assert!(store.record_discovery(1, Category::Quests, "Ember Trial").unwrap());
        assert!(!store.record_discovery(1, Category::Quests, "Ember Trial").unwrap());
        assert!(store.is_discovered(1, Category::Quests, "Ember Trial").unwrap());
        assert!(!store.is_discovered(2, Category::Quests, "Ember Trial").unwrap());
        assert!(!store.is_discovered(1, Category::Items, "Ember Trial").unwrap());
        assert_eq!(store.discoveries(1).unwrap().len(), 1);
    }

    pub fn discoveries_keep_order(store: &dyn ProgressStore) {
        store.record_discovery(7, Category::World, "Overview").unwrap();
        store.record_discovery(7, Category::Characters, "Miyou").unwrap();
        let names: Vec<String> = store
            .discoveries(7)
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Overview", "Miyou"]);
    }

    pub fn inventory_adds_and_clamps(store: &dyn ProgressStore) {
        store.add_inventory_item(1, "Ember Dust", 2, Rarity::Normal).unwrap();
        store.add_inventory_item(1, "Ember Dust", 1, Rarity::Rare).unwrap();
        store.add_inventory_item(1, "Moon Blade", 1, Rarity::Legendary).unwrap();
        let inventory = store.inventory(1).unwrap();
        assert_eq!(
            inventory,
            vec![
                InventoryItem {
                    name: "Ember Dust".into(),
                    quantity: 3,
                    rarity: Rarity::Normal,
                },
                InventoryItem {
                    name: "Moon Blade".into(),
                    quantity: 1,
                    rarity: Rarity::Legendary,
                },
            ]
        );

        store.add_inventory_item(1, "Ember Dust", -10, Rarity::Normal).unwrap();
        assert_eq!(store.quantity_of(1, "Ember Dust").unwrap(), 0);
        assert_eq!(store.inventory(1).unwrap().len(), 1);

        // Removing something never held is a no-op.
        store.add_inventory_item(1, "Torch", -1, Rarity::Normal).unwrap();
        assert_eq!(store.inventory(1).unwrap().len(), 1);
        assert!(store.inventory(2).unwrap().is_empty());
    }

    pub fn settings_roundtrip(store: &dyn ProgressStore) {
        assert!(store.settings(1).unwrap().is_empty());
        let mut settings = SettingsMap::new();
        settings.insert("theme".into(), "mystic".into());
        settings.insert("notifications".into(), false.into());
        store.set_settings(1, &settings).unwrap();
        assert_eq!(store.settings(1).unwrap(), settings);

        settings.insert("theme".into(), "dark".into());
        store.set_settings(1, &settings).unwrap();
        assert_eq!(store.settings(1).unwrap()["theme"], "dark");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_clamps_at_zero() {
        assert_eq!(apply_delta(3, -5), 0);
        assert_eq!(apply_delta(3, 2), 5);
        assert_eq!(apply_delta(u32::MAX, 1), u32::MAX);
    }
}
