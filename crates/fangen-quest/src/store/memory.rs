use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::Utc;
use fangen_core::{Category, Rarity};

use super::{
    Discovery, InventoryItem, ProgressStore, SettingsMap, StoreResult, UserId, apply_delta,
};

#[derive(Debug, Default)]
struct UserData {
    discoveries: Vec<Discovery>,
    inventory: BTreeMap<String, (u32, Rarity)>,
    settings: SettingsMap,
}

/// A progress store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<UserId, UserData>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn record_discovery(&self, user: UserId, category: Category, name: &str) -> StoreResult<bool> {
        let mut users = self.users.lock()?;
        let data = users.entry(user).or_default();
        if data
            .discoveries
            .iter()
            .any(|d| d.category == category && d.name == name)
        {
            return Ok(false);
        }
        data.discoveries.push(Discovery {
            category,
            name: name.to_string(),
            discovered_at: Utc::now(),
        });
        Ok(true)
    }

    fn is_discovered(&self, user: UserId, category: Category, name: &str) -> StoreResult<bool> {
        let users = self.users.lock()?;
        Ok(users.get(&user).is_some_and(|data| {
            data.discoveries
                .iter()
                .any(|d| d.category == category && d.name == name)
        }))
    }

    fn discoveries(&self, user: UserId) -> StoreResult<Vec<Discovery>> {
        let users = self.users.lock()?;
        Ok(users
            .get(&user)
            .map(|data| data.discoveries.clone())
            .unwrap_or_default())
    }

    fn add_inventory_item(
        &self,
        user: UserId,
        name: &str,
        quantity: i64,
        rarity: Rarity,
    ) -> StoreResult<()> {
        let mut users = self.users.lock()?;
        let inventory = &mut users.entry(user).or_default().inventory;
        let (held, rarity) = inventory.get(name).copied().unwrap_or((0, rarity));
        match apply_delta(held, quantity) {
            0 => {
                inventory.remove(name);
            }
            left => {
                inventory.insert(name.to_string(), (left, rarity));
            }
        }
        Ok(())
    }

    fn inventory(&self, user: UserId) -> StoreResult<Vec<InventoryItem>> {
        let users = self.users.lock()?;
        Ok(users
            .get(&user)
            .map(|data| {
                data.inventory
                    .iter()
                    .map(|(name, (quantity, rarity))| InventoryItem {
                        name: name.clone(),
                        quantity: *quantity,
                        rarity: *rarity,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn settings(&self, user: UserId) -> StoreResult<SettingsMap> {
        let users = self.users.lock()?;
        Ok(users
            .get(&user)
            .map(|data| data.settings.clone())
            .unwrap_or_default())
    }

    fn set_settings(&self, user: UserId, settings: &SettingsMap) -> StoreResult<()> {
        let mut users = self.users.lock()?;
        users.entry(user).or_default().settings = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[test]
    fn discoveries_are_idempotent() {
        contract::discoveries_are_idempotent(&MemoryStore::new());
    }

    #[test]
    fn discoveries_keep_order() {
        contract::discoveries_keep_order(&MemoryStore::new());
    }

    #[test]
    fn inventory_adds_and_clamps() {
        contract::inventory_adds_and_clamps(&MemoryStore::new());
    }

    #[test]
    fn settings_roundtrip() {
        contract::settings_roundtrip(&MemoryStore::new());
    }
}
