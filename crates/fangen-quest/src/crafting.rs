//! Crafting: turning inventory items into new ones.

use std::collections::BTreeMap;

use fangen_core::Rarity;
use serde::{Deserialize, Serialize};

use crate::error::{QuestError, QuestResult};
use crate::store::{ProgressStore, UserId};

/// How to make one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// The item produced.
    pub result: String,
    /// Rarity of the produced item.
    #[serde(default)]
    pub rarity: Rarity,
    /// Flavour text.
    #[serde(default)]
    pub description: String,
    /// Required items and how many of each are consumed.
    pub requirements: BTreeMap<String, u32>,
}

/// Whether a recipe can be made right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CraftCheck<'a> {
    /// Everything needed is in the inventory.
    Ready(&'a Recipe),
    /// Lines describing what is missing, e.g. `Ember Dust (have 1, need 3)`.
    Missing(Vec<String>),
}

/// The set of known recipes.
#[derive(Debug, Clone, Default)]
pub struct Workshop {
    recipes: Vec<Recipe>,
}

impl Workshop {
    /// Create a workshop from recipes. Later recipes for the same result are
    /// ignored.
    pub fn new(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let mut unique: Vec<Recipe> = Vec::new();
        for recipe in recipes {
            if unique
                .iter()
                .any(|r| r.result.eq_ignore_ascii_case(&recipe.result))
            {
                tracing::warn!(item = %recipe.result, "duplicate recipe ignored");
                continue;
            }
            unique.push(recipe);
        }
        Self { recipes: unique }
    }

    /// All recipes in configuration order.
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Find a recipe by result name, ignoring case.
    pub fn recipe(&self, item: &str) -> QuestResult<&Recipe> {
        let item = item.trim();
        self.recipes
            .iter()
            .find(|r| r.result.eq_ignore_ascii_case(item))
            .ok_or_else(|| QuestError::NotFound {
                kind: "recipe",
                name: item.to_string(),
            })
    }

    /// Compare a recipe against the user's inventory.
    pub fn check(
        &self,
        store: &dyn ProgressStore,
        user: UserId,
        item: &str,
    ) -> QuestResult<CraftCheck<'_>> {
        let recipe = self.recipe(item)?;
        let mut missing = Vec::new();
        for (name, &need) in &recipe.requirements {
            let have = store.quantity_of(user, name)?;
            if have < need {
                missing.push(format!("{name} (have {have}, need {need})"));
            }
        }
        Ok(if missing.is_empty() {
            CraftCheck::Ready(recipe)
        } else {
            CraftCheck::Missing(missing)
        })
    }

    /// Consume the requirements and add one of the result.
    ///
    /// Returns the missing list instead if the user cannot craft it yet.
    /// Not serialized per user; [`QuestEngine::craft`](crate::QuestEngine::craft)
    /// runs it under the user's lock.
    pub(crate) fn craft(
        &self,
        store: &dyn ProgressStore,
        user: UserId,
        item: &str,
    ) -> QuestResult<CraftCheck<'_>> {
        let check = self.check(store, user, item)?;
        if let CraftCheck::Ready(recipe) = check {
            for (name, &need) in &recipe.requirements {
                store.add_inventory_item(user, name, -i64::from(need), Rarity::Normal)?;
            }
            store.add_inventory_item(user, &recipe.result, 1, recipe.rarity)?;
            tracing::info!(user, item = %recipe.result, "item crafted");
        }
        Ok(check)
    }
}
