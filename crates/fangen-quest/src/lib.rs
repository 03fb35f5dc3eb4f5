//! Quest play and per-user progress for Fangen.
//!
//! [`QuestEngine`] runs branching quests over a shared [`KnowledgeBase`],
//! keeping one active session per user and writing discoveries and
//! inventory changes through a [`ProgressStore`]. The store is SQLite for
//! real use and in-memory for tests.
//!
//! [`KnowledgeBase`]: fangen_core::KnowledgeBase

/// Crafting recipes.
pub mod crafting;
/// Random discovery and progress reports.
pub mod discovery;
mod engine;
mod error;
/// Inventory directives.
pub mod inventory;
/// Structured quest output.
pub mod render;
mod session;
/// User settings.
pub mod settings;
/// Progress persistence.
pub mod store;

pub use crafting::{CraftCheck, Recipe, Workshop};
pub use discovery::{CategoryProgress, ProgressReport, collection, discover, progress};
pub use engine::QuestEngine;
pub use error::{QuestError, QuestResult};
pub use inventory::InventoryUpdate;
pub use render::{AvailableQuest, ChoiceView, QuestEnd, QuestReply, QuestView, SceneRendering};
pub use settings::{DiscoveryFrequency, SettingKey, Theme, UserSettings};
pub use store::{
    Discovery, InventoryItem, MemoryStore, ProgressStore, SettingsMap, SqliteStore, StoreError,
    StoreResult, UserId,
};
