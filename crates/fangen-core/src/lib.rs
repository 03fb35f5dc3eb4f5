//! Core types for Fangen: lore categories, entries, quests, and the knowledge base.
//!
//! This crate defines the data model the lore parser builds into. It is
//! independent of the parser; a [`KnowledgeBase`] can be assembled by hand,
//! which is what most tests in the workspace do.

/// Lore categories.
pub mod category;
/// Entry content: free text and structured profiles.
pub mod entry;
/// The knowledge base and its read-only query surface.
pub mod knowledge;
/// Canned character responses keyed on personality.
pub mod voice;

/// Re-export category types.
pub use category::Category;
/// Re-export entry types.
pub use entry::{
    CharacterProfile, Choice, Entry, ItemProfile, QuestDefinition, Rarity, RarityBasis, Scene,
};
/// Re-export the knowledge base.
pub use knowledge::KnowledgeBase;
/// Re-export voice types.
pub use voice::Tone;
