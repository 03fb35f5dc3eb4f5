//! Error types for the quest engine.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for quest operations.
pub type QuestResult<T> = Result<T, QuestError>;

/// Errors that can occur while running quests, crafting or discovering.
///
/// Every variant except [`QuestError::Store`] is a user mistake and its
/// message is meant to be shown as is.
#[derive(Debug, Error)]
pub enum QuestError {
    /// Unknown quest, character, item or recipe.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What was looked up.
        kind: &'static str,
        /// The name that did not match.
        name: String,
    },

    /// The user has no quest in progress.
    #[error("You are not on a quest. Start one first.")]
    NoActiveQuest,

    /// The choice id is not offered by the current scene.
    #[error("\"{0}\" is not one of the choices in this scene.")]
    InvalidChoice(String),

    /// The quest has no scenes to play.
    #[error("quest \"{0}\" has no scenes")]
    EmptyQuest(String),

    /// The progress store failed.
    #[error("progress store error: {0}")]
    Store(#[from] StoreError),
}

impl QuestError {
    /// An unknown quest.
    pub fn quest_not_found(name: impl Into<String>) -> Self {
        QuestError::NotFound {
            kind: "quest",
            name: name.into(),
        }
    }

    /// Whether the error is the user's doing rather than a store failure.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, QuestError::Store(_))
    }
}
