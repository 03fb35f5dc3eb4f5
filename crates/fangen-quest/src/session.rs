//! Per-user quest state.

use chrono::{DateTime, Utc};

/// A quest in progress. At most one exists per user.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestSession {
    /// Title of the quest being played.
    pub quest: String,
    /// Index of the current scene in the quest's scene list.
    pub scene: usize,
    /// Inventory directives collected so far in this run, in order.
    pub updates: Vec<String>,
    /// When the quest was started.
    pub started_at: DateTime<Utc>,
}

impl QuestSession {
    /// A fresh session at the first scene.
    pub fn new(quest: impl Into<String>) -> Self {
        Self {
            quest: quest.into(),
            scene: 0,
            updates: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Move to the scene after the current one.
    pub fn advance(&mut self) {
        self.scene += 1;
    }
}
