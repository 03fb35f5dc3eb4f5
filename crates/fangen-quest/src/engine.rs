//! The quest engine: one scene-by-scene run per user.
//!
//! Progression is linear. A choice picks the outcome text and the loot, then
//! the run moves on to the next scene in lore order whichever choice was
//! taken.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as Slot;
use fangen_core::{Category, KnowledgeBase, QuestDefinition, Rarity};

use crate::crafting::{CraftCheck, Workshop};
use crate::error::{QuestError, QuestResult};
use crate::inventory::InventoryUpdate;
use crate::render::{
    AvailableQuest, CONTINUE, QuestEnd, QuestReply, QuestView, SceneRendering, narrative,
};
use crate::session::QuestSession;
use crate::settings::{SettingKey, UserSettings};
use crate::store::{InventoryItem, ProgressStore, UserId};

/// Runs quests for any number of users.
///
/// The knowledge base is shared and read-only. Each user's session sits in
/// its own map slot, and every mutating operation holds that slot for its
/// whole duration, so two choices from the same user never interleave.
pub struct QuestEngine {
    knowledge: Arc<KnowledgeBase>,
    store: Arc<dyn ProgressStore>,
    sessions: DashMap<UserId, QuestSession>,
}

impl QuestEngine {
    /// Create an engine over a loaded knowledge base and a progress store.
    pub fn new(knowledge: Arc<KnowledgeBase>, store: Arc<dyn ProgressStore>) -> Self {
        Self {
            knowledge,
            store,
            sessions: DashMap::new(),
        }
    }

    /// The knowledge base quests are read from.
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// The progress store.
    pub fn store(&self) -> &dyn ProgressStore {
        self.store.as_ref()
    }

    /// Title of the user's quest in progress, if any.
    pub fn active_quest(&self, user: UserId) -> Option<String> {
        self.sessions.get(&user).map(|s| s.quest.clone())
    }

    /// Every playable quest with the user's completion flag, sorted by title.
    pub fn available_quests(&self, user: UserId) -> QuestResult<Vec<AvailableQuest>> {
        self.knowledge
            .quests()
            .into_iter()
            .map(|name| {
                let completed = self.store.is_discovered(user, Category::Quests, &name)?;
                Ok(AvailableQuest { name, completed })
            })
            .collect()
    }

    /// Begin a quest at its first scene, discarding any run in progress.
    pub fn start_quest(&self, user: UserId, name: &str) -> QuestResult<QuestReply> {
        let quest = self.resolve_quest(name)?;
        let first = quest
            .scenes
            .first()
            .ok_or_else(|| QuestError::EmptyQuest(quest.title.clone()))?;

        if let Some(previous) = self.sessions.insert(user, QuestSession::new(&quest.title)) {
            tracing::debug!(user, quest = %previous.quest, "previous quest discarded");
        }
        tracing::debug!(user, quest = %quest.title, "quest started");

        let mut message = format!("You begin the quest: {}", quest.title);
        if !quest.description.is_empty() {
            message.push_str("\n\n");
            message.push_str(&quest.description);
        }
        Ok(QuestReply {
            message,
            view: QuestView::Scene(SceneRendering::new(&quest.title, first)),
        })
    }

    /// Show the current scene again without changing anything.
    pub fn current_quest(&self, user: UserId) -> QuestResult<QuestReply> {
        let session = self.sessions.get(&user).ok_or(QuestError::NoActiveQuest)?;
        let quest = self.resolve_quest(&session.quest)?;
        let scene = quest
            .scenes
            .get(session.scene)
            .ok_or(QuestError::NoActiveQuest)?;

        Ok(QuestReply {
            message: format!(
                "{}: scene {} of {}",
                quest.title,
                session.scene + 1,
                quest.scenes.len()
            ),
            view: QuestView::Scene(SceneRendering::new(&quest.title, scene)),
        })
    }

    /// Take a choice in the current scene. A scene without choices accepts
    /// [`CONTINUE`].
    ///
    /// The choice's inventory directives are applied to the store before the
    /// run advances. If the next scene does not exist, or is the last one and
    /// offers no choices, the quest completes.
    pub fn make_choice(&self, user: UserId, choice_id: &str) -> QuestResult<QuestReply> {
        let Slot::Occupied(mut slot) = self.sessions.entry(user) else {
            return Err(QuestError::NoActiveQuest);
        };

        let quest = match self.resolve_quest(&slot.get().quest) {
            Ok(quest) => quest,
            Err(e) => {
                slot.remove();
                return Err(e);
            }
        };
        let index = slot.get().scene;
        let Some(scene) = quest.scenes.get(index) else {
            slot.remove();
            return Err(QuestError::NoActiveQuest);
        };
        let (outcome, directives) = match scene.choice(choice_id.trim()) {
            Some(choice) => (choice.outcome.clone(), choice.inventory_updates.clone()),
            None if scene.choices.is_empty() && choice_id.trim().eq_ignore_ascii_case(CONTINUE) => {
                (String::new(), Vec::new())
            }
            None => return Err(QuestError::InvalidChoice(choice_id.trim().to_string())),
        };

        self.apply_directives(user, &directives)?;

        let session = slot.get_mut();
        session.updates.extend(directives);

        let next = index + 1;
        let finished = match quest.scenes.get(next) {
            None => true,
            Some(scene) => next + 1 == quest.scenes.len() && scene.choices.is_empty(),
        };

        if !finished {
            session.advance();
            tracing::debug!(user, quest = %quest.title, scene = next, "scene advanced");
            return Ok(QuestReply {
                message: outcome,
                view: QuestView::Scene(SceneRendering::new(&quest.title, &quest.scenes[next])),
            });
        }

        let session = slot.remove();
        self.store
            .record_discovery(user, Category::Quests, &quest.title)?;
        tracing::info!(
            user,
            quest = %quest.title,
            secs = (Utc::now() - session.started_at).num_seconds(),
            "quest completed"
        );

        let final_scene = quest.scenes.get(next).map(narrative).unwrap_or_default();
        let text = [
            outcome.as_str(),
            final_scene.as_str(),
            quest.epilogue.as_deref().unwrap_or_default(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

        Ok(QuestReply {
            message: format!("Quest complete: {}", quest.title),
            view: QuestView::End(QuestEnd {
                title: quest.title.clone(),
                text,
                rewards: session.updates,
            }),
        })
    }

    /// Drop the user's quest in progress. Succeeds even when there is none.
    pub fn abandon_quest(&self, user: UserId) -> String {
        match self.sessions.remove(&user) {
            Some((_, session)) => {
                tracing::debug!(user, quest = %session.quest, "quest abandoned");
                format!("You have abandoned the quest: {}", session.quest)
            }
            None => "You are not on a quest.".to_string(),
        }
    }

    /// The user's inventory.
    pub fn inventory(&self, user: UserId) -> QuestResult<Vec<InventoryItem>> {
        Ok(self.store.inventory(user)?)
    }

    /// Craft an item from the user's inventory.
    ///
    /// Holds the user's slot while checking and consuming, so two crafts (or
    /// a craft and a choice) for the same user cannot spend the same items.
    pub fn craft<'w>(
        &self,
        workshop: &'w Workshop,
        user: UserId,
        item: &str,
    ) -> QuestResult<CraftCheck<'w>> {
        let _slot = self.sessions.entry(user);
        workshop.craft(self.store.as_ref(), user, item)
    }

    /// Flip or advance one of the user's settings and persist it.
    pub fn update_setting(&self, user: UserId, key: SettingKey) -> QuestResult<UserSettings> {
        let _slot = self.sessions.entry(user);
        Ok(UserSettings::update(self.store.as_ref(), user, key)?)
    }

    /// An in-character reply, using the message as the topic. Talking to a
    /// known character counts as discovering them.
    pub fn character_response(
        &self,
        user: UserId,
        character: &str,
        message: &str,
    ) -> QuestResult<String> {
        if self.knowledge.character_info(character).is_some() {
            self.store
                .record_discovery(user, Category::Characters, character)?;
        }
        Ok(self.knowledge.character_dialogue(character, message.trim()))
    }

    fn resolve_quest(&self, name: &str) -> QuestResult<&QuestDefinition> {
        if let Some(quest) = self.knowledge.quest_info(name) {
            return Ok(quest);
        }
        let wanted = name.trim().to_lowercase();
        self.knowledge
            .quests()
            .iter()
            .find(|title| title.to_lowercase() == wanted)
            .and_then(|title| self.knowledge.quest_info(title))
            .ok_or_else(|| QuestError::quest_not_found(name))
    }

    fn apply_directives(&self, user: UserId, directives: &[String]) -> QuestResult<()> {
        for directive in directives {
            let Some(update) = InventoryUpdate::parse(directive) else {
                tracing::warn!(directive = %directive, "unreadable inventory directive ignored");
                continue;
            };
            let rarity = self
                .knowledge
                .item_info(&update.item)
                .map_or(Rarity::Normal, |item| item.rarity);
            self.store
                .add_inventory_item(user, &update.item, update.quantity, rarity)?;
            tracing::debug!(user, %update, "inventory updated");
        }
        Ok(())
    }
}
