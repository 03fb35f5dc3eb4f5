use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The content of a single lore entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    /// Free text (events, themes, item tiers, quest narratives).
    Text(String),
    /// A character profile.
    Character(CharacterProfile),
    /// A catalogued item.
    Item(ItemProfile),
    /// A playable quest.
    Quest(QuestDefinition),
}

impl Entry {
    /// The string-valued fields of this entry, in a stable order.
    ///
    /// Scenes are not included; only the top-level text of a quest is.
    pub fn text_fields(&self) -> Vec<&str> {
        match self {
            Entry::Text(text) => vec![text.as_str()],
            Entry::Character(profile) => profile.fields().into_iter().map(|(_, v)| v).collect(),
            Entry::Item(item) => vec![
                item.name.as_str(),
                item.rarity.as_str(),
                item.description.as_str(),
            ],
            Entry::Quest(quest) => {
                let mut fields = vec![quest.title.as_str(), quest.description.as_str()];
                if let Some(epilogue) = &quest.epilogue {
                    fields.push(epilogue.as_str());
                }
                fields
            }
        }
    }

    /// Serialize the entry to JSON text, as used for literal name lookups.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Profile of a character. Parsing is best-effort, so any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    /// Origin story.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backstory: Option<String>,
    /// Personality and motivations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    /// Role in the world.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Relationships to other characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<String>,
    /// Significance in the lore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significance: Option<String>,
    /// Items the character is connected to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_connections: Option<String>,
    /// Quests the character is connected to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quest_connections: Option<String>,
}

impl CharacterProfile {
    /// Present fields as `(field name, value)` pairs.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("role", &self.role),
            ("backstory", &self.backstory),
            ("personality", &self.personality),
            ("relationships", &self.relationships),
            ("significance", &self.significance),
            ("item_connections", &self.item_connections),
            ("quest_connections", &self.quest_connections),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }

    /// Merge another profile into this one. Fields already present are kept;
    /// absent fields are taken from `other`.
    pub fn merge(&mut self, other: CharacterProfile) {
        fn fill(slot: &mut Option<String>, value: Option<String>) {
            if slot.is_none() {
                *slot = value;
            }
        }
        fill(&mut self.backstory, other.backstory);
        fill(&mut self.personality, other.personality);
        fill(&mut self.role, other.role);
        fill(&mut self.relationships, other.relationships);
        fill(&mut self.significance, other.significance);
        fill(&mut self.item_connections, other.item_connections);
        fill(&mut self.quest_connections, other.quest_connections);
    }
}

/// Item rarity tier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Rarity {
    /// Common item.
    #[default]
    Normal,
    /// Rare item.
    Rare,
    /// Legendary item.
    Legendary,
}

impl Rarity {
    /// The display name of the tier.
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Normal => "Normal",
            Rarity::Rare => "Rare",
            Rarity::Legendary => "Legendary",
        }
    }

    /// Parse a tier name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Some(Rarity::Normal),
            "rare" => Some(Rarity::Rare),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an item's rarity was decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RarityBasis {
    /// Set explicitly by configuration.
    Override,
    /// Guessed from words near the item's first mention.
    ContextWindow,
    /// Nothing found; the default tier.
    #[default]
    Default,
}

/// A catalogued item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProfile {
    /// Item name.
    pub name: String,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Short description.
    pub description: String,
    /// Where the rarity came from.
    #[serde(default)]
    pub rarity_basis: RarityBasis,
}

/// A playable quest: an ordered sequence of scenes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDefinition {
    /// Quest title as written after `Quest:`.
    pub title: String,
    /// Introductory text before the first scene.
    pub description: String,
    /// Scenes in document order.
    pub scenes: Vec<Scene>,
    /// Closing text, if the quest has an epilogue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epilogue: Option<String>,
}

/// One narrative beat of a quest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene number as written; not necessarily contiguous.
    pub number: u32,
    /// Scene title.
    pub title: String,
    /// Setting description.
    pub setting: String,
    /// Speaker name to dialogue line, in order of first appearance.
    pub dialogues: IndexMap<String, String>,
    /// Choices offered at the end of the scene.
    pub choices: Vec<Choice>,
}

impl Scene {
    /// Find a choice by id, ignoring ASCII case.
    pub fn choice(&self, id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id.eq_ignore_ascii_case(id))
    }
}

/// A labelled option within a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Option token, e.g. `1A`.
    pub id: String,
    /// What the option does.
    pub description: String,
    /// What the player says, if scripted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_line: Option<String>,
    /// Outcome text shown after choosing.
    pub outcome: String,
    /// Inventory directives such as `+1 Ember Fang`, in order.
    pub inventory_updates: Vec<String>,
}
