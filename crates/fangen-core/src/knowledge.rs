use std::collections::BTreeMap;

use indexmap::IndexMap;
use indexmap::map::Entry as Slot;

use crate::category::Category;
use crate::entry::{CharacterProfile, Entry, ItemProfile, QuestDefinition};
use crate::voice::Tone;

/// The structured result of parsing a lore document.
///
/// Entries are kept per category in document order. The knowledge base is
/// built once and only read afterwards; entries are never removed.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    categories: BTreeMap<Category, IndexMap<String, Entry>>,
}

impl KnowledgeBase {
    /// Create an empty knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Insert an entry unless the name is already taken in that category.
    /// Returns `true` if the entry was inserted.
    pub fn insert(&mut self, category: Category, name: impl Into<String>, entry: Entry) -> bool {
        let entries = self.categories.entry(category).or_default();
        let name = name.into();
        if entries.contains_key(&name) {
            return false;
        }
        entries.insert(name, entry);
        true
    }

    /// Insert a character, or merge the profile into an existing one.
    pub fn upsert_character(&mut self, name: impl Into<String>, profile: CharacterProfile) {
        let entries = self.categories.entry(Category::Characters).or_default();
        match entries.entry(name.into()) {
            Slot::Occupied(mut slot) => {
                if let Entry::Character(existing) = slot.get_mut() {
                    existing.merge(profile);
                }
            }
            Slot::Vacant(slot) => {
                slot.insert(Entry::Character(profile));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Categories that hold at least one entry, in listing order.
    pub fn categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(category, _)| *category)
            .collect()
    }

    /// Sorted entry names of a category given by name (case-insensitive).
    /// Unknown categories yield an empty list.
    pub fn entries_by_category(&self, category: &str) -> Vec<String> {
        Category::parse(category)
            .map(|c| self.entries_in(c))
            .unwrap_or_default()
    }

    /// Sorted entry names of a category.
    pub fn entries_in(&self, category: Category) -> Vec<String> {
        let mut names: Vec<String> = self
            .categories
            .get(&category)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names.dedup();
        names
    }

    /// Iterate a category's entries in document order.
    pub fn iter(&self, category: Category) -> impl Iterator<Item = (&str, &Entry)> {
        self.categories
            .get(&category)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(name, entry)| (name.as_str(), entry)))
    }

    /// The entry with this exact name in the first category that has it.
    pub fn entry_content(&self, name: &str) -> Option<&Entry> {
        self.locate(name).map(|(_, entry)| entry)
    }

    /// Like [`entry_content`](Self::entry_content), also returning the category.
    pub fn locate(&self, name: &str) -> Option<(Category, &Entry)> {
        self.categories
            .iter()
            .find_map(|(category, entries)| entries.get(name).map(|e| (*category, e)))
    }

    /// Get a character profile by exact name.
    pub fn character_info(&self, name: &str) -> Option<&CharacterProfile> {
        match self.get(Category::Characters, name)? {
            Entry::Character(profile) => Some(profile),
            _ => None,
        }
    }

    /// Get an item profile by exact name.
    pub fn item_info(&self, name: &str) -> Option<&ItemProfile> {
        match self.get(Category::Items, name)? {
            Entry::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Get a quest definition by exact name.
    pub fn quest_info(&self, name: &str) -> Option<&QuestDefinition> {
        match self.get(Category::Quests, name)? {
            Entry::Quest(quest) => Some(quest),
            _ => None,
        }
    }

    /// Sorted names of all character profiles.
    pub fn characters(&self) -> Vec<String> {
        self.names_where(Category::Characters, |e| matches!(e, Entry::Character(_)))
    }

    /// Sorted names of all catalogued items (tier descriptions excluded).
    pub fn items(&self) -> Vec<String> {
        self.names_where(Category::Items, |e| matches!(e, Entry::Item(_)))
    }

    /// Sorted titles of all playable quests.
    pub fn quests(&self) -> Vec<String> {
        self.names_where(Category::Quests, |e| matches!(e, Entry::Quest(_)))
    }

    /// Case-insensitive substring search over entry names and text fields.
    ///
    /// Only categories with at least one hit appear in the result. A blank
    /// query matches nothing.
    pub fn search(&self, query: &str) -> BTreeMap<Category, Vec<String>> {
        let needle = query.trim().to_lowercase();
        let mut results = BTreeMap::new();
        if needle.is_empty() {
            return results;
        }

        for (category, entries) in &self.categories {
            let hits: Vec<String> = entries
                .iter()
                .filter(|(name, entry)| {
                    name.to_lowercase().contains(&needle)
                        || entry
                            .text_fields()
                            .iter()
                            .any(|field| field.to_lowercase().contains(&needle))
                })
                .map(|(name, _)| name.clone())
                .collect();
            if !hits.is_empty() {
                results.insert(*category, hits);
            }
        }
        results
    }

    /// Characters whose name appears literally in the serialized content of
    /// the named entry, in document order.
    pub fn related_characters(&self, name: &str) -> Vec<String> {
        let Some(entry) = self.entry_content(name) else {
            return Vec::new();
        };
        let text = entry.to_json();
        self.iter(Category::Characters)
            .filter(|(character, _)| text.contains(character))
            .map(|(character, _)| character.to_string())
            .collect()
    }

    /// A canned in-character reply about `topic`.
    pub fn character_dialogue(&self, name: &str, topic: &str) -> String {
        match self.character_info(name) {
            Some(profile) => {
                Tone::classify(profile.personality.as_deref().unwrap_or_default()).respond(topic)
            }
            None => format!("I am {name}. What do you want to know?"),
        }
    }

    /// Number of entries in a category.
    pub fn count(&self, category: Category) -> usize {
        self.categories.get(&category).map_or(0, IndexMap::len)
    }

    /// Number of entries across all categories.
    pub fn total_entries(&self) -> usize {
        self.categories.values().map(IndexMap::len).sum()
    }

    /// Whether no entries were loaded.
    pub fn is_empty(&self) -> bool {
        self.total_entries() == 0
    }

    fn get(&self, category: Category, name: &str) -> Option<&Entry> {
        self.categories.get(&category)?.get(name)
    }

    fn names_where(&self, category: Category, keep: impl Fn(&Entry) -> bool) -> Vec<String> {
        let mut names: Vec<String> = self
            .iter(category)
            .filter(|(_, entry)| keep(entry))
            .map(|(name, _)| name.to_string())
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Rarity, RarityBasis, Scene};
    use proptest::prelude::*;

    fn sample() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.insert(
            Category::World,
            "Overview",
            Entry::Text("Fangen is a world of living elements.".into()),
        );
        kb.insert(
            Category::Events,
            "The Sealing",
            Entry::Text("Kagitada sealed the void gate.".into()),
        );
        kb.upsert_character(
            "Kagitada",
            CharacterProfile {
                personality: Some("Stoic and methodical".into()),
                backstory: Some("Keeper of the lock".into()),
                ..Default::default()
            },
        );
        kb.upsert_character(
            "Miyou",
            CharacterProfile {
                personality: Some("Playful, quirky".into()),
                relationships: Some("Pupil of Kagitada".into()),
                ..Default::default()
            },
        );
        kb.insert(
            Category::Items,
            "Kagitada's Lock",
            Entry::Item(ItemProfile {
                name: "Kagitada's Lock".into(),
                rarity: Rarity::Legendary,
                description: "An item from the world of Fangen.".into(),
                rarity_basis: RarityBasis::ContextWindow,
            }),
        );
        kb.insert(
            Category::Quests,
            "Ember Trial",
            Entry::Quest(QuestDefinition {
                title: "Ember Trial".into(),
                description: "Prove yourself to the flame.".into(),
                scenes: vec![Scene::default()],
                epilogue: None,
            }),
        );
        kb
    }

    #[test]
    fn categories_skip_empty() {
        let kb = sample();
        assert_eq!(
            kb.categories(),
            vec![
                Category::World,
                Category::Events,
                Category::Characters,
                Category::Items,
                Category::Quests
            ]
        );
    }

    #[test]
    fn entries_by_category_is_sorted_and_case_insensitive() {
        let kb = sample();
        assert_eq!(kb.entries_by_category("CHARACTERS"), vec!["Kagitada", "Miyou"]);
        assert!(kb.entries_by_category("dragons").is_empty());
    }

    #[test]
    fn insert_does_not_overwrite() {
        let mut kb = sample();
        assert!(!kb.insert(Category::World, "Overview", Entry::Text("replaced".into())));
        assert_eq!(
            kb.entry_content("Overview"),
            Some(&Entry::Text("Fangen is a world of living elements.".into()))
        );
    }

    #[test]
    fn upsert_merges_character_fields() {
        let mut kb = sample();
        kb.upsert_character(
            "Kagitada",
            CharacterProfile {
                role: Some("Gatekeeper".into()),
                backstory: Some("ignored".into()),
                ..Default::default()
            },
        );
        let profile = kb.character_info("Kagitada").unwrap();
        assert_eq!(profile.role.as_deref(), Some("Gatekeeper"));
        assert_eq!(profile.backstory.as_deref(), Some("Keeper of the lock"));
        assert_eq!(kb.count(Category::Characters), 2);
    }

    #[test]
    fn typed_accessors() {
        let kb = sample();
        assert!(kb.character_info("Miyou").is_some());
        assert!(kb.character_info("Overview").is_none());
        assert_eq!(kb.item_info("Kagitada's Lock").unwrap().rarity, Rarity::Legendary);
        assert_eq!(kb.quest_info("Ember Trial").unwrap().scenes.len(), 1);
        assert_eq!(kb.quests(), vec!["Ember Trial"]);
        assert_eq!(kb.items(), vec!["Kagitada's Lock"]);
    }

    #[test]
    fn search_matches_names_and_fields() {
        let kb = sample();
        let results = kb.search("kagitada");
        assert_eq!(results[&Category::Events], vec!["The Sealing"]);
        assert_eq!(results[&Category::Characters], vec!["Kagitada", "Miyou"]);
        assert_eq!(results[&Category::Items], vec!["Kagitada's Lock"]);
        assert!(!results.contains_key(&Category::World));
    }

    #[test]
    fn search_blank_or_missing_is_empty() {
        let kb = sample();
        assert!(kb.search("").is_empty());
        assert!(kb.search("   ").is_empty());
        assert!(kb.search("zzzz-not-there").is_empty());
    }

    #[test]
    fn related_characters_by_literal_mention() {
        let kb = sample();
        assert_eq!(kb.related_characters("The Sealing"), vec!["Kagitada"]);
        assert_eq!(kb.related_characters("Miyou"), vec!["Kagitada"]);
        assert!(kb.related_characters("Nowhere").is_empty());
    }

    #[test]
    fn dialogue_uses_personality_tone() {
        let kb = sample();
        assert!(kb.character_dialogue("Kagitada", "the gate").starts_with("*stares intently*"));
        assert!(kb.character_dialogue("Miyou", "cake").contains("mischievous grin"));
        assert_eq!(
            kb.character_dialogue("Stranger", "anything"),
            "I am Stranger. What do you want to know?"
        );
    }

    proptest! {
        #[test]
        fn entries_sorted_without_duplicates(names in proptest::collection::vec("[A-Za-z ]{1,12}", 0..40)) {
            let mut kb = KnowledgeBase::new();
            for name in &names {
                kb.insert(Category::Themes, name.clone(), Entry::Text(String::new()));
            }
            let listed = kb.entries_by_category("themes");
            let mut expected = listed.clone();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(listed, expected);
        }
    }
}
