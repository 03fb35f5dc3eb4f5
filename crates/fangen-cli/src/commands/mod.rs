pub mod check;
pub mod collection;
pub mod craft;
pub mod discover;
pub mod inventory;
pub mod lore;
pub mod play;
pub mod quests;
pub mod search;
pub mod settings;
pub mod show;
pub mod status;
pub mod talk;

use std::sync::Arc;

use colored::Colorize;
use fangen_core::{Entry, KnowledgeBase};
use fangen_quest::{
    MemoryStore, ProgressStore, QuestEngine, QuestError, SqliteStore, Workshop,
};

use crate::config::FangenConfig;

/// Load the lore without touching progress.
fn load_lore(config: &FangenConfig) -> KnowledgeBase {
    fangen_lore::load_file(&config.lore_file, &config.parse_options()).knowledge
}

/// Open the configured progress store.
fn open_store(config: &FangenConfig) -> Result<Arc<dyn ProgressStore>, String> {
    match &config.database {
        Some(path) => {
            let store = SqliteStore::open(path)
                .map_err(|e| format!("cannot open database {}: {e}", path.display()))?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Lore, progress store and quest engine for one invocation.
fn open_engine(config: &FangenConfig) -> Result<QuestEngine, String> {
    let knowledge = Arc::new(load_lore(config));
    Ok(QuestEngine::new(knowledge, open_store(config)?))
}

/// Print a user mistake in yellow and carry on. Store failures are fatal.
fn report(err: QuestError) -> Result<(), String> {
    if err.is_user_error() {
        println!("  {}", err.to_string().yellow());
        Ok(())
    } else {
        Err(err.to_string())
    }
}

/// Engine without lore, for commands that only touch the user's progress.
fn progress_engine(config: &FangenConfig) -> Result<QuestEngine, String> {
    Ok(QuestEngine::new(
        Arc::new(KnowledgeBase::new()),
        open_store(config)?,
    ))
}

fn workshop(config: &FangenConfig) -> Workshop {
    Workshop::new(config.recipes.iter().cloned())
}

/// Human-readable body of an entry.
fn entry_text(entry: &Entry) -> String {
    match entry {
        Entry::Text(text) => text.clone(),
        Entry::Character(profile) => profile
            .fields()
            .into_iter()
            .map(|(field, value)| format!("{}: {value}", title_case(field)))
            .collect::<Vec<_>>()
            .join("\n"),
        Entry::Item(item) => format!("Rarity: {}\n{}", item.rarity, item.description),
        Entry::Quest(quest) => {
            let mut text = quest.description.clone();
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(&format!("{} scenes", quest.scenes.len()));
            text
        }
    }
}

/// `item_connections` becomes `Item Connections`.
fn title_case(s: &str) -> String {
    s.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// First `max` characters, with `...` when cut.
fn preview(text: &str, max: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fangen_core::{ItemProfile, Rarity, RarityBasis};

    #[test]
    fn title_case_splits_words() {
        assert_eq!(title_case("item_connections"), "Item Connections");
        assert_eq!(title_case("role"), "Role");
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        assert_eq!(preview("Glühende Asche", 4), "Glüh...");
        assert_eq!(preview("short", 10), "short");
    }

    #[test]
    fn item_text_shows_rarity() {
        let entry = Entry::Item(ItemProfile {
            name: "Solar Fang".into(),
            rarity: Rarity::Legendary,
            description: "Bright.".into(),
            rarity_basis: RarityBasis::Override,
        });
        assert_eq!(entry_text(&entry), "Rarity: Legendary\nBright.");
    }
}
