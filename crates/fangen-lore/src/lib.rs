//! Lore document parser for Fangen.
//!
//! A lore document is loosely structured prose: headings followed by `•`
//! bullet fields, quest scripts with scenes and options, and free text in
//! between. Parsing runs in three stages:
//!
//! 1. [`lexer`] folds the text into logical lines,
//! 2. [`section`] labels each line and folds continuation lines into it,
//! 3. the record builder turns labelled sections into a [`KnowledgeBase`].
//!
//! Parsing never fails. Sections that cannot be used are skipped and
//! reported in [`ParseResult::diagnostics`] as warnings; a non-blank document
//! that yields no entries at all gets an error.

mod builder;
/// Parser diagnostics rendered with ariadne.
pub mod diagnostics;
/// Line lexer.
pub mod lexer;
/// Item catalogue and the rarity heuristic.
pub mod rarity;
/// Labelled sections.
pub mod section;

use std::collections::HashMap;
use std::path::Path;

use fangen_core::{KnowledgeBase, Rarity};

pub use builder::ITEM_DESCRIPTION;
pub use diagnostics::{Diagnostic, Severity, render_diagnostics};
pub use rarity::{DEFAULT_CATALOGUE, DEFAULT_WINDOW, RarityGuess, guess_rarity};

/// Knobs for a parse.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Item names searched for anywhere in the document.
    pub catalogue: Vec<String>,
    /// Rarities that bypass the context-window heuristic.
    pub rarity_overrides: HashMap<String, Rarity>,
    /// Half-width of the rarity context window, in bytes.
    pub window: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            catalogue: DEFAULT_CATALOGUE.iter().map(|s| s.to_string()).collect(),
            rarity_overrides: HashMap::new(),
            window: DEFAULT_WINDOW,
        }
    }
}

impl ParseOptions {
    /// Fix the rarity of one item.
    pub fn with_override(mut self, item: impl Into<String>, rarity: Rarity) -> Self {
        self.rarity_overrides.insert(item.into(), rarity);
        self
    }

    /// Add an item name to the catalogue.
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        let item = item.into();
        if !self.catalogue.contains(&item) {
            self.catalogue.push(item);
        }
        self
    }
}

/// Result of parsing a lore document.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Everything that could be extracted.
    pub knowledge: KnowledgeBase,
    /// Skipped sections and other problems, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Returns `true` if the document produced no usable lore.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Parse a lore document with default options.
pub fn parse(document: &str) -> ParseResult {
    parse_with(document, &ParseOptions::default())
}

/// Parse a lore document.
pub fn parse_with(document: &str, options: &ParseOptions) -> ParseResult {
    let lines = lexer::lines(document);
    let sections = section::sectionize(&lines);
    tracing::debug!(lines = lines.len(), sections = sections.len(), "lore sectioned");
    let (knowledge, mut diagnostics) = builder::build(document, &sections, options);
    if knowledge.is_empty() && !document.trim().is_empty() {
        diagnostics.push(
            Diagnostic::error(0..document.len(), "no lore entries found")
                .with_label("nothing in this document could be used"),
        );
    }
    ParseResult {
        knowledge,
        diagnostics,
    }
}

/// Read and parse a lore file.
///
/// An unreadable file yields an empty knowledge base and a warning, so the
/// caller stays operational without lore.
pub fn load_file(path: &Path, options: &ParseOptions) -> ParseResult {
    match std::fs::read_to_string(path) {
        Ok(document) => {
            let result = parse_with(&document, options);
            tracing::info!(
                path = %path.display(),
                entries = result.knowledge.total_entries(),
                warnings = result.diagnostics.len(),
                "lore loaded"
            );
            result
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "lore file not readable");
            ParseResult {
                knowledge: KnowledgeBase::new(),
                diagnostics: vec![Diagnostic::warning(
                    0..0,
                    format!("cannot read lore file {}: {e}", path.display()),
                )],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fangen_core::{Category, RarityBasis};

    const EMBER_TRIAL: &str = "\
Quest: Ember Trial
Prove your worth before the forge spirits.
Scene 1: The Spark
Setting: A dim forge beneath Ember Peak.
Kagitada (gruff): \"Show me your resolve.\"
Your Choice:
• Option 1A: Strike the anvil
Player: \"I am ready.\"
Outcome: Sparks leap into a small vial. [INV_UPDATE: +1 Ember Dust]
• Option 1B: Walk away
Outcome: The forge cools.
Scene 2: The Flame
Setting: The forge roars to life.
Epilogue: The spirits remember your name.
";

    #[test]
    fn ember_trial_parses() {
        let result = parse(EMBER_TRIAL);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);

        let quest = result.knowledge.quest_info("Ember Trial").unwrap();
        assert_eq!(quest.description, "Prove your worth before the forge spirits.");
        assert_eq!(quest.scenes.len(), 2);
        assert_eq!(
            quest.epilogue.as_deref(),
            Some("The spirits remember your name.")
        );

        let spark = &quest.scenes[0];
        assert_eq!(spark.number, 1);
        assert_eq!(spark.title, "The Spark");
        assert_eq!(spark.setting, "A dim forge beneath Ember Peak.");
        assert_eq!(spark.dialogues["Kagitada"], "Show me your resolve.");
        assert_eq!(spark.choices.len(), 2);

        let strike = spark.choice("1a").unwrap();
        assert_eq!(strike.description, "Strike the anvil");
        assert_eq!(strike.player_line.as_deref(), Some("I am ready."));
        assert_eq!(strike.inventory_updates, vec!["+1 Ember Dust"]);

        let flame = &quest.scenes[1];
        assert!(flame.choices.is_empty());
        assert_eq!(flame.setting, "The forge roars to life.");
    }

    #[test]
    fn both_character_forms_merge() {
        let doc = "\
KAGITADA
• Backstory & Role: Warden of the void lock.
• Personality & Motivations: Cold and methodical.
____________________
KAGITADA
• Role: Gatekeeper
• Backstory: A different telling.
• Personality: Stoic.
• Relationships: Mentor to Miyou.
• Significance in Lore: Sealed the gate.
";
        let kb = parse(doc).knowledge;
        let profile = kb.character_info("KAGITADA").unwrap();
        assert_eq!(profile.backstory.as_deref(), Some("Warden of the void lock."));
        assert_eq!(profile.personality.as_deref(), Some("Cold and methodical."));
        assert_eq!(profile.role.as_deref(), Some("Gatekeeper"));
        assert_eq!(profile.relationships.as_deref(), Some("Mentor to Miyou."));
        assert_eq!(kb.count(Category::Characters), 1);
    }

    #[test]
    fn rarity_override_wins() {
        let doc = "The Legendary Solar Fang.";
        let options = ParseOptions::default().with_override("Solar Fang", Rarity::Rare);
        let kb = parse_with(doc, &options).knowledge;
        let item = kb.item_info("Solar Fang").unwrap();
        assert_eq!(item.rarity, Rarity::Rare);
        assert_eq!(item.rarity_basis, RarityBasis::Override);
    }

    #[test]
    fn custom_catalogue_items() {
        let doc = "A Rare Ember Dust pouch.";
        let options = ParseOptions::default().with_item("Ember Dust");
        let kb = parse_with(doc, &options).knowledge;
        assert_eq!(kb.item_info("Ember Dust").unwrap().rarity, Rarity::Rare);
    }

    #[test]
    fn empty_document_is_empty() {
        let result = parse(" \n\n");
        assert!(result.knowledge.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn garbage_never_panics() {
        let doc = "•••\n:::\nScene 99999999999999999999: overflow\n• Option 1A:\nOutcome:\n\u{2022}";
        let result = parse(doc);
        assert_eq!(result.has_errors(), result.knowledge.is_empty());
    }

    #[test]
    fn document_without_lore_is_an_error() {
        let result = parse("Just some notes.\nNothing structured here.");
        assert!(result.knowledge.is_empty());
        assert!(result.has_errors());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn skipped_sections_alone_are_not_errors() {
        let doc = "Seigo\n• Role: Guardian\n• Backstory: Built the rampart.\n\nThe Solar Fang shines.";
        let result = parse(doc);
        assert!(!result.has_errors());
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].is_warning());
    }

    #[test]
    fn load_missing_file_is_empty_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_file(&dir.path().join("missing.txt"), &ParseOptions::default());
        assert!(result.knowledge.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].is_warning());
    }

    #[test]
    fn load_file_reads_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lore.txt");
        std::fs::write(&path, EMBER_TRIAL).unwrap();
        let result = load_file(&path, &ParseOptions::default());
        assert_eq!(result.knowledge.quests(), vec!["Ember Trial"]);
    }
}
