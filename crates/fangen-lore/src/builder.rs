//! Turns labelled sections into knowledge base records.
//!
//! The build runs four passes over the same section list, in a fixed order:
//! characters, world and history, items, quests. A pass never fails. Anything
//! it cannot use is skipped and reported as a warning diagnostic.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

use fangen_core::{
    Category, CharacterProfile, Choice, Entry, ItemProfile, KnowledgeBase, QuestDefinition, Scene,
};
use indexmap::IndexMap;
use regex::Regex;

use crate::ParseOptions;
use crate::diagnostics::Diagnostic;
use crate::rarity::{RarityGuess, guess_rarity};
use crate::section::{Label, Section, normalize_key};

static INV_UPDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[INV_UPDATE:\s*([^\]]+)\]").unwrap());
static CHARACTER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z, ]*$").unwrap());

/// Description given to every catalogued item.
pub const ITEM_DESCRIPTION: &str = "An item from the world of Fangen.";

const PROFILE_KEYS: [&str; 5] = [
    "backstory role",
    "personality motivations",
    "role",
    "backstory",
    "personality",
];

const HISTORY_HEADINGS: [(&str, Category); 3] = [
    ("key historical events", Category::Events),
    ("elemental and mystical themes", Category::Themes),
    ("cultural and social dynamics", Category::Factions),
];

/// Build a knowledge base from sections of `source`.
pub(crate) fn build(
    source: &str,
    sections: &[Section],
    options: &ParseOptions,
) -> (KnowledgeBase, Vec<Diagnostic>) {
    let mut builder = Builder {
        source,
        sections,
        options,
        kb: KnowledgeBase::new(),
        diagnostics: Vec::new(),
    };
    builder.characters();
    builder.world();
    builder.items();
    builder.quests();
    (builder.kb, builder.diagnostics)
}

struct Builder<'a> {
    source: &'a str,
    sections: &'a [Section],
    options: &'a ParseOptions,
    kb: KnowledgeBase,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Builder<'a> {
    // -- Characters --

    fn characters(&mut self) {
        let sections = self.sections;
        for (i, section) in sections.iter().enumerate() {
            let Label::Heading(name) = &section.label else {
                continue;
            };
            let fields = keyed_fields(self.field_group(i));
            if !PROFILE_KEYS.iter().any(|k| fields.contains_key(*k)) {
                continue;
            }

            let Some(profile) = profile_from(&fields) else {
                self.incomplete(
                    section.span.clone(),
                    format!("character profile \"{name}\""),
                    "needs Backstory & Role and Personality & Motivations, or Role, Backstory and Personality",
                );
                continue;
            };
            if !CHARACTER_NAME.is_match(name) {
                self.incomplete(
                    section.span.clone(),
                    format!("character profile \"{name}\""),
                    "a name may only contain letters, commas and spaces",
                );
                continue;
            }
            self.kb.upsert_character(name.as_str(), profile);
        }
    }

    // -- World and history --

    fn world(&mut self) {
        let sections = self.sections;
        for (i, section) in sections.iter().enumerate() {
            let Label::Heading(heading) = &section.label else {
                continue;
            };
            let heading = normalize_key(heading);

            if heading == "the world of fangen" {
                if let Some(overview) = self
                    .field_group(i)
                    .iter()
                    .find(|f| field_key(f).is_some_and(|k| normalize_key(k) == "overview"))
                {
                    self.add_text(Category::World, "Overview", overview.first_paragraph(), overview);
                }
                continue;
            }

            let category = HISTORY_HEADINGS
                .iter()
                .find(|(h, _)| *h == heading)
                .map(|(_, c)| *c)
                .or_else(|| {
                    (heading.contains("locations") || heading.contains("geography"))
                        .then_some(Category::Locations)
                });
            if let Some(category) = category {
                self.fields_as_text(i, category);
            }
        }
    }

    // -- Items --

    fn items(&mut self) {
        let sections = self.sections;
        for (i, section) in sections.iter().enumerate() {
            let Label::Heading(heading) = &section.label else {
                continue;
            };
            match normalize_key(heading).as_str() {
                "item crafting evolution" => self.fields_as_text(i, Category::Items),
                "quest narratives" => self.fields_as_text(i, Category::Quests),
                _ => {}
            }
        }
        self.catalogue();
    }

    fn catalogue(&mut self) {
        let options = self.options;
        let mut found: Vec<(usize, &str)> = options
            .catalogue
            .iter()
            .filter_map(|name| self.source.find(name.as_str()).map(|pos| (pos, name.as_str())))
            .collect();
        found.sort_by_key(|(pos, _)| *pos);

        for (pos, name) in found {
            let guess = match options.rarity_overrides.get(name) {
                Some(rarity) => RarityGuess::overridden(*rarity),
                None => guess_rarity(self.source, pos, options.window),
            };
            tracing::debug!(item = name, rarity = %guess.rarity, basis = ?guess.basis, "catalogued item");
            let item = ItemProfile {
                name: name.to_string(),
                rarity: guess.rarity,
                description: ITEM_DESCRIPTION.to_string(),
                rarity_basis: guess.basis,
            };
            if !self.kb.insert(Category::Items, name, Entry::Item(item)) {
                self.warn(pos..pos + name.len(), format!("item \"{name}\" is already defined"));
            }
        }
    }

    // -- Quests --

    fn quests(&mut self) {
        let sections = self.sections;
        let starts: Vec<usize> = sections
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s.label, Label::Quest { .. }))
            .map(|(i, _)| i)
            .collect();

        for (n, &start) in starts.iter().enumerate() {
            let end = starts.get(n + 1).copied().unwrap_or(sections.len());
            self.quest(&sections[start], &sections[start + 1..end]);
        }
    }

    fn quest(&mut self, header: &Section, body: &[Section]) {
        let Label::Quest { title } = &header.label else {
            return;
        };

        let first_block = next_block(body, 0);
        let description = join_text(
            std::iter::once(header.body.as_str()).chain(
                body[..first_block]
                    .iter()
                    .filter(|s| s.label == Label::Text)
                    .map(|s| s.body.as_str()),
            ),
        );

        let mut scenes: Vec<Scene> = Vec::new();
        let mut epilogue = None;
        let mut at = first_block;
        while at < body.len() {
            let end = next_block(body, at + 1);
            match &body[at].label {
                Label::Scene { .. } => {
                    if let Some(scene) = self.scene(&body[at], &body[at + 1..end]) {
                        scenes.push(scene);
                    }
                }
                Label::Epilogue if epilogue.is_none() => {
                    let text = join_text(
                        std::iter::once(body[at].body.as_str())
                            .chain(body[at + 1..end].iter().map(|s| s.raw.as_str())),
                    );
                    epilogue = Some(text);
                }
                _ => {}
            }
            at = end;
        }

        if scenes.is_empty() {
            self.warn(header.span.clone(), format!("quest \"{title}\" has no scenes"));
        }

        let quest = QuestDefinition {
            title: title.clone(),
            description,
            scenes,
            epilogue,
        };
        if !self.kb.insert(Category::Quests, title.as_str(), Entry::Quest(quest)) {
            self.warn(header.span.clone(), format!("quest \"{title}\" is already defined"));
        }
    }

    fn scene(&mut self, header: &Section, body: &[Section]) -> Option<Scene> {
        let Label::Scene { number, title } = &header.label else {
            return None;
        };
        let Ok(number) = number.parse::<u32>() else {
            self.incomplete(header.span.clone(), format!("scene {number}"), "scene number out of range");
            return None;
        };

        let narrative_end = body
            .iter()
            .position(|s| matches!(s.label, Label::ChoicePrompt | Label::Option { .. }))
            .unwrap_or(body.len());

        let mut setting = String::new();
        let mut dialogues = IndexMap::new();
        for section in &body[..narrative_end] {
            match &section.label {
                Label::Setting if setting.is_empty() => setting = section.body.trim().to_string(),
                Label::Dialogue { speaker, line } => {
                    dialogues.insert(speaker.clone(), line.clone());
                }
                _ => {}
            }
        }
        if setting.is_empty() {
            setting = header.body.trim().to_string();
        }

        let options: Vec<usize> = body
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s.label, Label::Option { .. }))
            .map(|(i, _)| i)
            .collect();

        let mut choices: Vec<Choice> = Vec::new();
        for (n, &k) in options.iter().enumerate() {
            let end = options.get(n + 1).copied().unwrap_or(body.len());
            let Some(choice) = self.choice(&body[k], &body[k + 1..end]) else {
                continue;
            };
            if choices.iter().any(|c| c.id.eq_ignore_ascii_case(&choice.id)) {
                self.warn(
                    body[k].span.clone(),
                    format!("option {} appears twice in scene {number}, keeping the first", choice.id),
                );
                continue;
            }
            choices.push(choice);
        }

        Some(Scene {
            number,
            title: title.clone(),
            setting,
            dialogues,
            choices,
        })
    }

    fn choice(&mut self, header: &Section, body: &[Section]) -> Option<Choice> {
        let Label::Option { id, description } = &header.label else {
            return None;
        };

        let player_line = body.iter().find_map(|s| match &s.label {
            Label::Player { line } => Some(line.clone()),
            _ => None,
        });

        let Some(at) = body.iter().position(|s| s.label == Label::Outcome) else {
            self.incomplete(header.span.clone(), format!("option {id}"), "no Outcome: line");
            return None;
        };

        let trailing = body[at + 1..]
            .iter()
            .take_while(|s| matches!(s.label, Label::Text | Label::Dialogue { .. }))
            .map(|s| s.raw.as_str());
        let outcome = join_text(std::iter::once(body[at].body.as_str()).chain(trailing));

        let inventory_updates = INV_UPDATE
            .captures_iter(&outcome)
            .map(|c| c[1].trim().to_string())
            .collect();

        let description = if description.is_empty() {
            header.body.trim().to_string()
        } else {
            description.clone()
        };

        Some(Choice {
            id: id.clone(),
            description,
            player_line,
            outcome,
            inventory_updates,
        })
    }

    // -- Helpers --

    /// The bullet fields directly after the section at `heading`.
    fn field_group(&self, heading: usize) -> &'a [Section] {
        let sections = self.sections;
        let start = heading + 1;
        let len = sections[start..]
            .iter()
            .take_while(|s| matches!(s.label, Label::Field { .. }))
            .count();
        &sections[start..start + len]
    }

    fn fields_as_text(&mut self, heading: usize, category: Category) {
        for field in self.field_group(heading) {
            if let Some(key) = field_key(field) {
                self.add_text(category, key, field.body.trim(), field);
            }
        }
    }

    fn add_text(&mut self, category: Category, name: &str, text: &str, at: &Section) {
        if !self.kb.insert(category, name, Entry::Text(text.to_string())) {
            self.warn(
                at.span.clone(),
                format!("{category} entry \"{name}\" is already defined"),
            );
        }
    }

    fn warn(&mut self, span: Range<usize>, message: String) {
        tracing::warn!("{message}");
        self.diagnostics.push(Diagnostic::warning(span, message));
    }

    fn incomplete(&mut self, span: Range<usize>, what: String, why: &str) {
        tracing::warn!(section = %what, reason = why, "skipping incomplete lore section");
        self.diagnostics.push(Diagnostic::incomplete(span, what, why));
    }
}

fn field_key(section: &Section) -> Option<&str> {
    match &section.label {
        Label::Field { key } => Some(key.as_str()),
        _ => None,
    }
}

fn keyed_fields(fields: &[Section]) -> HashMap<String, &str> {
    let mut keyed = HashMap::new();
    for field in fields {
        if let Some(key) = field_key(field) {
            keyed.entry(normalize_key(key)).or_insert(field.body.trim());
        }
    }
    keyed
}

/// A profile in short or expanded form, whichever the fields satisfy.
fn profile_from(fields: &HashMap<String, &str>) -> Option<CharacterProfile> {
    let get = |key: &str| {
        fields
            .get(key)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    };
    let has = |key: &str| fields.contains_key(key);

    if has("backstory role") && has("personality motivations") {
        return Some(CharacterProfile {
            backstory: get("backstory role"),
            personality: get("personality motivations"),
            item_connections: get("potential items"),
            quest_connections: get("quests"),
            ..Default::default()
        });
    }
    if has("role") && has("backstory") && has("personality") {
        return Some(CharacterProfile {
            role: get("role"),
            backstory: get("backstory"),
            personality: get("personality"),
            relationships: get("relationships"),
            significance: get("significance in lore"),
            ..Default::default()
        });
    }
    None
}

/// Index of the next scene or epilogue at or after `from`.
fn next_block(body: &[Section], from: usize) -> usize {
    body.iter()
        .skip(from)
        .position(|s| matches!(s.label, Label::Scene { .. } | Label::Epilogue))
        .map_or(body.len(), |p| p + from)
}

fn join_text<'s>(parts: impl Iterator<Item = &'s str>) -> String {
    parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lines;
    use crate::section::sectionize;

    fn build_str(source: &str) -> (KnowledgeBase, Vec<Diagnostic>) {
        build(source, &sectionize(&lines(source)), &ParseOptions::default())
    }

    #[test]
    fn short_form_character() {
        let source = "KAGITADA\n• Backstory & Role: Keeper of the void lock.\n• Personality & Motivations: Stoic and methodical.\n• Item & Quest Connections:\n• Potential Items: Kagitada's Lock\n• Quests: The Sealed Gate";
        let (kb, diags) = build_str(source);
        assert!(diags.is_empty(), "{diags:?}");
        let profile = kb.character_info("KAGITADA").unwrap();
        assert_eq!(profile.backstory.as_deref(), Some("Keeper of the void lock."));
        assert_eq!(profile.personality.as_deref(), Some("Stoic and methodical."));
        assert_eq!(profile.item_connections.as_deref(), Some("Kagitada's Lock"));
        assert_eq!(profile.quest_connections.as_deref(), Some("The Sealed Gate"));
        assert_eq!(profile.role, None);
    }

    #[test]
    fn wrapped_field_keeps_the_character() {
        let source = "KAGITADA\n• Backstory & Role: Warden of the void lock,\nsworn at the first sealing.\n• Personality & Motivations: Cold and methodical.\n";
        let (kb, diags) = build_str(source);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(kb.characters(), vec!["KAGITADA"]);
        let profile = kb.character_info("KAGITADA").unwrap();
        assert_eq!(
            profile.backstory.as_deref(),
            Some("Warden of the void lock,\nsworn at the first sealing.")
        );
        assert_eq!(profile.personality.as_deref(), Some("Cold and methodical."));
    }

    #[test]
    fn expanded_form_character() {
        let source = "Miyou\n• Role: Seer\n• Backstory: Raised in the paper temples.\n• Personality: Playful and quirky.\n• Relationships: Pupil of Kagitada.\n• Significance in Lore: Foresaw the Sealing.";
        let (kb, _) = build_str(source);
        let profile = kb.character_info("Miyou").unwrap();
        assert_eq!(profile.role.as_deref(), Some("Seer"));
        assert_eq!(profile.significance.as_deref(), Some("Foresaw the Sealing."));
    }

    #[test]
    fn incomplete_profile_is_reported() {
        let source = "Seigo\n• Role: Guardian\n• Backstory: Built the rampart.";
        let (kb, diags) = build_str(source);
        assert!(kb.character_info("Seigo").is_none());
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("character profile"));
    }

    #[test]
    fn implausible_name_is_skipped() {
        let source = "Chapter 3\n• Role: a\n• Backstory: b\n• Personality: c";
        let (kb, diags) = build_str(source);
        assert!(kb.characters().is_empty());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn history_headings_take_every_field() {
        let source = "Key Historical Events\n• The Sealing: The gate was locked.\n• The Burning: Fire took the east.\nElemental and Mystical Themes\n• Paper: Fragile but sharp.\nCultural and Social Dynamics\n• Ash Clans: Nomads of the waste.\nLocations of Fangen\n• Ember Peak: A volcano.";
        let (kb, _) = build_str(source);
        assert_eq!(kb.entries_in(Category::Events), vec!["The Burning", "The Sealing"]);
        assert_eq!(kb.entries_in(Category::Themes), vec!["Paper"]);
        assert_eq!(kb.entries_in(Category::Factions), vec!["Ash Clans"]);
        assert_eq!(kb.entries_in(Category::Locations), vec!["Ember Peak"]);
    }

    #[test]
    fn wrapped_event_keeps_later_events() {
        let source = "Key Historical Events\n• The Sealing: The gate\nwas locked.\n• The Burning: Fire.";
        let (kb, diags) = build_str(source);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(kb.entries_in(Category::Events), vec!["The Burning", "The Sealing"]);
        assert_eq!(
            kb.entry_content("The Sealing"),
            Some(&Entry::Text("The gate\nwas locked.".into()))
        );
    }

    #[test]
    fn world_overview_is_first_paragraph() {
        let source = "The World of Fangen\n• Overview: A land of living elements.\n\nMore detail later.";
        let (kb, _) = build_str(source);
        assert_eq!(
            kb.entry_content("Overview"),
            Some(&Entry::Text("A land of living elements.".into()))
        );
    }

    #[test]
    fn catalogue_items_in_document_order() {
        let source = "The Solar Fang shines.\nLegendary relic: Moon Blade.";
        let (kb, _) = build_str(source);
        let names: Vec<&str> = kb.iter(Category::Items).map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Solar Fang", "Moon Blade"]);
        assert_eq!(kb.item_info("Moon Blade").unwrap().description, ITEM_DESCRIPTION);
    }

    #[test]
    fn options_are_scoped_to_their_scene() {
        let source = "Quest: Twin Gates\nScene 1: First\n• Option 1A: Left\nOutcome: Went left.\nScene 2: Second\n• Option 1A: Right\nOutcome: Went right.";
        let (kb, _) = build_str(source);
        let quest = kb.quest_info("Twin Gates").unwrap();
        assert_eq!(quest.scenes[0].choices[0].outcome, "Went left.");
        assert_eq!(quest.scenes[1].choices[0].outcome, "Went right.");
    }

    #[test]
    fn option_without_outcome_is_skipped() {
        let source = "Quest: Q\nScene 1: S\n• Option 1A: Nothing happens\n• Option 1B: Something\nOutcome: It happened.";
        let (kb, diags) = build_str(source);
        let scene = &kb.quest_info("Q").unwrap().scenes[0];
        assert_eq!(scene.choices.len(), 1);
        assert_eq!(scene.choices[0].id, "1B");
        assert!(diags.iter().any(|d| d.message.contains("option 1A")));
    }

    #[test]
    fn duplicate_option_keeps_first() {
        let source = "Quest: Q\nScene 1: S\n• Option 1A: a\nOutcome: first\n• Option 1A: b\nOutcome: second";
        let (kb, diags) = build_str(source);
        let scene = &kb.quest_info("Q").unwrap().scenes[0];
        assert_eq!(scene.choices.len(), 1);
        assert_eq!(scene.choices[0].outcome, "first");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn outcome_keeps_trailing_dialogue_and_inventory() {
        let source = "Quest: Q\nScene 1: S\n• Option 1A: Take it\nPlayer: \"Mine.\"\nOutcome: You take the vial. [INV_UPDATE: +1 Emberdust Vial]\nKagitada: \"Careful.\" [INV_UPDATE: -1 Torch]";
        let (kb, _) = build_str(source);
        let choice = &kb.quest_info("Q").unwrap().scenes[0].choices[0];
        assert_eq!(choice.player_line.as_deref(), Some("Mine."));
        assert!(choice.outcome.contains("Careful."));
        assert_eq!(choice.inventory_updates, vec!["+1 Emberdust Vial", "-1 Torch"]);
    }

    #[test]
    fn quest_without_scenes_is_kept_with_warning() {
        let (kb, diags) = build_str("Quest: Empty Road\nNothing here yet.");
        let quest = kb.quest_info("Empty Road").unwrap();
        assert!(quest.scenes.is_empty());
        assert_eq!(quest.description, "Nothing here yet.");
        assert_eq!(diags.len(), 1);
    }
}
