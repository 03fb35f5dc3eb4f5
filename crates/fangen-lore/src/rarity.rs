//! Item catalogue and the rarity heuristic.
//!
//! Rarity is a guess. The lore never states it in a structured way, so the
//! words "Legendary" and "Rare" are looked for in a fixed window of text
//! around the first mention of an item. Two items mentioned close together
//! share a window and can be misclassified; use an override when it matters.

use fangen_core::{Rarity, RarityBasis};

/// Bytes on each side of an item's first mention that are searched.
pub const DEFAULT_WINDOW: usize = 100;

/// Item names recognized anywhere in the lore document.
pub const DEFAULT_CATALOGUE: [&str; 14] = [
    "Ape's Wrath",
    "Wagami's Catalyst",
    "Shokei's Maw",
    "Moon Blade",
    "Seigo's Rampart",
    "Miyou's Insight Amulet",
    "Kagitada's Lock",
    "Paper's Edge",
    "Paper Reaver",
    "Alpha Empress's Sigil",
    "Voidforged Relic",
    "Inferno Fang",
    "Emberdust Vial",
    "Solar Fang",
];

/// A rarity together with how it was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RarityGuess {
    /// The tier.
    pub rarity: Rarity,
    /// How the tier was decided.
    pub basis: RarityBasis,
}

impl RarityGuess {
    /// An explicitly configured tier.
    pub fn overridden(rarity: Rarity) -> Self {
        Self {
            rarity,
            basis: RarityBasis::Override,
        }
    }
}

/// Guess the rarity of the item first mentioned at byte `position`.
///
/// "Legendary" is checked before "Rare". With neither in the window the
/// item is Normal.
pub fn guess_rarity(document: &str, position: usize, window: usize) -> RarityGuess {
    let start = floor_boundary(document, position.saturating_sub(window));
    let end = ceil_boundary(document, position.saturating_add(window));
    let context = &document[start..end];

    let (rarity, basis) = if context.contains("Legendary") {
        (Rarity::Legendary, RarityBasis::ContextWindow)
    } else if context.contains("Rare") {
        (Rarity::Rare, RarityBasis::ContextWindow)
    } else {
        (Rarity::Normal, RarityBasis::Default)
    };
    RarityGuess { rarity, basis }
}

fn floor_boundary(s: &str, mut index: usize) -> usize {
    index = index.min(s.len());
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_boundary(s: &str, mut index: usize) -> usize {
    index = index.min(s.len());
    while !s.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legendary_wins_over_rare() {
        let doc = "A Rare and Legendary blade: Moon Blade.";
        let pos = doc.find("Moon Blade").unwrap();
        let guess = guess_rarity(doc, pos, DEFAULT_WINDOW);
        assert_eq!(guess.rarity, Rarity::Legendary);
        assert_eq!(guess.basis, RarityBasis::ContextWindow);
    }

    #[test]
    fn nothing_nearby_is_normal() {
        let doc = format!("Legendary things.{}Solar Fang", " ".repeat(200));
        let pos = doc.find("Solar Fang").unwrap();
        let guess = guess_rarity(&doc, pos, DEFAULT_WINDOW);
        assert_eq!(guess.rarity, Rarity::Normal);
        assert_eq!(guess.basis, RarityBasis::Default);
    }

    #[test]
    fn window_respects_char_boundaries() {
        let doc = format!("{}Rare • Inferno Fang •••", "•".repeat(60));
        let pos = doc.find("Inferno Fang").unwrap();
        assert_eq!(guess_rarity(&doc, pos, 7).rarity, Rarity::Rare);
    }

    #[test]
    fn neighbouring_items_share_a_window() {
        let doc = "Legendary: Solar Fang. Also the Inferno Fang, a trinket.";
        let pos = doc.find("Inferno Fang").unwrap();
        // Known limitation of the heuristic.
        assert_eq!(guess_rarity(doc, pos, DEFAULT_WINDOW).rarity, Rarity::Legendary);
    }
}
