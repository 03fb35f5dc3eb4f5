use std::fmt;

use serde::{Deserialize, Serialize};

/// A lore category. The declaration order is the order categories are
/// listed and searched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Overview of the world itself.
    World,
    /// Key historical events.
    Events,
    /// Elemental and mystical themes.
    Themes,
    /// Character profiles.
    Characters,
    /// Places in the world.
    Locations,
    /// Cultures, factions and social dynamics.
    Factions,
    /// Item tiers and catalogued items.
    Items,
    /// Quest narratives and quest definitions.
    Quests,
}

impl Category {
    /// Every category, in listing order.
    pub const ALL: [Category; 8] = [
        Category::World,
        Category::Events,
        Category::Themes,
        Category::Characters,
        Category::Locations,
        Category::Factions,
        Category::Items,
        Category::Quests,
    ];

    /// The lowercase name used in storage and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::World => "world",
            Category::Events => "events",
            Category::Themes => "themes",
            Category::Characters => "characters",
            Category::Locations => "locations",
            Category::Factions => "factions",
            Category::Items => "items",
            Category::Quests => "quests",
        }
    }

    /// Parse a category name, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == lower)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Category::parse("Characters"), Some(Category::Characters));
        assert_eq!(Category::parse(" QUESTS "), Some(Category::Quests));
        assert_eq!(Category::parse("dragons"), None);
    }

    #[test]
    fn ordering_follows_declaration() {
        assert!(Category::World < Category::Events);
        assert!(Category::Items < Category::Quests);
    }
}
