//! Inventory directives from quest outcomes.
//!
//! Directives are free text. The forms understood are `+1 Ember Dust`,
//! `-2 Torch`, `3 Arrows`, `Arrows x3` and a bare item name, which means one.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static LEADING_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?)\s*(\d+)\s*[xX×]?\s+(.+)$").unwrap());
static TRAILING_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?)\s*(.+?)\s+[xX×]\s*(\d+)$").unwrap());

/// A parsed inventory change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryUpdate {
    /// Item name.
    pub item: String,
    /// Signed change: positive adds, negative removes.
    pub quantity: i64,
}

impl InventoryUpdate {
    /// Parse a directive. Returns `None` for an empty directive or a zero
    /// count.
    pub fn parse(directive: &str) -> Option<Self> {
        let directive = directive.trim();
        if directive.is_empty() {
            return None;
        }

        let (sign, count, item) = if let Some(c) = LEADING_COUNT.captures(directive) {
            (sign_of(&c[1]), c[2].parse::<i64>().ok()?, c[3].trim().to_string())
        } else if let Some(c) = TRAILING_COUNT.captures(directive) {
            (sign_of(&c[1]), c[3].parse::<i64>().ok()?, c[2].trim().to_string())
        } else if let Some(rest) = directive.strip_prefix('-') {
            (-1, 1, rest.trim().to_string())
        } else {
            (1, 1, directive.trim_start_matches('+').trim().to_string())
        };

        if item.is_empty() || count == 0 {
            return None;
        }
        Some(Self {
            item,
            quantity: sign * count,
        })
    }

    /// Whether this removes items.
    pub fn is_removal(&self) -> bool {
        self.quantity < 0
    }
}

impl fmt::Display for InventoryUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+} {}", self.quantity, self.item)
    }
}

fn sign_of(s: &str) -> i64 {
    if s == "-" { -1 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(s: &str) -> (String, i64) {
        let u = InventoryUpdate::parse(s).unwrap();
        (u.item, u.quantity)
    }

    #[test]
    fn signed_leading_counts() {
        assert_eq!(parsed("+1 Ember Dust"), ("Ember Dust".into(), 1));
        assert_eq!(parsed("-2 Torch"), ("Torch".into(), -2));
        assert_eq!(parsed("3 Arrows"), ("Arrows".into(), 3));
        assert_eq!(parsed("2x Healing Herb"), ("Healing Herb".into(), 2));
    }

    #[test]
    fn trailing_counts() {
        assert_eq!(parsed("Arrows x3"), ("Arrows".into(), 3));
        assert_eq!(parsed("-Torch x 2"), ("Torch".into(), -2));
    }

    #[test]
    fn bare_names_mean_one() {
        assert_eq!(parsed("Solar Fang"), ("Solar Fang".into(), 1));
        assert_eq!(parsed("-Solar Fang"), ("Solar Fang".into(), -1));
        assert_eq!(parsed("+Solar Fang"), ("Solar Fang".into(), 1));
    }

    #[test]
    fn names_with_digits_survive() {
        assert_eq!(parsed("Gate 7 Key"), ("Gate 7 Key".into(), 1));
    }

    #[test]
    fn rejects_empty_and_zero() {
        assert!(InventoryUpdate::parse("   ").is_none());
        assert!(InventoryUpdate::parse("+0 Ember Dust").is_none());
        assert!(InventoryUpdate::parse("-").is_none());
    }

    #[test]
    fn display_shows_sign() {
        assert_eq!(InventoryUpdate::parse("Torch").unwrap().to_string(), "+1 Torch");
        assert_eq!(InventoryUpdate::parse("-2 Torch").unwrap().to_string(), "-2 Torch");
    }

    proptest::proptest! {
        #[test]
        fn parse_never_panics(s in "\\PC{0,40}") {
            let _ = InventoryUpdate::parse(&s);
        }

        #[test]
        fn display_parses_back(item in "[A-Z][a-z]{1,8}( [A-Z][a-z]{1,8})?", quantity in -500i64..500) {
            proptest::prop_assume!(quantity != 0);
            let update = InventoryUpdate { item, quantity };
            proptest::prop_assert_eq!(InventoryUpdate::parse(&update.to_string()), Some(update));
        }
    }
}
