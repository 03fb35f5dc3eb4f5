//! User settings and the toggle/cycle operations on them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::{ProgressStore, SettingsMap, StoreResult, UserId};

/// How often discoveries are offered. Stored only; nothing is scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryFrequency {
    /// Every day.
    #[default]
    Daily,
    /// Every week.
    Weekly,
    /// Every month.
    Monthly,
    /// Never.
    Never,
}

impl DiscoveryFrequency {
    const CYCLE: [Self; 4] = [Self::Daily, Self::Weekly, Self::Monthly, Self::Never];

    /// The next value in cycle order, wrapping around.
    pub fn next(self) -> Self {
        next_in(&Self::CYCLE, self)
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Never => "never",
        }
    }
}

/// Display theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// The default theme.
    #[default]
    Default,
    /// Dark.
    Dark,
    /// Light.
    Light,
    /// Mystic.
    Mystic,
}

impl Theme {
    const CYCLE: [Self; 4] = [Self::Default, Self::Dark, Self::Light, Self::Mystic];

    /// The next value in cycle order, wrapping around.
    pub fn next(self) -> Self {
        next_in(&Self::CYCLE, self)
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Mystic => "mystic",
        }
    }
}

fn next_in<T: Copy + PartialEq>(cycle: &[T], current: T) -> T {
    let at = cycle.iter().position(|v| *v == current).unwrap_or(0);
    cycle[(at + 1) % cycle.len()]
}

/// A setting that can be toggled or cycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    /// `notifications`
    Notifications,
    /// `discovery_frequency`
    DiscoveryFrequency,
    /// `theme`
    Theme,
}

impl SettingKey {
    /// Parse a key name, accepting `frequency` for the discovery frequency.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "notifications" => Some(Self::Notifications),
            "discovery_frequency" | "frequency" => Some(Self::DiscoveryFrequency),
            "theme" => Some(Self::Theme),
            _ => None,
        }
    }
}

/// Typed view of a user's settings. Missing or unreadable values fall back
/// to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Whether notifications are on.
    pub notifications: bool,
    /// Discovery frequency.
    pub discovery_frequency: DiscoveryFrequency,
    /// Display theme.
    pub theme: Theme,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            discovery_frequency: DiscoveryFrequency::default(),
            theme: Theme::default(),
        }
    }
}

impl UserSettings {
    /// Read from a stored map.
    pub fn from_map(map: &SettingsMap) -> Self {
        let defaults = Self::default();
        let field = |key: &str| map.get(key).cloned();
        Self {
            notifications: field("notifications")
                .and_then(|v| v.as_bool())
                .unwrap_or(defaults.notifications),
            discovery_frequency: field("discovery_frequency")
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or(defaults.discovery_frequency),
            theme: field("theme")
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or(defaults.theme),
        }
    }

    /// Write into a stored map, keeping unrelated keys.
    pub fn apply_to(&self, map: &mut SettingsMap) {
        map.insert("notifications".into(), self.notifications.into());
        map.insert(
            "discovery_frequency".into(),
            self.discovery_frequency.as_str().into(),
        );
        map.insert("theme".into(), self.theme.as_str().into());
    }

    /// Flip or advance one setting.
    pub fn advance(&mut self, key: SettingKey) {
        match key {
            SettingKey::Notifications => self.notifications = !self.notifications,
            SettingKey::DiscoveryFrequency => {
                self.discovery_frequency = self.discovery_frequency.next();
            }
            SettingKey::Theme => self.theme = self.theme.next(),
        }
    }

    /// Load a user's settings.
    pub fn load(store: &dyn ProgressStore, user: UserId) -> StoreResult<Self> {
        Ok(Self::from_map(&store.settings(user)?))
    }

    /// Advance one setting and persist the result. Callers go through
    /// [`QuestEngine::update_setting`](crate::QuestEngine::update_setting),
    /// which holds the user's lock.
    pub(crate) fn update(store: &dyn ProgressStore, user: UserId, key: SettingKey) -> StoreResult<Self> {
        let mut map = store.settings(user)?;
        let mut settings = Self::from_map(&map);
        settings.advance(key);
        settings.apply_to(&mut map);
        store.set_settings(user, &map)?;
        tracing::debug!(user, ?key, "setting changed");
        Ok(settings)
    }
}

impl fmt::Display for UserSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Notifications: {}",
            if self.notifications { "ON" } else { "OFF" }
        )?;
        writeln!(f, "Discovery Frequency: {}", capitalize(self.discovery_frequency.as_str()))?;
        write!(f, "Theme: {}", capitalize(self.theme.as_str()))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn defaults_when_unset() {
        let settings = UserSettings::from_map(&SettingsMap::new());
        assert!(settings.notifications);
        assert_eq!(settings.discovery_frequency, DiscoveryFrequency::Daily);
        assert_eq!(settings.theme, Theme::Default);
    }

    #[test]
    fn cycles_wrap() {
        assert_eq!(DiscoveryFrequency::Never.next(), DiscoveryFrequency::Daily);
        assert_eq!(Theme::Light.next(), Theme::Mystic);
        assert_eq!(Theme::Mystic.next(), Theme::Default);
    }

    #[test]
    fn unreadable_values_fall_back() {
        let mut map = SettingsMap::new();
        map.insert("theme".into(), "neon".into());
        map.insert("notifications".into(), "yes".into());
        let settings = UserSettings::from_map(&map);
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn update_persists_and_keeps_other_keys() {
        let store = MemoryStore::new();
        let mut map = SettingsMap::new();
        map.insert("language".into(), "de".into());
        store.set_settings(1, &map).unwrap();

        let settings = UserSettings::update(&store, 1, SettingKey::Theme).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        let settings = UserSettings::update(&store, 1, SettingKey::Notifications).unwrap();
        assert!(!settings.notifications);

        let stored = store.settings(1).unwrap();
        assert_eq!(stored["language"], "de");
        assert_eq!(stored["theme"], "dark");
        assert_eq!(UserSettings::load(&store, 1).unwrap(), settings);
    }

    #[test]
    fn parse_keys() {
        assert_eq!(SettingKey::parse("Theme"), Some(SettingKey::Theme));
        assert_eq!(
            SettingKey::parse("discovery-frequency"),
            Some(SettingKey::DiscoveryFrequency)
        );
        assert_eq!(SettingKey::parse("volume"), None);
    }

    #[test]
    fn display_lists_all() {
        let text = UserSettings::default().to_string();
        assert!(text.contains("Notifications: ON"));
        assert!(text.contains("Discovery Frequency: Daily"));
        assert!(text.contains("Theme: Default"));
    }
}
