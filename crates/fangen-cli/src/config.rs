//! Configuration for the `fangen` binary, read from TOML.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fangen_core::Rarity;
use fangen_lore::ParseOptions;
use fangen_quest::Recipe;
use serde::Deserialize;

/// Lore file used when neither the config nor `--lore` names one.
pub const DEFAULT_LORE_FILE: &str = "fangen_lore.txt";

/// Everything the binary can be configured with. Missing keys take their
/// defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FangenConfig {
    /// Path of the lore document.
    pub lore_file: PathBuf,
    /// SQLite database for progress. In-memory when unset.
    pub database: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is unset and `-v` is not given.
    pub log_level: String,
    /// Seed for discovery rolls. Random when unset.
    pub seed: Option<u64>,
    /// Fixed item rarities that skip the heuristic.
    pub rarity_overrides: HashMap<String, Rarity>,
    /// Crafting recipes.
    pub recipes: Vec<Recipe>,
}

impl Default for FangenConfig {
    fn default() -> Self {
        Self {
            lore_file: PathBuf::from(DEFAULT_LORE_FILE),
            database: None,
            log_level: "warn".to_string(),
            seed: None,
            rarity_overrides: HashMap::new(),
            recipes: Vec::new(),
        }
    }
}

impl FangenConfig {
    /// Read a config file. A file that is given but unreadable is an error.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| format!("invalid config {}: {e}", path.display()))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Set the lore file.
    pub fn with_lore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.lore_file = path.into();
        self
    }

    /// Set the progress database.
    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }

    /// Set the discovery seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parser options carrying the configured rarity overrides. Overridden
    /// items join the catalogue.
    pub fn parse_options(&self) -> ParseOptions {
        self.rarity_overrides
            .iter()
            .fold(ParseOptions::default(), |options, (item, rarity)| {
                options
                    .with_item(item.clone())
                    .with_override(item.clone(), *rarity)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = FangenConfig::default();
        assert_eq!(cfg.lore_file, PathBuf::from(DEFAULT_LORE_FILE));
        assert!(cfg.database.is_none());
        assert_eq!(cfg.log_level, "warn");
        assert!(cfg.recipes.is_empty());
    }

    #[test]
    fn builder_methods() {
        let cfg = FangenConfig::default()
            .with_lore_file("world.txt")
            .with_database("progress.db")
            .with_seed(7);
        assert_eq!(cfg.lore_file, PathBuf::from("world.txt"));
        assert_eq!(cfg.database, Some(PathBuf::from("progress.db")));
        assert_eq!(cfg.seed, Some(7));
    }

    #[test]
    fn reads_toml() {
        let cfg: FangenConfig = toml::from_str(
            r#"
lore_file = "lore/fangen.txt"
seed = 42

[rarity_overrides]
"Paper's Edge" = "Rare"

[[recipes]]
result = "Inferno Fang"
rarity = "Legendary"
requirements = { "Ember Dust" = 3, "Solar Fang" = 1 }
"#,
        )
        .unwrap();
        assert_eq!(cfg.lore_file, PathBuf::from("lore/fangen.txt"));
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.rarity_overrides["Paper's Edge"], Rarity::Rare);
        assert_eq!(cfg.recipes[0].requirements["Ember Dust"], 3);
        assert_eq!(cfg.recipes[0].rarity, Rarity::Legendary);
    }

    #[test]
    fn overrides_reach_parse_options() {
        let mut cfg = FangenConfig::default();
        cfg.rarity_overrides
            .insert("Paper's Edge".into(), Rarity::Legendary);
        let options = cfg.parse_options();
        assert_eq!(options.rarity_overrides["Paper's Edge"], Rarity::Legendary);
        assert!(options.catalogue.iter().any(|i| i == "Paper's Edge"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = FangenConfig::load(Path::new("/nonexistent/fangen.toml")).unwrap_err();
        assert!(err.contains("cannot read config"));
    }
}
