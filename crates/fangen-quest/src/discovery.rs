//! Random discovery, progress reports and the discovered collection.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use fangen_core::{Category, KnowledgeBase};
use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::error::QuestResult;
use crate::store::{ProgressStore, UserId};

/// Pick a random entry the user has not discovered yet and record it.
///
/// Returns `None` once everything has been discovered.
pub fn discover(
    kb: &KnowledgeBase,
    store: &dyn ProgressStore,
    user: UserId,
    rng: &mut StdRng,
) -> QuestResult<Option<(Category, String)>> {
    let known = discovered_set(store, user)?;
    let candidates: Vec<(Category, &str)> = Category::ALL
        .iter()
        .flat_map(|&category| kb.iter(category).map(move |(name, _)| (category, name)))
        .filter(|(category, name)| !known.contains(&(*category, (*name).to_string())))
        .collect();

    if candidates.is_empty() {
        return Ok(None);
    }
    let (category, name) = candidates[rng.random_range(0..candidates.len())];
    store.record_discovery(user, category, name)?;
    tracing::debug!(user, %category, name, "entry discovered");
    Ok(Some((category, name.to_string())))
}

/// Discovered versus available entries in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    /// The category.
    pub category: Category,
    /// Entries the user has discovered.
    pub discovered: usize,
    /// Entries in the knowledge base.
    pub total: usize,
}

impl CategoryProgress {
    /// Share discovered, in percent. Zero for an empty category.
    pub fn percent(&self) -> f64 {
        percent(self.discovered, self.total)
    }
}

/// A user's discovery progress across all non-empty categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    /// Per-category figures in listing order.
    pub categories: Vec<CategoryProgress>,
    /// Discovered entries overall.
    pub discovered: usize,
    /// Entries overall.
    pub total: usize,
}

impl ProgressReport {
    /// Overall share discovered, in percent.
    pub fn percent(&self) -> f64 {
        percent(self.discovered, self.total)
    }
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.categories {
            writeln!(
                f,
                "{}: {}/{} ({:.1}%)",
                capitalize(c.category.as_str()),
                c.discovered,
                c.total,
                c.percent()
            )?;
        }
        write!(
            f,
            "Overall: {}/{} ({:.1}%)",
            self.discovered,
            self.total,
            self.percent()
        )
    }
}

/// Count discovered entries per category. Discoveries of entries that are no
/// longer in the lore do not count.
pub fn progress(
    kb: &KnowledgeBase,
    store: &dyn ProgressStore,
    user: UserId,
) -> QuestResult<ProgressReport> {
    let known = discovered_set(store, user)?;
    let categories: Vec<CategoryProgress> = kb
        .categories()
        .into_iter()
        .map(|category| CategoryProgress {
            category,
            discovered: kb
                .iter(category)
                .filter(|(name, _)| known.contains(&(category, (*name).to_string())))
                .count(),
            total: kb.count(category),
        })
        .collect();

    Ok(ProgressReport {
        discovered: categories.iter().map(|c| c.discovered).sum(),
        total: categories.iter().map(|c| c.total).sum(),
        categories,
    })
}

/// Discovered entry names grouped by category, in discovery order.
pub fn collection(
    store: &dyn ProgressStore,
    user: UserId,
) -> QuestResult<BTreeMap<Category, Vec<String>>> {
    let mut grouped: BTreeMap<Category, Vec<String>> = BTreeMap::new();
    for discovery in store.discoveries(user)? {
        grouped
            .entry(discovery.category)
            .or_default()
            .push(discovery.name);
    }
    Ok(grouped)
}

fn discovered_set(
    store: &dyn ProgressStore,
    user: UserId,
) -> QuestResult<HashSet<(Category, String)>> {
    Ok(store
        .discoveries(user)?
        .into_iter()
        .map(|d| (d.category, d.name))
        .collect())
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
