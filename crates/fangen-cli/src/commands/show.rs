use colored::Colorize;
use fangen_core::Category;
use fangen_quest::UserId;

use crate::config::FangenConfig;

/// Reading an entry discovers it. Quests are only discovered by finishing
/// them.
pub fn run(config: &FangenConfig, user: UserId, name: &str) -> Result<(), String> {
    let engine = super::open_engine(config)?;
    let kb = engine.knowledge();

    let (category, name, entry) = kb
        .locate(name)
        .map(|(category, entry)| (category, name, entry))
        .or_else(|| {
            Category::ALL.into_iter().find_map(|category| {
                kb.iter(category)
                    .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
                    .map(|(candidate, entry)| (category, candidate, entry))
            })
        })
        .ok_or_else(|| format!("entry not found: \"{name}\""))?;

    println!("  {} [{}]", name.bold(), category.to_string().dimmed());
    println!();
    for line in super::entry_text(entry).lines() {
        println!("  {}", line.trim());
    }

    let related: Vec<String> = kb
        .related_characters(name)
        .into_iter()
        .filter(|c| c != name)
        .collect();
    if !related.is_empty() {
        println!();
        println!("  {} {}", "Related:".bold(), related.join(", "));
    }

    if category != Category::Quests {
        engine
            .store()
            .record_discovery(user, category, name)
            .map_err(|e| e.to_string())?;
    }
    Ok(())
}
