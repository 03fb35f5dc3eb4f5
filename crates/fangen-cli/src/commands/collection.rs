use colored::Colorize;
use fangen_quest::UserId;

use crate::config::FangenConfig;

pub fn run(config: &FangenConfig, user: UserId) -> Result<(), String> {
    let store = super::open_store(config)?;
    let grouped = fangen_quest::collection(store.as_ref(), user).map_err(|e| e.to_string())?;

    if grouped.is_empty() {
        println!("  Your collection is empty. Use `fangen discover` to find lore entries!");
        return Ok(());
    }

    for (category, names) in &grouped {
        println!("  {} ({})", super::title_case(category.as_str()).bold(), names.len());
        for name in names {
            println!("    {name}");
        }
    }
    Ok(())
}
