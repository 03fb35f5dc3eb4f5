use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use fangen_quest::UserId;

use crate::config::FangenConfig;

pub fn run(config: &FangenConfig, user: UserId) -> Result<(), String> {
    let engine = super::open_engine(config)?;
    let quests = engine.available_quests(user).map_err(|e| e.to_string())?;

    if quests.is_empty() {
        println!("  No quests found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Quest", "Scenes", "Status"]);
    for quest in &quests {
        let scenes = engine
            .knowledge()
            .quest_info(&quest.name)
            .map_or(0, |q| q.scenes.len());
        let status = if quest.completed {
            "completed".green().to_string()
        } else {
            "open".to_string()
        };
        table.add_row(vec![quest.name.clone(), scenes.to_string(), status]);
    }
    println!("{table}");
    println!();
    println!("  Start one with: fangen play");
    Ok(())
}
