use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use fangen_quest::{CraftCheck, UserId};

use crate::config::FangenConfig;

pub fn run(config: &FangenConfig, user: UserId, item: Option<&str>) -> Result<(), String> {
    let workshop = super::workshop(config);

    let Some(item) = item else {
        if workshop.recipes().is_empty() {
            println!("  No crafting recipes are available.");
            return Ok(());
        }
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Item", "Rarity", "Requires"]);
        for recipe in workshop.recipes() {
            let requires = recipe
                .requirements
                .iter()
                .map(|(name, count)| format!("{count}x {name}"))
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(vec![
                recipe.result.clone(),
                super::inventory::rarity_label(recipe.rarity),
                requires,
            ]);
        }
        println!("{table}");
        return Ok(());
    };

    let engine = super::progress_engine(config)?;
    match engine.craft(&workshop, user, item) {
        Ok(CraftCheck::Ready(recipe)) => {
            println!("  {} {}", "Crafted".green().bold(), recipe.result.bold());
            if !recipe.description.is_empty() {
                println!("  {}", recipe.description);
            }
            Ok(())
        }
        Ok(CraftCheck::Missing(missing)) => {
            println!("  {}", format!("You cannot craft {item} yet. Missing:").yellow());
            for line in missing {
                println!("    {line}");
            }
            Ok(())
        }
        Err(e) => super::report(e),
    }
}
