use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use fangen_core::Rarity;
use fangen_quest::{InventoryItem, UserId};

use crate::config::FangenConfig;

pub fn run(config: &FangenConfig, user: UserId) -> Result<(), String> {
    let engine = super::open_engine(config)?;
    let items = engine.inventory(user).map_err(|e| e.to_string())?;
    print_inventory(&items);
    Ok(())
}

/// Inventory table, grouped with the rarest items first.
pub(crate) fn print_inventory(items: &[InventoryItem]) {
    if items.is_empty() {
        println!("  Your inventory is empty. Complete quests to find items.");
        return;
    }

    let mut sorted: Vec<&InventoryItem> = items.iter().collect();
    sorted.sort_by(|a, b| b.rarity.cmp(&a.rarity).then_with(|| a.name.cmp(&b.name)));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Item", "Qty", "Rarity"]);
    for item in sorted {
        table.add_row(vec![
            item.name.clone(),
            item.quantity.to_string(),
            rarity_label(item.rarity),
        ]);
    }
    println!("{table}");
}

pub(crate) fn rarity_label(rarity: Rarity) -> String {
    match rarity {
        Rarity::Legendary => rarity.as_str().yellow().bold().to_string(),
        Rarity::Rare => rarity.as_str().cyan().to_string(),
        Rarity::Normal => rarity.as_str().to_string(),
    }
}
