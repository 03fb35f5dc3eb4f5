use comfy_table::{ContentArrangement, Table};
use fangen_core::Category;

use crate::config::FangenConfig;

pub fn run(config: &FangenConfig, category: Option<&str>) -> Result<(), String> {
    let kb = super::load_lore(config);

    let Some(name) = category else {
        let categories = kb.categories();
        if categories.is_empty() {
            println!("  No lore loaded.");
            return Ok(());
        }
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Category", "Entries"]);
        for category in categories {
            table.add_row(vec![category.to_string(), kb.count(category).to_string()]);
        }
        println!("{table}");
        return Ok(());
    };

    let category =
        Category::parse(name).ok_or_else(|| format!("unknown category: \"{name}\""))?;
    let entries = kb.entries_in(category);
    if entries.is_empty() {
        println!("  No entries in {category}.");
        return Ok(());
    }

    for entry in &entries {
        println!("  {entry}");
    }
    println!();
    println!("  {} entries", entries.len());
    Ok(())
}
