use comfy_table::{ContentArrangement, Table};
use fangen_quest::UserId;

use crate::config::FangenConfig;

pub fn run(config: &FangenConfig, user: UserId) -> Result<(), String> {
    let engine = super::open_engine(config)?;
    let report = fangen_quest::progress(engine.knowledge(), engine.store(), user)
        .map_err(|e| e.to_string())?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Category", "Discovered", "Total", "Progress"]);
    for c in &report.categories {
        table.add_row(vec![
            c.category.to_string(),
            c.discovered.to_string(),
            c.total.to_string(),
            format!("{:.1}%", c.percent()),
        ]);
    }
    println!("{table}");
    println!();
    println!(
        "  Overall: {}/{} ({:.1}%)",
        report.discovered,
        report.total,
        report.percent()
    );
    Ok(())
}
