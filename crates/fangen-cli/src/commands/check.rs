use comfy_table::{ContentArrangement, Table};
use fangen_lore::render_diagnostics;

use crate::config::FangenConfig;

pub fn run(config: &FangenConfig) -> Result<(), String> {
    let path = &config.lore_file;
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read lore file {}: {e}", path.display()))?;
    let result = fangen_lore::parse_with(&source, &config.parse_options());

    if !result.diagnostics.is_empty() {
        let filename = path.display().to_string();
        eprint!(
            "{}",
            render_diagnostics(&source, &filename, &result.diagnostics)
        );
    }

    let kb = &result.knowledge;
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Category", "Entries"]);
    for category in kb.categories() {
        table.add_row(vec![category.to_string(), kb.count(category).to_string()]);
    }
    println!("{table}");
    println!();

    let skipped = result.diagnostics.iter().filter(|d| d.is_warning()).count();
    println!(
        "  {} entries, {} section{} skipped",
        kb.total_entries(),
        skipped,
        if skipped == 1 { "" } else { "s" },
    );

    if result.has_errors() {
        return Err(format!("no usable lore in {}", path.display()));
    }
    Ok(())
}
