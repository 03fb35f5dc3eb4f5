use crate::config::FangenConfig;

pub fn run(config: &FangenConfig, query: &str) -> Result<(), String> {
    let kb = super::load_lore(config);
    let results = kb.search(query);

    if results.is_empty() {
        println!("  No results for \"{query}\".");
        return Ok(());
    }

    let total: usize = results.values().map(Vec::len).sum();
    println!("  {total} results for \"{query}\":");
    println!();

    for (category, names) in &results {
        for name in names {
            println!("  {name} [{category}]");
            if let Some(entry) = kb.entry_content(name) {
                let text = super::entry_text(entry);
                let first = text.lines().next().unwrap_or_default();
                if !first.is_empty() {
                    println!("    {}", super::preview(first, 77));
                }
            }
        }
    }
    Ok(())
}
