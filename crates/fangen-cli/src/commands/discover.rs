use colored::Colorize;
use fangen_core::Category;
use fangen_quest::UserId;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::FangenConfig;

pub fn run(config: &FangenConfig, user: UserId) -> Result<(), String> {
    let engine = super::open_engine(config)?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let found = fangen_quest::discover(engine.knowledge(), engine.store(), user, &mut rng)
        .map_err(|e| e.to_string())?;
    let Some((category, name)) = found else {
        println!("  You've discovered all there is to know about this world... for now.");
        return Ok(());
    };

    println!("  {}", intro(category).bold());
    println!();
    println!("  {}", name.bold());
    if let Some(entry) = engine.knowledge().entry_content(&name) {
        let text = super::entry_text(entry);
        if !text.is_empty() {
            println!("  {}", super::preview(&text.replace('\n', " "), 200));
        }
    }
    Ok(())
}

fn intro(category: Category) -> &'static str {
    match category {
        Category::World => "You've uncovered new knowledge about the world!",
        Category::Events => "A historical event has been revealed to you!",
        Category::Themes => "You've gained insight into a mystical concept!",
        Category::Characters => "You've learned about a notable figure!",
        Category::Locations => "You've discovered a new location!",
        Category::Factions => "You've learned about a group or faction!",
        Category::Items => "You've uncovered a legendary item!",
        Category::Quests => "You've discovered something new!",
    }
}
