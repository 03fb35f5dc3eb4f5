use std::io::{self, BufRead, Write};

use colored::Colorize;
use fangen_quest::{QuestEnd, QuestEngine, QuestReply, QuestView, SceneRendering, UserId};

use crate::config::FangenConfig;

const HELP: &str = "\
  quests               list quests
  start <quest>        begin a quest
  current              show the current scene again
  choose <id>          take a choice (or just type the id)
  abandon              give up the current quest
  inventory            show your items
  talk <name>: <text>  talk to a character
  help                 this list
  quit                 leave";

pub fn run(config: &FangenConfig, user: UserId) -> Result<(), String> {
    let engine = super::open_engine(config)?;

    println!("  {} Fangen", "Entering".bold());
    println!("  Type 'help' for commands, 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
            break;
        }

        step(&engine, user, input)?;
        println!();
    }

    Ok(())
}

/// Handle one line of input.
fn step(engine: &QuestEngine, user: UserId, input: &str) -> Result<(), String> {
    let (command, rest) = match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (input, ""),
    };

    let reply = match command.to_lowercase().as_str() {
        "help" | "?" => {
            println!("{HELP}");
            return Ok(());
        }
        "quests" => {
            for quest in engine.available_quests(user).map_err(|e| e.to_string())? {
                let mark = if quest.completed { "✓".green() } else { " ".normal() };
                println!("  {mark} {}", quest.name);
            }
            return Ok(());
        }
        "inventory" | "inv" => {
            let items = engine.inventory(user).map_err(|e| e.to_string())?;
            super::inventory::print_inventory(&items);
            return Ok(());
        }
        "abandon" => {
            println!("  {}", engine.abandon_quest(user));
            return Ok(());
        }
        "talk" => {
            let Some((name, message)) = split_talk(rest) else {
                println!("  {}", "Usage: talk <name>: <text>".yellow());
                return Ok(());
            };
            return match engine.character_response(user, name, message) {
                Ok(reply) => {
                    println!("  {}: \"{}\"", name.bold(), reply);
                    Ok(())
                }
                Err(e) => super::report(e),
            };
        }
        "start" if !rest.is_empty() => engine.start_quest(user, rest),
        "current" => engine.current_quest(user),
        "choose" if !rest.is_empty() => engine.make_choice(user, rest),
        _ if engine.active_quest(user).is_some() => engine.make_choice(user, input),
        _ => {
            println!(
                "  {}",
                format!("Unknown command \"{input}\". Type 'help' for commands.").yellow()
            );
            return Ok(());
        }
    };

    match reply {
        Ok(reply) => {
            print_reply(&reply);
            Ok(())
        }
        Err(e) => super::report(e),
    }
}

/// `Kagitada: hello` or `Kagitada hello`.
fn split_talk(rest: &str) -> Option<(&str, &str)> {
    let (name, message) = rest
        .split_once(':')
        .or_else(|| rest.split_once(char::is_whitespace))?;
    let (name, message) = (name.trim(), message.trim());
    (!name.is_empty() && !message.is_empty()).then_some((name, message))
}

fn print_reply(reply: &QuestReply) {
    if !reply.message.is_empty() {
        for line in reply.message.lines() {
            println!("  {line}");
        }
        println!();
    }
    match &reply.view {
        QuestView::Scene(scene) => print_scene(scene),
        QuestView::End(end) => print_end(end),
    }
}

fn print_scene(scene: &SceneRendering) {
    println!(
        "  {} {}",
        format!("Scene {}:", scene.number).bold(),
        scene.title.bold()
    );
    println!();
    for line in scene.narrative.lines() {
        println!("  {line}");
    }
    println!();
    for choice in &scene.choices {
        println!("  [{}] {}", choice.id.cyan(), choice.text);
    }
}

fn print_end(end: &QuestEnd) {
    for line in end.text.lines() {
        println!("  {line}");
    }
    if !end.rewards.is_empty() {
        println!();
        println!("  {} {}", "Rewards:".green().bold(), end.rewards.join(", "));
    }
}
