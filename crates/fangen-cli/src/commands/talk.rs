use colored::Colorize;
use fangen_quest::UserId;

use crate::config::FangenConfig;

pub fn run(config: &FangenConfig, user: UserId, character: &str, message: &str) -> Result<(), String> {
    let engine = super::open_engine(config)?;
    match engine.character_response(user, character, message) {
        Ok(reply) => {
            println!("  {}: \"{}\"", character.bold(), reply);
            Ok(())
        }
        Err(e) => super::report(e),
    }
}
