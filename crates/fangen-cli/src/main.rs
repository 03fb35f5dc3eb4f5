//! CLI frontend for Fangen: browse the lore, play quests and track progress.

mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use fangen_quest::UserId;
use tracing_subscriber::EnvFilter;

use crate::config::FangenConfig;

#[derive(Parser)]
#[command(
    name = "fangen",
    about = "Fangen: explore a world's lore and play through its quests",
    version,
    propagate_version = true
)]
struct Cli {
    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Lore document (overrides the config)
    #[arg(short, long, global = true)]
    lore: Option<PathBuf>,

    /// SQLite database for progress (default: in memory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Whose progress to use
    #[arg(short, long, global = true, default_value = "1")]
    user: UserId,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the lore document and report skipped sections
    Check,

    /// List lore categories, or the entries in one
    Lore {
        /// Category name (e.g. characters, events, quests)
        category: Option<String>,
    },

    /// Show a lore entry
    Show {
        /// Entry name
        name: String,
    },

    /// Search entry names and text
    Search {
        /// Search query
        query: String,
    },

    /// List quests and whether you have completed them
    Quests,

    /// Play quests interactively
    Play,

    /// Show your inventory
    Inventory,

    /// List recipes, or craft an item
    Craft {
        /// Item to craft
        item: Option<String>,
    },

    /// Discover a random lore entry
    Discover {
        /// RNG seed (overrides the config)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show your discovery progress
    Status,

    /// List the entries you have discovered
    Collection,

    /// Show or change your settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Talk to a character
    Talk {
        /// Character name
        character: String,

        /// What to say
        #[arg(num_args = 1.., required = true)]
        message: Vec<String>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Switch an on/off setting
    Toggle {
        /// Setting name (notifications)
        key: String,
    },

    /// Move a setting to its next value
    Cycle {
        /// Setting name (discovery_frequency, theme)
        key: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    init_tracing(cli.verbose, &config.log_level);

    let user = cli.user;
    let result = match cli.command {
        Commands::Check => commands::check::run(&config),
        Commands::Lore { category } => commands::lore::run(&config, category.as_deref()),
        Commands::Show { name } => commands::show::run(&config, user, &name),
        Commands::Search { query } => commands::search::run(&config, &query),
        Commands::Quests => commands::quests::run(&config, user),
        Commands::Play => commands::play::run(&config, user),
        Commands::Inventory => commands::inventory::run(&config, user),
        Commands::Craft { item } => commands::craft::run(&config, user, item.as_deref()),
        Commands::Discover { seed } => match seed {
            Some(seed) => commands::discover::run(&config.clone().with_seed(seed), user),
            None => commands::discover::run(&config, user),
        },
        Commands::Status => commands::status::run(&config, user),
        Commands::Collection => commands::collection::run(&config, user),
        Commands::Settings { action } => match action {
            None => commands::settings::show(&config, user),
            Some(SettingsAction::Toggle { key }) => commands::settings::toggle(&config, user, &key),
            Some(SettingsAction::Cycle { key }) => commands::settings::cycle(&config, user, &key),
        },
        Commands::Talk { character, message } => {
            commands::talk::run(&config, user, &character, &message.join(" "))
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Config file first, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<FangenConfig, String> {
    let mut config = match &cli.config {
        Some(path) => FangenConfig::load(path)?,
        None => FangenConfig::default(),
    };
    if let Some(lore) = &cli.lore {
        config = config.with_lore_file(lore);
    }
    if let Some(db) = &cli.db {
        config = config.with_database(db);
    }
    Ok(config)
}

/// `RUST_LOG` wins, then `-v`, then the configured level.
fn init_tracing(verbose: bool, log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
