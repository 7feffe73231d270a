// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renewbot - renewal reminders from a Google Sheet to Telegram groups.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod preview;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use renewbot_config::RenewbotConfig;

/// Renewbot - renewal reminders from a Google Sheet to Telegram groups.
#[derive(Parser, Debug)]
#[command(name = "renewbot", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Run the bot: scheduled checks, daily summary and chat commands (default).
    Serve,
    /// Print the alerts a periodic check would send right now.
    Check,
    /// Print today's daily summary.
    Summary,
}

fn load_config(path: Option<&PathBuf>) -> RenewbotConfig {
    let loaded = match path {
        Some(path) => renewbot_config::load_and_validate_path(path),
        None => renewbot_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            renewbot_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    serve::init_tracing(&config.bot.log_level);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Check => preview::run_check(&config).await,
        Commands::Summary => preview::run_summary(&config).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
