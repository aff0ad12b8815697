// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timar - a chat-driven task, epic, and time tracker.
//!
//! Binary entry point: loads configuration, then hands off to the serve
//! loop.

mod serve;

use clap::{Parser, Subcommand};

/// Timar - a chat-driven task, epic, and time tracker.
#[derive(Parser, Debug)]
#[command(name = "timar", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot: Telegram long polling plus the timer refresh job.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match timar_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            timar_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("timar serve failed: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("timar: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        let config = timar_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.agent.name, "timar");
        assert_eq!(config.job.refresh_interval_ms, 1000);
    }
}
