// ABOUTME: Recipe CLI - command-line access to the recipe workflow and meal planner
// ABOUTME: Generates a single recipe or a weekly meal plan and prints the result as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Generate one recipe with the built-in sample profile
//! recipe-cli recipe "lava cheesecake"
//!
//! # Generate one recipe for a profile stored in a JSON file
//! recipe-cli recipe "lava cheesecake" --profile profile.json
//!
//! # Plan a week of meals
//! recipe-cli plan --profile profile.json
//! ```

mod commands;
mod helpers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use recipe_agent::{
    config::AgentConfig, external::http_client::initialize_shared_client,
    logging::LoggingConfig,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "recipe-cli",
    about = "Recipe agent CLI",
    long_about = "Researches dishes on the web and writes structured recipes that respect a dietary profile."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file with the dietary profile (defaults to the built-in sample)
    #[arg(long, short = 'p', global = true)]
    profile: Option<PathBuf>,

    /// Print a readable summary instead of JSON
    #[arg(long, global = true)]
    summary: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Research and write one recipe
    Recipe {
        /// Dish to research
        dish: String,
    },

    /// Plan a week of meals, one recipe per day
    Plan,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    LoggingConfig::for_cli(cli.verbose).init()?;
    info!("Recipe agent CLI");

    let config = AgentConfig::from_env()?;
    initialize_shared_client(
        config.server.client_timeout_secs,
        config.server.client_connect_timeout_secs,
    );
    let profile = helpers::profile::load(cli.profile.as_deref()).await?;

    match cli.command {
        Command::Recipe { dish } => {
            commands::recipe::run(&config, &dish, &profile, cli.summary).await?;
        }
        Command::Plan => {
            commands::plan::run(&config, &profile, cli.summary).await?;
        }
    }

    Ok(())
}
