// ABOUTME: Single recipe command for recipe-cli
// ABOUTME: Runs the workflow once and prints the recipe, warning on the placeholder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use recipe_agent::{config::AgentConfig, models::UserProfile, workflow::RecipeWorkflow};
use tracing::warn;

use crate::helpers::display;

/// Generate and print one recipe
pub async fn run(config: &AgentConfig, dish: &str, profile: &UserProfile, summary: bool) -> Result<()> {
    let workflow = RecipeWorkflow::from_config(config)?;
    let recipe = workflow.run(dish, profile).await;
    if recipe.is_placeholder() {
        warn!(dish = %dish, "No recipe could be produced; printing the placeholder");
    }

    if summary {
        display::display_recipe(&recipe);
    } else {
        display::print_json(&recipe)?;
    }
    Ok(())
}
