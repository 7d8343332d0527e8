// ABOUTME: Weekly meal plan command for recipe-cli
// ABOUTME: Drafts seven meal ideas and prints the recipe produced for each day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use recipe_agent::{
    config::AgentConfig, meal_plan::day_name, models::UserProfile, routes::AppState,
};

use crate::helpers::display;

/// Plan and print a week of meals
pub async fn run(config: &AgentConfig, profile: &UserProfile, summary: bool) -> Result<()> {
    let state = AppState::from_config(config)?;
    let plan = state.planner.plan_week(profile).await?;

    if summary {
        for planned in plan.days() {
            println!("\n{}", day_name(planned.day));
            println!("{}", "=".repeat(40));
            display::display_recipe(&planned.recipe);
        }
    } else {
        display::print_json(&plan)?;
    }
    Ok(())
}
