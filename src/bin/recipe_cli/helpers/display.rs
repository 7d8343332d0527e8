// ABOUTME: Output formatting helpers for recipe-cli
// ABOUTME: Prints recipes as JSON or as a readable summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use recipe_agent::models::Recipe;
use serde::Serialize;

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a recipe for a human reader
pub fn display_recipe(recipe: &Recipe) {
    if recipe.is_placeholder() {
        println!("No recipe could be produced.");
        return;
    }

    println!("{}", recipe.title);
    println!(
        "Serves {} | prep {} min | cook {} min | total {} min",
        recipe.serving_size,
        recipe.prep_time,
        recipe.cook_time,
        recipe.total_time()
    );
    println!("\nIngredients:\n{}", recipe.ingredients);
    println!("\nInstructions:\n{}", recipe.instructions);

    let sources = recipe.unique_urls();
    if !sources.is_empty() {
        println!("\nSources:");
        for url in sources {
            println!("  {url}");
        }
    }
}
