// ABOUTME: System prompts for each workflow stage loaded at compile time
// ABOUTME: Research, evaluation, synthesis, and meal planning instructions kept as markdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.

/// Instructions for turning the conversation into search queries
pub const RESEARCH_QUERIES_PROMPT: &str = include_str!("research_queries.md");

/// Instructions for grading research sufficiency
pub const RESEARCH_EVALUATOR_PROMPT: &str = include_str!("research_evaluator.md");

/// Instructions for writing the structured recipe
pub const RECIPE_SYNTHESIZER_PROMPT: &str = include_str!("recipe_synthesizer.md");

/// Instructions for grading a recipe against the user profile
pub const RECIPE_EVALUATOR_PROMPT: &str = include_str!("recipe_evaluator.md");

/// Instructions for drafting a week of meal ideas
pub const MEAL_PLANNER_PROMPT: &str = include_str!("meal_planner.md");

/// Research query prompt with the query bound filled in
#[must_use]
pub fn research_queries_prompt(max_queries: usize) -> String {
    RESEARCH_QUERIES_PROMPT.replace("{max_queries}", &max_queries.to_string())
}

/// Prefix used when feeding evaluator feedback back to a producer stage
#[must_use]
pub fn feedback_message(feedback: &str) -> String {
    format!("Take into account this feedback: {feedback}")
}
