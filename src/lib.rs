// ABOUTME: Main library entry point for the recipe generation agent
// ABOUTME: Researches dishes on the web, synthesizes structured recipes, and refines them against a profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Recipe Agent
//!
//! Given a dish name and a dietary profile, the agent researches recipes on
//! the web, writes one structured [`models::Recipe`], and refines it until it
//! satisfies the profile.
//!
//! ## Architecture
//!
//! - **Workflow**: the research, evaluation, synthesis, and grading state machine
//! - **LLM**: provider trait, Gemini implementation, structured output records
//! - **External**: search and article fetch traits with Jina implementations
//! - **Routes**: axum HTTP boundary
//! - **Config**: environment-driven settings
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use recipe_agent::config::AgentConfig;
//! use recipe_agent::models::UserProfile;
//! use recipe_agent::workflow::RecipeWorkflow;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AgentConfig::from_env()?;
//!     let workflow = RecipeWorkflow::from_config(&config)?;
//!
//!     let recipe = workflow.run("lava cheesecake", &UserProfile::sample()).await;
//!     if recipe.is_placeholder() {
//!         eprintln!("no recipe could be produced");
//!     }
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Application constants grouped by domain
pub mod constants;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// Web search and article fetch collaborators
pub mod external;

/// Language model providers and structured output
pub mod llm;

/// Structured logging setup and helpers
pub mod logging;

/// Weekly meal planning on top of the recipe workflow
pub mod meal_plan;

/// HTTP middleware
pub mod middleware;

/// HTTP routes
pub mod routes;

/// Recipe workflow state machine
pub mod workflow;

/// Recipe and profile data types
pub use recipe_core::models;
