// ABOUTME: Route module organization for the recipe agent HTTP endpoints
// ABOUTME: Assembles recipe and health routes with CORS, tracing, and timeout layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the recipe agent
//!
//! Handlers are thin: they parse the request, call the workflow or the meal
//! planner held in [`AppState`], and serialize the result.

/// Health check and readiness routes
pub mod health;
/// Recipe generation and meal planning routes
pub mod recipes;

/// Health check route handlers
pub use health::HealthRoutes;
/// Recipe route handlers
pub use recipes::RecipeRoutes;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware::from_fn, Router};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{AgentConfig, HttpServerConfig};
use crate::errors::AppResult;
use crate::llm::StructuredOutputCaller;
use crate::meal_plan::MealPlanner;
use crate::middleware::{setup_cors, with_request_tracing};
use crate::workflow::RecipeWorkflow;

/// Shared, read-only state handed to every handler
///
/// Each request builds its own workflow state, so handlers never contend on
/// anything in here.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Recipe workflow
    pub workflow: Arc<RecipeWorkflow>,
    /// Weekly meal planner backed by the same workflow
    pub planner: Arc<MealPlanner>,
}

impl AppState {
    /// Build state from a caller and a workflow
    #[must_use]
    pub fn new(caller: StructuredOutputCaller, workflow: RecipeWorkflow) -> Self {
        let workflow = Arc::new(workflow);
        let planner = Arc::new(MealPlanner::new(caller, Arc::clone(&workflow)));
        Self { workflow, planner }
    }

    /// Build the production state from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no Gemini API key is configured.
    pub fn from_config(config: &AgentConfig) -> AppResult<Self> {
        let caller = StructuredOutputCaller::from_config(&config.llm)?;
        let workflow = RecipeWorkflow::from_config(config)?;
        Ok(Self::new(caller, workflow))
    }
}

/// Full application router
///
/// `POST /meal-plan` runs a workflow per day, so it gets
/// `meal_plan_timeout_secs` instead of the per-request timeout.
pub fn router(state: Arc<AppState>, config: &HttpServerConfig) -> Router {
    let request_timeout = Duration::from_secs(config.request_timeout_secs);
    let meal_plan_timeout = Duration::from_secs(config.meal_plan_timeout_secs);

    let recipes = RecipeRoutes::routes(Arc::clone(&state));
    let meal_plan = RecipeRoutes::meal_plan_routes(state);

    Router::new()
        .merge(recipes.layer(TimeoutLayer::new(request_timeout)))
        .merge(HealthRoutes::routes().layer(TimeoutLayer::new(request_timeout)))
        .merge(meal_plan.layer(TimeoutLayer::new(meal_plan_timeout)))
        .layer(from_fn(with_request_tracing))
        .layer(TraceLayer::new_for_http())
        .layer(setup_cors(config))
}
