// ABOUTME: Iterative research, synthesis, and evaluation control loop for recipe generation
// ABOUTME: Exposes the orchestrator, its stages, and the typed state they share
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recipe Workflow
//!
//! Stages never mutate [`WorkflowState`] themselves. Each returns a typed
//! update that the [`RecipeWorkflow`] applies before choosing the next stage
//! from [`TRANSITIONS`].

pub mod orchestrator;
pub mod recipe_evaluator;
pub mod research;
pub mod research_evaluator;
pub mod state;
pub mod synthesizer;

pub use orchestrator::{
    next_stage, RecipeWorkflow, Route, Stage, StageVisit, WorkflowSettings, WorkflowTrace,
    TRANSITIONS,
};
pub use recipe_evaluator::RecipeEvaluator;
pub use research::ResearchStage;
pub use research_evaluator::ResearchEvaluator;
pub use state::{
    GradeUpdate, QueryFindings, ResearchFindings, ResearchUpdate, SynthesisUpdate, WorkflowState,
};
pub use synthesizer::RecipeSynthesizer;
