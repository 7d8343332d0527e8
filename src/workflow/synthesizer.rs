// ABOUTME: Recipe synthesizer producing one structured Recipe from the research conversation
// ABOUTME: Each call fully replaces the previous recipe; source URLs are attached later
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tracing::{info, instrument};

use super::state::{SynthesisUpdate, WorkflowState};
use crate::errors::WorkflowError;
use crate::llm::prompts::{feedback_message, RECIPE_SYNTHESIZER_PROMPT};
use crate::llm::{ChatMessage, StructuredOutputCaller};
use crate::models::Recipe;

/// Recipe synthesizer
#[derive(Debug, Clone)]
pub struct RecipeSynthesizer {
    caller: StructuredOutputCaller,
}

impl RecipeSynthesizer {
    /// Create a synthesizer
    #[must_use]
    pub const fn new(caller: StructuredOutputCaller) -> Self {
        Self { caller }
    }

    /// Write a recipe from the full conversation
    ///
    /// # Errors
    ///
    /// Returns `Schema` when the reply is not a valid recipe and `Transport`
    /// when the model call fails.
    #[instrument(skip_all)]
    pub async fn run(&self, state: &WorkflowState<'_>) -> Result<SynthesisUpdate, WorkflowError> {
        let mut context = state.messages.clone();
        context.push(ChatMessage::system(RECIPE_SYNTHESIZER_PROMPT));
        context.push(ChatMessage::user(format!(
            "The recipe is for a user with this profile:\n{}",
            state.profile.describe()
        )));
        if let Some(feedback) = state.recipe_feedback() {
            context.push(ChatMessage::user(feedback_message(feedback)));
        }

        let recipe: Recipe = self.caller.generate(context).await?;
        info!(title = %recipe.title, serving_size = recipe.serving_size, "Recipe synthesized");
        Ok(SynthesisUpdate { recipe })
    }
}
