// ABOUTME: Recipe evaluator grading the synthesized recipe against the user profile
// ABOUTME: Checks allergens, quantities, instruction detail, and nutrition with a loop cap
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tracing::instrument;

use super::state::{GradeUpdate, WorkflowState};
use crate::errors::WorkflowError;
use crate::llm::prompts::RECIPE_EVALUATOR_PROMPT;
use crate::llm::{ChatMessage, RecipeFeedback, RecipeGrade, StructuredOutputCaller};

/// Recipe evaluator
#[derive(Debug, Clone)]
pub struct RecipeEvaluator {
    caller: StructuredOutputCaller,
    cap: u32,
}

impl RecipeEvaluator {
    /// Create an evaluator with the given loop cap
    #[must_use]
    pub const fn new(caller: StructuredOutputCaller, cap: u32) -> Self {
        Self { caller, cap }
    }

    /// Grade the current recipe
    ///
    /// # Errors
    ///
    /// Returns `Invariant` when no recipe has been synthesized yet, otherwise
    /// `Schema` or `Transport` from the model call.
    #[instrument(skip_all, fields(loop_count = state.loop_count, cap = self.cap))]
    pub async fn run(
        &self,
        state: &WorkflowState<'_>,
    ) -> Result<GradeUpdate<RecipeGrade>, WorkflowError> {
        let recipe = state
            .final_recipe
            .as_ref()
            .ok_or_else(|| WorkflowError::invariant("recipe evaluated before synthesis"))?;

        if state.loop_count >= self.cap {
            return Ok(GradeUpdate::forced(RecipeGrade::Satisfactory));
        }

        let recipe_json = serde_json::to_string_pretty(recipe)
            .map_err(|e| WorkflowError::invariant(format!("recipe not serializable: {e}")))?;
        let context = vec![
            ChatMessage::system(RECIPE_EVALUATOR_PROMPT),
            ChatMessage::user(format!(
                "User profile:\n{}\n\nThe current recipe is:\n{recipe_json}",
                state.profile.describe()
            )),
        ];

        let verdict: RecipeFeedback = self.caller.generate(context).await?;
        let passed = verdict.grade == RecipeGrade::Satisfactory;
        Ok(GradeUpdate::graded(
            verdict.grade,
            passed,
            verdict.feedback,
            state.loop_count,
        ))
    }
}
