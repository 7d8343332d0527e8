// ABOUTME: Research evaluator grading the latest findings as Sufficient or Insufficient
// ABOUTME: Forces Sufficient once the loop cap is reached so research always terminates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tracing::instrument;

use super::state::{GradeUpdate, WorkflowState};
use crate::errors::WorkflowError;
use crate::llm::prompts::RESEARCH_EVALUATOR_PROMPT;
use crate::llm::{ChatMessage, ResearchFeedback, ResearchGrade, StructuredOutputCaller};

/// Research evaluator
#[derive(Debug, Clone)]
pub struct ResearchEvaluator {
    caller: StructuredOutputCaller,
    cap: u32,
}

impl ResearchEvaluator {
    /// Create an evaluator with the given loop cap
    #[must_use]
    pub const fn new(caller: StructuredOutputCaller, cap: u32) -> Self {
        Self { caller, cap }
    }

    /// Grade the latest research pass
    ///
    /// Only the request and the latest findings are shown to the model.
    ///
    /// # Errors
    ///
    /// Returns `Schema` or `Transport` from the model call.
    #[instrument(skip_all, fields(loop_count = state.loop_count, cap = self.cap))]
    pub async fn run(
        &self,
        state: &WorkflowState<'_>,
    ) -> Result<GradeUpdate<ResearchGrade>, WorkflowError> {
        if state.loop_count >= self.cap {
            return Ok(GradeUpdate::forced(ResearchGrade::Sufficient));
        }

        let request = state
            .messages
            .first()
            .map_or("", |message| message.content.as_str());
        let context = vec![
            ChatMessage::system(RESEARCH_EVALUATOR_PROMPT),
            ChatMessage::user(format!(
                "Request: {request}\n\nLatest research:\n\n{}",
                state.search_results.render()
            )),
        ];

        let verdict: ResearchFeedback = self.caller.generate(context).await?;
        let passed = verdict.grade == ResearchGrade::Sufficient;
        Ok(GradeUpdate::graded(
            verdict.grade,
            passed,
            verdict.feedback,
            state.loop_count,
        ))
    }
}
