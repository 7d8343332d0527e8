// ABOUTME: Recipe workflow state machine with an explicit transition table and whole-run retries
// ABOUTME: Drives research, evaluation, synthesis, and grading to a Recipe or the placeholder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Workflow Orchestrator
//!
//! ```text
//! Research ──Done──▶ ResearchEvaluate ──Sufficient──▶ Synthesize ──Done──▶ RecipeEvaluate ──Satisfactory──▶ Terminal
//!    ▲                     │                              ▲                      │
//!    └─────Insufficient────┘                              └────Unsatisfactory────┘
//! ```
//!
//! Any stage error abandons the attempt. The next attempt starts again from
//! `Research` with a fresh [`WorkflowState`] after a fixed backoff.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use super::recipe_evaluator::RecipeEvaluator;
use super::research::ResearchStage;
use super::research_evaluator::ResearchEvaluator;
use super::state::WorkflowState;
use super::synthesizer::RecipeSynthesizer;
use crate::config::AgentConfig;
use crate::constants::{search, workflow};
use crate::errors::{AppResult, WorkflowError};
use crate::external::{
    ArticleFetcher, JinaClientConfig, JinaReaderClient, JinaSearchClient, SearchProvider,
};
use crate::llm::{RecipeGrade, ResearchGrade, StructuredOutputCaller};
use crate::logging::AppLogger;
use crate::models::{Recipe, UserProfile};

// ============================================================================
// State machine
// ============================================================================

/// Workflow stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    /// Generate queries and search the web
    Research,
    /// Grade the latest findings
    ResearchEvaluate,
    /// Write a recipe
    Synthesize,
    /// Grade the recipe against the profile
    RecipeEvaluate,
    /// Attach sources and return
    Terminal,
}

impl Stage {
    /// Stable name for logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::ResearchEvaluate => "research_evaluate",
            Self::Synthesize => "synthesize",
            Self::RecipeEvaluate => "recipe_evaluate",
            Self::Terminal => "terminal",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a stage that selects the next edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Route {
    /// Producer stage finished
    Done,
    /// Research grade passed
    Sufficient,
    /// Research grade failed
    Insufficient,
    /// Recipe grade passed
    Satisfactory,
    /// Recipe grade failed
    Unsatisfactory,
}

impl Route {
    /// Stable name for logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Sufficient => "sufficient",
            Self::Insufficient => "insufficient",
            Self::Satisfactory => "satisfactory",
            Self::Unsatisfactory => "unsatisfactory",
        }
    }
}

impl From<ResearchGrade> for Route {
    fn from(grade: ResearchGrade) -> Self {
        match grade {
            ResearchGrade::Sufficient => Self::Sufficient,
            ResearchGrade::Insufficient => Self::Insufficient,
        }
    }
}

impl From<RecipeGrade> for Route {
    fn from(grade: RecipeGrade) -> Self {
        match grade {
            RecipeGrade::Satisfactory => Self::Satisfactory,
            RecipeGrade::Unsatisfactory => Self::Unsatisfactory,
        }
    }
}

/// Every legal edge of the workflow graph
pub const TRANSITIONS: &[(Stage, Route, Stage)] = &[
    (Stage::Research, Route::Done, Stage::ResearchEvaluate),
    (Stage::ResearchEvaluate, Route::Sufficient, Stage::Synthesize),
    (Stage::ResearchEvaluate, Route::Insufficient, Stage::Research),
    (Stage::Synthesize, Route::Done, Stage::RecipeEvaluate),
    (Stage::RecipeEvaluate, Route::Satisfactory, Stage::Terminal),
    (Stage::RecipeEvaluate, Route::Unsatisfactory, Stage::Synthesize),
];

/// Look up the stage that follows `stage` on `route`
#[must_use]
pub fn next_stage(stage: Stage, route: Route) -> Option<Stage> {
    TRANSITIONS
        .iter()
        .find(|(from, on, _)| *from == stage && *on == route)
        .map(|(_, _, to)| *to)
}

// ============================================================================
// Settings
// ============================================================================

/// Control loop and research bounds for one workflow
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// Research evaluator loop cap
    pub research_loop_cap: u32,
    /// Recipe evaluator loop cap
    pub recipe_loop_cap: u32,
    /// Whole-workflow retries after the first attempt
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub retry_backoff: Duration,
    /// Drop duplicate URLs from the final recipe
    pub dedupe_urls: bool,
    /// Queries per research pass
    pub max_queries: usize,
    /// Results requested per query
    pub max_results: usize,
    /// Fetched article truncation
    pub max_article_chars: usize,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            research_loop_cap: workflow::LOOP_CAP,
            recipe_loop_cap: workflow::LOOP_CAP,
            max_retries: workflow::MAX_RETRIES,
            retry_backoff: Duration::from_millis(workflow::RETRY_BACKOFF_MS),
            dedupe_urls: false,
            max_queries: search::MAX_QUERIES,
            max_results: search::MAX_RESULTS,
            max_article_chars: search::MAX_ARTICLE_CHARS,
        }
    }
}

impl WorkflowSettings {
    /// Build from loaded configuration
    #[must_use]
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            research_loop_cap: config.workflow.research_loop_cap,
            recipe_loop_cap: config.workflow.recipe_loop_cap,
            max_retries: config.workflow.max_retries,
            retry_backoff: config.workflow.retry_backoff(),
            dedupe_urls: config.workflow.dedupe_urls,
            max_queries: config.search.max_queries,
            max_results: config.search.max_results,
            max_article_chars: config.search.max_article_chars,
        }
    }

    /// Total attempts including the first
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Stage executions allowed in one attempt
    fn step_limit(&self) -> usize {
        // Each loop visits its producer and evaluator at most cap + 1 times
        let loop_steps = |cap: u32| cap.saturating_add(1).saturating_mul(2);
        let bound = loop_steps(self.research_loop_cap)
            .saturating_add(loop_steps(self.recipe_loop_cap))
            .saturating_add(1);
        usize::try_from(bound)
            .unwrap_or(usize::MAX)
            .max(workflow::MAX_STAGE_STEPS)
    }
}

// ============================================================================
// Trace
// ============================================================================

/// One executed stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageVisit {
    /// Attempt number, starting at 1
    pub attempt: u32,
    /// Stage that ran
    pub stage: Stage,
    /// Edge it selected
    pub route: Route,
    /// Loop counter after the stage
    pub loop_count: u32,
}

/// Ordered record of every stage executed during a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowTrace {
    /// Visits in execution order across all attempts
    pub visits: Vec<StageVisit>,
}

impl WorkflowTrace {
    /// Visits made during `attempt`
    pub fn attempt(&self, attempt: u32) -> impl Iterator<Item = &StageVisit> {
        self.visits.iter().filter(move |visit| visit.attempt == attempt)
    }

    /// Number of visits to `stage` across all attempts
    #[must_use]
    pub fn count(&self, stage: Stage) -> usize {
        self.visits.iter().filter(|visit| visit.stage == stage).count()
    }
}

// ============================================================================
// Workflow
// ============================================================================

/// Recipe generation workflow
///
/// Holds no per-run state, so one instance can serve concurrent runs behind
/// an `Arc`.
#[derive(Debug, Clone)]
pub struct RecipeWorkflow {
    research: ResearchStage,
    research_evaluator: ResearchEvaluator,
    synthesizer: RecipeSynthesizer,
    recipe_evaluator: RecipeEvaluator,
    settings: WorkflowSettings,
}

impl RecipeWorkflow {
    /// Assemble a workflow from its collaborators
    #[must_use]
    pub fn new(
        caller: StructuredOutputCaller,
        search: Arc<dyn SearchProvider>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            research: ResearchStage::new(
                caller.clone(),
                search,
                settings.max_queries,
                settings.max_results,
            ),
            research_evaluator: ResearchEvaluator::new(caller.clone(), settings.research_loop_cap),
            synthesizer: RecipeSynthesizer::new(caller.clone()),
            recipe_evaluator: RecipeEvaluator::new(caller, settings.recipe_loop_cap),
            settings,
        }
    }

    /// Enrich research with the full text of each best result
    #[must_use]
    pub fn with_article_fetcher(mut self, fetcher: Arc<dyn ArticleFetcher>) -> Self {
        self.research = self
            .research
            .with_article_fetcher(fetcher, self.settings.max_article_chars);
        self
    }

    /// Build the production workflow: Gemini for the model, Jina for search
    ///
    /// # Errors
    ///
    /// Returns an error if no Gemini API key is configured.
    pub fn from_config(config: &AgentConfig) -> AppResult<Self> {
        let caller = StructuredOutputCaller::from_config(&config.llm)?;
        let jina = JinaClientConfig::from_search_config(&config.search);
        let search: Arc<dyn SearchProvider> = Arc::new(JinaSearchClient::new(jina.clone()));
        let workflow = Self::new(caller, search, WorkflowSettings::from_config(config));

        if config.search.fetch_articles {
            return Ok(workflow.with_article_fetcher(Arc::new(JinaReaderClient::new(jina))));
        }
        Ok(workflow)
    }

    /// Settings in effect
    #[must_use]
    pub const fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Produce a recipe for `dish`, never failing
    ///
    /// When every attempt fails the placeholder recipe is returned; check
    /// [`Recipe::is_placeholder`] to detect the degraded result.
    pub async fn run(&self, dish: &str, profile: &UserProfile) -> Recipe {
        match self.try_run(dish, profile).await {
            Ok(recipe) => recipe,
            Err(e) => {
                error!(dish = %dish, error = %e, "Recipe workflow exhausted, returning placeholder");
                Recipe::placeholder()
            }
        }
    }

    /// Produce a recipe for `dish`, surfacing the final error
    ///
    /// # Errors
    ///
    /// Returns `ExhaustedRetries` wrapping the last stage error when every
    /// attempt fails.
    pub async fn try_run(&self, dish: &str, profile: &UserProfile) -> Result<Recipe, WorkflowError> {
        let mut trace = WorkflowTrace::default();
        self.execute(dish, profile, &mut trace).await
    }

    /// Like [`Self::try_run`] but also returns every stage visited
    pub async fn run_traced(
        &self,
        dish: &str,
        profile: &UserProfile,
    ) -> (Result<Recipe, WorkflowError>, WorkflowTrace) {
        let mut trace = WorkflowTrace::default();
        let result = self.execute(dish, profile, &mut trace).await;
        (result, trace)
    }

    async fn execute(
        &self,
        dish: &str,
        profile: &UserProfile,
        trace: &mut WorkflowTrace,
    ) -> Result<Recipe, WorkflowError> {
        let run_id = Uuid::new_v4().to_string();
        let max_attempts = self.settings.max_attempts();
        let mut attempt = 1;

        loop {
            let span = info_span!("recipe_workflow", run.id = %run_id, run.attempt = attempt, dish = %dish);
            let outcome = self
                .attempt(&run_id, attempt, dish, profile, trace)
                .instrument(span)
                .await;

            match outcome {
                Ok(recipe) => {
                    info!(run.id = %run_id, attempt, title = %recipe.title, urls = recipe.url.len(), "Recipe workflow complete");
                    return Ok(recipe);
                }
                Err(e) => {
                    AppLogger::log_attempt_failure(
                        &run_id,
                        attempt,
                        max_attempts,
                        e.kind(),
                        &e.to_string(),
                    );
                    if attempt >= max_attempts {
                        return Err(WorkflowError::ExhaustedRetries {
                            attempts: max_attempts,
                            last_error: Box::new(e),
                        });
                    }
                    tokio::time::sleep(self.settings.retry_backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(
        &self,
        run_id: &str,
        attempt: u32,
        dish: &str,
        profile: &UserProfile,
        trace: &mut WorkflowTrace,
    ) -> Result<Recipe, WorkflowError> {
        let mut state = WorkflowState::new(dish, profile);
        let mut stage = Stage::Research;

        for _ in 0..self.settings.step_limit() {
            if stage == Stage::Terminal {
                return self.finish(state);
            }

            let route = self.step(run_id, stage, &mut state).await?;
            trace.visits.push(StageVisit {
                attempt,
                stage,
                route,
                loop_count: state.loop_count,
            });

            let next = next_stage(stage, route).ok_or_else(|| {
                WorkflowError::invariant(format!("no transition from {stage} on {}", route.as_str()))
            })?;
            AppLogger::log_stage_transition(run_id, attempt, stage.as_str(), next.as_str(), route.as_str());
            stage = next;
        }

        Err(WorkflowError::invariant("stage budget exhausted before reaching terminal"))
    }

    async fn step(
        &self,
        run_id: &str,
        stage: Stage,
        state: &mut WorkflowState<'_>,
    ) -> Result<Route, WorkflowError> {
        match stage {
            Stage::Research => {
                let update = self.research.run(state).await?;
                state.apply_research(update);
                Ok(Route::Done)
            }
            Stage::ResearchEvaluate => {
                let update = self.research_evaluator.run(state).await?;
                AppLogger::log_grade(run_id, "research", &update.grade.to_string(), update.loop_count, update.forced);
                let route = Route::from(update.grade);
                state.apply_research_grade(update);
                Ok(route)
            }
            Stage::Synthesize => {
                let update = self.synthesizer.run(state).await?;
                state.apply_synthesis(update);
                Ok(Route::Done)
            }
            Stage::RecipeEvaluate => {
                let update = self.recipe_evaluator.run(state).await?;
                AppLogger::log_grade(run_id, "recipe", &update.grade.to_string(), update.loop_count, update.forced);
                let route = Route::from(update.grade);
                state.apply_recipe_grade(update);
                Ok(route)
            }
            Stage::Terminal => Err(WorkflowError::invariant("terminal stage has no work")),
        }
    }

    fn finish(&self, state: WorkflowState<'_>) -> Result<Recipe, WorkflowError> {
        let mut recipe = state
            .final_recipe
            .ok_or_else(|| WorkflowError::invariant("terminal reached without a recipe"))?;
        recipe.attach_sources(state.urls, self.settings.dedupe_urls);
        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_non_terminal_stage_has_an_exit() {
        for stage in [
            Stage::Research,
            Stage::ResearchEvaluate,
            Stage::Synthesize,
            Stage::RecipeEvaluate,
        ] {
            assert!(
                TRANSITIONS.iter().any(|(from, _, _)| *from == stage),
                "{stage} has no outgoing edge"
            );
        }
        assert!(!TRANSITIONS.iter().any(|(from, _, _)| *from == Stage::Terminal));
    }

    #[test]
    fn test_evaluators_never_route_to_themselves() {
        for (from, _, to) in TRANSITIONS {
            assert_ne!(from, to);
        }
    }

    #[test]
    fn test_unknown_edge_is_none() {
        assert_eq!(next_stage(Stage::Research, Route::Sufficient), None);
        assert_eq!(
            next_stage(Stage::RecipeEvaluate, Route::Unsatisfactory),
            Some(Stage::Synthesize)
        );
    }

    #[test]
    fn test_step_limit_grows_with_caps() {
        let settings = WorkflowSettings {
            research_loop_cap: 100,
            recipe_loop_cap: 100,
            ..WorkflowSettings::default()
        };
        assert!(settings.step_limit() > 400);
        assert_eq!(WorkflowSettings::default().step_limit(), workflow::MAX_STAGE_STEPS);
    }
}
