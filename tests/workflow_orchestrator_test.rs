// ABOUTME: Integration tests for the recipe workflow state machine
// ABOUTME: Covers loop caps, feedback routing, URL accumulation, retries, and the placeholder fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    best_url, fast_settings, happy_script, queries, recipe, recipe_grade, request_mentions,
    research_grade, workflow, workflow_with, ScriptedLlmProvider, StubSearchProvider,
};
use recipe_agent::errors::WorkflowError;
use recipe_agent::models::UserProfile;
use recipe_agent::workflow::{Stage, WorkflowSettings, WorkflowTrace};

fn stages(trace: &WorkflowTrace, attempt: u32) -> Vec<Stage> {
    trace.attempt(attempt).map(|visit| visit.stage).collect()
}

/// Always-failing grades at both evaluators
fn stubborn_script() -> ScriptedLlmProvider {
    ScriptedLlmProvider::new()
        .reply("SearchQueries", queries(&["cheesecake"]))
        .reply("ResearchFeedback", research_grade("Insufficient", "find oven temperatures"))
        .reply("Recipe", recipe("Cheesecake", "500 g cream cheese"))
        .reply("RecipeFeedback", recipe_grade("unsatisfactory", "more detail"))
}

#[tokio::test]
async fn test_happy_path_visits_each_stage_once() {
    let llm = Arc::new(happy_script("lava cheesecake"));
    let search = Arc::new(StubSearchProvider::new());
    let workflow = workflow(&llm, &search);

    let (result, trace) = workflow
        .run_traced("lava cheesecake", &UserProfile::sample())
        .await;
    let recipe = result.unwrap();

    assert_eq!(recipe.title, "lava cheesecake");
    assert_eq!(recipe.url, vec![best_url("lava cheesecake recipe")]);
    assert_eq!(
        stages(&trace, 1),
        vec![
            Stage::Research,
            Stage::ResearchEvaluate,
            Stage::Synthesize,
            Stage::RecipeEvaluate
        ]
    );
    assert_eq!(search.queries(), vec!["lava cheesecake recipe"]);

    let first = &llm.requests_for("SearchQueries")[0];
    assert!(request_mentions(first, "Give me the recipe for lava cheesecake"));
}

#[tokio::test]
async fn test_allergen_in_recipe_loops_back_with_feedback() {
    let llm = Arc::new(
        ScriptedLlmProvider::new()
            .reply("SearchQueries", queries(&["lava cheesecake"]))
            .reply("ResearchFeedback", research_grade("Sufficient", ""))
            .reply(
                "Recipe",
                recipe("Lava cheesecake", "200 g cream cheese\n50 g crushed nuts"),
            )
            .reply(
                "Recipe",
                recipe("Lava cheesecake", "200 g cream cheese\n50 g biscuit crumbs"),
            )
            .reply(
                "RecipeFeedback",
                recipe_grade(
                    "unsatisfactory",
                    "Remove the nuts: the user is allergic to nuts.",
                ),
            )
            .reply("RecipeFeedback", recipe_grade("satisfactory", "")),
    );
    let search = Arc::new(StubSearchProvider::new());
    let workflow = workflow(&llm, &search);

    let (result, trace) = workflow
        .run_traced("lava cheesecake", &UserProfile::sample())
        .await;
    let recipe = result.unwrap();

    assert!(!recipe.ingredients.contains("nuts"));
    assert_eq!(trace.count(Stage::Synthesize), 2);
    assert_eq!(trace.count(Stage::RecipeEvaluate), 2);

    let grading = llm.requests_for("RecipeFeedback");
    assert!(request_mentions(&grading[0], "allergies: nuts"));
    assert!(request_mentions(&grading[0], "crushed nuts"));

    let synthesis = llm.requests_for("Recipe");
    assert!(!request_mentions(&synthesis[0], "Take into account this feedback"));
    assert!(request_mentions(
        &synthesis[1],
        "Take into account this feedback: Remove the nuts"
    ));
}

#[tokio::test]
async fn test_zero_results_three_passes_forces_sufficient() {
    let llm = Arc::new(
        ScriptedLlmProvider::new()
            .reply("SearchQueries", queries(&["lava cheesecake"]))
            .reply("ResearchFeedback", research_grade("Insufficient", "search harder"))
            .reply("Recipe", recipe("Lava cheesecake", "200 g cream cheese"))
            .reply("RecipeFeedback", recipe_grade("satisfactory", "")),
    );
    let search = Arc::new(StubSearchProvider::empty());
    let workflow = workflow(&llm, &search);

    let (result, trace) = workflow
        .run_traced("lava cheesecake", &UserProfile::sample())
        .await;
    let recipe = result.unwrap();

    assert_eq!(
        stages(&trace, 1),
        vec![
            Stage::Research,
            Stage::ResearchEvaluate,
            Stage::Research,
            Stage::ResearchEvaluate,
            Stage::Research,
            Stage::ResearchEvaluate,
            Stage::Synthesize,
            Stage::RecipeEvaluate
        ]
    );
    let research_counts: Vec<u32> = trace
        .visits
        .iter()
        .filter(|visit| visit.stage == Stage::ResearchEvaluate)
        .map(|visit| visit.loop_count)
        .collect();
    assert_eq!(research_counts, vec![1, 2, 0]);

    // The third evaluation is forced without asking the model
    assert_eq!(llm.calls("ResearchFeedback"), 2);
    assert_eq!(search.queries().len(), 3);
    assert!(recipe.url.is_empty());
    assert!(!recipe.is_placeholder());
}

#[tokio::test]
async fn test_research_feedback_reaches_next_research_pass() {
    let llm = Arc::new(
        ScriptedLlmProvider::new()
            .reply("SearchQueries", queries(&["cheesecake"]))
            .reply("ResearchFeedback", research_grade("Insufficient", "look for ramekin sizes"))
            .reply("ResearchFeedback", research_grade("Sufficient", ""))
            .reply("Recipe", recipe("Cheesecake", "500 g cream cheese"))
            .reply("RecipeFeedback", recipe_grade("satisfactory", "")),
    );
    let search = Arc::new(StubSearchProvider::new());
    let workflow = workflow(&llm, &search);

    workflow.try_run("cheesecake", &UserProfile::sample()).await.unwrap();

    let research = llm.requests_for("SearchQueries");
    assert_eq!(research.len(), 2);
    assert!(!request_mentions(&research[0], "ramekin"));
    assert!(request_mentions(
        &research[1],
        "Take into account this feedback: look for ramekin sizes"
    ));
}

#[tokio::test]
async fn test_persistent_transport_error_returns_placeholder() {
    let llm = Arc::new(ScriptedLlmProvider::new().fail("SearchQueries", "503 Service Unavailable"));
    let search = Arc::new(StubSearchProvider::new());
    let workflow = workflow(&llm, &search);

    let recipe = workflow.run("lava cheesecake", &UserProfile::sample()).await;

    assert!(recipe.is_placeholder());
    assert_eq!(recipe.title, "dummy");
    assert_eq!(recipe.serving_size, 0);
    assert_eq!(recipe.prep_time, 0);
    assert_eq!(recipe.cook_time, 0);
    assert!(recipe.ingredients.is_empty());
    assert!(recipe.instructions.is_empty());
    assert!(recipe.url.is_empty());

    // One initial attempt plus two retries
    assert_eq!(llm.calls("SearchQueries"), 3);
}

#[tokio::test]
async fn test_search_outage_exhausts_retries_with_transport_error() {
    let llm = Arc::new(happy_script("soup"));
    let search = Arc::new(StubSearchProvider::failing());
    let workflow = workflow(&llm, &search);

    let err = workflow
        .try_run("soup", &UserProfile::sample())
        .await
        .unwrap_err();

    match err {
        WorkflowError::ExhaustedRetries {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last_error, WorkflowError::Transport { .. }));
        }
        other => panic!("expected ExhaustedRetries, got {other:?}"),
    }
    assert_eq!(search.queries().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_sleeps_between_attempts_only() {
    let llm = Arc::new(ScriptedLlmProvider::new().fail("SearchQueries", "503 Service Unavailable"));
    let search = Arc::new(StubSearchProvider::new());
    let backoff = Duration::from_millis(500);
    let workflow = workflow_with(
        &llm,
        &search,
        WorkflowSettings {
            retry_backoff: backoff,
            ..WorkflowSettings::default()
        },
    );

    let started = tokio::time::Instant::now();
    let err = workflow
        .try_run("soup", &UserProfile::sample())
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, WorkflowError::ExhaustedRetries { attempts: 3, .. }));
    assert_eq!(llm.calls("SearchQueries"), 3);
    // Three failed attempts sleep twice; no sleep after the last one
    assert!(elapsed >= backoff * 2, "elapsed {elapsed:?}");
    assert!(elapsed < backoff * 2 + Duration::from_millis(10), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn test_negative_serving_size_is_schema_error_and_retried() {
    let llm = Arc::new(
        ScriptedLlmProvider::new()
            .reply("SearchQueries", queries(&["cheesecake"]))
            .reply("ResearchFeedback", research_grade("Sufficient", ""))
            .reply_raw(
                "Recipe",
                r#"{"title":"Cheesecake","serving_size":-4,"prep_time":10,"cook_time":50,
                    "ingredients":"500 g cream cheese","instructions":"1. Bake.","url":[]}"#,
            )
            .reply("Recipe", recipe("Cheesecake", "500 g cream cheese"))
            .reply("RecipeFeedback", recipe_grade("satisfactory", "")),
    );
    let search = Arc::new(StubSearchProvider::new());
    let workflow = workflow(&llm, &search);

    let (result, trace) = workflow.run_traced("cheesecake", &UserProfile::sample()).await;
    let recipe = result.unwrap();

    assert_eq!(recipe.serving_size, 4);
    assert_eq!(
        stages(&trace, 1),
        vec![Stage::Research, Stage::ResearchEvaluate]
    );
    assert_eq!(stages(&trace, 2).len(), 4);
    // The whole workflow restarted from research
    assert_eq!(llm.calls("SearchQueries"), 2);
}

#[tokio::test]
async fn test_missing_cook_time_without_retries_surfaces_schema_error() {
    let llm = Arc::new(
        ScriptedLlmProvider::new()
            .reply("SearchQueries", queries(&["cheesecake"]))
            .reply("ResearchFeedback", research_grade("Sufficient", ""))
            .reply_raw(
                "Recipe",
                r#"{"title":"Cheesecake","serving_size":4,"prep_time":10,
                    "ingredients":"500 g cream cheese","instructions":"1. Bake.","url":[]}"#,
            ),
    );
    let search = Arc::new(StubSearchProvider::new());
    let settings = WorkflowSettings {
        max_retries: 0,
        ..fast_settings()
    };
    let workflow = workflow_with(&llm, &search, settings);

    let err = workflow
        .try_run("cheesecake", &UserProfile::sample())
        .await
        .unwrap_err();
    let WorkflowError::ExhaustedRetries {
        attempts,
        last_error,
    } = err
    else {
        panic!("expected ExhaustedRetries");
    };
    assert_eq!(attempts, 1);
    assert!(matches!(
        *last_error,
        WorkflowError::Schema {
            record: "Recipe",
            ..
        }
    ));
}

#[tokio::test]
async fn test_final_urls_are_superset_of_every_pass() {
    let llm = Arc::new(
        ScriptedLlmProvider::new()
            .reply("SearchQueries", queries(&["cheesecake basics"]))
            .reply("SearchQueries", queries(&["baked cheesecake", "cheesecake basics"]))
            .reply("ResearchFeedback", research_grade("Insufficient", "need baking times"))
            .reply("ResearchFeedback", research_grade("Sufficient", ""))
            .reply("Recipe", recipe("Cheesecake", "500 g cream cheese"))
            .reply("RecipeFeedback", recipe_grade("satisfactory", "")),
    );
    let search = Arc::new(StubSearchProvider::new());
    let workflow = workflow(&llm, &search);

    let recipe = workflow
        .try_run("cheesecake", &UserProfile::sample())
        .await
        .unwrap();

    // Newest pass first, duplicates kept
    assert_eq!(
        recipe.url,
        vec![
            best_url("baked cheesecake"),
            best_url("cheesecake basics"),
            best_url("cheesecake basics"),
        ]
    );
    assert_eq!(recipe.unique_urls().len(), 2);
}

#[tokio::test]
async fn test_dedupe_setting_drops_duplicate_urls() {
    let llm = Arc::new(
        ScriptedLlmProvider::new()
            .reply("SearchQueries", queries(&["cheesecake basics"]))
            .reply("ResearchFeedback", research_grade("Insufficient", "again"))
            .reply("ResearchFeedback", research_grade("Sufficient", ""))
            .reply("Recipe", recipe("Cheesecake", "500 g cream cheese"))
            .reply("RecipeFeedback", recipe_grade("satisfactory", "")),
    );
    let search = Arc::new(StubSearchProvider::new());
    let settings = WorkflowSettings {
        dedupe_urls: true,
        ..fast_settings()
    };
    let workflow = workflow_with(&llm, &search, settings);

    let recipe = workflow
        .try_run("cheesecake", &UserProfile::sample())
        .await
        .unwrap();

    assert_eq!(recipe.url, vec![best_url("cheesecake basics")]);
}

#[tokio::test]
async fn test_loop_count_bounded_and_evaluators_never_repeat() {
    let llm = Arc::new(stubborn_script());
    let search = Arc::new(StubSearchProvider::new());
    let settings = fast_settings();
    let cap = settings.research_loop_cap.max(settings.recipe_loop_cap);
    let workflow = workflow_with(&llm, &search, settings);

    let (result, trace) = workflow.run_traced("cheesecake", &UserProfile::sample()).await;
    assert!(result.is_ok());

    for visit in &trace.visits {
        assert!(visit.loop_count <= cap + 1, "loop_count {} over cap", visit.loop_count);
    }
    for pair in trace.visits.windows(2) {
        if pair[0].attempt == pair[1].attempt {
            assert_ne!(pair[0].stage, pair[1].stage);
        }
    }

    // Each evaluator asks the model cap times, then acceptance is forced
    assert_eq!(llm.calls("ResearchFeedback"), 2);
    assert_eq!(llm.calls("RecipeFeedback"), 2);
    assert_eq!(llm.calls("Recipe"), 3);
    assert_eq!(trace.count(Stage::Research), 3);
}

#[tokio::test]
async fn test_zero_cap_forces_acceptance_immediately() {
    let llm = Arc::new(stubborn_script());
    let search = Arc::new(StubSearchProvider::new());
    let settings = WorkflowSettings {
        research_loop_cap: 0,
        recipe_loop_cap: 0,
        ..fast_settings()
    };
    let workflow = workflow_with(&llm, &search, settings);

    let recipe = workflow.run("cheesecake", &UserProfile::sample()).await;

    assert!(!recipe.is_placeholder());
    assert_eq!(llm.calls("ResearchFeedback"), 0);
    assert_eq!(llm.calls("RecipeFeedback"), 0);
}

#[tokio::test]
async fn test_identical_inputs_yield_identical_recipes() {
    let llm = Arc::new(happy_script("shakshuka"));
    let search = Arc::new(StubSearchProvider::new());
    let workflow = workflow(&llm, &search);
    let profile = UserProfile::sample();

    let first = workflow.run("shakshuka", &profile).await;
    let second = workflow.run("shakshuka", &profile).await;

    assert_eq!(first, second);
    assert!(!first.is_placeholder());
}

#[tokio::test]
async fn test_concurrent_runs_do_not_share_state() {
    let llm = Arc::new(happy_script("ramen"));
    let search = Arc::new(StubSearchProvider::new());
    let workflow = Arc::new(workflow(&llm, &search));
    let profile = UserProfile::sample();

    let (a, b) = tokio::join!(
        workflow.run("ramen", &profile),
        workflow.run("ramen", &profile)
    );

    assert_eq!(a, b);
    assert_eq!(a.url.len(), 1);
}
