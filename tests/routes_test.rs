// ABOUTME: HTTP route tests for the recipe agent router
// ABOUTME: Exercises recipe generation, meal planning, health endpoints, and request ID propagation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::Router;
use common::{best_url, caller, happy_script, workflow, ScriptedLlmProvider, StubSearchProvider};
use http::{Request, StatusCode};
use recipe_agent::config::HttpServerConfig;
use recipe_agent::routes::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(llm: &Arc<ScriptedLlmProvider>, search: &Arc<StubSearchProvider>) -> Router {
    let state = AppState::new(caller(llm), workflow(llm, search));
    router(Arc::new(state), &HttpServerConfig::default())
}

fn app_with(
    llm: &Arc<ScriptedLlmProvider>,
    search: &Arc<StubSearchProvider>,
    config: &HttpServerConfig,
) -> Router {
    let state = AppState::new(caller(llm), workflow(llm, search));
    router(Arc::new(state), config)
}

fn post_json(uri: &str, body: &Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn test_root_says_hello() -> Result<()> {
    let llm = Arc::new(ScriptedLlmProvider::new());
    let search = Arc::new(StubSearchProvider::new());

    let request = Request::builder().uri("/").body(Body::empty())?;
    let response = app(&llm, &search).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?, json!({ "message": "Hello" }));
    Ok(())
}

#[tokio::test]
async fn test_generate_recipe() -> Result<()> {
    let llm = Arc::new(happy_script("lava cheesecake"));
    let search = Arc::new(StubSearchProvider::new());

    let request = post_json("/", &json!({ "recipe": "  lava cheesecake  " }))?;
    let response = app(&llm, &search).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    let result = &body["result"];
    assert_eq!(result["title"], "lava cheesecake");
    assert_eq!(result["serving_size"], 4);
    assert_eq!(result["url"], json!([best_url("lava cheesecake recipe")]));

    // The trimmed dish reaches the workflow
    let first = &llm.requests_for("SearchQueries")[0];
    assert!(common::request_mentions(
        first,
        "Give me the recipe for lava cheesecake"
    ));
    Ok(())
}

#[tokio::test]
async fn test_generate_uses_supplied_profile() -> Result<()> {
    let llm = Arc::new(happy_script("falafel"));
    let search = Arc::new(StubSearchProvider::new());

    let request = post_json(
        "/",
        &json!({
            "recipe": "falafel",
            "profile": { "allergies": ["sesame"], "cooking_skill": "advanced" }
        }),
    )?;
    let response = app(&llm, &search).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let synthesis = &llm.requests_for("Recipe")[0];
    assert!(common::request_mentions(synthesis, "- allergies: sesame"));
    assert!(common::request_mentions(synthesis, "- cooking skill: advanced"));
    Ok(())
}

#[tokio::test]
async fn test_generate_returns_placeholder_when_workflow_fails() -> Result<()> {
    let llm = Arc::new(ScriptedLlmProvider::new().fail("SearchQueries", "quota exceeded"));
    let search = Arc::new(StubSearchProvider::new());

    let request = post_json("/", &json!({ "recipe": "lava cheesecake" }))?;
    let response = app(&llm, &search).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["result"]["title"], "dummy");
    assert_eq!(body["result"]["serving_size"], 0);
    assert_eq!(body["result"]["url"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_empty_dish_is_bad_request() -> Result<()> {
    let llm = Arc::new(ScriptedLlmProvider::new());
    let search = Arc::new(StubSearchProvider::new());

    let request = post_json("/", &json!({ "recipe": "   " }))?;
    let response = app(&llm, &search).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert!(llm.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_missing_dish_field_is_rejected() -> Result<()> {
    let llm = Arc::new(ScriptedLlmProvider::new());
    let search = Arc::new(StubSearchProvider::new());

    let request = post_json("/", &json!({ "dish": "soup" }))?;
    let response = app(&llm, &search).oneshot(request).await?;

    assert!(response.status().is_client_error());
    assert!(llm.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_meal_plan_covers_the_week() -> Result<()> {
    let llm = Arc::new(
        happy_script("stir fry").reply("DraftMealPlan", json!({ "meals": ["stir fry", "  "] })),
    );
    let search = Arc::new(StubSearchProvider::new());

    let request = post_json("/meal-plan", &json!({}))?;
    let response = app(&llm, &search).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    let result = body["result"].as_object().unwrap();
    assert_eq!(result.len(), 7);
    assert_eq!(result["Monday"]["title"], "stir fry");
    assert_eq!(result["Tuesday"]["title"], "dummy");
    assert_eq!(result["Sunday"]["title"], "dummy");
    Ok(())
}

#[tokio::test]
async fn test_meal_plan_draft_failure_is_error_response() -> Result<()> {
    let llm = Arc::new(ScriptedLlmProvider::new().fail("DraftMealPlan", "quota exceeded"));
    let search = Arc::new(StubSearchProvider::new());

    let request = post_json("/meal-plan", &json!({}))?;
    let response = app(&llm, &search).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await?;
    assert_eq!(body["error"]["code"], "EXTERNAL_SERVICE_UNAVAILABLE");
    assert_eq!(body["error"]["details"]["workflow_error"], "transport");
    Ok(())
}

#[tokio::test]
async fn test_health_and_ready() -> Result<()> {
    let llm = Arc::new(ScriptedLlmProvider::new());
    let search = Arc::new(StubSearchProvider::new());
    let app = app(&llm, &search);

    let request = Request::builder().uri("/health").body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "recipe-agent");

    let request = Request::builder().uri("/ready").body(Body::empty())?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["status"], "ready");
    Ok(())
}

#[tokio::test]
async fn test_request_id_echoed_or_generated() -> Result<()> {
    let llm = Arc::new(ScriptedLlmProvider::new());
    let search = Arc::new(StubSearchProvider::new());
    let app = app(&llm, &search);

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req_fixed")
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.headers()["x-request-id"], "req_fixed");

    let request = Request::builder().uri("/health").body(Body::empty())?;
    let response = app.oneshot(request).await?;
    let generated = response.headers()["x-request-id"].to_str()?;
    assert!(generated.starts_with("req_"));
    Ok(())
}

#[tokio::test]
async fn test_error_body_carries_request_id() -> Result<()> {
    let llm = Arc::new(ScriptedLlmProvider::new());
    let search = Arc::new(StubSearchProvider::new());
    let app = app(&llm, &search);

    let mut request = post_json("/", &json!({ "recipe": "" }))?;
    request
        .headers_mut()
        .insert("x-request-id", "req_fixed".parse()?);
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await?["error"]["request_id"], "req_fixed");

    let request = post_json("/", &json!({ "recipe": " " }))?;
    let response = app.oneshot(request).await?;
    let generated = response.headers()["x-request-id"].to_str()?.to_owned();
    assert_eq!(body_json(response).await?["error"]["request_id"], generated);
    Ok(())
}

#[tokio::test]
async fn test_meal_plan_error_carries_request_id() -> Result<()> {
    let llm = Arc::new(ScriptedLlmProvider::new().fail("DraftMealPlan", "quota exceeded"));
    let search = Arc::new(StubSearchProvider::new());

    let mut request = post_json("/meal-plan", &json!({}))?;
    request
        .headers_mut()
        .insert("x-request-id", "req_plan".parse()?);
    let response = app(&llm, &search).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await?["error"]["request_id"], "req_plan");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_meal_plan_outlives_the_request_timeout() -> Result<()> {
    let llm = Arc::new(
        happy_script("ramen")
            .reply("DraftMealPlan", json!({ "meals": ["ramen"] }))
            .with_delay(Duration::from_secs(2)),
    );
    let search = Arc::new(StubSearchProvider::new());
    let config = HttpServerConfig {
        request_timeout_secs: 1,
        meal_plan_timeout_secs: 100,
        ..HttpServerConfig::default()
    };
    let app = app_with(&llm, &search, &config);

    let request = post_json("/", &json!({ "recipe": "ramen" }))?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    let request = post_json("/meal-plan", &json!({}))?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["result"]["Monday"]["title"], "ramen");
    Ok(())
}

#[test]
fn test_meal_plan_timeout_defaults_above_request_timeout() {
    let config = HttpServerConfig::default();
    assert_eq!(config.meal_plan_timeout_secs, config.request_timeout_secs * 7);
}
