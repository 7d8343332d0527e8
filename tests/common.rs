// ABOUTME: Shared test utilities and scripted collaborators for integration tests
// ABOUTME: Provides a scripted LLM provider, stub search and fetch providers, and workflow builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `recipe_agent`
//!
//! Every collaborator here is deterministic: the same script always yields
//! the same replies in the same order.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use recipe_agent::errors::AppError;
use recipe_agent::external::{ArticleFetcher, SearchProvider, SearchResult};
use recipe_agent::llm::{ChatRequest, ChatResponse, LlmProvider, StructuredOutputCaller};
use recipe_agent::workflow::{RecipeWorkflow, WorkflowSettings};
use serde_json::json;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

// ============================================================================
// Scripted LLM
// ============================================================================

/// One scripted model reply
#[derive(Debug, Clone)]
pub enum Reply {
    /// Raw reply text
    Json(String),
    /// Provider failure
    Fail(String),
}

/// LLM provider replying from per-record scripts
///
/// Replies are keyed by the requested record name (`SearchQueries`,
/// `ResearchFeedback`, `Recipe`, `RecipeFeedback`, `DraftMealPlan`). Each
/// script is consumed in order and its last reply repeats forever.
#[derive(Default)]
pub struct ScriptedLlmProvider {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<ChatRequest>>,
    delay: Duration,
}

impl ScriptedLlmProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply for `record`
    pub fn reply(self, record: &str, value: serde_json::Value) -> Self {
        self.push(record, Reply::Json(value.to_string()))
    }

    /// Queue a raw text reply for `record`
    pub fn reply_raw(self, record: &str, raw: &str) -> Self {
        self.push(record, Reply::Json(raw.to_owned()))
    }

    /// Sleep this long before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue a provider failure for `record`
    pub fn fail(self, record: &str, message: &str) -> Self {
        self.push(record, Reply::Fail(message.to_owned()))
    }

    fn push(self, record: &str, reply: Reply) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(record.to_owned())
            .or_default()
            .push_back(reply);
        self
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests for one record, in order
    pub fn requests_for(&self, record: &str) -> Vec<ChatRequest> {
        self.requests()
            .into_iter()
            .filter(|request| record_name(request) == record)
            .collect()
    }

    /// Number of requests for one record
    pub fn calls(&self, record: &str) -> usize {
        self.requests_for(record).len()
    }
}

fn record_name(request: &ChatRequest) -> &str {
    request
        .response_format
        .as_ref()
        .map_or("", |format| format.name.as_str())
}

#[async_trait]
impl LlmProvider for ScriptedLlmProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let record = record_name(request).to_owned();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let reply = {
            let mut scripts = self.scripts.lock().unwrap();
            let queue = scripts.get_mut(&record);
            match queue {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Json(content)) => Ok(ChatResponse {
                content,
                model: "scripted-model".to_owned(),
                usage: None,
                finish_reason: Some("STOP".to_owned()),
            }),
            Some(Reply::Fail(message)) => Err(AppError::external_unavailable("scripted", message)),
            None => Err(AppError::internal(format!("no scripted reply for {record}"))),
        }
    }
}

/// Whether any message of `request` contains `needle`
pub fn request_mentions(request: &ChatRequest, needle: &str) -> bool {
    request
        .messages
        .iter()
        .any(|message| message.content.contains(needle))
}

// ============================================================================
// Stub search and fetch
// ============================================================================

/// Search provider returning two ranked hits per query
///
/// The best hit for query `q` is `https://recipes.example/<slug(q)>`.
#[derive(Default)]
pub struct StubSearchProvider {
    empty_queries: HashSet<String>,
    always_empty: bool,
    failing: bool,
    queries: Mutex<Vec<String>>,
}

impl StubSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns nothing for every query
    pub fn empty() -> Self {
        Self {
            always_empty: true,
            ..Self::default()
        }
    }

    /// Fails every call with a transport error
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Return nothing for `query`
    pub fn with_empty_query(mut self, query: &str) -> Self {
        self.empty_queries.insert(query.to_owned());
        self
    }

    /// Queries received, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

/// URL of the best stub hit for `query`
pub fn best_url(query: &str) -> String {
    format!("https://recipes.example/{}", slug(query))
}

fn slug(query: &str) -> String {
    query.to_lowercase().replace(' ', "-")
}

#[async_trait]
impl SearchProvider for StubSearchProvider {
    fn name(&self) -> &'static str {
        "stub-search"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, AppError> {
        self.queries.lock().unwrap().push(query.to_owned());
        if self.failing {
            return Err(AppError::external_unavailable("stub-search", "connection reset"));
        }
        if self.always_empty || self.empty_queries.contains(query) {
            return Ok(Vec::new());
        }
        let hits = vec![
            SearchResult {
                title: format!("Best {query}"),
                url: best_url(query),
                snippet: format!("200 g of everything for {query}"),
            },
            SearchResult {
                title: format!("Another {query}"),
                url: format!("https://other.example/{}", slug(query)),
                snippet: "a less useful page".to_owned(),
            },
        ];
        Ok(hits.into_iter().take(max_results).collect())
    }
}

/// Article fetcher returning a fixed body, or failing
pub struct StubArticleFetcher {
    body: Option<String>,
    urls: Mutex<Vec<String>>,
}

impl StubArticleFetcher {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            body: None,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleFetcher for StubArticleFetcher {
    fn name(&self) -> &'static str {
        "stub-reader"
    }

    async fn fetch_article(&self, url: &str) -> Result<String, AppError> {
        self.urls.lock().unwrap().push(url.to_owned());
        self.body
            .clone()
            .ok_or_else(|| AppError::external_unavailable("stub-reader", "timed out"))
    }
}

// ============================================================================
// Records and builders
// ============================================================================

pub fn queries(list: &[&str]) -> serde_json::Value {
    json!({ "queries": list })
}

pub fn research_grade(grade: &str, feedback: &str) -> serde_json::Value {
    json!({ "grade": grade, "feedback": feedback })
}

pub fn recipe_grade(grade: &str, feedback: &str) -> serde_json::Value {
    json!({ "grade": grade, "feedback": feedback })
}

pub fn recipe(title: &str, ingredients: &str) -> serde_json::Value {
    json!({
        "title": title,
        "serving_size": 4,
        "prep_time": 15,
        "cook_time": 20,
        "ingredients": ingredients,
        "instructions": "1. Preheat the oven to 200C.\n2. Mix everything.\n3. Bake for 20 minutes.",
        "url": []
    })
}

/// Settings with the production caps and no retry delay
pub fn fast_settings() -> WorkflowSettings {
    WorkflowSettings {
        retry_backoff: Duration::ZERO,
        ..WorkflowSettings::default()
    }
}

pub fn caller(llm: &Arc<ScriptedLlmProvider>) -> StructuredOutputCaller {
    StructuredOutputCaller::new(Arc::clone(llm) as Arc<dyn LlmProvider>)
}

pub fn workflow(llm: &Arc<ScriptedLlmProvider>, search: &Arc<StubSearchProvider>) -> RecipeWorkflow {
    workflow_with(llm, search, fast_settings())
}

pub fn workflow_with(
    llm: &Arc<ScriptedLlmProvider>,
    search: &Arc<StubSearchProvider>,
    settings: WorkflowSettings,
) -> RecipeWorkflow {
    init_test_logging();
    RecipeWorkflow::new(
        caller(llm),
        Arc::clone(search) as Arc<dyn SearchProvider>,
        settings,
    )
}

/// A script where every stage passes on the first try
pub fn happy_script(dish: &str) -> ScriptedLlmProvider {
    ScriptedLlmProvider::new()
        .reply("SearchQueries", queries(&[&format!("{dish} recipe")]))
        .reply("ResearchFeedback", research_grade("Sufficient", ""))
        .reply("Recipe", recipe(dish, "200 g cream cheese\n100 g sugar\n2 eggs"))
        .reply("RecipeFeedback", recipe_grade("satisfactory", ""))
}
