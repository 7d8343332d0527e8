// ABOUTME: Jina AI search and reader clients used as the production research collaborators
// ABOUTME: Maps s.jina.ai JSON results to SearchResult and fetches page text through r.jina.ai
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Jina AI clients
//!
//! # API Reference
//! - Search: `GET https://s.jina.ai/?q=<query>` with `Accept: application/json`
//! - Reader: `GET https://r.jina.ai/<url>` returning the page as text
//!
//! Both accept an optional `Authorization: Bearer <JINA_API_KEY>` header.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Instant;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::http_client::shared_client;
use super::{ArticleFetcher, SearchProvider, SearchResult};
use crate::config::SearchConfig;
use crate::constants::service_names::{JINA_READER, JINA_SEARCH};
use crate::errors::{AppError, ErrorCode};
use crate::logging::AppLogger;

/// Longest snippet kept when a hit has no description
const MAX_SNIPPET_CHARS: usize = 300;

/// Jina client configuration
#[derive(Clone)]
pub struct JinaClientConfig {
    /// Jina API key; anonymous requests are rate limited harder
    pub api_key: Option<String>,
    /// Search endpoint base URL (default: <https://s.jina.ai>)
    pub search_base_url: String,
    /// Reader endpoint base URL (default: <https://r.jina.ai>)
    pub reader_base_url: String,
}

impl Default for JinaClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            search_base_url: "https://s.jina.ai".to_owned(),
            reader_base_url: "https://r.jina.ai".to_owned(),
        }
    }
}

impl JinaClientConfig {
    /// Build from the loaded search configuration
    #[must_use]
    pub fn from_search_config(config: &SearchConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            ..Self::default()
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

impl Debug for JinaClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("JinaClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("search_base_url", &self.search_base_url)
            .field("reader_base_url", &self.reader_base_url)
            .finish()
    }
}

/// Search API response envelope
#[derive(Debug, Deserialize)]
struct JinaSearchResponse {
    #[serde(default)]
    data: Vec<JinaHit>,
}

/// One search hit
#[derive(Debug, Deserialize)]
struct JinaHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl JinaHit {
    fn into_result(self) -> SearchResult {
        let snippet = match self.description.filter(|d| !d.trim().is_empty()) {
            Some(description) => description,
            None => self
                .content
                .map(|c| c.chars().take(MAX_SNIPPET_CHARS).collect())
                .unwrap_or_default(),
        };
        SearchResult {
            title: self.title,
            url: self.url,
            snippet,
        }
    }
}

/// Convert a search envelope into ranked results, dropping hits without a URL
fn into_results(response: JinaSearchResponse, max_results: usize) -> Vec<SearchResult> {
    response
        .data
        .into_iter()
        .filter(|hit| !hit.url.trim().is_empty())
        .take(max_results)
        .map(JinaHit::into_result)
        .collect()
}

fn status_error(service: &str, status: reqwest::StatusCode, body: &str) -> AppError {
    let code = match status.as_u16() {
        401 | 403 => ErrorCode::ExternalAuthFailed,
        429 => ErrorCode::ExternalRateLimited,
        _ => ErrorCode::ExternalServiceError,
    };
    AppError::new(code, format!("{service}: HTTP {status}: {body}"))
}

// ============================================================================
// Search
// ============================================================================

/// Jina web search client
#[derive(Debug)]
pub struct JinaSearchClient {
    config: JinaClientConfig,
    http_client: Client,
}

impl JinaSearchClient {
    /// Create a new search client
    #[must_use]
    pub fn new(config: JinaClientConfig) -> Self {
        Self {
            config,
            http_client: shared_client().clone(),
        }
    }
}

#[async_trait]
impl SearchProvider for JinaSearchClient {
    fn name(&self) -> &'static str {
        JINA_SEARCH
    }

    #[instrument(skip(self), fields(service = JINA_SEARCH))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::invalid_input("Search query cannot be empty"));
        }
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let url = format!("{}/", self.config.search_base_url.trim_end_matches('/'));
        let request = self
            .http_client
            .get(&url)
            .query(&[("q", query)])
            .header(header::ACCEPT, "application/json");

        let response = self
            .config
            .authorize(request)
            .send()
            .await
            .map_err(|e| AppError::external_unavailable(JINA_SEARCH, e.to_string()))?;

        let status = response.status();
        AppLogger::log_external_call(
            JINA_SEARCH,
            "search",
            status.is_success(),
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(JINA_SEARCH, status, &body));
        }

        let envelope: JinaSearchResponse = response.json().await.map_err(|e| {
            AppError::external_service(JINA_SEARCH, format!("JSON parse error: {e}"))
        })?;

        let results = into_results(envelope, max_results);
        debug!(hits = results.len(), "Search completed");
        Ok(results)
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Jina reader client returning page text
#[derive(Debug)]
pub struct JinaReaderClient {
    config: JinaClientConfig,
    http_client: Client,
}

impl JinaReaderClient {
    /// Create a new reader client
    #[must_use]
    pub fn new(config: JinaClientConfig) -> Self {
        Self {
            config,
            http_client: shared_client().clone(),
        }
    }
}

#[async_trait]
impl ArticleFetcher for JinaReaderClient {
    fn name(&self) -> &'static str {
        JINA_READER
    }

    #[instrument(skip(self), fields(service = JINA_READER))]
    async fn fetch_article(&self, url: &str) -> Result<String, AppError> {
        if url.trim().is_empty() {
            return Err(AppError::invalid_input("Article URL cannot be empty"));
        }

        let started = Instant::now();
        let endpoint = format!("{}/{url}", self.config.reader_base_url.trim_end_matches('/'));
        let response = self
            .config
            .authorize(self.http_client.get(&endpoint))
            .send()
            .await
            .map_err(|e| AppError::external_unavailable(JINA_READER, e.to_string()))?;

        let status = response.status();
        AppLogger::log_external_call(
            JINA_READER,
            "fetch_article",
            status.is_success(),
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );
        let body = response
            .text()
            .await
            .map_err(|e| AppError::external_unavailable(JINA_READER, e.to_string()))?;
        if !status.is_success() {
            return Err(status_error(JINA_READER, status, &body));
        }
        Ok(body)
    }
}
