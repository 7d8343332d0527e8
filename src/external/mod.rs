// ABOUTME: External collaborator interfaces for web search and article retrieval
// ABOUTME: Defines SearchProvider and ArticleFetcher plus the Jina-backed implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! External API Clients
//!
//! The research stage only talks to the traits defined here. Jina's search
//! (`s.jina.ai`) and reader (`r.jina.ai`) endpoints are the production
//! implementations.

pub mod http_client;
pub mod jina;

pub use jina::{JinaClientConfig, JinaReaderClient, JinaSearchClient};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// One ranked web search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title
    pub title: String,
    /// Page URL
    pub url: String,
    /// Short excerpt
    pub snippet: String,
}

/// Ranked web search
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name for logs and errors
    fn name(&self) -> &'static str;

    /// Search the web, best result first
    ///
    /// Returning fewer than `max_results` hits, including none, is valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the search service cannot be reached or replies
    /// with a failure.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, AppError>;
}

/// Full-text retrieval of a single page
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// Fetcher name for logs and errors
    fn name(&self) -> &'static str;

    /// Fetch the readable text behind `url`
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be retrieved.
    async fn fetch_article(&self, url: &str) -> Result<String, AppError>;
}
