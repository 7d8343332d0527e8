// ABOUTME: Research stage turning conversation and feedback into web searches
// ABOUTME: Keeps the best hit per query, optionally fetches its article, and reports new URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::state::{QueryFindings, ResearchFindings, ResearchUpdate, WorkflowState};
use crate::errors::WorkflowError;
use crate::external::{ArticleFetcher, SearchProvider};
use crate::llm::prompts::{feedback_message, research_queries_prompt};
use crate::llm::{ChatMessage, SearchQueries, StructuredOutputCaller};

/// Research stage
#[derive(Clone)]
pub struct ResearchStage {
    caller: StructuredOutputCaller,
    search: Arc<dyn SearchProvider>,
    fetcher: Option<Arc<dyn ArticleFetcher>>,
    max_queries: usize,
    max_results: usize,
    max_article_chars: usize,
}

impl ResearchStage {
    /// Create a research stage without article enrichment
    #[must_use]
    pub fn new(
        caller: StructuredOutputCaller,
        search: Arc<dyn SearchProvider>,
        max_queries: usize,
        max_results: usize,
    ) -> Self {
        Self {
            caller,
            search,
            fetcher: None,
            max_queries,
            max_results,
            max_article_chars: crate::constants::search::MAX_ARTICLE_CHARS,
        }
    }

    /// Fetch the full text of each best result, truncated to `max_chars`
    #[must_use]
    pub fn with_article_fetcher(mut self, fetcher: Arc<dyn ArticleFetcher>, max_chars: usize) -> Self {
        self.fetcher = Some(fetcher);
        self.max_article_chars = max_chars;
        self
    }

    /// Run one research pass
    ///
    /// # Errors
    ///
    /// Returns `Schema` when the query list is malformed and `Transport` when
    /// the model, search, or fetch call fails.
    #[instrument(skip_all, fields(search = self.search.name()))]
    pub async fn run(&self, state: &WorkflowState<'_>) -> Result<ResearchUpdate, WorkflowError> {
        let mut context = state.messages.clone();
        context.push(ChatMessage::system(research_queries_prompt(self.max_queries)));
        if let Some(feedback) = state.research_feedback() {
            context.push(ChatMessage::user(feedback_message(feedback)));
        }

        let planned: SearchQueries = self.caller.generate(context).await?;
        let queries: Vec<String> = planned
            .queries
            .into_iter()
            .map(|q| q.trim().to_owned())
            .filter(|q| !q.is_empty())
            .take(self.max_queries)
            .collect();
        debug!(count = queries.len(), "Planned search queries");

        let mut entries = Vec::with_capacity(queries.len());
        for query in queries {
            let hits = self
                .search
                .search(&query, self.max_results)
                .await
                .map_err(|e| WorkflowError::transport(self.search.name(), e.to_string()))?;

            let Some(best) = hits.into_iter().next() else {
                debug!(query = %query, "Query returned no results");
                continue;
            };
            let article = self.fetch(&best.url).await?;
            entries.push(QueryFindings {
                query,
                best,
                article,
            });
        }

        let findings = ResearchFindings::new(entries);
        let new_urls: Vec<String> = findings.urls().map(str::to_owned).collect();
        info!(hits = findings.len(), new_urls = new_urls.len(), "Research pass complete");

        let message = ChatMessage::assistant(format!("Research findings:\n\n{}", findings.render()));
        Ok(ResearchUpdate {
            findings,
            new_urls,
            message,
        })
    }

    async fn fetch(&self, url: &str) -> Result<Option<String>, WorkflowError> {
        let Some(fetcher) = &self.fetcher else {
            return Ok(None);
        };
        let text = fetcher
            .fetch_article(url)
            .await
            .map_err(|e| WorkflowError::transport(fetcher.name(), e.to_string()))?;
        Ok(Some(text.chars().take(self.max_article_chars).collect()))
    }
}

impl Debug for ResearchStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResearchStage")
            .field("search", &self.search.name())
            .field("fetcher", &self.fetcher.as_ref().map(|f| f.name()))
            .field("max_queries", &self.max_queries)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}
