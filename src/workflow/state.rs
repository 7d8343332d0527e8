// ABOUTME: Typed state threaded through one workflow run plus the per-stage update records
// ABOUTME: Stages read the state by shared reference; only the orchestrator applies their updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::Write as _;

use serde::Serialize;

use crate::external::SearchResult;
use crate::llm::{ChatMessage, RecipeGrade, ResearchGrade};
use crate::models::{Recipe, UserProfile};

/// Best-ranked hit for one query of a research pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFindings {
    /// Query sent to the search provider
    pub query: String,
    /// Top result for the query
    pub best: SearchResult,
    /// Fetched page text, truncated, when article enrichment is enabled
    pub article: Option<String>,
}

/// Findings of the latest research pass, in query order
///
/// Queries that returned nothing have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResearchFindings {
    entries: Vec<QueryFindings>,
}

impl ResearchFindings {
    /// Build from per-query findings
    #[must_use]
    pub const fn new(entries: Vec<QueryFindings>) -> Self {
        Self { entries }
    }

    /// Per-query findings
    #[must_use]
    pub fn entries(&self) -> &[QueryFindings] {
        &self.entries
    }

    /// Whether the pass found nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of queries that produced a hit
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// URLs of the best results, in query order
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.best.url.as_str())
    }

    /// Flattened text of the best results used as model context
    #[must_use]
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return "No search results were found.".to_owned();
        }
        let mut out = String::new();
        for (index, entry) in self.entries.iter().enumerate() {
            let _ = writeln!(out, "## Result {} for \"{}\"", index + 1, entry.query);
            let _ = writeln!(out, "Title: {}", entry.best.title);
            let _ = writeln!(out, "URL: {}", entry.best.url);
            let _ = writeln!(out, "Snippet: {}", entry.best.snippet);
            if let Some(article) = &entry.article {
                let _ = writeln!(out, "Article:\n{article}");
            }
            out.push('\n');
        }
        out
    }
}

/// State of one workflow run
///
/// Created fresh for every attempt and dropped when the attempt ends.
#[derive(Debug, Clone)]
pub struct WorkflowState<'a> {
    /// Conversation history, append-only
    pub messages: Vec<ChatMessage>,
    /// Profile the recipe is written for
    pub profile: &'a UserProfile,
    /// Findings of the latest research pass
    pub search_results: ResearchFindings,
    /// Every URL visited so far, newest pass first, duplicates allowed
    pub urls: Vec<String>,
    /// Consecutive failed grades at the current evaluator
    pub loop_count: u32,
    /// Latest research grade
    pub sufficiency: Option<ResearchGrade>,
    /// Latest recipe grade
    pub satisfaction: Option<RecipeGrade>,
    /// Latest evaluator feedback
    pub feedback: String,
    /// Latest synthesized recipe
    pub final_recipe: Option<Recipe>,
}

impl<'a> WorkflowState<'a> {
    /// Start a run for `dish`
    #[must_use]
    pub fn new(dish: &str, profile: &'a UserProfile) -> Self {
        Self {
            messages: vec![ChatMessage::user(format!("Give me the recipe for {dish}"))],
            profile,
            search_results: ResearchFindings::default(),
            urls: Vec::new(),
            loop_count: 0,
            sufficiency: None,
            satisfaction: None,
            feedback: String::new(),
            final_recipe: None,
        }
    }

    /// Feedback to hand to the research stage, if the last research grade failed
    #[must_use]
    pub fn research_feedback(&self) -> Option<&str> {
        match self.sufficiency {
            Some(ResearchGrade::Insufficient) if !self.feedback.is_empty() => {
                Some(self.feedback.as_str())
            }
            _ => None,
        }
    }

    /// Feedback to hand to the synthesizer, if the last recipe grade failed
    #[must_use]
    pub fn recipe_feedback(&self) -> Option<&str> {
        match self.satisfaction {
            Some(RecipeGrade::Unsatisfactory) if !self.feedback.is_empty() => {
                Some(self.feedback.as_str())
            }
            _ => None,
        }
    }

    pub(crate) fn apply_research(&mut self, update: ResearchUpdate) {
        let mut urls = update.new_urls;
        urls.append(&mut self.urls);
        self.urls = urls;
        self.search_results = update.findings;
        self.messages.push(update.message);
    }

    pub(crate) fn apply_research_grade(&mut self, update: GradeUpdate<ResearchGrade>) {
        self.sufficiency = Some(update.grade);
        self.feedback = update.feedback;
        self.loop_count = update.loop_count;
    }

    pub(crate) fn apply_synthesis(&mut self, update: SynthesisUpdate) {
        self.final_recipe = Some(update.recipe);
    }

    pub(crate) fn apply_recipe_grade(&mut self, update: GradeUpdate<RecipeGrade>) {
        self.satisfaction = Some(update.grade);
        self.feedback = update.feedback;
        self.loop_count = update.loop_count;
    }
}

// ============================================================================
// Stage updates
// ============================================================================

/// Output of one research pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchUpdate {
    /// Replaces the previous findings
    pub findings: ResearchFindings,
    /// URLs discovered by this pass, prepended to the accumulated list
    pub new_urls: Vec<String>,
    /// Findings summary appended to the conversation
    pub message: ChatMessage,
}

/// Output of either evaluator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeUpdate<G> {
    /// Verdict
    pub grade: G,
    /// Feedback for the producer stage, empty when forced
    pub feedback: String,
    /// Loop counter after this grade
    pub loop_count: u32,
    /// Whether the loop cap forced the grade
    pub forced: bool,
}

impl<G> GradeUpdate<G> {
    /// Acceptance forced by the loop cap
    #[must_use]
    pub const fn forced(grade: G) -> Self {
        Self {
            grade,
            feedback: String::new(),
            loop_count: 0,
            forced: true,
        }
    }

    /// Model verdict; a pass resets the counter and a failure increments it
    #[must_use]
    pub fn graded(grade: G, passed: bool, feedback: String, previous_loop_count: u32) -> Self {
        Self {
            grade,
            feedback,
            loop_count: if passed {
                0
            } else {
                previous_loop_count.saturating_add(1)
            },
            forced: false,
        }
    }
}

/// Output of the synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisUpdate {
    /// Replaces the previous recipe
    pub recipe: Recipe,
}
