// ABOUTME: Structured output layer turning model replies into validated, strongly typed records
// ABOUTME: Defines the grade/feedback/query records and separates schema errors from transport errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use super::{ChatMessage, ChatRequest, GeminiProvider, LlmProvider};
use crate::config::LlmConfig;
use crate::constants::llm::DEFAULT_TEMPERATURE;
use crate::errors::{AppError, WorkflowError};
use crate::models::Recipe;

/// A record the model can be asked to produce
pub trait StructuredOutput: DeserializeOwned + Send {
    /// Record name sent with the request and used in errors
    const NAME: &'static str;

    /// Response schema in Gemini's `OpenAPI` subset
    fn schema() -> Value;

    /// Semantic checks beyond the JSON shape
    ///
    /// # Errors
    ///
    /// Returns a description of the violated rule.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

// ============================================================================
// Records
// ============================================================================

/// Search queries derived from the conversation and feedback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQueries {
    /// Web search queries, most useful first
    pub queries: Vec<String>,
}

/// Research evaluator verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResearchGrade {
    /// Research is detailed enough to write a recipe
    Sufficient,
    /// More research is needed
    Insufficient,
}

/// Research evaluator output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchFeedback {
    /// Verdict
    pub grade: ResearchGrade,
    /// Suggested search direction when insufficient
    #[serde(default)]
    pub feedback: String,
}

/// Recipe evaluator verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeGrade {
    /// Recipe meets every criterion
    Satisfactory,
    /// Recipe needs another synthesis pass
    Unsatisfactory,
}

/// Recipe evaluator output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeFeedback {
    /// Verdict
    pub grade: RecipeGrade,
    /// How to improve the recipe
    #[serde(default)]
    pub feedback: String,
}

impl Display for ResearchGrade {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sufficient => write!(f, "Sufficient"),
            Self::Insufficient => write!(f, "Insufficient"),
        }
    }
}

impl Display for RecipeGrade {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Satisfactory => write!(f, "satisfactory"),
            Self::Unsatisfactory => write!(f, "unsatisfactory"),
        }
    }
}

impl StructuredOutput for SearchQueries {
    const NAME: &'static str = "SearchQueries";

    fn schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "queries": {
                    "type": "ARRAY",
                    "description": "Web search queries that will find detailed recipes.",
                    "items": { "type": "STRING" }
                }
            },
            "required": ["queries"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.queries.iter().all(|q| q.trim().is_empty()) {
            return Err("at least one non-empty query is required".to_owned());
        }
        Ok(())
    }
}

impl StructuredOutput for ResearchFeedback {
    const NAME: &'static str = "ResearchFeedback";

    fn schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "grade": {
                    "type": "STRING",
                    "enum": ["Sufficient", "Insufficient"],
                    "description": "Sufficient when the recipes give ingredient quantities and step-by-step cooking instructions."
                },
                "feedback": {
                    "type": "STRING",
                    "description": "When insufficient, which search queries to try next."
                }
            },
            "required": ["grade", "feedback"]
        })
    }
}

impl StructuredOutput for RecipeFeedback {
    const NAME: &'static str = "RecipeFeedback";

    fn schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "grade": {
                    "type": "STRING",
                    "enum": ["satisfactory", "unsatisfactory"],
                    "description": "Whether the recipe meets every criterion."
                },
                "feedback": {
                    "type": "STRING",
                    "description": "How to make the recipe satisfactory."
                }
            },
            "required": ["grade", "feedback"]
        })
    }
}

impl StructuredOutput for Recipe {
    const NAME: &'static str = "Recipe";

    fn schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "title": {
                    "type": "STRING",
                    "description": "Short title saying what dish the recipe makes."
                },
                "serving_size": {
                    "type": "INTEGER",
                    "description": "Number of people the meal feeds."
                },
                "prep_time": {
                    "type": "INTEGER",
                    "description": "Minutes spent preparing ingredients (washing, peeling, chopping) before cooking."
                },
                "cook_time": {
                    "type": "INTEGER",
                    "description": "Minutes needed to follow the cooking instructions, excluding prep_time."
                },
                "ingredients": {
                    "type": "STRING",
                    "description": "Every ingredient with its quantity in metric units such as g, kg and ml."
                },
                "instructions": {
                    "type": "STRING",
                    "description": "Detailed steps a novice can follow, stating heat level where relevant. Each step starts with its number followed by a period."
                },
                "url": {
                    "type": "ARRAY",
                    "description": "URLs referenced while writing the recipe.",
                    "items": { "type": "STRING" }
                }
            },
            "required": [
                "title", "serving_size", "prep_time", "cook_time",
                "ingredients", "instructions", "url"
            ],
            "propertyOrdering": [
                "title", "serving_size", "prep_time", "cook_time",
                "ingredients", "instructions", "url"
            ]
        })
    }

    fn validate(&self) -> Result<(), String> {
        Self::validate(self)
    }
}

// ============================================================================
// Caller
// ============================================================================

/// Invokes a provider and parses the reply into a `StructuredOutput` record
#[derive(Clone)]
pub struct StructuredOutputCaller {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
    temperature: f32,
}

impl StructuredOutputCaller {
    /// Create a caller using the provider's default model
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Gemini-backed caller using the configured model and temperature
    ///
    /// # Errors
    ///
    /// Returns an error if no Gemini API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Self, AppError> {
        let provider = GeminiProvider::from_config(config)?;
        Ok(Self::new(Arc::new(provider))
            .with_model(config.model.clone())
            .with_temperature(config.temperature))
    }

    /// Override the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// One round trip producing a validated record
    ///
    /// # Errors
    ///
    /// Returns `Transport` when the provider call fails and `Schema` when the
    /// reply does not parse into `T` or fails its validation.
    #[instrument(skip_all, fields(record = T::NAME, provider = self.provider.name()))]
    pub async fn generate<T: StructuredOutput>(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<T, WorkflowError> {
        let mut request = ChatRequest::new(messages)
            .with_temperature(self.temperature)
            .with_response_format(T::NAME, T::schema());
        if let Some(model) = &self.model {
            request = request.with_model(model);
        }

        let response = self
            .provider
            .complete(&request)
            .await
            .map_err(|e| WorkflowError::transport(self.provider.name(), e.to_string()))?;

        debug!(chars = response.content.len(), "Structured reply received");
        parse_record::<T>(&response.content)
    }
}

impl Debug for StructuredOutputCaller {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredOutputCaller")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Parse and validate a raw model reply
fn parse_record<T: StructuredOutput>(raw: &str) -> Result<T, WorkflowError> {
    let body = strip_code_fence(raw);
    let record: T = serde_json::from_str(body).map_err(|e| {
        warn!(record = T::NAME, error = %e, "Model reply does not match schema");
        WorkflowError::schema(T::NAME, e.to_string())
    })?;
    record
        .validate()
        .map_err(|reason| WorkflowError::schema(T::NAME, reason))?;
    Ok(record)
}

/// Models sometimes wrap JSON in a markdown fence even in JSON mode
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
