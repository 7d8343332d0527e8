// ABOUTME: Google Gemini LLM provider implementation with JSON structured output support
// ABOUTME: Maps chat requests onto the Generative Language generateContent REST endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gemini Provider
//!
//! Implementation of the `LlmProvider` trait for Google's Gemini models.
//!
//! ## Configuration
//!
//! Set `GEMINI_API_KEY` (or `GOOGLE_API_KEY`) with a key from Google AI
//! Studio. The model defaults to `gemini-2.0-flash`.
//!
//! When a request carries a `ResponseFormat`, the provider asks Gemini for
//! `application/json` output constrained by the given schema.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, MessageRole, TokenUsage};
use crate::config::environment::{LlmConfig, GEMINI_API_KEY_ENV, GOOGLE_API_KEY_ENV};
use crate::constants::{llm::DEFAULT_MODEL, service_names};
use crate::errors::{AppError, ErrorCode};
use crate::external::http_client::shared_client;
use crate::logging::AppLogger;

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Gemini API request structure
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// Content structure for Gemini API
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

/// Text part of a content block
#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

/// Generation configuration
#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

/// Gemini API response structure
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
    error: Option<GeminiError>,
}

/// Response candidate
#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

/// Usage metadata from Gemini API response
#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    candidates: Option<u32>,
    #[serde(rename = "totalTokenCount")]
    total: Option<u32>,
}

/// API error response from Gemini
#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini LLM provider
pub struct GeminiProvider {
    api_key: String,
    client: Client,
    default_model: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: shared_client().clone(),
            default_model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Create a provider from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no API key was configured.
    pub fn from_config(config: &LlmConfig) -> Result<Self, AppError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            AppError::new(
                ErrorCode::ConfigMissing,
                format!("{GEMINI_API_KEY_ENV} or {GOOGLE_API_KEY_ENV} must be set"),
            )
        })?;
        Ok(Self::new(api_key).with_default_model(&config.model))
    }

    /// Set a custom default model
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Convert our message role to Gemini's role format
    const fn convert_role(role: MessageRole) -> &'static str {
        match role {
            MessageRole::System | MessageRole::User => "user",
            MessageRole::Assistant => "model",
        }
    }

    /// Build the API URL for a model and method
    fn build_url(&self, model: &str, method: &str) -> String {
        format!(
            "{API_BASE_URL}/models/{model}:{method}?key={}",
            self.api_key
        )
    }

    /// Convert chat messages to Gemini format
    ///
    /// Gemini takes a single system instruction, so every system message is
    /// merged into it in order.
    fn convert_messages(messages: &[ChatMessage]) -> (Vec<GeminiContent>, Option<GeminiContent>) {
        let mut contents = Vec::new();
        let mut system_parts = Vec::new();

        for message in messages {
            if message.role == MessageRole::System {
                system_parts.push(ContentPart {
                    text: message.content.clone(),
                });
            } else {
                contents.push(GeminiContent {
                    role: Some(Self::convert_role(message.role).to_owned()),
                    parts: vec![ContentPart {
                        text: message.content.clone(),
                    }],
                });
            }
        }

        let system_instruction = (!system_parts.is_empty()).then(|| GeminiContent {
            role: None,
            parts: system_parts,
        });

        (contents, system_instruction)
    }

    /// Build a Gemini API request from a `ChatRequest`
    fn build_gemini_request(request: &ChatRequest) -> GeminiRequest {
        let (contents, system_instruction) = Self::convert_messages(&request.messages);

        let generation_config = (request.temperature.is_some()
            || request.response_format.is_some())
        .then(|| GenerationConfig {
            temperature: request.temperature,
            response_mime_type: request
                .response_format
                .as_ref()
                .map(|_| "application/json"),
            response_schema: request.response_format.as_ref().map(|f| f.schema.clone()),
        });

        GeminiRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    /// Extract text content from Gemini response
    fn extract_content(response: &GeminiResponse) -> Result<String, AppError> {
        let parts = response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .map(|c| &c.parts)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                AppError::external_service(service_names::GEMINI, "No content in Gemini response")
            })?;

        Ok(parts.iter().map(|p| p.text.as_str()).collect())
    }

    /// Convert usage metadata to our token usage format
    fn convert_usage(metadata: &UsageMetadata) -> TokenUsage {
        TokenUsage {
            prompt_tokens: metadata.prompt.unwrap_or(0),
            completion_tokens: metadata.candidates.unwrap_or(0),
            total_tokens: metadata.total.unwrap_or(0),
        }
    }

    /// Map API error status to appropriate error type
    fn map_api_error(status: u16, response_text: &str) -> AppError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.message);

        match status {
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                Self::extract_quota_message(&message),
            ),
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("Gemini rejected the API key: {message}"),
            ),
            _ => AppError::external_service(
                service_names::GEMINI,
                format!("API error ({status}): {message}"),
            ),
        }
    }

    /// Extract a user-friendly quota/rate limit message from Gemini error
    fn extract_quota_message(message: &str) -> String {
        // Example: "Please retry in 6.406453963s."
        const PREFIX: &str = "Please retry in ";
        if let Some(retry_pos) = message.find(PREFIX) {
            let after_prefix = &message[retry_pos + PREFIX.len()..];
            if let Some(s_pos) = after_prefix.find('s') {
                if let Ok(seconds) = after_prefix[..s_pos].parse::<f64>() {
                    let seconds_int = seconds.ceil() as u64;
                    return format!(
                        "AI service quota exceeded. Please try again in {seconds_int} seconds."
                    );
                }
            }
        }
        "AI service quota exceeded. Please wait a moment and try again.".to_owned()
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        service_names::GEMINI
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let url = self.build_url(model, "generateContent");
        let gemini_request = Self::build_gemini_request(request);
        let started = Instant::now();

        debug!(
            messages = request.messages.len(),
            structured = request.response_format.is_some(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                AppLogger::log_external_call(
                    service_names::GEMINI,
                    "generateContent",
                    false,
                    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                );
                AppError::external_unavailable(
                    service_names::GEMINI,
                    format!("HTTP request failed: {e}"),
                )
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            AppError::external_unavailable(
                service_names::GEMINI,
                format!("Failed to read response: {e}"),
            )
        })?;

        AppLogger::log_external_call(
            service_names::GEMINI,
            "generateContent",
            status.is_success(),
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = %e, "Failed to parse Gemini response");
                AppError::external_service(
                    service_names::GEMINI,
                    format!("Failed to parse Gemini response: {e}"),
                )
            })?;

        if let Some(error) = gemini_response.error {
            return Err(AppError::external_service(
                service_names::GEMINI,
                error.message,
            ));
        }

        let content = Self::extract_content(&gemini_response)?;
        let usage = gemini_response
            .usage_metadata
            .as_ref()
            .map(Self::convert_usage);
        let finish_reason = gemini_response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.finish_reason.clone());

        debug!("Successfully received Gemini response");

        Ok(ChatResponse {
            content,
            model: model.to_owned(),
            usage,
            finish_reason,
        })
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("default_model", &self.default_model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
