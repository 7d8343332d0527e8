// ABOUTME: Environment-based configuration for the agent, its collaborators, and the HTTP server
// ABOUTME: Parses LLM, search, workflow, and server settings with validated defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::{Environment, LogLevel};
use crate::constants::{llm, network, search, workflow};
use crate::errors::{AppError, AppResult, ErrorCode};

/// Primary environment variable for the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Fallback environment variable for the Gemini API key
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Environment variable for the Jina API key
pub const JINA_API_KEY_ENV: &str = "JINA_API_KEY";

/// Complete agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Language model settings
    pub llm: LlmConfig,
    /// Web search and article fetch settings
    pub search: SearchConfig,
    /// Control loop settings
    pub workflow: WorkflowConfig,
    /// HTTP server settings
    pub server: HttpServerConfig,
}

/// Language model settings
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Gemini API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
}

/// Web search and article fetch settings
#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Jina API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Results requested per query
    pub max_results: usize,
    /// Queries issued per research pass
    pub max_queries: usize,
    /// Fetch the full article behind each top result
    pub fetch_articles: bool,
    /// Fetched article text is truncated to this many characters
    pub max_article_chars: usize,
}

/// Control loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Loop cap for the research evaluator
    pub research_loop_cap: u32,
    /// Loop cap for the recipe evaluator
    pub recipe_loop_cap: u32,
    /// Whole-workflow retries after the first attempt
    pub max_retries: u32,
    /// Fixed delay between attempts in milliseconds
    pub retry_backoff_ms: u64,
    /// Drop duplicate URLs from the final recipe
    pub dedupe_urls: bool,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Origins allowed by CORS
    pub cors_allowed_origins: Vec<String>,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Timeout for `POST /meal-plan` in seconds
    pub meal_plan_timeout_secs: u64,
    /// Outbound HTTP client timeout in seconds
    pub client_timeout_secs: u64,
    /// Outbound HTTP client connect timeout in seconds
    pub client_connect_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: llm::DEFAULT_MODEL.to_owned(),
            temperature: llm::DEFAULT_TEMPERATURE,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            max_results: search::MAX_RESULTS,
            max_queries: search::MAX_QUERIES,
            fetch_articles: false,
            max_article_chars: search::MAX_ARTICLE_CHARS,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            research_loop_cap: workflow::LOOP_CAP,
            recipe_loop_cap: workflow::LOOP_CAP,
            max_retries: workflow::MAX_RETRIES,
            retry_backoff_ms: workflow::RETRY_BACKOFF_MS,
            dedupe_urls: false,
        }
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: network::DEFAULT_HTTP_HOST.to_owned(),
            port: network::DEFAULT_HTTP_PORT,
            cors_allowed_origins: parse_origins(network::DEFAULT_CORS_ORIGINS),
            request_timeout_secs: network::REQUEST_TIMEOUT_SECS,
            meal_plan_timeout_secs: network::MEAL_PLAN_TIMEOUT_SECS,
            client_timeout_secs: network::HTTP_CLIENT_TIMEOUT_SECS,
            client_connect_timeout_secs: network::HTTP_CLIENT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl AgentConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable or out-of-range value.
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            llm: LlmConfig::from_env()?,
            search: SearchConfig::from_env()?,
            workflow: WorkflowConfig::from_env()?,
            server: HttpServerConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` describing the first violated constraint.
    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid("RECIPE_LLM_TEMPERATURE must be between 0.0 and 2.0"));
        }
        if self.llm.model.trim().is_empty() {
            return Err(invalid("RECIPE_LLM_MODEL must not be empty"));
        }
        if self.search.max_results == 0 {
            return Err(invalid("RECIPE_SEARCH_MAX_RESULTS must be at least 1"));
        }
        if self.search.max_queries == 0 {
            return Err(invalid("RECIPE_MAX_QUERIES must be at least 1"));
        }
        Ok(())
    }

    /// One-line summary safe for logs (no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "environment={} model={} temperature={} search(max_results={}, max_queries={}, fetch_articles={}) \
             workflow(research_cap={}, recipe_cap={}, retries={}, backoff_ms={}, dedupe_urls={}) \
             server={}:{} llm_key={} jina_key={}",
            self.environment,
            self.llm.model,
            self.llm.temperature,
            self.search.max_results,
            self.search.max_queries,
            self.search.fetch_articles,
            self.workflow.research_loop_cap,
            self.workflow.recipe_loop_cap,
            self.workflow.max_retries,
            self.workflow.retry_backoff_ms,
            self.workflow.dedupe_urls,
            self.server.host,
            self.server.port,
            presence(self.llm.api_key.as_ref()),
            presence(self.search.api_key.as_ref()),
        )
    }
}

impl LlmConfig {
    /// Load LLM settings from environment
    ///
    /// # Errors
    ///
    /// Returns an error if the temperature cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        let api_key = env::var(GEMINI_API_KEY_ENV)
            .or_else(|_| env::var(GOOGLE_API_KEY_ENV))
            .ok()
            .filter(|k| !k.trim().is_empty());
        Ok(Self {
            api_key,
            model: env_var_or("RECIPE_LLM_MODEL", llm::DEFAULT_MODEL),
            temperature: parse_env("RECIPE_LLM_TEMPERATURE", llm::DEFAULT_TEMPERATURE)?,
        })
    }
}

impl SearchConfig {
    /// Load search settings from environment
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            api_key: env::var(JINA_API_KEY_ENV)
                .ok()
                .filter(|k| !k.trim().is_empty()),
            max_results: parse_env("RECIPE_SEARCH_MAX_RESULTS", search::MAX_RESULTS)?,
            max_queries: parse_env("RECIPE_MAX_QUERIES", search::MAX_QUERIES)?,
            fetch_articles: parse_env("RECIPE_FETCH_ARTICLES", false)?,
            max_article_chars: parse_env("RECIPE_MAX_ARTICLE_CHARS", search::MAX_ARTICLE_CHARS)?,
        })
    }
}

impl WorkflowConfig {
    /// Load workflow settings from environment
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            research_loop_cap: parse_env("RECIPE_RESEARCH_LOOP_CAP", workflow::LOOP_CAP)?,
            recipe_loop_cap: parse_env("RECIPE_RECIPE_LOOP_CAP", workflow::LOOP_CAP)?,
            max_retries: parse_env("RECIPE_MAX_RETRIES", workflow::MAX_RETRIES)?,
            retry_backoff_ms: parse_env("RECIPE_RETRY_BACKOFF_MS", workflow::RETRY_BACKOFF_MS)?,
            dedupe_urls: parse_env("RECIPE_DEDUPE_URLS", false)?,
        })
    }

    /// Delay between whole-workflow attempts
    #[must_use]
    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl HttpServerConfig {
    /// Load server settings from environment
    ///
    /// # Errors
    ///
    /// Returns an error if the port or a timeout cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            host: env_var_or("HTTP_HOST", network::DEFAULT_HTTP_HOST),
            port: parse_env("HTTP_PORT", network::DEFAULT_HTTP_PORT)?,
            cors_allowed_origins: parse_origins(&env_var_or(
                "CORS_ALLOWED_ORIGINS",
                network::DEFAULT_CORS_ORIGINS,
            )),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", network::REQUEST_TIMEOUT_SECS)?,
            meal_plan_timeout_secs: parse_env(
                "MEAL_PLAN_TIMEOUT_SECS",
                network::MEAL_PLAN_TIMEOUT_SECS,
            )?,
            client_timeout_secs: parse_env(
                "HTTP_CLIENT_TIMEOUT_SECS",
                network::HTTP_CLIENT_TIMEOUT_SECS,
            )?,
            client_connect_timeout_secs: parse_env(
                "HTTP_CLIENT_CONNECT_TIMEOUT_SECS",
                network::HTTP_CLIENT_CONNECT_TIMEOUT_SECS,
            )?,
        })
    }

    /// Socket address string for binding
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &presence(self.api_key.as_ref()))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &presence(self.api_key.as_ref()))
            .field("max_results", &self.max_results)
            .field("max_queries", &self.max_queries)
            .field("fetch_articles", &self.fetch_articles)
            .field("max_article_chars", &self.max_article_chars)
            .finish()
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| invalid(format!("Invalid {key} value '{raw}': {e}"))),
        _ => Ok(default),
    }
}

/// Parse comma-separated origins
fn parse_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

const fn presence(value: Option<&String>) -> &'static str {
    if value.is_some() {
        "[SET]"
    } else {
        "[UNSET]"
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::new(ErrorCode::ConfigInvalid, message)
}
