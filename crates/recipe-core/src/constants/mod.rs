// ABOUTME: Application-wide constants for the recipe agent grouped by domain
// ABOUTME: Workflow limits, LLM defaults, search bounds, and network defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Control loop limits
pub mod workflow {
    /// Consecutive Insufficient/unsatisfactory grades tolerated before acceptance is forced
    pub const LOOP_CAP: u32 = 2;

    /// Whole-workflow retries after the first attempt (3 attempts total)
    pub const MAX_RETRIES: u32 = 2;

    /// Fixed delay between whole-workflow attempts
    pub const RETRY_BACKOFF_MS: u64 = 2_000;

    /// Minimum stage execution budget for one attempt
    ///
    /// The effective budget grows with the configured loop caps.
    pub const MAX_STAGE_STEPS: usize = 64;
}

/// Research stage bounds
pub mod search {
    /// Maximum queries issued per research pass
    pub const MAX_QUERIES: usize = 5;

    /// Maximum results requested from the search provider per query
    pub const MAX_RESULTS: usize = 5;

    /// Fetched article text is truncated to this many characters
    pub const MAX_ARTICLE_CHARS: usize = 8_000;
}

/// Language model defaults
pub mod llm {
    /// Default Gemini model
    pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.2;
}

/// Recipe model constants
pub mod recipe {
    /// Title of the placeholder recipe returned when every attempt fails
    pub const PLACEHOLDER_TITLE: &str = "dummy";
}

/// Service identifiers used in logs
pub mod service_names {
    /// Service name reported by the HTTP server
    pub const RECIPE_AGENT: &str = "recipe-agent";
    /// Gemini service label
    pub const GEMINI: &str = "gemini";
    /// Jina search service label
    pub const JINA_SEARCH: &str = "jina-search";
    /// Jina reader service label
    pub const JINA_READER: &str = "jina-reader";
}

/// Network defaults
pub mod network {
    /// Default bind host
    pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8000;

    /// Origins allowed by CORS when none are configured
    pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

    /// Upper bound for a full HTTP request (a workflow run can take minutes)
    pub const REQUEST_TIMEOUT_SECS: u64 = 300;

    /// Upper bound for `POST /meal-plan`, which runs one workflow per day
    pub const MEAL_PLAN_TIMEOUT_SECS: u64 = REQUEST_TIMEOUT_SECS * 7;

    /// Outbound HTTP client request timeout
    pub const HTTP_CLIENT_TIMEOUT_SECS: u64 = 60;

    /// Outbound HTTP client connect timeout
    pub const HTTP_CLIENT_CONNECT_TIMEOUT_SECS: u64 = 10;
}
