// ABOUTME: Logging configuration and structured logging setup for observability and debugging
// ABOUTME: Configures log levels, formatters, noise filters, and workflow-level structured events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Logging configuration with structured output

use crate::config::AgentConfig;
use crate::constants::service_names;
use anyhow::Result;
use serde_json::json;
use std::env;
use std::io;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread information
    pub include_thread: bool,
    /// Emit span open/close events
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for terminals and the CLI
    Compact,
}

impl LogFormat {
    /// Parse from string with fallback to `Pretty`
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            include_spans: false,
            service_name: service_names::RECIPE_AGENT.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Logging configuration for the loaded agent configuration
    ///
    /// The level comes from `LOG_LEVEL` (via [`AgentConfig`]); `RUST_LOG`
    /// still overrides it when building the filter.
    #[must_use]
    pub fn from_config(config: &AgentConfig) -> Self {
        let format = LogFormat::from_str_or_default(&env::var("LOG_FORMAT").unwrap_or_default());

        // In production, use more detailed logging
        let is_production = config.environment.is_production();

        Self {
            level: config.log_level.to_string(),
            format,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: is_production || env::var("LOG_INCLUDE_THREAD").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| service_names::RECIPE_AGENT.into()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_owned()),
            environment: config.environment.to_string(),
        }
    }

    /// Compact, location-free logging for command-line use
    #[must_use]
    pub fn for_cli(verbose: bool) -> Self {
        Self {
            level: if verbose { "debug" } else { "warn" }.into(),
            format: LogFormat::Compact,
            ..Self::default()
        }
    }

    /// Build the env filter with noise reduction for HTTP internals
    fn env_filter(&self) -> EnvFilter {
        let base = env::var("RUST_LOG").unwrap_or_else(|_| self.level.clone());
        [
            "hyper=warn",
            "hyper_util=warn",
            "reqwest=warn",
            "rustls=warn",
            "tower_http=info",
        ]
        .iter()
        .fold(EnvFilter::new(base), |filter, directive| {
            match directive.parse() {
                Ok(d) => filter.add_directive(d),
                Err(e) => {
                    warn!(directive, error = %e, "Ignoring invalid log directive");
                    filter
                }
            }
        })
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        match self.format {
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_thread_names(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(span_events)
                    .json();

                registry.with(json_layer).try_init()?;
            }
            LogFormat::Pretty => {
                let pretty_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_thread_names(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(span_events);

                registry.with(pretty_layer).try_init()?;
            }
            LogFormat::Compact => {
                // stderr keeps stdout clean for CLI JSON output
                let compact_layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stderr)
                    .with_span_events(FmtSpan::NONE);

                registry.with(compact_layer).try_init()?;
            }
        }

        self.log_startup_info();

        Ok(())
    }

    /// Log structured startup information
    fn log_startup_info(&self) {
        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Recipe agent starting up"
        );

        let config_summary = json!({
            "service": {
                "name": self.service_name,
                "version": self.service_version,
                "environment": self.environment
            },
            "logging": {
                "level": self.level,
                "format": format!("{:?}", self.format),
                "features": {
                    "location": self.include_location,
                    "thread": self.include_thread,
                    "spans": self.include_spans
                }
            }
        });

        info!("Logging configured: {}", config_summary);
    }
}

/// Initialize logging for the loaded agent configuration
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_config(config: &AgentConfig) -> Result<()> {
    LoggingConfig::from_config(config).init()
}

/// Application-specific logging utilities
pub struct AppLogger;

impl AppLogger {
    /// Log a state machine transition
    pub fn log_stage_transition(run_id: &str, attempt: u32, from: &str, to: &str, route: &str) {
        info!(
            run.id = %run_id,
            run.attempt = attempt,
            stage.from = %from,
            stage.to = %to,
            stage.route = %route,
            "Workflow transition"
        );
    }

    /// Log an evaluator grade
    pub fn log_grade(run_id: &str, evaluator: &str, grade: &str, loop_count: u32, forced: bool) {
        info!(
            run.id = %run_id,
            evaluator = %evaluator,
            grade = %grade,
            loop_count = loop_count,
            forced = forced,
            "Evaluator grade"
        );
    }

    /// Log a failed workflow attempt
    pub fn log_attempt_failure(
        run_id: &str,
        attempt: u32,
        max_attempts: u32,
        error_kind: &str,
        error: &str,
    ) {
        warn!(
            run.id = %run_id,
            run.attempt = attempt,
            run.max_attempts = max_attempts,
            error.kind = %error_kind,
            error.message = %error,
            "Workflow attempt failed"
        );
    }

    /// Log a call to an external collaborator
    pub fn log_external_call(service: &str, operation: &str, success: bool, duration_ms: u64) {
        info!(
            external.service = %service,
            external.operation = %operation,
            external.success = success,
            external.duration_ms = duration_ms,
            "External call"
        );
    }

    /// Log `API` requests
    pub fn log_api_request(method: &str, path: &str, status: u16, duration_ms: u64) {
        info!(
            http.method = %method,
            http.path = %path,
            http.status = status,
            http.duration_ms = duration_ms,
            "HTTP request"
        );
    }
}
