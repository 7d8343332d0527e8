// ABOUTME: Error kinds raised by the research/synthesis control loop
// ABOUTME: Distinguishes schema violations from transport failures and exhausted retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

use super::{AppError, ErrorCode};

/// Errors raised while executing the recipe workflow.
///
/// Any of these inside a stage aborts the current attempt. The orchestrator
/// restarts the whole workflow; `ExhaustedRetries` is what is left once the
/// retry budget is spent.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Model output did not match the expected record shape
    #[error("{record} failed schema validation: {reason}")]
    Schema {
        /// Name of the structured record that was expected
        record: &'static str,
        /// What was wrong with the output
        reason: String,
    },

    /// A model, search, or fetch call failed or timed out
    #[error("{service} call failed: {message}")]
    Transport {
        /// Collaborator that failed
        service: String,
        /// Failure description
        message: String,
    },

    /// The state machine reached a state it should never be in
    #[error("workflow invariant violated: {detail}")]
    Invariant {
        /// What was violated
        detail: String,
    },

    /// Every workflow attempt failed
    #[error("workflow failed after {attempts} attempts: {last_error}")]
    ExhaustedRetries {
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        #[source]
        last_error: Box<WorkflowError>,
    },
}

impl WorkflowError {
    /// Create a schema error
    #[must_use]
    pub fn schema(record: &'static str, reason: impl Into<String>) -> Self {
        Self::Schema {
            record,
            reason: reason.into(),
        }
    }

    /// Create a transport error
    #[must_use]
    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an invariant error
    #[must_use]
    pub fn invariant(detail: impl Into<String>) -> Self {
        Self::Invariant {
            detail: detail.into(),
        }
    }

    /// Short label for structured logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Schema { .. } => "schema",
            Self::Transport { .. } => "transport",
            Self::Invariant { .. } => "invariant",
            Self::ExhaustedRetries { .. } => "exhausted_retries",
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(error: WorkflowError) -> Self {
        let code = match &error {
            WorkflowError::Schema { .. } => ErrorCode::SerializationError,
            WorkflowError::Transport { .. } | WorkflowError::ExhaustedRetries { .. } => {
                ErrorCode::ExternalServiceUnavailable
            }
            WorkflowError::Invariant { .. } => ErrorCode::InternalError,
        };
        let kind = error.kind();
        Self::new(code, error.to_string())
            .with_details(serde_json::json!({ "workflow_error": kind }))
            .with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_retries_keeps_last_error() {
        let error = WorkflowError::ExhaustedRetries {
            attempts: 3,
            last_error: Box::new(WorkflowError::transport("jina-search", "timed out")),
        };
        assert_eq!(
            error.to_string(),
            "workflow failed after 3 attempts: jina-search call failed: timed out"
        );
        assert_eq!(error.kind(), "exhausted_retries");
    }

    #[test]
    fn test_conversion_to_app_error() {
        let app: AppError = WorkflowError::schema("Recipe", "missing field `title`").into();
        assert_eq!(app.code, ErrorCode::SerializationError);
        assert_eq!(app.context.details["workflow_error"], "schema");
    }
}
