// ABOUTME: Configuration management module for the recipe agent
// ABOUTME: Environment-only configuration for LLM, search, workflow, and server settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! All settings come from environment variables; there is no configuration
//! file. See [`environment::AgentConfig::from_env`].

/// Environment-driven agent configuration
pub mod environment;
/// Shared configuration enums
pub mod types;

pub use environment::{AgentConfig, HttpServerConfig, LlmConfig, SearchConfig, WorkflowConfig};
pub use types::{Environment, LogLevel};
