// ABOUTME: Re-exports the unified error types from recipe-core
// ABOUTME: Keeps `crate::errors::*` paths stable for the rest of the crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! The error types live in `recipe-core` so every workspace crate shares them.
//! `AppError` is the boundary error (HTTP responses, configuration, adapters);
//! `WorkflowError` is raised inside the control loop.

pub use recipe_core::errors::{
    AppError, AppResult, ErrorCode, ErrorContext, ErrorResponse, ErrorResponseDetails,
    WorkflowError,
};
