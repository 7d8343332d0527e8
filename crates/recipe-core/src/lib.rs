// ABOUTME: Core types and constants for the recipe research agent
// ABOUTME: Foundation crate with error handling, recipe and profile models, and workflow constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Recipe Core
//!
//! Foundation crate providing shared types and constants for the recipe
//! research agent. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `WorkflowError`
//! - **constants**: Workflow limits, model defaults, and network defaults
//! - **models**: `Recipe` and `UserProfile` domain records

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Recipe, `UserProfile`)
pub mod models;
