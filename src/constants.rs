// ABOUTME: Application constants re-exported from recipe-core
// ABOUTME: Workflow limits, search bounds, LLM defaults, and network defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use recipe_core::constants::{llm, network, recipe, search, service_names, workflow};
