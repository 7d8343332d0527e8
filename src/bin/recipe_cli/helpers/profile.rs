// ABOUTME: Dietary profile loading for recipe-cli
// ABOUTME: Reads a JSON profile file or falls back to the built-in sample profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;

use anyhow::{Context, Result};
use recipe_agent::models::UserProfile;
use tracing::debug;

/// Load the profile at `path`, or the sample profile when no path is given
pub async fn load(path: Option<&Path>) -> Result<UserProfile> {
    let Some(path) = path else {
        debug!("No profile file given, using the sample profile");
        return Ok(UserProfile::sample());
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid profile JSON in {}", path.display()))
}
