// ABOUTME: Structured recipe record produced by the synthesizer and returned to callers
// ABOUTME: Includes contract validation, the placeholder sentinel, and source URL handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::recipe::PLACEHOLDER_TITLE;

/// A complete, structured recipe.
///
/// Numeric fields are unsigned, so a negative value from the model is rejected
/// at deserialization. Every field is required on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Short title describing the dish
    pub title: String,
    /// Number of people the meal feeds
    pub serving_size: u32,
    /// Preparation time in minutes
    pub prep_time: u32,
    /// Cooking time in minutes, excluding preparation
    pub cook_time: u32,
    /// Ingredients with quantities
    pub ingredients: String,
    /// Numbered steps, each starting with `<n>.`
    pub instructions: String,
    /// Source URLs in the order they were collected; may contain duplicates
    pub url: Vec<String>,
}

impl Recipe {
    /// The sentinel returned when the workflow cannot produce a recipe
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            title: PLACEHOLDER_TITLE.to_owned(),
            serving_size: 0,
            prep_time: 0,
            cook_time: 0,
            ingredients: String::new(),
            instructions: String::new(),
            url: Vec::new(),
        }
    }

    /// Whether this is the degraded-result placeholder
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.title == PLACEHOLDER_TITLE && self.serving_size == 0
    }

    /// Check the contract a synthesized recipe must satisfy
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated rule.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_owned());
        }
        if self.serving_size == 0 {
            return Err("serving_size must be a positive integer".to_owned());
        }
        if self.ingredients.trim().is_empty() {
            return Err("ingredients must not be empty".to_owned());
        }
        if !starts_with_step_number(&self.instructions) {
            return Err("instructions must be numbered steps starting with `<n>.`".to_owned());
        }
        Ok(())
    }

    /// Append collected source URLs, optionally dropping ones already present
    pub fn attach_sources<I>(&mut self, urls: I, dedupe: bool)
    where
        I: IntoIterator<Item = String>,
    {
        self.url.extend(urls);
        if dedupe {
            let mut seen = HashSet::new();
            self.url.retain(|u| seen.insert(u.clone()));
        }
    }

    /// Source URLs without duplicates, first occurrence wins
    #[must_use]
    pub fn unique_urls(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.url
            .iter()
            .map(String::as_str)
            .filter(|u| seen.insert(*u))
            .collect()
    }

    /// Total time in minutes
    #[must_use]
    pub const fn total_time(&self) -> u32 {
        self.prep_time.saturating_add(self.cook_time)
    }
}

fn starts_with_step_number(text: &str) -> bool {
    let trimmed = text.trim_start();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && trimmed[digits..].starts_with('.')
}
