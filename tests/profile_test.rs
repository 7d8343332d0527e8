// ABOUTME: Tests for user profile files and their prompt rendering
// ABOUTME: Covers partial profile JSON, the built-in sample, and recipe placeholder detection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::io::Write;

use recipe_agent::models::{CookingSkill, Recipe, UserProfile};
use tempfile::NamedTempFile;

#[test]
fn test_partial_profile_file_uses_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "allergies": ["shellfish", "gluten"], "time_limit": 30 }}"#
    )
    .unwrap();

    let raw = std::fs::read_to_string(file.path()).unwrap();
    let profile: UserProfile = serde_json::from_str(&raw).unwrap();

    assert_eq!(profile.cooking_skill, CookingSkill::Beginner);
    assert!(profile.dislikes.is_empty());
    assert_eq!(profile.time_limit, Some(30));

    let described = profile.describe();
    assert!(described.contains("- allergies: gluten, shellfish"));
    assert!(described.contains("- time limit: 30 minutes"));
    assert!(described.contains("- goals: none"));
}

#[test]
fn test_sample_profile() {
    let profile = UserProfile::sample();

    assert!(profile.allergies.contains("nuts"));
    assert!(profile.dislikes.contains("chicken breast"));
    assert_eq!(profile.time_limit, None);
    assert!(profile.describe().contains("- goals: high protein diet"));
}

#[test]
fn test_placeholder_recipe_shape() {
    let placeholder = Recipe::placeholder();

    assert!(placeholder.is_placeholder());
    assert_eq!(placeholder.title, "dummy");
    assert_eq!(placeholder.total_time(), 0);
    assert!(placeholder.url.is_empty());

    let json = serde_json::to_value(&placeholder).unwrap();
    assert_eq!(json["serving_size"], 0);
    assert_eq!(json["ingredients"], "");
}

#[test]
fn test_attach_sources_keeps_or_drops_duplicates() {
    let urls = vec![
        "https://b.example".to_owned(),
        "https://a.example".to_owned(),
        "https://b.example".to_owned(),
    ];

    let mut kept = Recipe::placeholder();
    kept.url = vec!["https://a.example".to_owned()];
    kept.attach_sources(urls.clone(), false);
    assert_eq!(kept.url.len(), 4);

    let mut deduped = Recipe::placeholder();
    deduped.url = vec!["https://a.example".to_owned()];
    deduped.attach_sources(urls, true);
    assert_eq!(deduped.url, vec!["https://a.example", "https://b.example"]);
}
