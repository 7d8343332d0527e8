// ABOUTME: User dietary profile consumed read-only by a workflow run
// ABOUTME: Allergies, dislikes, skill, time limit, nutrition tags, and goals with prompt rendering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Self-reported cooking ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CookingSkill {
    /// New to cooking
    #[default]
    Beginner,
    /// Comfortable with common techniques
    Intermediate,
    /// Experienced cook
    Advanced,
}

impl Display for CookingSkill {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

/// Dietary profile for one user.
///
/// Sets are ordered so the rendered prompt text is stable between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    /// Ingredients the user must not eat
    #[serde(default)]
    pub allergies: BTreeSet<String>,
    /// Ingredients the user prefers to avoid
    #[serde(default)]
    pub dislikes: BTreeSet<String>,
    /// Cooking ability
    #[serde(default)]
    pub cooking_skill: CookingSkill,
    /// Preferred maximum total time in minutes; `None` means unbounded
    #[serde(default)]
    pub time_limit: Option<u32>,
    /// Nutrition preference tags (e.g. "low sugar")
    #[serde(default)]
    pub nutrition: BTreeSet<String>,
    /// Free-text meal planning goals
    #[serde(default)]
    pub goals: String,
}

impl UserProfile {
    /// Profile used when a caller does not supply one
    #[must_use]
    pub fn sample() -> Self {
        Self {
            allergies: BTreeSet::from(["nuts".to_owned()]),
            dislikes: BTreeSet::from(["chicken breast".to_owned()]),
            cooking_skill: CookingSkill::Beginner,
            time_limit: None,
            nutrition: BTreeSet::new(),
            goals: "high protein diet".to_owned(),
        }
    }

    /// Render the profile as a bullet list for prompts
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "- allergies: {}", join_or_none(&self.allergies));
        let _ = writeln!(out, "- dislikes: {}", join_or_none(&self.dislikes));
        let _ = writeln!(out, "- cooking skill: {}", self.cooking_skill);
        match self.time_limit {
            Some(minutes) => {
                let _ = writeln!(out, "- time limit: {minutes} minutes");
            }
            None => {
                let _ = writeln!(out, "- time limit: none");
            }
        }
        let _ = writeln!(out, "- nutrition: {}", join_or_none(&self.nutrition));
        let goals = if self.goals.trim().is_empty() {
            "none"
        } else {
            self.goals.trim()
        };
        let _ = write!(out, "- goals: {goals}");
        out
    }
}

fn join_or_none(items: &BTreeSet<String>) -> String {
    if items.is_empty() {
        "none".to_owned()
    } else {
        items.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}
