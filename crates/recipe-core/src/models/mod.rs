// ABOUTME: Core domain models for the recipe agent
// ABOUTME: Re-exports the Recipe record and the UserProfile dietary input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

mod profile;
mod recipe;

pub use profile::{CookingSkill, UserProfile};
pub use recipe::Recipe;
