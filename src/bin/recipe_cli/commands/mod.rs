// ABOUTME: Re-exports command modules for recipe-cli
// ABOUTME: Provides the single-recipe and weekly-plan commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod plan;
pub mod recipe;
