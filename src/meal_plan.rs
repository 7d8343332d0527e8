// ABOUTME: Weekly meal planning that drafts seven meal ideas and runs the recipe workflow per day
// ABOUTME: Days without a usable meal idea get the placeholder recipe
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Meal Planning
//!
//! The model drafts a list of dish names honouring the profile. Each dish is
//! then researched and written by the [`RecipeWorkflow`], one day at a time.

use std::sync::Arc;

use chrono::Weekday;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::errors::WorkflowError;
use crate::llm::prompts::MEAL_PLANNER_PROMPT;
use crate::llm::{ChatMessage, StructuredOutput, StructuredOutputCaller};
use crate::models::{Recipe, UserProfile};
use crate::workflow::RecipeWorkflow;

/// Days of a plan, in order
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English name of a weekday
#[must_use]
pub const fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Meal ideas drafted by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftMealPlan {
    /// Dish names, Monday first
    pub meals: Vec<String>,
}

impl StructuredOutput for DraftMealPlan {
    const NAME: &'static str = "DraftMealPlan";

    fn schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "meals": {
                    "type": "ARRAY",
                    "description": "Names of meal ideas, one for each day of the week starting on Monday.",
                    "items": { "type": "STRING" }
                }
            },
            "required": ["meals"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.meals.iter().all(|meal| meal.trim().is_empty()) {
            return Err("at least one meal idea is required".to_owned());
        }
        Ok(())
    }
}

/// One day of a weekly plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDay {
    /// Day of the week
    pub day: Weekday,
    /// Drafted meal idea, if the model supplied one
    pub meal: Option<String>,
    /// Recipe produced for the meal, or the placeholder
    pub recipe: Recipe,
}

/// Seven planned days, Monday to Sunday
///
/// Serializes as an object keyed by day name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyMealPlan {
    days: Vec<PlannedDay>,
}

impl WeeklyMealPlan {
    /// Planned days in week order
    #[must_use]
    pub fn days(&self) -> &[PlannedDay] {
        &self.days
    }

    /// Plan for `day`
    #[must_use]
    pub fn get(&self, day: Weekday) -> Option<&PlannedDay> {
        self.days.iter().find(|planned| planned.day == day)
    }

    /// Number of days that fell back to the placeholder
    #[must_use]
    pub fn placeholder_days(&self) -> usize {
        self.days
            .iter()
            .filter(|planned| planned.recipe.is_placeholder())
            .count()
    }
}

impl Serialize for WeeklyMealPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for planned in &self.days {
            map.serialize_entry(day_name(planned.day), &planned.recipe)?;
        }
        map.end()
    }
}

/// Drafts meal ideas and turns them into recipes
#[derive(Debug, Clone)]
pub struct MealPlanner {
    caller: StructuredOutputCaller,
    workflow: Arc<RecipeWorkflow>,
}

impl MealPlanner {
    /// Create a planner sharing the given workflow
    #[must_use]
    pub const fn new(caller: StructuredOutputCaller, workflow: Arc<RecipeWorkflow>) -> Self {
        Self { caller, workflow }
    }

    /// Ask the model for meal ideas
    ///
    /// # Errors
    ///
    /// Returns `Schema` or `Transport` from the model call.
    #[instrument(skip_all)]
    pub async fn draft(&self, profile: &UserProfile) -> Result<DraftMealPlan, WorkflowError> {
        let context = vec![
            ChatMessage::system(MEAL_PLANNER_PROMPT),
            ChatMessage::user(format!("My preferences are:\n{}", profile.describe())),
        ];
        self.caller.generate(context).await
    }

    /// Draft a week of meals and produce a recipe for each day
    ///
    /// Days run one after another. A day whose meal idea is missing or blank
    /// gets the placeholder recipe.
    ///
    /// # Errors
    ///
    /// Returns an error only if drafting the meal ideas fails.
    #[instrument(skip_all)]
    pub async fn plan_week(&self, profile: &UserProfile) -> Result<WeeklyMealPlan, WorkflowError> {
        let draft = self.draft(profile).await?;
        info!(meals = draft.meals.len(), "Meal ideas drafted");

        let mut meals = draft.meals.into_iter();
        let mut days = Vec::with_capacity(WEEK.len());
        for day in WEEK {
            let meal = meals
                .next()
                .map(|meal| meal.trim().to_owned())
                .filter(|meal| !meal.is_empty());
            let recipe = match &meal {
                Some(dish) => self.workflow.run(dish, profile).await,
                None => Recipe::placeholder(),
            };
            info!(day = day_name(day), placeholder = recipe.is_placeholder(), "Day planned");
            days.push(PlannedDay { day, meal, recipe });
        }

        Ok(WeeklyMealPlan { days })
    }
}
