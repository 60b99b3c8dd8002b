use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROFILE_GOALS: &str = "Stay healthy";
pub const UPDATED_PROFILE_GOALS: &str = "Healthy living";

fn default_updated_goals() -> String {
    UPDATED_PROFILE_GOALS.to_string()
}

/// Medical profile the recommender plans around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub restrictions: Vec<String>,
    #[serde(default = "default_updated_goals")]
    pub goals: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            restrictions: Vec::new(),
            goals: DEFAULT_PROFILE_GOALS.to_string(),
        }
    }
}

impl UserProfile {
    /// Trims every entry and drops blanks. A blank goal becomes the update default.
    pub fn normalized(self) -> Self {
        let goals = self.goals.trim();
        Self {
            conditions: normalize_entries(self.conditions),
            restrictions: normalize_entries(self.restrictions),
            goals: if goals.is_empty() {
                default_updated_goals()
            } else {
                goals.to_string()
            },
        }
    }
}

fn normalize_entries(entries: Vec<String>) -> Vec<String> {
    entries
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub restaurant: String,
    pub dish: String,
    pub rationale: String,
}

impl Recommendation {
    pub fn new(
        restaurant: impl Into<String>,
        dish: impl Into<String>,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            restaurant: restaurant.into(),
            dish: dish.into(),
            rationale: rationale.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        [&self.restaurant, &self.dish, &self.rationale]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSize {
    Small,
    Big,
}

impl MealSize {
    pub fn as_str(self) -> &'static str {
        match self {
            MealSize::Small => "small",
            MealSize::Big => "big",
        }
    }
}

impl fmt::Display for MealSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the ingestion boundary reports for one event. Never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TriggerOutcome {
    Monitoring { count: usize },
    Muted,
    Ordered { order: Recommendation },
}
