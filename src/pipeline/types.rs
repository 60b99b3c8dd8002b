use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    order::PlacementOutcome,
    recommender::RecommendationSource,
    types::{MealSize, Recommendation, TriggerOutcome, UserProfile},
};

fn default_window_secs() -> u64 {
    120
}

fn default_min_count() -> usize {
    3
}

fn default_big_meal_count() -> usize {
    5
}

fn default_cooldown_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_min_count")]
    pub min_count: usize,
    #[serde(default = "default_big_meal_count")]
    pub big_meal_count: usize,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            min_count: default_min_count(),
            big_meal_count: default_big_meal_count(),
            cooldown_secs: default_cooldown_secs(),
            profile: None,
        }
    }
}

impl PipelineConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn meal_size_for(&self, count: usize) -> MealSize {
        if count >= self.big_meal_count {
            MealSize::Big
        } else {
            MealSize::Small
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Monitoring,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStatus {
    pub state: PipelineState,
    pub count: usize,
    pub mute_remaining: Option<Duration>,
}

/// Everything a trigger did, including which fallbacks fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerReport {
    pub trigger_id: u64,
    pub count: usize,
    pub meal_size: MealSize,
    pub recommendation: Recommendation,
    pub source: RecommendationSource,
    pub placement: PlacementOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventReport {
    Muted,
    Monitoring { count: usize },
    Triggered(TriggerReport),
}

impl EventReport {
    pub fn into_outcome(self) -> TriggerOutcome {
        match self {
            EventReport::Muted => TriggerOutcome::Muted,
            EventReport::Monitoring { count } => TriggerOutcome::Monitoring { count },
            EventReport::Triggered(report) => TriggerOutcome::Ordered {
                order: report.recommendation,
            },
        }
    }
}
