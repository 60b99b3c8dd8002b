use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use tokio::sync::Mutex;

use crate::{
    order::OrderDispatcher,
    pipeline::{
        cooldown::CooldownGate,
        profile::ProfileStore,
        types::{EventReport, PipelineConfig, PipelineState, PipelineStatus, TriggerReport},
        window::EventWindow,
    },
    recommender::RecommendationClient,
    types::{MealSize, TriggerOutcome, UserProfile},
};

#[derive(Debug)]
struct GateAndWindow {
    gate: CooldownGate,
    window: EventWindow,
}

enum Decision {
    Muted,
    Monitoring { count: usize },
    Trigger { count: usize, meal_size: MealSize },
}

/// Owns the window, the gate and the profile. The gate check, window update
/// and trigger commit happen under one lock; the recommend and place calls run
/// after it is released, with the gate already armed.
pub struct Coordinator {
    config: PipelineConfig,
    state: Mutex<GateAndWindow>,
    profiles: ProfileStore,
    recommender: RecommendationClient,
    dispatcher: OrderDispatcher,
    trigger_seq: AtomicU64,
}

impl Coordinator {
    pub fn new(
        config: PipelineConfig,
        recommender: RecommendationClient,
        dispatcher: OrderDispatcher,
    ) -> Self {
        let profile = config.profile.clone().unwrap_or_default().normalized();
        Self {
            state: Mutex::new(GateAndWindow {
                gate: CooldownGate::new(config.cooldown()),
                window: EventWindow::new(config.window()),
            }),
            profiles: ProfileStore::new(profile),
            recommender,
            dispatcher,
            trigger_seq: AtomicU64::new(0),
            config,
        }
    }

    pub async fn handle_event(&self) -> TriggerOutcome {
        self.handle_event_at(Instant::now()).await
    }

    pub async fn handle_event_at(&self, now: Instant) -> TriggerOutcome {
        self.ingest_at(now).await.into_outcome()
    }

    pub async fn ingest_at(&self, now: Instant) -> EventReport {
        match self.decide(now).await {
            Decision::Muted => {
                tracing::debug!(target: "pipeline", "event_muted");
                EventReport::Muted
            }
            Decision::Monitoring { count } => {
                tracing::debug!(
                    target: "pipeline",
                    count = count,
                    min_count = self.config.min_count,
                    "event_recorded"
                );
                EventReport::Monitoring { count }
            }
            Decision::Trigger { count, meal_size } => {
                EventReport::Triggered(self.trigger(count, meal_size).await)
            }
        }
    }

    pub async fn update_profile(&self, profile: UserProfile) {
        let profile = profile.normalized();
        tracing::info!(
            target: "pipeline",
            conditions = profile.conditions.len(),
            restrictions = profile.restrictions.len(),
            "profile_updated"
        );
        self.profiles.replace(profile).await;
    }

    pub async fn profile(&self) -> Arc<UserProfile> {
        self.profiles.snapshot().await
    }

    pub async fn status(&self) -> PipelineStatus {
        self.status_at(Instant::now()).await
    }

    pub async fn status_at(&self, now: Instant) -> PipelineStatus {
        let mut guard = self.state.lock().await;
        let mute_remaining = guard.gate.remaining(now);
        PipelineStatus {
            state: if mute_remaining.is_some() {
                PipelineState::Muted
            } else {
                PipelineState::Monitoring
            },
            count: guard.window.count_at(now),
            mute_remaining,
        }
    }

    async fn decide(&self, now: Instant) -> Decision {
        let mut guard = self.state.lock().await;
        if guard.gate.is_muted(now) {
            return Decision::Muted;
        }

        let count = guard.window.record_and_count(now);
        if count < self.config.min_count {
            return Decision::Monitoring { count };
        }

        guard.window.clear();
        guard.gate.arm(now);
        Decision::Trigger {
            count,
            meal_size: self.config.meal_size_for(count),
        }
    }

    async fn trigger(&self, count: usize, meal_size: MealSize) -> TriggerReport {
        let trigger_id = self.trigger_seq.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            target: "pipeline",
            trigger_id = trigger_id,
            count = count,
            meal_size = %meal_size,
            "trigger_fired"
        );

        let profile = self.profiles.snapshot().await;
        let recommended = self
            .recommender
            .recommend(trigger_id, &profile, meal_size)
            .await;
        let placement = self
            .dispatcher
            .dispatch(trigger_id, &recommended.recommendation)
            .await;

        tracing::info!(
            target: "pipeline",
            trigger_id = trigger_id,
            fallback_recommendation = recommended.source.is_fallback(),
            placement = ?placement,
            "trigger_completed"
        );

        TriggerReport {
            trigger_id,
            count,
            meal_size,
            recommendation: recommended.recommendation,
            source: recommended.source,
            placement,
        }
    }
}
