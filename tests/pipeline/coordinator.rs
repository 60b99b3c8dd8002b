use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use growl::{
    order::{PlacementOutcome, SimulationReason},
    pipeline::{EventReport, PipelineState},
    recommender::{FallbackReason, RecommendationSource, generator_failed_fallback},
    types::{MealSize, Recommendation, TriggerOutcome, UserProfile},
};

use crate::support::{
    CountingOrderBackend, GOOD_REPLY, Reply, ScriptedGenerator, coordinator,
    coordinator_with_backend, pipeline_config,
};

fn at(base: Instant, secs: u64) -> Instant {
    base + Duration::from_secs(secs)
}

#[tokio::test]
async fn given_default_thresholds_when_events_arrive_then_scenario_outcomes_match() {
    let generator = ScriptedGenerator::new(Reply::Text(GOOD_REPLY));
    let coordinator = coordinator(pipeline_config(), generator.clone());
    let base = Instant::now();

    assert_eq!(
        coordinator.handle_event_at(at(base, 0)).await,
        TriggerOutcome::Monitoring { count: 1 }
    );
    assert_eq!(
        coordinator.handle_event_at(at(base, 10)).await,
        TriggerOutcome::Monitoring { count: 2 }
    );
    assert_eq!(
        coordinator.handle_event_at(at(base, 20)).await,
        TriggerOutcome::Ordered {
            order: Recommendation::new("Shetty Lunch Home", "Neer Dosa", "Light and low fat"),
        }
    );
    assert_eq!(
        coordinator.handle_event_at(at(base, 21)).await,
        TriggerOutcome::Muted
    );
    assert_eq!(
        coordinator.handle_event_at(at(base, 3700)).await,
        TriggerOutcome::Monitoring { count: 1 }
    );
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn given_events_spread_beyond_window_when_counting_then_old_events_are_evicted() {
    let coordinator = coordinator(
        pipeline_config(),
        ScriptedGenerator::new(Reply::Text(GOOD_REPLY)),
    );
    let base = Instant::now();

    coordinator.handle_event_at(at(base, 0)).await;
    coordinator.handle_event_at(at(base, 100)).await;
    assert_eq!(
        coordinator.handle_event_at(at(base, 120)).await,
        TriggerOutcome::Monitoring { count: 2 },
        "event at t=0 is exactly one window old and must be evicted"
    );
}

#[tokio::test]
async fn given_failing_generator_when_threshold_crossed_then_fallback_is_ordered() {
    let coordinator = coordinator(pipeline_config(), ScriptedGenerator::new(Reply::Fail));
    let base = Instant::now();

    coordinator.ingest_at(at(base, 0)).await;
    coordinator.ingest_at(at(base, 1)).await;
    let EventReport::Triggered(report) = coordinator.ingest_at(at(base, 2)).await else {
        panic!("third event should trigger");
    };

    assert_eq!(report.recommendation, generator_failed_fallback());
    assert_eq!(
        report.source,
        RecommendationSource::Fallback {
            reason: FallbackReason::GeneratorFailed
        }
    );
    assert_eq!(
        report.placement,
        PlacementOutcome::Simulated {
            reason: SimulationReason::Configured
        }
    );
    assert_eq!(report.meal_size, MealSize::Small);
}

#[tokio::test]
async fn given_trigger_when_status_queried_then_window_is_empty_and_gate_is_muted() {
    let coordinator = coordinator(
        pipeline_config(),
        ScriptedGenerator::new(Reply::Text(GOOD_REPLY)),
    );
    let base = Instant::now();

    for secs in [0, 1, 2] {
        coordinator.handle_event_at(at(base, secs)).await;
    }
    // muted events must not refill the cleared window
    coordinator.handle_event_at(at(base, 3)).await;
    coordinator.handle_event_at(at(base, 4)).await;

    let status = coordinator.status_at(at(base, 5)).await;
    assert_eq!(status.state, PipelineState::Muted);
    assert_eq!(status.count, 0);
    assert_eq!(status.mute_remaining, Some(Duration::from_secs(3597)));

    let status = coordinator.status_at(at(base, 2 + 3600)).await;
    assert_eq!(status.state, PipelineState::Monitoring);
    assert_eq!(status.mute_remaining, None);
}

#[tokio::test]
async fn given_equal_thresholds_when_triggered_then_big_meal_is_requested() {
    let generator = ScriptedGenerator::new(Reply::Text(GOOD_REPLY));
    let mut config = pipeline_config();
    config.min_count = 5;
    config.big_meal_count = 5;
    let coordinator = coordinator(config, generator.clone());
    let base = Instant::now();

    let mut last = None;
    for secs in 0..5 {
        last = Some(coordinator.ingest_at(at(base, secs)).await);
    }

    let Some(EventReport::Triggered(report)) = last else {
        panic!("fifth event should trigger");
    };
    assert_eq!(report.meal_size, MealSize::Big);
    assert!(generator.prompts()[0].contains("Meal Size Request: Big."));
}

#[tokio::test]
async fn given_updated_profile_when_triggered_then_generator_sees_new_snapshot() {
    let generator = ScriptedGenerator::new(Reply::Text(GOOD_REPLY));
    let coordinator = coordinator(pipeline_config(), generator.clone());
    assert_eq!(coordinator.profile().await.goals, "Stay healthy");

    coordinator
        .update_profile(UserProfile {
            conditions: vec!["diabetes".to_string()],
            restrictions: vec![" maida ".to_string(), "".to_string()],
            goals: "Lose weight".to_string(),
        })
        .await;
    assert_eq!(coordinator.profile().await.restrictions, vec!["maida"]);

    let base = Instant::now();
    for secs in [0, 1, 2] {
        coordinator.handle_event_at(at(base, secs)).await;
    }

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("- Conditions: diabetes"));
    assert!(prompts[0].contains("- Restrictions: maida"));
    assert!(prompts[0].contains("- Goals: Lose weight"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_burst_when_threshold_crossed_then_exactly_one_order_is_placed() {
    let generator = ScriptedGenerator::with_delay(
        Reply::Text(GOOD_REPLY),
        Duration::from_millis(50),
    );
    let backend = Arc::new(CountingOrderBackend::default());
    let coordinator = Arc::new(coordinator_with_backend(generator.clone(), backend.clone()));

    let tasks = (0..12)
        .map(|_| {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.handle_event().await })
        })
        .collect::<Vec<_>>();

    let mut ordered = 0;
    let mut monitoring = 0;
    let mut muted = 0;
    for task in tasks {
        match task.await.expect("event task should not panic") {
            TriggerOutcome::Ordered { .. } => ordered += 1,
            TriggerOutcome::Monitoring { .. } => monitoring += 1,
            TriggerOutcome::Muted => muted += 1,
        }
    }

    assert_eq!(ordered, 1);
    assert_eq!(monitoring, 2);
    assert_eq!(muted, 9);
    assert_eq!(generator.calls(), 1);
    let orders = backend.orders.lock().expect("order log lock");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].dish, "Neer Dosa");
    assert_eq!(orders[0].phone, "9876543210");
}
