use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use growl::{
    order::{
        OrderBackend, OrderBackendConfig, OrderConfig, OrderDispatcher, OrderError,
        OrderErrorKind, OrderRequest, PlacementOutcome, SimulationReason, error,
    },
    types::Recommendation,
};

enum Answer {
    Confirm,
    Refuse,
    Error,
    Hang,
}

struct StubBackend {
    answer: Answer,
    calls: AtomicUsize,
}

impl StubBackend {
    fn new(answer: Answer) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl OrderBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn place(&self, _req: &OrderRequest) -> Result<bool, OrderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answer {
            Answer::Confirm => Ok(true),
            Answer::Refuse => Ok(false),
            Answer::Error => Err(error::transport("agent unreachable")),
            Answer::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(true)
            }
        }
    }
}

fn order_config(phone: Option<&str>, confirmation_timeout_ms: u64) -> OrderConfig {
    let mut config = OrderConfig {
        confirmation_timeout_ms,
        ..OrderConfig::default()
    };
    config.contact.phone = phone.map(str::to_string);
    config
}

fn recommendation() -> Recommendation {
    Recommendation::new("Machali", "Fish Thali", "Omega-3")
}

async fn dispatch_with(answer: Answer, phone: Option<&str>) -> (PlacementOutcome, usize) {
    let backend = StubBackend::new(answer);
    let dispatcher = OrderDispatcher::new(Some(backend.clone()), &order_config(phone, 100));
    let outcome = dispatcher.dispatch(1, &recommendation()).await;
    (outcome, backend.calls.load(Ordering::SeqCst))
}

#[tokio::test]
async fn given_simulated_backend_when_dispatching_then_order_is_simulated() {
    let dispatcher = OrderDispatcher::simulated();
    assert_eq!(dispatcher.backend_name(), "simulated");

    assert_eq!(
        dispatcher.dispatch(1, &recommendation()).await,
        PlacementOutcome::Simulated {
            reason: SimulationReason::Configured
        }
    );
    assert!(dispatcher.place(2, &recommendation()).await);
}

#[tokio::test]
async fn given_confirming_backend_when_dispatching_then_order_is_placed() {
    let (outcome, calls) = dispatch_with(Answer::Confirm, Some("9876543210")).await;
    assert_eq!(outcome, PlacementOutcome::Placed { backend: "stub" });
    assert!(outcome.is_real());
    assert_eq!(calls, 1);
}

#[tokio::test]
async fn given_refusing_backend_when_dispatching_then_simulation_takes_over() {
    let (outcome, _) = dispatch_with(Answer::Refuse, Some("9876543210")).await;
    assert_eq!(
        outcome,
        PlacementOutcome::Simulated {
            reason: SimulationReason::BackendRefused
        }
    );
}

#[tokio::test]
async fn given_refusing_or_erroring_backend_when_placing_then_place_still_succeeds() {
    for answer in [Answer::Refuse, Answer::Error] {
        let backend = StubBackend::new(answer);
        let dispatcher =
            OrderDispatcher::new(Some(backend.clone()), &order_config(Some("9876543210"), 100));

        assert!(dispatcher.place(3, &recommendation()).await);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn given_erroring_backend_when_dispatching_then_simulation_takes_over() {
    let (outcome, _) = dispatch_with(Answer::Error, Some("9876543210")).await;
    assert_eq!(
        outcome,
        PlacementOutcome::Simulated {
            reason: SimulationReason::BackendError
        }
    );
}

#[tokio::test]
async fn given_hanging_backend_when_confirmation_times_out_then_simulation_takes_over() {
    let (outcome, calls) = dispatch_with(Answer::Hang, Some("9876543210")).await;
    assert_eq!(
        outcome,
        PlacementOutcome::Simulated {
            reason: SimulationReason::TimedOut
        }
    );
    assert_eq!(calls, 1);
}

#[tokio::test]
async fn given_missing_phone_when_dispatching_then_backend_is_skipped() {
    let (outcome, calls) = dispatch_with(Answer::Confirm, Some("  ")).await;
    assert_eq!(
        outcome,
        PlacementOutcome::Simulated {
            reason: SimulationReason::MissingContact
        }
    );
    assert_eq!(calls, 0);
}

#[tokio::test]
async fn given_shutdown_when_confirmation_pending_then_simulation_reports_cancelled() {
    let shutdown = CancellationToken::new();
    let dispatcher = OrderDispatcher::new(
        Some(StubBackend::new(Answer::Hang)),
        &order_config(Some("9876543210"), 60_000),
    )
    .with_shutdown(shutdown.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();
    });
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        dispatcher.dispatch(1, &recommendation()),
    )
    .await
    .expect("cancellation must end the wait");
    canceller.await.expect("canceller should finish");

    assert_eq!(
        outcome,
        PlacementOutcome::Simulated {
            reason: SimulationReason::Cancelled
        }
    );
}

#[test]
fn given_webhook_with_bad_scheme_when_building_from_config_then_invalid_request_is_returned() {
    let config = OrderConfig {
        backend: OrderBackendConfig::Webhook {
            endpoint: "ftp://agent.local/orders".to_string(),
        },
        ..OrderConfig::default()
    };

    let err = match OrderDispatcher::from_config(&config) {
        Ok(_) => panic!("ftp endpoint should be rejected"),
        Err(err) => err,
    };
    assert_eq!(err.kind, OrderErrorKind::InvalidRequest);
}
