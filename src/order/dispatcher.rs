use std::{sync::Arc, time::Duration};

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::{
    order::{
        error::OrderError,
        ports::{OrderBackend, OrderRequest},
        simulated::SimulatedOrderBackend,
        types::{
            ContactDetails, OrderBackendConfig, OrderConfig, PlacementOutcome, Platform,
            SimulationReason,
        },
        webhook::WebhookOrderBackend,
    },
    types::Recommendation,
};

enum Attempt {
    Confirmed(bool),
    Errored(OrderError),
    TimedOut,
    Cancelled,
}

/// Routes a recommendation to the configured backend. Refusals and operational
/// failures of the real backend fall back to the simulated one.
pub struct OrderDispatcher {
    primary: Option<Arc<dyn OrderBackend>>,
    simulated: SimulatedOrderBackend,
    platform: Platform,
    contact: ContactDetails,
    confirmation_timeout: Duration,
    shutdown: CancellationToken,
}

impl OrderDispatcher {
    pub fn new(primary: Option<Arc<dyn OrderBackend>>, config: &OrderConfig) -> Self {
        Self {
            primary,
            simulated: SimulatedOrderBackend,
            platform: config.platform,
            contact: config.contact.clone(),
            confirmation_timeout: config.confirmation_timeout(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn simulated() -> Self {
        Self::new(None, &OrderConfig::default())
    }

    pub fn from_config(config: &OrderConfig) -> Result<Self, OrderError> {
        let primary: Option<Arc<dyn OrderBackend>> = match &config.backend {
            OrderBackendConfig::Simulated => None,
            OrderBackendConfig::Webhook { endpoint } => {
                Some(Arc::new(WebhookOrderBackend::new(endpoint)?))
            }
        };

        let dispatcher = Self::new(primary, config);
        if dispatcher.primary.is_some() && dispatcher.contact.phone().is_none() {
            tracing::warn!(
                target: "order",
                platform = %dispatcher.platform,
                "contact_phone_missing_orders_will_be_simulated"
            );
        }
        Ok(dispatcher)
    }

    /// Cancelling this token abandons an in-flight confirmation wait.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.primary
            .as_ref()
            .map(|backend| backend.name())
            .unwrap_or_else(|| self.simulated.name())
    }

    /// Places or simulates the order. Always true, since every failure of the
    /// real backend ends in simulation.
    pub async fn place(&self, trigger_id: u64, recommendation: &Recommendation) -> bool {
        self.dispatch(trigger_id, recommendation).await;
        true
    }

    pub async fn dispatch(
        &self,
        trigger_id: u64,
        recommendation: &Recommendation,
    ) -> PlacementOutcome {
        let Some(backend) = self.primary.as_ref() else {
            return self.simulate(trigger_id, recommendation, SimulationReason::Configured);
        };

        let Some(phone) = self.contact.phone() else {
            tracing::warn!(
                target: "order",
                trigger_id = trigger_id,
                backend = backend.name(),
                "contact_phone_missing"
            );
            return self.simulate(trigger_id, recommendation, SimulationReason::MissingContact);
        };

        let request = OrderRequest::new(
            trigger_id,
            recommendation,
            self.platform,
            phone,
            &self.contact,
        );
        tracing::info!(
            target: "order",
            trigger_id = trigger_id,
            backend = backend.name(),
            platform = %self.platform,
            restaurant = %request.restaurant,
            dish = %request.dish,
            "order_dispatched"
        );

        let attempt = tokio::select! {
            _ = self.shutdown.cancelled() => Attempt::Cancelled,
            result = timeout(self.confirmation_timeout, backend.place(&request)) => match result {
                Ok(Ok(confirmed)) => Attempt::Confirmed(confirmed),
                Ok(Err(err)) => Attempt::Errored(err),
                Err(_) => Attempt::TimedOut,
            },
        };

        match attempt {
            Attempt::Confirmed(true) => {
                tracing::info!(
                    target: "order",
                    trigger_id = trigger_id,
                    backend = backend.name(),
                    "order_placed"
                );
                PlacementOutcome::Placed {
                    backend: backend.name(),
                }
            }
            Attempt::Confirmed(false) => {
                tracing::warn!(
                    target: "order",
                    trigger_id = trigger_id,
                    backend = backend.name(),
                    "order_refused"
                );
                self.simulate(trigger_id, recommendation, SimulationReason::BackendRefused)
            }
            Attempt::Errored(err) => {
                tracing::warn!(
                    target: "order",
                    trigger_id = trigger_id,
                    backend = backend.name(),
                    kind = ?err.kind,
                    error = %err,
                    "order_backend_error"
                );
                self.simulate(trigger_id, recommendation, SimulationReason::BackendError)
            }
            Attempt::TimedOut => {
                tracing::warn!(
                    target: "order",
                    trigger_id = trigger_id,
                    backend = backend.name(),
                    timeout_ms = self.confirmation_timeout.as_millis() as u64,
                    "order_confirmation_timeout"
                );
                self.simulate(trigger_id, recommendation, SimulationReason::TimedOut)
            }
            Attempt::Cancelled => {
                tracing::warn!(
                    target: "order",
                    trigger_id = trigger_id,
                    backend = backend.name(),
                    "order_confirmation_cancelled"
                );
                self.simulate(trigger_id, recommendation, SimulationReason::Cancelled)
            }
        }
    }

    fn simulate(
        &self,
        trigger_id: u64,
        recommendation: &Recommendation,
        reason: SimulationReason,
    ) -> PlacementOutcome {
        self.simulated.simulate(trigger_id, recommendation, reason);
        PlacementOutcome::Simulated { reason }
    }
}
