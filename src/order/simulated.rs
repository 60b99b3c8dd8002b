use async_trait::async_trait;

use crate::{
    order::{
        error::OrderError,
        ports::{OrderBackend, OrderRequest},
        types::SimulationReason,
    },
    types::Recommendation,
};

/// No-op backend. Logs the order and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedOrderBackend;

impl SimulatedOrderBackend {
    pub fn simulate(
        &self,
        trigger_id: u64,
        recommendation: &Recommendation,
        reason: SimulationReason,
    ) {
        tracing::info!(
            target: "order",
            trigger_id = trigger_id,
            reason = reason.as_str(),
            restaurant = %recommendation.restaurant,
            dish = %recommendation.dish,
            rationale = %recommendation.rationale,
            "order_simulated"
        );
    }
}

#[async_trait]
impl OrderBackend for SimulatedOrderBackend {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn place(&self, req: &OrderRequest) -> Result<bool, OrderError> {
        let recommendation = Recommendation::new(&req.restaurant, &req.dish, &req.rationale);
        self.simulate(req.trigger_id, &recommendation, SimulationReason::Configured);
        Ok(true)
    }
}
