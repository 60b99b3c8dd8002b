use async_trait::async_trait;
use serde::Serialize;

use crate::{
    order::{
        error::OrderError,
        types::{ContactDetails, Platform},
    },
    types::Recommendation,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub trigger_id: u64,
    pub restaurant: String,
    pub dish: String,
    pub rationale: String,
    pub platform: Platform,
    pub phone: String,
    pub location: String,
}

impl OrderRequest {
    pub fn new(
        trigger_id: u64,
        recommendation: &Recommendation,
        platform: Platform,
        phone: &str,
        contact: &ContactDetails,
    ) -> Self {
        Self {
            trigger_id,
            restaurant: recommendation.restaurant.clone(),
            dish: recommendation.dish.clone(),
            rationale: recommendation.rationale.clone(),
            platform,
            phone: phone.to_string(),
            location: contact.location.clone(),
        }
    }
}

/// An ordering integration. `Ok(false)` is a clean refusal; `Err` is an
/// operational failure.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn place(&self, req: &OrderRequest) -> Result<bool, OrderError>;
}
