use async_trait::async_trait;

use crate::recommender::error::GeneratorError;

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub request_id: String,
    pub prompt: String,
    pub max_tokens: u64,
}

/// External text generator. Returns the raw reply text; shaping it into a
/// recommendation is the client's job.
#[async_trait]
pub trait GeneratorPort: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn generate(&self, req: GenerationRequest) -> Result<String, GeneratorError>;
}
