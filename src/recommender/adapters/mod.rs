use std::sync::Arc;

use crate::recommender::{
    credentials::CredentialProvider,
    error::GeneratorError,
    ports::GeneratorPort,
    types::{GeneratorDialect, RecommenderConfig},
};

pub mod anthropic;
pub mod http_common;
pub mod openai_compatible;

pub fn build_generator(
    config: &RecommenderConfig,
    credentials: Arc<dyn CredentialProvider>,
) -> Result<Arc<dyn GeneratorPort>, GeneratorError> {
    let generator: Arc<dyn GeneratorPort> = match config.dialect {
        GeneratorDialect::Anthropic => Arc::new(anthropic::AnthropicGenerator::new(
            config.endpoint.clone(),
            config.model.clone(),
            config.credential.clone(),
            credentials,
            config.request_timeout(),
        )?),
        GeneratorDialect::OpenAiCompatible => {
            Arc::new(openai_compatible::OpenAiCompatibleGenerator::new(
                config.endpoint.clone(),
                config.model.clone(),
                config.credential.clone(),
                credentials,
                config.request_timeout(),
            )?)
        }
    };
    Ok(generator)
}
