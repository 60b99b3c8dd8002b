use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::recommender::error::{GeneratorError, GeneratorErrorKind, invalid_request};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialRef {
    Env { var: String },
    InlineToken { token: String },
    None,
}

impl Default for CredentialRef {
    fn default() -> Self {
        CredentialRef::Env {
            var: "ANTHROPIC_API_KEY".to_string(),
        }
    }
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// `Ok(None)` means the backend is called without a credential.
    async fn resolve(&self, reference: &CredentialRef) -> Result<Option<String>, GeneratorError>;
}

#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn resolve(&self, reference: &CredentialRef) -> Result<Option<String>, GeneratorError> {
        match reference {
            CredentialRef::Env { var } => match env::var(var) {
                Ok(token) if !token.trim().is_empty() => Ok(Some(token)),
                _ => Err(GeneratorError::new(
                    GeneratorErrorKind::Authentication,
                    format!("missing credential environment variable {var}"),
                )),
            },
            CredentialRef::InlineToken { token } => {
                if token.trim().is_empty() {
                    return Err(invalid_request("inline credential token cannot be empty"));
                }
                Ok(Some(token.clone()))
            }
            CredentialRef::None => Ok(None),
        }
    }
}
