//! Chat collaborator for small talk
//!
//! The planning flows never depend on it; the router consults it only when
//! no flow or command claims the input.

use std::sync::Arc;

use tracing::debug;

mod client;
mod error;
mod openai;

#[cfg(test)]
pub use client::mock;
pub use client::{ChatClient, OfflineClient};
pub use error::LlmError;
pub use openai::OpenAIClient;

use crate::config::LlmConfig;

/// Create a chat client based on the provider specified in config
///
/// Supports "openai" (any compatible endpoint) and "none".
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "openai" => {
            debug!("create_client: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(config)?))
        }
        "none" => {
            debug!("create_client: chat disabled");
            Ok(Arc::new(OfflineClient))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::Config(format!(
                "Unknown LLM provider: '{}'. Supported: openai, none",
                other
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_none() {
        let config = LlmConfig {
            provider: "none".to_string(),
            ..LlmConfig::default()
        };
        assert!(create_client(&config).is_ok());
    }

    #[test]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..LlmConfig::default()
        };
        let err = create_client(&config).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
