//! Provider adapter implementations.
//!
//! Contains concrete implementations of the [`ProviderAdapter`] trait
//! defined in `parley-core`, a factory ([`create_adapter`]) that constructs
//! the right adapter from a [`ProviderConfig`], and the static pricing table.
//!
//! [`ProviderAdapter`]: parley_core::llm::provider::ProviderAdapter

pub mod anthropic;
pub mod http;
pub mod image;
pub mod openai;
pub mod pricing;

use std::time::Duration;

use secrecy::SecretString;

use parley_core::llm::box_provider::BoxProviderAdapter;
use parley_types::config::ProviderConfig;
use parley_types::llm::{ProviderError, ProviderId};

use self::anthropic::AnthropicAdapter;
use self::image::ImageGenAdapter;
use self::openai::OpenAiChatAdapter;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create a [`BoxProviderAdapter`] from a [`ProviderConfig`].
///
/// # Arguments
///
/// * `config` - Resolved provider configuration (model, token ceiling, base URL)
/// * `api_key` - The resolved API key
///
/// # Errors
///
/// Returns [`ProviderError::Transport`] if the HTTP client cannot be built.
pub fn create_adapter(
    config: &ProviderConfig,
    api_key: SecretString,
) -> Result<BoxProviderAdapter, ProviderError> {
    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {e}")))?;

    let adapter = match config.id {
        ProviderId::OpenAi => {
            let adapter = OpenAiChatAdapter::new(client, api_key, config.model.clone(), config.max_tokens);
            match &config.base_url {
                Some(url) => BoxProviderAdapter::new(adapter.with_base_url(url.clone())),
                None => BoxProviderAdapter::new(adapter),
            }
        }
        ProviderId::Anthropic => {
            let adapter = AnthropicAdapter::new(client, api_key, config.model.clone(), config.max_tokens);
            match &config.base_url {
                Some(url) => BoxProviderAdapter::new(adapter.with_base_url(url.clone())),
                None => BoxProviderAdapter::new(adapter),
            }
        }
        ProviderId::ImageGen => {
            let adapter = ImageGenAdapter::new(client, api_key, config.model.clone());
            match &config.base_url {
                Some(url) => BoxProviderAdapter::new(adapter.with_base_url(url.clone())),
                None => BoxProviderAdapter::new(adapter),
            }
        }
    };
    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_adapter_for_each_provider() {
        for id in ProviderId::ALL {
            let config = ProviderConfig::defaults_for(id);
            let adapter = create_adapter(&config, SecretString::from("sk-test")).unwrap();
            assert_eq!(adapter.id(), id);
            assert_eq!(adapter.model(), config.model);
        }
    }

    #[test]
    fn test_capabilities_follow_config() {
        let mut config = ProviderConfig::defaults_for(ProviderId::Anthropic);
        config.max_tokens = 512;
        config.base_url = Some("http://localhost:8080".to_string());
        let adapter = create_adapter(&config, SecretString::from("k")).unwrap();
        assert_eq!(adapter.capabilities().max_output_tokens, 512);
        assert!(adapter.capabilities().accepts_attachments);

        let image = create_adapter(
            &ProviderConfig::defaults_for(ProviderId::ImageGen),
            SecretString::from("k"),
        )
        .unwrap();
        assert!(!image.capabilities().accepts_attachments);
    }
}
