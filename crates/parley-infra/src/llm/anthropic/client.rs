//! AnthropicAdapter -- concrete [`ProviderAdapter`] for Anthropic Claude.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::provider::ProviderAdapter;
use parley_types::llm::{
    Payload, ProviderCapabilities, ProviderError, ProviderId, ProviderRequest, ProviderResponse,
    ReportedUsage,
};

use super::types::{
    AnthropicContent, AnthropicContentBlock, AnthropicImageSource, AnthropicInputBlock,
    AnthropicMessage, AnthropicRequest, AnthropicResponse,
};
use crate::llm::http::{base64_data, error_from_response, map_send_error};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic Claude adapter.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// constructing HTTP request headers.
pub struct AnthropicAdapter {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl AnthropicAdapter {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(client: reqwest::Client, api_key: SecretString, model: String, max_tokens: u32) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            capabilities: ProviderCapabilities {
                accepts_attachments: true,
                max_output_tokens: max_tokens,
            },
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Convert a generic [`ProviderRequest`] into an [`AnthropicRequest`].
    fn to_anthropic_request(&self, request: &ProviderRequest) -> AnthropicRequest {
        let content = match &request.attachment {
            Some(attachment) => AnthropicContent::Blocks(vec![
                AnthropicInputBlock::Text {
                    text: request.prompt.clone(),
                },
                AnthropicInputBlock::Image {
                    source: AnthropicImageSource {
                        source_type: "base64",
                        media_type: attachment.media_type().mime().to_string(),
                        data: base64_data(attachment),
                    },
                },
            ]),
            None => AnthropicContent::Text(request.prompt.clone()),
        };

        AnthropicRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content,
            }],
            system: request.system.clone(),
        }
    }
}

// AnthropicAdapter intentionally does NOT derive Debug.

impl ProviderAdapter for AnthropicAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let body = self.to_anthropic_request(request);

        let response = self
            .client
            .post(self.url("/v1/messages"))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let resp: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Deserialization(format!("failed to parse response: {e}")))?;

        let text = resp
            .content
            .iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text.as_str()),
                AnthropicContentBlock::Other => None,
            })
            .collect::<String>();

        tracing::trace!(id = %resp.id, stop_reason = ?resp.stop_reason, "anthropic response");

        Ok(ProviderResponse {
            payload: Payload::Text(text),
            model: resp.model,
            usage: resp.usage.map(|u| ReportedUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }
}
