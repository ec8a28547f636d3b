//! OpenAI chat completions adapter.
//!
//! Talks to `POST {base}/chat/completions` directly over reqwest. The mode
//! instruction becomes a system message; an attachment becomes an
//! `image_url` part carrying a `data:` URL.

pub mod types;

use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::provider::ProviderAdapter;
use parley_types::llm::{
    Payload, ProviderCapabilities, ProviderError, ProviderId, ProviderRequest, ProviderResponse,
    ReportedUsage,
};

use self::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatContent, ChatContentPart, ChatMessage,
    ImageUrl,
};
use super::http::{data_url, error_from_response, map_send_error};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat adapter.
///
/// Does NOT derive Debug; the API key lives in a [`SecretString`].
pub struct OpenAiChatAdapter {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl OpenAiChatAdapter {
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

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn build_request(&self, request: &ProviderRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);

        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: ChatContent::Text(system.clone()),
            });
        }

        let content = match &request.attachment {
            Some(attachment) => ChatContent::Parts(vec![
                ChatContentPart::Text {
                    text: request.prompt.clone(),
                },
                ChatContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_url(attachment),
                    },
                },
            ]),
            None => ChatContent::Text(request.prompt.clone()),
        };
        messages.push(ChatMessage {
            role: "user",
            content,
        });

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens,
        }
    }
}

impl ProviderAdapter for OpenAiChatAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(self.url("/chat/completions"))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let resp: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Deserialization(format!("failed to parse response: {e}")))?;

        let choice = resp.choices.into_iter().next().ok_or_else(|| {
            ProviderError::Deserialization("response contained no choices".to_string())
        })?;
        tracing::trace!(finish_reason = ?choice.finish_reason, "openai response");

        let text = choice.message.content.unwrap_or_default().trim().to_string();

        Ok(ProviderResponse {
            payload: Payload::Text(text),
            model: resp.model,
            usage: resp.usage.map(|u| ReportedUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }
}
