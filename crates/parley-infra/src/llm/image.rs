//! Image generation adapter (`POST {base}/images/generations`).
//!
//! Returns the generated image URL as [`Payload::ImageRef`]. Mode
//! instructions are ignored and attachments are not accepted.

use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::provider::ProviderAdapter;
use parley_types::llm::{
    Payload, ProviderCapabilities, ProviderError, ProviderId, ProviderRequest, ProviderResponse,
};

use super::http::{error_from_response, map_send_error};
use super::openai::DEFAULT_BASE_URL;
use super::openai::types::{ImageGenerationRequest, ImageGenerationResponse};

const IMAGE_SIZE: &str = "1024x1024";
const IMAGE_QUALITY: &str = "standard";

pub struct ImageGenAdapter {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl ImageGenAdapter {
    pub fn new(client: reqwest::Client, api_key: SecretString, model: String) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            capabilities: ProviderCapabilities {
                accepts_attachments: false,
                max_output_tokens: 0,
            },
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn build_request(&self, request: &ProviderRequest) -> ImageGenerationRequest {
        ImageGenerationRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            n: 1,
            size: IMAGE_SIZE,
            quality: IMAGE_QUALITY,
        }
    }
}

impl ProviderAdapter for ImageGenAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::ImageGen
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if request.attachment.is_some() {
            return Err(ProviderError::UnsupportedAttachment(ProviderId::ImageGen));
        }

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.build_request(request))
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let resp: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Deserialization(format!("failed to parse response: {e}")))?;

        let (url, revised_prompt) = resp
            .data
            .into_iter()
            .find_map(|d| d.url.map(|url| (url, d.revised_prompt)))
            .ok_or_else(|| ProviderError::Deserialization("response contained no image url".to_string()))?;
        if let Some(revised) = revised_prompt {
            tracing::debug!(revised_prompt = %revised, "image prompt revised by provider");
        }

        Ok(ProviderResponse {
            payload: Payload::ImageRef(url),
            model: self.model.clone(),
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use parley_types::request::Attachment;

    use super::*;

    fn make_adapter() -> ImageGenAdapter {
        ImageGenAdapter::new(
            reqwest::Client::new(),
            SecretString::from("sk-test"),
            "dall-e-3".to_string(),
        )
    }

    #[test]
    fn test_build_request_ignores_mode() {
        let req = ProviderRequest {
            prompt: "a lighthouse at dusk".to_string(),
            attachment: None,
            system: Some("Be concise.".to_string()),
            max_tokens: 0,
        };
        let json = serde_json::to_value(make_adapter().build_request(&req)).unwrap();
        assert_eq!(json["model"], "dall-e-3");
        assert_eq!(json["prompt"], "a lighthouse at dusk");
        assert_eq!(json["n"], 1);
        assert_eq!(json["size"], "1024x1024");
        assert_eq!(json["quality"], "standard");
    }

    #[test]
    fn test_does_not_accept_attachments() {
        assert!(!make_adapter().capabilities().accepts_attachments);
    }

    #[tokio::test]
    async fn test_attachment_rejected_without_request() {
        let adapter = make_adapter().with_base_url("http://127.0.0.1:9".to_string());
        let req = ProviderRequest {
            prompt: "x".to_string(),
            attachment: Some(Attachment::from_bytes(b"GIF89a".to_vec()).unwrap()),
            system: None,
            max_tokens: 0,
        };
        let err = adapter.complete(&req).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedAttachment(ProviderId::ImageGen)));
    }
}
