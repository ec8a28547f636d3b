//! Single adapter invocation, normalized into a [`CallOutcome`].

use std::time::Instant;

use chrono::Utc;
use parley_types::llm::{ProviderError, ProviderRequest};
use parley_types::outcome::{CallOutcome, CallStatus, FailureKind};
use uuid::Uuid;

use super::box_provider::BoxProviderAdapter;
use super::token_estimate::usage_for;

/// Call one adapter and fold the result into a finalized outcome.
///
/// Never fails: every [`ProviderError`] becomes a `Failure` outcome. An
/// attachment sent to an adapter that cannot accept one fails with
/// `UnsupportedAttachment` without touching the network.
pub async fn invoke(adapter: &BoxProviderAdapter, request: &ProviderRequest) -> CallOutcome {
    let started_at = Utc::now();
    let start = Instant::now();
    let provider = adapter.id();
    let model = adapter.model().to_string();

    if request.attachment.is_some() && !adapter.capabilities().accepts_attachments {
        tracing::debug!(%provider, "attachment not supported, skipping call");
        let err = ProviderError::UnsupportedAttachment(provider);
        return CallOutcome::failed(
            provider,
            model,
            FailureKind::UnsupportedAttachment,
            Some(err.to_string()),
            start.elapsed(),
            started_at,
        );
    }

    let result = adapter.complete(request).await;
    let latency = start.elapsed();

    match result {
        Ok(response) => {
            let usage = usage_for(request, &response.payload, response.usage);
            tracing::debug!(
                %provider,
                model = %response.model,
                latency_ms = latency.as_millis() as u64,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                estimated = usage.is_estimate(),
                "provider call succeeded"
            );
            CallOutcome {
                id: Uuid::now_v7(),
                provider,
                model: response.model,
                status: CallStatus::Success,
                payload: Some(response.payload),
                failure_detail: None,
                usage,
                latency,
                started_at,
            }
        }
        Err(err) => {
            tracing::warn!(
                %provider,
                %model,
                latency_ms = latency.as_millis() as u64,
                error = %err,
                "provider call failed"
            );
            CallOutcome::failed(
                provider,
                model,
                err.failure_kind(),
                Some(err.to_string()),
                latency,
                started_at,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockAdapter;
    use parley_types::llm::{Payload, ProviderId, ReportedUsage};
    use parley_types::request::Attachment;

    const PNG: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn request() -> ProviderRequest {
        ProviderRequest {
            prompt: "Summarize quantum entanglement".to_string(),
            attachment: None,
            system: None,
            max_tokens: 300,
        }
    }

    #[tokio::test]
    async fn test_success_with_estimated_usage() {
        let mock = MockAdapter::text(ProviderId::OpenAi, "Particles stay correlated.");
        let adapter = BoxProviderAdapter::new(mock);

        let outcome = invoke(&adapter, &request()).await;
        assert!(outcome.is_success());
        assert_eq!(
            outcome.payload,
            Some(Payload::Text("Particles stay correlated.".into()))
        );
        assert!(outcome.usage.is_estimate());
        assert!(outcome.usage.input_tokens > 0);
        assert!(outcome.usage.output_tokens > 0);
    }

    #[tokio::test]
    async fn test_success_with_reported_usage() {
        let mock = MockAdapter::text(ProviderId::Anthropic, "ok").with_usage(ReportedUsage {
            input_tokens: 12,
            output_tokens: 4,
        });
        let adapter = BoxProviderAdapter::new(mock);

        let outcome = invoke(&adapter, &request()).await;
        assert!(!outcome.usage.is_estimate());
        assert_eq!(outcome.usage.input_tokens, 12);
        assert_eq!(outcome.usage.output_tokens, 4);
    }

    #[tokio::test]
    async fn test_provider_error_becomes_failure() {
        let mock = MockAdapter::failing(
            ProviderId::Anthropic,
            ProviderError::RateLimited {
                retry_after_secs: Some(20),
            },
        );
        let adapter = BoxProviderAdapter::new(mock);

        let outcome = invoke(&adapter, &request()).await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::RateLimited));
        assert!(outcome.payload.is_none());
        assert_eq!(outcome.usage.input_tokens, 0);
        assert!(outcome.failure_detail.unwrap().contains("20"));
    }

    #[tokio::test]
    async fn test_unsupported_attachment_skips_network_call() {
        let mock = MockAdapter::image(ProviderId::ImageGen, "https://img/1.png");
        let calls = mock.call_counter();
        let adapter = BoxProviderAdapter::new(mock);

        let mut req = request();
        req.attachment = Some(Attachment::from_bytes(PNG.to_vec()).unwrap());

        let outcome = invoke(&adapter, &req).await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::UnsupportedAttachment));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_attachment_forwarded_when_supported() {
        let mock = MockAdapter::text(ProviderId::OpenAi, "a cat");
        let calls = mock.call_counter();
        let adapter = BoxProviderAdapter::new(mock);

        let mut req = request();
        req.attachment = Some(Attachment::from_bytes(PNG.to_vec()).unwrap());

        let outcome = invoke(&adapter, &req).await;
        assert!(outcome.is_success());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
