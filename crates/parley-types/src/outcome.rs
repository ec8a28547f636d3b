//! Call outcomes and the per-request response envelope.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::{Payload, ProviderError, ProviderId};

/// Why a provider call did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    RateLimited,
    TransportError,
    BackendError,
    UnsupportedAttachment,
    AuthenticationFailed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RateLimited => write!(f, "rate_limited"),
            FailureKind::TransportError => write!(f, "transport_error"),
            FailureKind::BackendError => write!(f, "backend_error"),
            FailureKind::UnsupportedAttachment => write!(f, "unsupported_attachment"),
            FailureKind::AuthenticationFailed => write!(f, "authentication_failed"),
        }
    }
}

impl From<&ProviderError> for FailureKind {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::Timeout => FailureKind::Timeout,
            ProviderError::RateLimited { .. } => FailureKind::RateLimited,
            ProviderError::Transport(_) => FailureKind::TransportError,
            ProviderError::Backend { .. } | ProviderError::Deserialization(_) => {
                FailureKind::BackendError
            }
            ProviderError::AuthenticationFailed => FailureKind::AuthenticationFailed,
            ProviderError::UnsupportedAttachment(_) => FailureKind::UnsupportedAttachment,
        }
    }
}

impl ProviderError {
    /// The failure category this error is reported under.
    pub fn failure_kind(&self) -> FailureKind {
        FailureKind::from(self)
    }
}

/// Terminal state of one provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "kind", rename_all = "snake_case")]
pub enum CallStatus {
    Success,
    Failure(FailureKind),
}

/// Where a token count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    /// Figures reported by the provider.
    Reported,
    /// Deterministic text-length estimate; not measured.
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub source: UsageSource,
}

impl TokenUsage {
    pub fn none() -> Self {
        Self {
            input_tokens: 0,
            output_tokens: 0,
            source: UsageSource::Estimated,
        }
    }

    pub fn is_estimate(&self) -> bool {
        self.source == UsageSource::Estimated
    }
}

/// The finalized result of one adapter invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallOutcome {
    pub id: Uuid,
    pub provider: ProviderId,
    pub model: String,
    pub status: CallStatus,
    pub payload: Option<Payload>,
    /// Short human-readable cause, only set on failures.
    pub failure_detail: Option<String>,
    pub usage: TokenUsage,
    pub latency: Duration,
    pub started_at: DateTime<Utc>,
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        self.status == CallStatus::Success
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.status {
            CallStatus::Success => None,
            CallStatus::Failure(kind) => Some(kind),
        }
    }

    /// Build a failed outcome with no payload and zero usage.
    pub fn failed(
        provider: ProviderId,
        model: impl Into<String>,
        kind: FailureKind,
        detail: Option<String>,
        latency: Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            provider,
            model: model.into(),
            status: CallStatus::Failure(kind),
            payload: None,
            failure_detail: detail,
            usage: TokenUsage::none(),
            latency,
            started_at,
        }
    }
}

/// All outcomes for one request plus the rendered reply.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    /// One outcome per requested provider, in request order.
    pub outcomes: Vec<CallOutcome>,
    pub display_text: String,
}

impl ResponseEnvelope {
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| !o.is_success())
    }

    /// Image references the transport should deliver as media.
    pub fn image_references(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.payload {
                Some(Payload::ImageRef(url)) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(provider: ProviderId, payload: Payload) -> CallOutcome {
        CallOutcome {
            id: Uuid::now_v7(),
            provider,
            model: "m".to_string(),
            status: CallStatus::Success,
            payload: Some(payload),
            failure_detail: None,
            usage: TokenUsage::none(),
            latency: Duration::from_millis(5),
            started_at: Utc::now(),
        }
    }

    #[test]
    fn test_failure_kind_from_provider_error() {
        assert_eq!(FailureKind::from(&ProviderError::Timeout), FailureKind::Timeout);
        assert_eq!(
            FailureKind::from(&ProviderError::Deserialization("bad".into())),
            FailureKind::BackendError
        );
        assert_eq!(
            FailureKind::from(&ProviderError::UnsupportedAttachment(ProviderId::ImageGen)),
            FailureKind::UnsupportedAttachment
        );
    }

    #[test]
    fn test_call_status_serde() {
        let json = serde_json::to_string(&CallStatus::Failure(FailureKind::RateLimited)).unwrap();
        assert_eq!(json, r#"{"status":"failure","kind":"rate_limited"}"#);
    }

    #[test]
    fn test_envelope_image_references_and_all_failed() {
        let failed = CallOutcome::failed(
            ProviderId::OpenAi,
            "gpt-4o",
            FailureKind::Timeout,
            None,
            Duration::from_secs(10),
            Utc::now(),
        );
        let envelope = ResponseEnvelope {
            outcomes: vec![
                failed.clone(),
                ok(ProviderId::ImageGen, Payload::ImageRef("https://img/1.png".into())),
            ],
            display_text: String::new(),
        };
        assert_eq!(envelope.image_references(), vec!["https://img/1.png"]);
        assert!(!envelope.all_failed());

        let envelope = ResponseEnvelope {
            outcomes: vec![failed],
            display_text: String::new(),
        };
        assert!(envelope.all_failed());
    }
}
