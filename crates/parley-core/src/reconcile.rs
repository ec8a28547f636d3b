//! Response reconciliation: merges call outcomes into one reply.
//!
//! One outcome renders bare. Several outcomes render as labeled sections in
//! the order given, and every outcome appears exactly once, failures
//! included.

use parley_types::llm::Payload;
use parley_types::outcome::{CallOutcome, CallStatus, FailureKind};

const ALL_FAILED_HEADER: &str = "All providers failed.";
const EMPTY_PAYLOAD: &str = "(empty response)";

/// Short user-facing notice for a failure kind.
pub fn failure_notice(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Timeout => "timed out",
        FailureKind::RateLimited => "rate limited, try again later",
        FailureKind::TransportError => "could not reach the provider",
        FailureKind::BackendError => "provider returned an error",
        FailureKind::UnsupportedAttachment => "attachments are not supported by this provider",
        FailureKind::AuthenticationFailed => "authentication failed",
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseReconciler;

impl ResponseReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Render outcomes into display text.
    pub fn reconcile(&self, outcomes: &[CallOutcome]) -> String {
        match outcomes {
            [] => String::new(),
            [single] => render_single(single),
            many => {
                let sections = many
                    .iter()
                    .map(|outcome| {
                        let body = match outcome.status {
                            CallStatus::Success => render_payload(outcome.payload.as_ref()),
                            CallStatus::Failure(kind) => format!("⚠ {}", failure_notice(kind)),
                        };
                        format!("{} Response:\n{}", outcome.provider.label(), body)
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n");
                if many.iter().all(|o| !o.is_success()) {
                    format!("{ALL_FAILED_HEADER}\n\n{sections}")
                } else {
                    sections
                }
            }
        }
    }
}

fn render_single(outcome: &CallOutcome) -> String {
    match outcome.status {
        CallStatus::Success => match &outcome.payload {
            Some(Payload::Text(text)) => text.clone(),
            Some(Payload::ImageRef(url)) => format!("Image: {url}"),
            None => EMPTY_PAYLOAD.to_string(),
        },
        CallStatus::Failure(kind) => format!(
            "{} failed: {}",
            outcome.provider.label(),
            failure_notice(kind)
        ),
    }
}

fn render_payload(payload: Option<&Payload>) -> String {
    match payload {
        Some(Payload::Text(text)) if !text.trim().is_empty() => text.clone(),
        Some(Payload::ImageRef(url)) if !url.is_empty() => format!("Image: {url}"),
        _ => EMPTY_PAYLOAD.to_string(),
    }
}
