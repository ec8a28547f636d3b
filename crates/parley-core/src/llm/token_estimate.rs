//! Character-based token estimation.
//!
//! Used only when a provider does not report usage. The result is tagged
//! [`UsageSource::Estimated`] so nothing downstream mistakes it for a
//! measured figure.

use parley_types::llm::{Payload, ProviderRequest, ReportedUsage};
use parley_types::outcome::{TokenUsage, UsageSource};

/// Per-message overhead for role and message structure, in characters.
const MESSAGE_OVERHEAD_CHARS: usize = 10;

/// ~4 characters per token, rounded up.
pub fn estimate_tokens(chars: usize) -> u32 {
    (chars as f64 / 4.0).ceil() as u32
}

/// Estimated input tokens for a request: prompt plus system instruction.
pub fn estimate_input(request: &ProviderRequest) -> u32 {
    let mut total_chars = request.prompt.chars().count() + MESSAGE_OVERHEAD_CHARS;
    if let Some(system) = &request.system {
        total_chars += system.chars().count() + MESSAGE_OVERHEAD_CHARS;
    }
    estimate_tokens(total_chars)
}

/// Estimated output tokens. Image references carry no token cost.
pub fn estimate_output(payload: &Payload) -> u32 {
    match payload {
        Payload::Text(text) => estimate_tokens(text.chars().count()),
        Payload::ImageRef(_) => 0,
    }
}

/// Usage for a successful call: reported figures when available, else estimates.
pub fn usage_for(
    request: &ProviderRequest,
    payload: &Payload,
    reported: Option<ReportedUsage>,
) -> TokenUsage {
    match reported {
        Some(usage) => TokenUsage {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            source: UsageSource::Reported,
        },
        None => TokenUsage {
            input_tokens: estimate_input(request),
            output_tokens: estimate_output(payload),
            source: UsageSource::Estimated,
        },
    }
}
