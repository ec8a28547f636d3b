//! Provider request/response types for Parley.
//!
//! These types model the data shapes for a single provider call: which
//! backend is addressed, what it can accept, the normalized request handed to
//! an adapter, and the normalized response or error it returns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::request::Attachment;

/// Identifier of a configured backend.
///
/// The set is closed: two chat-completion providers and one image-generation
/// provider. Adapter selection matches on this enum rather than on strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    #[serde(rename = "image")]
    ImageGen,
}

impl ProviderId {
    /// Every provider, in canonical order.
    pub const ALL: [ProviderId; 3] = [ProviderId::OpenAi, ProviderId::Anthropic, ProviderId::ImageGen];

    /// Stable machine name used in config files and the usage ledger.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::ImageGen => "image",
        }
    }

    /// Human-facing label used when rendering replies.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "GPT",
            ProviderId::Anthropic => "Claude",
            ProviderId::ImageGen => "Image",
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderId::OpenAi | ProviderId::Anthropic => ProviderKind::Chat,
            ProviderId::ImageGen => ProviderKind::Image,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Ok(ProviderId::OpenAi),
            "anthropic" | "claude" => Ok(ProviderId::Anthropic),
            "image" | "dalle" | "openai_image" => Ok(ProviderId::ImageGen),
            other => Err(format!("invalid provider: '{other}'")),
        }
    }
}

/// Broad category of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Chat,
    Image,
}

/// What an adapter can accept, declared up front rather than discovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    pub accepts_attachments: bool,
    pub max_output_tokens: u32,
}

/// Normalized request handed to a single adapter.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub prompt: String,
    pub attachment: Option<Attachment>,
    pub system: Option<String>,
    pub max_tokens: u32,
}

/// What the provider produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Payload {
    /// Chat completion text.
    Text(String),
    /// URL (or other reference) of a generated image.
    ImageRef(String),
}

/// Token counts as reported by the provider, if it reported any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Normalized successful response from an adapter.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub payload: Payload,
    pub model: String,
    pub usage: Option<ReportedUsage>,
}

/// Errors from a single provider call.
///
/// These never propagate past the adapter invocation; they are folded into a
/// failed [`crate::outcome::CallOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend error: {message}")]
    Backend { message: String },

    #[error("malformed response: {0}")]
    Deserialization(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("attachments are not supported by {0}")]
    UnsupportedAttachment(ProviderId),
}
