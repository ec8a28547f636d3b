//! Shared HTTP plumbing for provider adapters: error mapping and
//! attachment encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use parley_types::llm::ProviderError;
use parley_types::request::Attachment;

/// Map a non-success HTTP status to a [`ProviderError`].
pub fn map_status(status: StatusCode, headers: &HeaderMap, body: &str) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationFailed,
        429 => ProviderError::RateLimited {
            retry_after_secs: headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok()),
        },
        _ => ProviderError::Backend {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

/// Map a failed send (no HTTP response) to a [`ProviderError`].
pub fn map_send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Transport(format!("HTTP request failed: {err}"))
    }
}

/// Turn an error response into a [`ProviderError`], reading its body.
pub async fn error_from_response(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await.unwrap_or_default();
    map_status(status, &headers, &body)
}

pub fn base64_data(attachment: &Attachment) -> String {
    STANDARD.encode(attachment.bytes())
}

/// `data:` URL for providers that take images inline as URLs.
pub fn data_url(attachment: &Attachment) -> String {
    format!(
        "data:{};base64,{}",
        attachment.media_type().mime(),
        base64_data(attachment)
    )
}
