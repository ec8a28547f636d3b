//! Request commands: `ask`, `compare` and `image`.
//!
//! Builds a [`RequestDescriptor`] from CLI arguments, hands it to the
//! dispatch orchestrator, prints the reconciled reply and appends the
//! exchange to the conversation log.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use parley_core::mode::ModeResolver;
use parley_types::error::DispatchError;
use parley_types::llm::ProviderId;
use parley_types::outcome::{CallOutcome, ResponseEnvelope};
use parley_types::request::{Attachment, RequestDescriptor};

use crate::cli::RequestArgs;
use crate::state::AppState;

/// Providers asked by `compare`.
pub const COMPARE_PROVIDERS: [ProviderId; 2] = [ProviderId::OpenAi, ProviderId::Anthropic];

/// Ask a single provider.
pub async fn ask(
    state: &AppState,
    prompt: String,
    provider: ProviderId,
    args: &RequestArgs,
    json: bool,
) -> Result<()> {
    let request = build_request(&state.modes, prompt, [provider], args).await?;
    run(state, request, &args.user, json).await
}

/// Ask every chat provider and show all answers.
pub async fn compare(state: &AppState, prompt: String, args: &RequestArgs, json: bool) -> Result<()> {
    let request = build_request(&state.modes, prompt, COMPARE_PROVIDERS, args).await?;
    run(state, request, &args.user, json).await
}

/// Generate an image. Modes and attachments do not apply.
pub async fn image(state: &AppState, prompt: String, user: &str, json: bool) -> Result<()> {
    let request = RequestDescriptor::new(prompt, [ProviderId::ImageGen]);
    run(state, request, user, json).await
}

/// Assemble a request: resolve the mode and load the attachment, if any.
pub async fn build_request(
    modes: &ModeResolver,
    prompt: String,
    providers: impl IntoIterator<Item = ProviderId>,
    args: &RequestArgs,
) -> Result<RequestDescriptor> {
    let instruction = match &args.mode {
        Some(name) => modes.resolve(name)?.instruction().map(str::to_string),
        None => None,
    };

    let mut request = RequestDescriptor::new(prompt, providers).with_mode_instruction(instruction);

    if let Some(path) = &args.attach {
        request = request.with_attachment(read_attachment(path).await?);
    }

    Ok(request)
}

async fn read_attachment(path: &Path) -> Result<Attachment> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read attachment {}", path.display()))?;
    Attachment::from_bytes(bytes)
        .map_err(DispatchError::from)
        .with_context(|| format!("cannot attach {}", path.display()))
}

async fn run(state: &AppState, request: RequestDescriptor, user: &str, json: bool) -> Result<()> {
    let prompt = request.prompt.clone();
    let envelope = state.orchestrator.dispatch(request).await?;

    if let Err(e) = state
        .conversations
        .save(user, &prompt, &envelope.display_text)
        .await
    {
        tracing::warn!(user, "Failed to save conversation: {e}");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&envelope_json(&envelope))?);
    } else {
        print_envelope(&envelope);
    }

    state.orchestrator.flush_usage().await;
    Ok(())
}

fn envelope_json(envelope: &ResponseEnvelope) -> serde_json::Value {
    serde_json::json!({
        "text": envelope.display_text,
        "images": envelope.image_references(),
        "all_failed": envelope.all_failed(),
        "outcomes": envelope.outcomes.iter().map(outcome_json).collect::<Vec<_>>(),
    })
}

fn outcome_json(outcome: &CallOutcome) -> serde_json::Value {
    serde_json::json!({
        "id": outcome.id,
        "provider": outcome.provider,
        "model": outcome.model,
        "status": outcome.status,
        "detail": outcome.failure_detail,
        "input_tokens": outcome.usage.input_tokens,
        "output_tokens": outcome.usage.output_tokens,
        "usage_source": outcome.usage.source,
        "latency_ms": outcome.latency.as_millis() as u64,
        "started_at": outcome.started_at.to_rfc3339(),
    })
}

fn print_envelope(envelope: &ResponseEnvelope) {
    println!();
    for line in envelope.display_text.lines() {
        println!("  {line}");
    }
    println!();

    let footer: Vec<String> = envelope
        .outcomes
        .iter()
        .map(|o| {
            let mark = if o.is_success() {
                style("✓").green()
            } else {
                style("✗").red()
            };
            format!(
                "{mark} {} {}",
                o.provider.label(),
                style(format!("{:.1}s", o.latency.as_secs_f64())).dim()
            )
        })
        .collect();
    println!("  {}", footer.join("  "));
    println!();
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use parley_types::mode::ModeDefinition;

    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn resolver() -> ModeResolver {
        ModeResolver::new(vec![ModeDefinition::new("pirate", "Talk like a pirate.")])
    }

    #[tokio::test]
    async fn test_build_request_applies_mode() {
        let args = RequestArgs {
            mode: Some("pirate".to_string()),
            ..Default::default()
        };
        let request = build_request(&resolver(), "hi".into(), COMPARE_PROVIDERS, &args)
            .await
            .unwrap();
        assert_eq!(request.mode_instruction.as_deref(), Some("Talk like a pirate."));
        assert_eq!(request.requested_providers, COMPARE_PROVIDERS.to_vec());
    }

    #[tokio::test]
    async fn test_build_request_reset_clears_mode() {
        let args = RequestArgs {
            mode: Some("reset".to_string()),
            ..Default::default()
        };
        let request = build_request(&resolver(), "hi".into(), [ProviderId::OpenAi], &args)
            .await
            .unwrap();
        assert!(request.mode_instruction.is_none());
    }

    #[tokio::test]
    async fn test_build_request_unknown_mode_lists_available() {
        let args = RequestArgs {
            mode: Some("shakespeare".to_string()),
            ..Default::default()
        };
        let err = build_request(&resolver(), "hi".into(), [ProviderId::OpenAi], &args)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("shakespeare"));
        assert!(message.contains("pirate"));
    }

    #[tokio::test]
    async fn test_build_request_reads_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        tokio::fs::write(&path, PNG_HEADER).await.unwrap();

        let args = RequestArgs {
            attach: Some(path),
            ..Default::default()
        };
        let request = build_request(&resolver(), "what is this?".into(), [ProviderId::OpenAi], &args)
            .await
            .unwrap();
        assert_eq!(request.attachment.unwrap().media_type().mime(), "image/png");
    }

    #[tokio::test]
    async fn test_build_request_rejects_non_image_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"just text").await.unwrap();

        let args = RequestArgs {
            attach: Some(path),
            ..Default::default()
        };
        let err = build_request(&resolver(), "hi".into(), [ProviderId::OpenAi], &args)
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<DispatchError>().is_some());
    }

    #[tokio::test]
    async fn test_build_request_missing_attachment_file() {
        let args = RequestArgs {
            attach: Some(PathBuf::from("/nonexistent/parley/cat.png")),
            ..Default::default()
        };
        let err = build_request(&resolver(), "hi".into(), [ProviderId::OpenAi], &args)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read attachment"));
    }
}
