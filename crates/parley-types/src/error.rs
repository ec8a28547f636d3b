use thiserror::Error;

use crate::llm::ProviderId;
use crate::request::AttachmentError;

/// Validation failures raised before any provider is called.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("no providers requested")]
    NoProviders,

    #[error("provider '{0}' is not configured (missing credentials)")]
    UnconfiguredProvider(ProviderId),

    #[error("invalid attachment: {0}")]
    InvalidAttachment(#[from] AttachmentError),
}

/// Errors resolving a chat mode.
#[derive(Debug, Error)]
pub enum ModeError {
    #[error("unknown mode '{name}'. Available modes are: {}", .available.join(", "))]
    UnknownMode { name: String, available: Vec<String> },
}

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("missing credential: environment variable {env} is not set")]
    MissingCredential { env: String },
}
