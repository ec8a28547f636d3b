//! Inbound request types.
//!
//! A [`RequestDescriptor`] is what the transport/session layer hands to the
//! dispatch orchestrator: the prompt, an optional image attachment, the
//! active mode instruction (already resolved), and the providers to ask.

use std::fmt;

use crate::llm::ProviderId;

/// Image formats recognized from their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMediaType {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageMediaType {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageMediaType::Jpeg => "image/jpeg",
            ImageMediaType::Png => "image/png",
            ImageMediaType::Gif => "image/gif",
            ImageMediaType::Webp => "image/webp",
        }
    }

    /// Detect the format from magic numbers.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageMediaType::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageMediaType::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageMediaType::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageMediaType::Webp)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Errors building an [`Attachment`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    #[error("attachment is empty")]
    Empty,

    #[error("attachment is not a supported image (jpeg, png, gif, webp)")]
    Undecodable,
}

/// An image attached to a request.
///
/// Can only be constructed from bytes that look like a known image format.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    bytes: Vec<u8>,
    media_type: ImageMediaType,
}

impl Attachment {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, AttachmentError> {
        if bytes.is_empty() {
            return Err(AttachmentError::Empty);
        }
        let media_type = ImageMediaType::sniff(&bytes).ok_or(AttachmentError::Undecodable)?;
        Ok(Self { bytes, media_type })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> ImageMediaType {
        self.media_type
    }
}

// Raw image bytes are noise in logs.
impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A single logical user request, already authorized by the caller.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub prompt: String,
    pub attachment: Option<Attachment>,
    pub mode_instruction: Option<String>,
    /// Providers to ask, in the order their answers should be shown.
    pub requested_providers: Vec<ProviderId>,
}

impl RequestDescriptor {
    /// A plain text request to the given providers.
    pub fn new(prompt: impl Into<String>, providers: impl IntoIterator<Item = ProviderId>) -> Self {
        Self {
            prompt: prompt.into(),
            attachment: None,
            mode_instruction: None,
            requested_providers: providers.into_iter().collect(),
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_mode_instruction(mut self, instruction: Option<String>) -> Self {
        self.mode_instruction = instruction;
        self
    }

    /// Requested providers with duplicates removed, first occurrence wins.
    pub fn distinct_providers(&self) -> Vec<ProviderId> {
        let mut seen = Vec::with_capacity(self.requested_providers.len());
        for id in &self.requested_providers {
            if !seen.contains(id) {
                seen.push(*id);
            }
        }
        seen
    }
}
