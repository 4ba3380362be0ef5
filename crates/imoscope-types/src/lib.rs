//! Shared types for ImoScope
//!
//! Transcript messages, image attachments, and the error taxonomy used across
//! the client, the conversation controller, and the app.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Product name, used in console branding and export filenames.
pub const APP_NAME: &str = "ImoScope";

/// Fallback shown when the server fails without a usable error body.
pub const SERVER_ERROR_FALLBACK: &str = "Something went wrong on the server.";

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used when rendering a transcript line.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => APP_NAME,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry of the conversation transcript. Immutable once created;
/// the transcript is append-only and insertion order is chronological.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Raster formats the analysis service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Detect the format from file magic bytes. Extension alone is not
    /// trusted; a renamed GIF must not slip through to the server.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// The uploaded image blob plus the metadata the multipart upload needs.
/// Read-only once created; shared between preview display and PDF export.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Validate raw bytes and wrap them as an attachment.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ChatError> {
        let format = ImageFormat::sniff(&bytes).ok_or_else(|| {
            ChatError::Validation("Only PNG and JPEG images are supported.".to_string())
        })?;
        Ok(Self {
            file_name: file_name.into(),
            format,
            bytes,
        })
    }
}

/// Errors raised by the conversation flow. All variants are converted into
/// the session's single user-visible error string at the operation that
/// raised them; none propagate further.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    /// Missing or malformed user input. Never reaches the network.
    #[error("{0}")]
    Validation(String),

    /// The request could not be completed (connectivity, DNS, timeout).
    #[error("Could not reach the analysis service: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("{0}")]
    Server(String),
}
