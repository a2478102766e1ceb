// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for leadrelay.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across adapter traits and campaign operations.
///
/// Network failures from the messaging, provider, and board collaborators are
/// reported through `Channel`, `Provider`, and `Board`. None of them are
/// retried; callers log them and move on.
#[derive(Debug, Error)]
pub enum LeadRelayError {
    /// Configuration errors (missing credentials, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A required input file could not be opened or read.
    #[error("cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed input data (bad rows, unparseable documents or payloads).
    #[error("data format error: {0}")]
    DataFormat(String),

    /// Status persistence failed.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging channel errors (HTTP failure, rejected send, missing message id).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Response generator errors (API failure, empty completion).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Board collaborator errors (card lookup, creation, update).
    #[error("board error: {message}")]
    Board {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LeadRelayError {
    /// Convenience constructor for a channel error without a source.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
            source: None,
        }
    }

    /// Convenience constructor for a provider error without a source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Convenience constructor for a board error without a source.
    pub fn board(message: impl Into<String>) -> Self {
        Self::Board {
            message: message.into(),
            source: None,
        }
    }

    /// Whether the error came from a remote collaborator rather than local state.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Channel { .. } | Self::Provider { .. } | Self::Board { .. } | Self::Timeout { .. }
        )
    }
}
