// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors surfaced by a message channel implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("Channel '{0}' not found")]
    NotFound(String),

    #[error("Submission to channel '{channel_id}' was rejected: {reason}")]
    Rejected { channel_id: String, reason: String },

    #[error("Channel transport error: {0}")]
    Transport(String),
}
