// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ChannelError;
use thiserror::Error;

/// Errors raised while publishing or reconstructing an assembly from a channel.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("Failed to encode assembly operation: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Channel '{0}' does not contain a register operation")]
    NotRegistered(String),
}
