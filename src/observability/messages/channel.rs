// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for assembly registry traffic.

use std::fmt::{Display, Formatter};

/// An assembly operation was submitted to a channel.
///
/// # Log Level
/// `info!`
pub struct OperationPublished<'a> {
    pub channel_id: &'a str,
    pub op: &'a str,
    pub sequence_number: u64,
}

impl Display for OperationPublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Published '{}' to channel '{}' at sequence {}",
            self.op, self.channel_id, self.sequence_number
        )
    }
}

/// A channel message could not be applied to the assembly and was skipped.
///
/// # Log Level
/// `warn!`
pub struct MessageSkipped<'a> {
    pub channel_id: &'a str,
    pub sequence_number: u64,
    pub reason: &'a str,
}

impl Display for MessageSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipped message {} on channel '{}': {}",
            self.sequence_number, self.channel_id, self.reason
        )
    }
}
