// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message channel port.
//!
//! A channel is an ordered, append-only log addressed by an opaque id. The
//! protocol-specific ledger clients implement this trait; the core only ever
//! submits string payloads and reads them back in order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ChannelError;

/// Confirmation returned by a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub sequence_number: u64,
    pub confirmed: bool,
}

/// A single message read back from a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedMessage {
    pub sequence_number: u64,
    /// RFC 3339 consensus timestamp.
    pub timestamp: String,
    pub payload: String,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filters for [`MessageChannel::query`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub limit: Option<usize>,
    #[serde(default)]
    pub order: SortOrder,
    /// Only return messages with a sequence number strictly greater than this.
    pub since_sequence: Option<u64>,
}

#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn submit(&self, channel_id: &str, payload: &str) -> Result<SubmitReceipt, ChannelError>;

    async fn query(
        &self,
        channel_id: &str,
        options: QueryOptions,
    ) -> Result<Vec<OrderedMessage>, ChannelError>;
}
