// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::errors::ChannelError;
use crate::traits::{MessageChannel, OrderedMessage, QueryOptions, SortOrder, SubmitReceipt};

/// Process-local message channel.
///
/// Channels are created on first submission. Sequence numbers start at 1 and
/// increase by one per message within a channel.
#[derive(Debug, Default)]
pub struct InMemoryChannel {
    channels: Mutex<HashMap<String, Vec<OrderedMessage>>>,
}

impl InMemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn message_count(&self, channel_id: &str) -> usize {
        self.channels
            .lock()
            .await
            .get(channel_id)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl MessageChannel for InMemoryChannel {
    async fn submit(&self, channel_id: &str, payload: &str) -> Result<SubmitReceipt, ChannelError> {
        if channel_id.is_empty() {
            return Err(ChannelError::Rejected {
                channel_id: String::new(),
                reason: "channel id is empty".to_string(),
            });
        }

        let mut channels = self.channels.lock().await;
        let messages = channels.entry(channel_id.to_string()).or_default();
        let sequence_number = messages.len() as u64 + 1;
        messages.push(OrderedMessage {
            sequence_number,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            payload: payload.to_string(),
        });

        Ok(SubmitReceipt {
            sequence_number,
            confirmed: true,
        })
    }

    async fn query(
        &self,
        channel_id: &str,
        options: QueryOptions,
    ) -> Result<Vec<OrderedMessage>, ChannelError> {
        let channels = self.channels.lock().await;
        let messages = channels
            .get(channel_id)
            .ok_or_else(|| ChannelError::NotFound(channel_id.to_string()))?;

        let since = options.since_sequence.unwrap_or(0);
        let selected = messages.iter().filter(|m| m.sequence_number > since);
        let limit = options.limit.unwrap_or(usize::MAX);

        Ok(match options.order {
            SortOrder::Asc => selected.take(limit).cloned().collect(),
            SortOrder::Desc => selected.rev().take(limit).cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> InMemoryChannel {
        let channel = InMemoryChannel::new();
        for payload in ["one", "two", "three", "four"] {
            channel.submit("0.0.100", payload).await.unwrap();
        }
        channel
    }

    fn payloads(messages: &[OrderedMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.payload.as_str()).collect()
    }

    #[tokio::test]
    async fn test_sequence_numbers_are_per_channel() {
        let channel = seeded().await;
        let receipt = channel.submit("0.0.200", "other").await.unwrap();

        assert_eq!(receipt, SubmitReceipt { sequence_number: 1, confirmed: true });
        assert_eq!(channel.message_count("0.0.100").await, 4);
        assert_eq!(channel.message_count("0.0.200").await, 1);
    }

    #[tokio::test]
    async fn test_query_options() {
        let channel = seeded().await;

        let all = channel.query("0.0.100", QueryOptions::default()).await.unwrap();
        assert_eq!(payloads(&all), vec!["one", "two", "three", "four"]);
        assert_eq!(all[3].sequence_number, 4);
        assert!(chrono::DateTime::parse_from_rfc3339(&all[0].timestamp).is_ok());

        let latest = channel
            .query(
                "0.0.100",
                QueryOptions {
                    limit: Some(2),
                    order: SortOrder::Desc,
                    since_sequence: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(payloads(&latest), vec!["four", "three"]);

        let after = channel
            .query(
                "0.0.100",
                QueryOptions {
                    limit: Some(1),
                    order: SortOrder::Asc,
                    since_sequence: Some(2),
                },
            )
            .await
            .unwrap();
        assert_eq!(payloads(&after), vec!["three"]);
    }

    #[tokio::test]
    async fn test_unknown_and_empty_channels() {
        let channel = InMemoryChannel::new();
        assert_eq!(
            channel.query("0.0.404", QueryOptions::default()).await,
            Err(ChannelError::NotFound("0.0.404".to_string()))
        );
        assert!(matches!(
            channel.submit("", "payload").await,
            Err(ChannelError::Rejected { .. })
        ));
    }
}
