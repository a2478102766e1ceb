// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging channel for deterministic testing.
//!
//! `MockChannel` captures every template and text send, hands out sequential
//! message ids, and can be told to reject sends to specific recipients.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadrelay_core::traits::adapter::PluginAdapter;
use leadrelay_core::traits::channel::MessagingChannel;
use leadrelay_core::types::{AdapterType, HealthStatus, MessageId, TemplateMessage};
use leadrelay_core::LeadRelayError;

/// One captured send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Template {
        to: String,
        template: TemplateMessage,
        message_id: MessageId,
    },
    Text {
        to: String,
        body: String,
        message_id: MessageId,
    },
}

impl SentMessage {
    pub fn to(&self) -> &str {
        match self {
            Self::Template { to, .. } | Self::Text { to, .. } => to,
        }
    }

    pub fn message_id(&self) -> &MessageId {
        match self {
            Self::Template { message_id, .. } | Self::Text { message_id, .. } => message_id,
        }
    }
}

/// A mock messaging channel for testing.
pub struct MockChannel {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    next_id: AtomicU64,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Makes every send to `to` fail with a channel error.
    pub async fn fail_for(&self, to: &str) {
        self.failing.lock().await.insert(to.to_string());
    }

    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Template sends only, in send order.
    pub async fn templates(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| matches!(m, SentMessage::Template { .. }))
            .cloned()
            .collect()
    }

    /// Bodies of text sends to `to`, in send order.
    pub async fn texts_to(&self, to: &str) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                SentMessage::Text { to: t, body, .. } if t == to => Some(body.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    async fn check_recipient(&self, to: &str) -> Result<MessageId, LeadRelayError> {
        if self.failing.lock().await.contains(to) {
            return Err(LeadRelayError::channel(format!("mock send to {to} rejected")));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(MessageId(format!("wamid.mock.{n}")))
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadRelayError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl MessagingChannel for MockChannel {
    async fn send_template(
        &self,
        to: &str,
        template: &TemplateMessage,
    ) -> Result<MessageId, LeadRelayError> {
        let message_id = self.check_recipient(to).await?;
        self.sent.lock().await.push(SentMessage::Template {
            to: to.to_string(),
            template: template.clone(),
            message_id: message_id.clone(),
        });
        Ok(message_id)
    }

    async fn send_text(&self, to: &str, body: &str) -> Result<MessageId, LeadRelayError> {
        let message_id = self.check_recipient(to).await?;
        self.sent.lock().await.push(SentMessage::Text {
            to: to.to_string(),
            body: body.to_string(),
            message_id: message_id.clone(),
        });
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opener() -> TemplateMessage {
        TemplateMessage {
            name: "opener2".into(),
            language: "en".into(),
            header_image_url: None,
            body_parameters: vec!["Anna".into()],
        }
    }

    #[tokio::test]
    async fn sends_are_captured_with_unique_ids() {
        let channel = MockChannel::new();
        let a = channel.send_template("491701234567", &opener()).await.unwrap();
        let b = channel.send_text("491701234567", "hello").await.unwrap();

        assert_ne!(a, b);
        assert_eq!(channel.sent_count().await, 2);
        assert_eq!(channel.templates().await.len(), 1);
        assert_eq!(channel.texts_to("491701234567").await, vec!["hello"]);
    }

    #[tokio::test]
    async fn failing_recipient_is_rejected_and_not_recorded() {
        let channel = MockChannel::new();
        channel.fail_for("491707654321").await;

        let err = channel
            .send_template("491707654321", &opener())
            .await
            .unwrap_err();
        assert!(matches!(err, LeadRelayError::Channel { .. }));
        assert_eq!(channel.sent_count().await, 0);
    }
}
