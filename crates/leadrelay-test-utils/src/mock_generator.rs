// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock response generator for deterministic testing.
//!
//! Replies are popped from a FIFO queue. When the queue is empty a default
//! "mock reply" is returned. Every call's history is recorded.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadrelay_core::traits::adapter::PluginAdapter;
use leadrelay_core::traits::generator::ResponseGenerator;
use leadrelay_core::types::{AdapterType, HealthStatus, Turn};
use leadrelay_core::LeadRelayError;

pub struct MockGenerator {
    responses: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<Mutex<Vec<Vec<Turn>>>>,
    fail_next: AtomicBool,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_next: AtomicBool::new(false),
        }
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }

    /// Makes the next `generate` call fail with a provider error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Histories passed to `generate`, one per call.
    pub async fn calls(&self) -> Vec<Vec<Turn>> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadRelayError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ResponseGenerator for MockGenerator {
    async fn generate(&self, _persona: &str, history: &[Turn]) -> Result<String, LeadRelayError> {
        self.calls.lock().await.push(history.to_vec());
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(LeadRelayError::provider("mock generation failure"));
        }
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock reply".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_reply_when_queue_empty() {
        let generator = MockGenerator::new();
        let reply = generator.generate("persona", &[Turn::user("hi")]).await.unwrap();
        assert_eq!(reply, "mock reply");
    }

    #[tokio::test]
    async fn queued_replies_in_order_then_failure() {
        let generator = MockGenerator::with_responses(vec!["first".into(), "second".into()]);
        assert_eq!(generator.generate("p", &[]).await.unwrap(), "first");
        generator.fail_next();
        assert!(generator.generate("p", &[]).await.is_err());
        assert_eq!(generator.generate("p", &[]).await.unwrap(), "second");
        assert_eq!(generator.calls().await.len(), 3);
    }
}
