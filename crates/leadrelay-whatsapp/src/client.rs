// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the WhatsApp Cloud (Graph) API.

use std::time::Duration;

use leadrelay_core::types::MessageId;
use leadrelay_core::LeadRelayError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{
    GraphErrorResponse, MessagePayload, PhoneNumberInfo, SendMessageRequest, SendMessageResponse,
};

/// Graph API client bound to one sending phone number.
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
    phone_number_id: String,
}

impl GraphClient {
    pub fn new(
        access_token: &str,
        phone_number_id: String,
        api_version: String,
        base_url: &str,
    ) -> Result<Self, LeadRelayError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {access_token}")).map_err(|e| {
                LeadRelayError::Config(format!("invalid WhatsApp token header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LeadRelayError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version,
            phone_number_id,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn phone_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.base_url, self.api_version, self.phone_number_id
        )
    }

    /// Sends one message and returns the id the API assigned to it.
    pub async fn send(&self, to: &str, payload: MessagePayload) -> Result<MessageId, LeadRelayError> {
        let request = SendMessageRequest {
            messaging_product: "whatsapp",
            to,
            payload,
        };
        let response = self
            .client
            .post(format!("{}/messages", self.phone_url()))
            .json(&request)
            .send()
            .await
            .map_err(|e| LeadRelayError::Channel {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, to, "send response received");
        if !status.is_success() {
            return Err(error_from_body(status, response.text().await.unwrap_or_default()));
        }

        let body: SendMessageResponse =
            response.json().await.map_err(|e| LeadRelayError::Channel {
                message: format!("failed to parse send response: {e}"),
                source: Some(Box::new(e)),
            })?;
        body.messages
            .into_iter()
            .next()
            .map(|m| MessageId(m.id))
            .ok_or_else(|| LeadRelayError::channel("send response carried no message id"))
    }

    /// Looks up the sending phone number; doubles as a credential check.
    pub async fn phone_number_info(&self) -> Result<PhoneNumberInfo, LeadRelayError> {
        let response = self
            .client
            .get(self.phone_url())
            .send()
            .await
            .map_err(|e| LeadRelayError::Channel {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(error_from_body(status, response.text().await.unwrap_or_default()));
        }
        response.json().await.map_err(|e| LeadRelayError::Channel {
            message: format!("failed to parse phone number info: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

fn error_from_body(status: reqwest::StatusCode, body: String) -> LeadRelayError {
    let message = match serde_json::from_str::<GraphErrorResponse>(&body) {
        Ok(err) => format!(
            "Graph API error ({}): {}",
            err.error.code.unwrap_or_default(),
            err.error.message
        ),
        Err(_) => format!("API returned {status}: {body}"),
    };
    LeadRelayError::channel(message)
}
