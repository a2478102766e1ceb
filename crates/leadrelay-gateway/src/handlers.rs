// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Handles GET /health, GET and POST /webhook, GET /v1/stats.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use leadrelay_core::types::CampaignStats;
use leadrelay_whatsapp::types::WebhookPayload;
use leadrelay_whatsapp::webhook::{
    extract_events, verify_signature, verify_subscription, Subscription,
    BUSINESS_ACCOUNT_OBJECT, SIGNATURE_HEADER,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Response body for GET /v1/stats.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CampaignStats,
}

/// GET /health
pub async fn get_public_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// GET /webhook
///
/// Subscription handshake: echoes `hub.challenge` when `hub.mode` is
/// `subscribe` and `hub.verify_token` matches.
pub async fn verify_webhook(
    State(state): State<GatewayState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let outcome = verify_subscription(
        params.get("hub.mode").map(String::as_str),
        params.get("hub.verify_token").map(String::as_str),
        params.get("hub.challenge").map(String::as_str),
        state.webhook.verify_token.as_deref(),
    );
    match outcome {
        Subscription::Accepted(challenge) => (StatusCode::OK, challenge).into_response(),
        Subscription::Forbidden => StatusCode::FORBIDDEN.into_response(),
        Subscription::BadRequest => StatusCode::BAD_REQUEST.into_response(),
    }
}

/// POST /webhook
///
/// Verifies the signature when an app secret is configured, then forwards
/// every extracted event to the dispatcher in payload order.
pub async fn receive_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(secret) = state.webhook.app_secret.as_deref() {
        let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
        if !verify_signature(secret, &body, signature) {
            warn!("webhook signature check failed");
            return StatusCode::FORBIDDEN;
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "malformed webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };
    if payload.object != BUSINESS_ACCOUNT_OBJECT {
        debug!(object = %payload.object, "ignoring webhook for other object");
        return StatusCode::NOT_FOUND;
    }

    let events = extract_events(&payload);
    debug!(events = events.len(), "webhook payload received");
    for event in events {
        if state.events_tx.send(event).await.is_err() {
            error!("event dispatcher is gone, dropping webhook events");
            return StatusCode::SERVICE_UNAVAILABLE;
        }
    }
    StatusCode::OK
}

/// GET /v1/stats
pub async fn get_stats(State(state): State<GatewayState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        stats: (state.stats)(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }

    #[test]
    fn stats_response_is_flat() {
        let resp = StatsResponse {
            stats: CampaignStats {
                initiated: 3,
                delivered: 1,
                pending: 1,
                failed: 1,
            },
        };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            serde_json::json!({"initiated": 3, "delivered": 1, "pending": 1, "failed": 1})
        );
    }
}
