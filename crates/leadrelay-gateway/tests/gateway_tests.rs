// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use leadrelay_core::types::{CampaignStats, DeliveryReport, InboundKind, WebhookEvent};
use leadrelay_gateway::{build_router, AuthConfig, GatewayState, HealthState, WebhookSecrets};
use leadrelay_whatsapp::webhook::sign_payload;
use tokio::sync::mpsc;
use tower::ServiceExt;

struct Fixture {
    router: Router,
    events: mpsc::Receiver<WebhookEvent>,
}

fn fixture(app_secret: Option<&str>) -> Fixture {
    let (tx, rx) = mpsc::channel(16);
    let state = GatewayState {
        events_tx: tx,
        webhook: WebhookSecrets {
            verify_token: Some("verify-me".into()),
            app_secret: app_secret.map(str::to_string),
        },
        stats: Arc::new(|| CampaignStats {
            initiated: 5,
            delivered: 3,
            pending: 1,
            failed: 1,
        }),
        auth: AuthConfig {
            bearer_token: Some("operator".into()),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
        },
    };
    Fixture {
        router: build_router(state),
        events: rx,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_webhook(body: &serde_json::Value, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("x-hub-signature-256", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn inbound_payload() -> serde_json::Value {
    serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{"changes": [{"value": {
            "messages": [{"id": "wamid.in", "from": "491701234567", "type": "text", "text": {"body": "hello"}}],
            "statuses": [{"id": "wamid.out", "status": "delivered", "recipient_id": "491701234567"}]
        }}]}]
    })
}

#[tokio::test]
async fn health_is_public() {
    let response = fixture(None).router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn handshake_echoes_challenge() {
    let response = fixture(None)
        .router
        .oneshot(get(
            "/webhook?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=1158201444",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"1158201444");
}

#[tokio::test]
async fn handshake_rejects_wrong_token() {
    let response = fixture(None)
        .router
        .oneshot(get("/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn handshake_without_params_is_bad_request() {
    let response = fixture(None).router.oneshot(get("/webhook")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_forwards_events_in_order() {
    let Fixture { router, mut events } = fixture(None);
    let response = router
        .oneshot(post_webhook(&inbound_payload(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    match events.recv().await.unwrap() {
        WebhookEvent::Inbound(message) => {
            assert_eq!(message.from, "491701234567");
            assert_eq!(message.text, "hello");
            assert_eq!(message.kind, InboundKind::Text);
        }
        other => panic!("expected inbound, got {other:?}"),
    }
    match events.recv().await.unwrap() {
        WebhookEvent::Status(status) => {
            assert_eq!(status.message_id.as_str(), "wamid.out");
            assert_eq!(status.status, DeliveryReport::Delivered);
        }
        other => panic!("expected status, got {other:?}"),
    }
}

#[tokio::test]
async fn webhook_for_other_object_is_not_found() {
    let Fixture { router, mut events } = fixture(None);
    let response = router
        .oneshot(post_webhook(&serde_json::json!({"object": "page", "entry": []}), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn malformed_webhook_is_bad_request() {
    let response = fixture(None)
        .router
        .oneshot(post_webhook(&serde_json::json!({"entry": "nope"}), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signed_webhook_accepted_with_valid_signature() {
    let payload = inbound_payload();
    let signature = sign_payload("app-secret", payload.to_string().as_bytes());
    let Fixture { router, mut events } = fixture(Some("app-secret"));
    let response = router.oneshot(post_webhook(&payload, signature)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(events.recv().await.is_some());
}

#[tokio::test]
async fn signed_webhook_rejected_without_signature() {
    let Fixture { router, mut events } = fixture(Some("app-secret"));
    let response = router
        .oneshot(post_webhook(&inbound_payload(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn stats_require_bearer_token() {
    let response = fixture(None).router.oneshot(get("/v1/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stats_return_counters() {
    let request = Request::builder()
        .uri("/v1/stats")
        .header("authorization", "Bearer operator")
        .body(Body::empty())
        .unwrap();
    let response = fixture(None).router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"initiated": 5, "delivered": 3, "pending": 1, "failed": 1})
    );
}
