// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook handshake, signature check, and payload extraction.
//!
//! These are transport-free helpers; the gateway crate maps their results to
//! HTTP responses.

use hmac::{Hmac, Mac};
use leadrelay_core::types::{
    DeliveryReport, InboundKind, InboundMessage, MessageId, StatusEvent, WebhookEvent,
};
use sha2::Sha256;
use tracing::{debug, info};

use crate::types::{WebhookPayload, WireMessage};

/// `object` value of payloads addressed to this channel.
pub const BUSINESS_ACCOUNT_OBJECT: &str = "whatsapp_business_account";

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Result of the subscription handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// Echo the challenge back with 200.
    Accepted(String),
    /// Mode or token present but wrong.
    Forbidden,
    /// Mode or token missing.
    BadRequest,
}

/// Evaluates a `GET /webhook` handshake.
pub fn verify_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    expected_token: Option<&str>,
) -> Subscription {
    let (Some(mode), Some(token)) = (mode, token) else {
        return Subscription::BadRequest;
    };
    match expected_token {
        Some(expected) if mode == "subscribe" && token == expected => {
            info!("webhook subscription verified");
            Subscription::Accepted(challenge.unwrap_or_default().to_string())
        }
        _ => {
            info!(mode, "webhook subscription rejected");
            Subscription::Forbidden
        }
    }
}

/// Checks an `X-Hub-Signature-256: sha256=<hex>` header against `body`.
pub fn verify_signature(app_secret: &str, body: &[u8], header: Option<&str>) -> bool {
    let Some(hex_digest) = header.and_then(|h| h.strip_prefix("sha256=")) else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Computes the header value for `body`; the counterpart of [`verify_signature`].
pub fn sign_payload(app_secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()).ok()?;
    mac.update(body);
    Some(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Flattens a payload into inbound messages and status callbacks, in
/// payload order. Unsupported message kinds are logged and skipped.
pub fn extract_events(payload: &WebhookPayload) -> Vec<WebhookEvent> {
    let mut events = Vec::new();
    for change in payload.entry.iter().flat_map(|e| e.changes.iter()) {
        for message in &change.value.messages {
            if let Some(inbound) = inbound_from_wire(message) {
                events.push(WebhookEvent::Inbound(inbound));
            }
        }
        for status in &change.value.statuses {
            events.push(WebhookEvent::Status(StatusEvent {
                message_id: MessageId(status.id.clone()),
                status: DeliveryReport::parse(&status.status),
                recipient_id: status.recipient_id.clone(),
            }));
        }
    }
    events
}

fn inbound_from_wire(message: &WireMessage) -> Option<InboundMessage> {
    let (text, kind) = match message.type_.as_str() {
        "text" => (message.text.as_ref()?.body.clone(), InboundKind::Text),
        "button" => (message.button.as_ref()?.text.clone(), InboundKind::Button),
        "interactive" => {
            let interactive = message.interactive.as_ref()?;
            match interactive.type_.as_str() {
                "button_reply" => (
                    interactive.button_reply.as_ref()?.title.clone(),
                    InboundKind::Button,
                ),
                "list_reply" => (
                    interactive.list_reply.as_ref()?.title.clone(),
                    InboundKind::List,
                ),
                other => {
                    debug!(from = %message.from, kind = other, "skipping unsupported interactive message");
                    return None;
                }
            }
        }
        other => {
            debug!(from = %message.from, kind = other, "skipping unsupported message type");
            return None;
        }
    };
    if text.is_empty() {
        return None;
    }
    Some(InboundMessage {
        id: message.id.clone(),
        from: message.from.clone(),
        text,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(json).unwrap()
    }

    fn wrap(value: serde_json::Value) -> WebhookPayload {
        parse(serde_json::json!({
            "object": BUSINESS_ACCOUNT_OBJECT,
            "entry": [{"changes": [{"value": value}]}]
        }))
    }

    #[test]
    fn handshake_accepts_matching_token() {
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("secret"), Some("1158201444"), Some("secret")),
            Subscription::Accepted("1158201444".into())
        );
    }

    #[test]
    fn handshake_rejects_wrong_token_or_mode() {
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("nope"), Some("c"), Some("secret")),
            Subscription::Forbidden
        );
        assert_eq!(
            verify_subscription(Some("unsubscribe"), Some("secret"), Some("c"), Some("secret")),
            Subscription::Forbidden
        );
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("secret"), Some("c"), None),
            Subscription::Forbidden
        );
    }

    #[test]
    fn handshake_missing_params_is_bad_request() {
        assert_eq!(
            verify_subscription(None, Some("secret"), Some("c"), Some("secret")),
            Subscription::BadRequest
        );
        assert_eq!(
            verify_subscription(Some("subscribe"), None, Some("c"), Some("secret")),
            Subscription::BadRequest
        );
    }

    #[test]
    fn signature_round_trip() {
        let body = br#"{"object":"whatsapp_business_account"}"#;
        let header = sign_payload("app-secret", body).unwrap();
        assert!(header.starts_with("sha256="));
        assert!(verify_signature("app-secret", body, Some(&header)));
        assert!(!verify_signature("other-secret", body, Some(&header)));
        assert!(!verify_signature("app-secret", b"tampered", Some(&header)));
    }

    #[test]
    fn signature_rejects_malformed_headers() {
        assert!(!verify_signature("s", b"body", None));
        assert!(!verify_signature("s", b"body", Some("md5=abc")));
        assert!(!verify_signature("s", b"body", Some("sha256=not-hex")));
    }

    #[test]
    fn extracts_text_message() {
        let payload = wrap(serde_json::json!({
            "messages": [{"id": "wamid.1", "from": "491701234567", "type": "text", "text": {"body": "hello"}}]
        }));
        assert_eq!(
            extract_events(&payload),
            vec![WebhookEvent::Inbound(InboundMessage {
                id: "wamid.1".into(),
                from: "491701234567".into(),
                text: "hello".into(),
                kind: InboundKind::Text,
            })]
        );
    }

    #[test]
    fn extracts_button_and_interactive_replies() {
        let payload = wrap(serde_json::json!({
            "messages": [
                {"id": "a", "from": "1", "type": "button", "button": {"text": "Book now", "payload": "x"}},
                {"id": "b", "from": "1", "type": "interactive",
                 "interactive": {"type": "button_reply", "button_reply": {"id": "yes", "title": "Yes please"}}},
                {"id": "c", "from": "1", "type": "interactive",
                 "interactive": {"type": "list_reply", "list_reply": {"id": "k", "title": "Kitchen"}}},
                {"id": "d", "from": "1", "type": "interactive",
                 "interactive": {"type": "nfm_reply"}}
            ]
        }));
        let kinds: Vec<_> = extract_events(&payload)
            .into_iter()
            .map(|e| match e {
                WebhookEvent::Inbound(m) => (m.text, m.kind),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("Book now".to_string(), InboundKind::Button),
                ("Yes please".to_string(), InboundKind::Button),
                ("Kitchen".to_string(), InboundKind::List),
            ]
        );
    }

    #[test]
    fn skips_unsupported_types() {
        let payload = wrap(serde_json::json!({
            "messages": [
                {"id": "a", "from": "1", "type": "image", "image": {"id": "media"}},
                {"id": "b", "from": "1", "type": "text"}
            ]
        }));
        assert!(extract_events(&payload).is_empty());
    }

    #[test]
    fn extracts_statuses() {
        let payload = wrap(serde_json::json!({
            "statuses": [
                {"id": "wamid.9", "status": "delivered", "recipient_id": "491701234567", "timestamp": "1"},
                {"id": "wamid.9", "status": "deleted"}
            ]
        }));
        let events = extract_events(&payload);
        assert_eq!(
            events[0],
            WebhookEvent::Status(StatusEvent {
                message_id: MessageId("wamid.9".into()),
                status: DeliveryReport::Delivered,
                recipient_id: Some("491701234567".into()),
            })
        );
        assert!(matches!(
            &events[1],
            WebhookEvent::Status(StatusEvent { status: DeliveryReport::Other(s), .. }) if s == "deleted"
        ));
    }

    #[test]
    fn processes_every_message_in_a_change() {
        let payload = wrap(serde_json::json!({
            "messages": [
                {"id": "a", "from": "1", "type": "text", "text": {"body": "one"}},
                {"id": "b", "from": "1", "type": "text", "text": {"body": "two"}}
            ]
        }));
        assert_eq!(extract_events(&payload).len(), 2);
    }
}
