// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for leadrelay.
//!
//! Receives WhatsApp webhooks (subscription handshake, inbound messages,
//! delivery statuses) and forwards the extracted events over an mpsc channel
//! to the campaign dispatcher. Also serves a public health check and a
//! bearer-protected campaign stats endpoint.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{
    build_router, start_server, GatewayState, HealthState, ServerConfig, StatsFn, WebhookSecrets,
};
