// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for leadrelay.
//!
//! This crate provides the trait definitions, error type, and common types
//! shared by the adapter crates, the campaign engine, and the gateway.

pub mod error;
pub mod phone;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LeadRelayError;
pub use phone::normalize_phone;
pub use types::{AdapterType, HealthStatus, MessageId};

pub use traits::{BoardAdapter, MessagingChannel, PluginAdapter, ResponseGenerator, StatusLedger};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_render() {
        let config = LeadRelayError::Config("missing token".into());
        assert_eq!(config.to_string(), "configuration error: missing token");

        let file = LeadRelayError::FileAccess {
            path: "leads.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(file.to_string().contains("leads.csv"));

        let timeout = LeadRelayError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        assert!(timeout.is_network());
        assert!(LeadRelayError::board("down").is_network());
        assert!(!LeadRelayError::DataFormat("bad row".into()).is_network());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Channel, AdapterType::Provider, AdapterType::Board] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_messaging_channel<T: MessagingChannel>() {}
        fn _assert_response_generator<T: ResponseGenerator>() {}
        fn _assert_board_adapter<T: BoardAdapter>() {}
        fn _assert_status_ledger<T: StatusLedger>() {}
    }
}
