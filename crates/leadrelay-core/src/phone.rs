// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number normalization.
//!
//! Every component keys leads by the same normalized digit string, so the
//! lead import, the status ledger, and inbound replies agree on identity.

/// Removes every non-digit character.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalizes a phone number to international digits without a `+` or `00`.
///
/// Strips non-digits and leading zeros, then prefixes `country_code` when the
/// number does not already start with it. An empty `country_code` disables
/// prefixing. Returns an empty string when no digits remain.
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let digits = digits_only(raw);
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return String::new();
    }
    if country_code.is_empty() || trimmed.starts_with(country_code) {
        trimmed.to_string()
    } else {
        format!("{country_code}{trimmed}")
    }
}
