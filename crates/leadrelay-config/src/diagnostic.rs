// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config error diagnostics.
//!
//! Turns figment extraction errors into miette reports that point at the
//! offending line of `leadrelay.toml`. Unknown keys get a "did you mean"
//! from the table's field list, a legacy variable name written as a key
//! (`WHATSAPP_TOKEN = ...`) is mapped to the field it feeds, and secret
//! fields mention the environment variable that can supply them instead.

#![allow(unused_assignments)] // miette's Diagnostic derive

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key suggestion.
const SIMILARITY_FLOOR: f64 = 0.75;

/// Config fields that fall back to a legacy environment variable.
pub const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("openai.api_key", "OPENAI_API_KEY"),
    ("whatsapp.access_token", "WHATSAPP_TOKEN"),
    ("whatsapp.phone_number_id", "WHATSAPP_PHONE_NUMBER_ID"),
    ("whatsapp.verify_token", "WHATSAPP_VERIFY_TOKEN"),
    ("trello.api_key", "TRELLO_API_KEY"),
    ("trello.token", "TRELLO_TOKEN"),
    ("trello.board_id", "TRELLO_BOARD_ID"),
    ("trello.incoming_list_id", "TRELLO_INCOMING_LIST_ID"),
    ("trello.leads_list_id", "TRELLO_LEADS_LIST_ID"),
];

/// A configuration problem, renderable with miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {location}")]
    #[diagnostic(code(leadrelay::config::unknown_key), help("{help}"))]
    UnknownKey {
        /// `[section]` or `the top level`.
        location: String,
        key: String,
        suggestion: Option<String>,
        help: String,
        #[label("not a leadrelay setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(leadrelay::config::invalid_type), help("{help}"))]
    InvalidType {
        /// Dotted path, e.g. `gateway.port`.
        key: String,
        found: String,
        help: String,
        #[label("wrong type")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that parsed but is out of range or inconsistent.
    #[error("{message}")]
    #[diagnostic(code(leadrelay::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(leadrelay::config::other))]
    Other(String),
}

/// Converts every error carried by `err` into a [`ConfigError`].
///
/// `toml_sources` holds `(path, content)` pairs used to attach spans.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, toml_sources))
        .collect()
}

fn convert(error: &figment::Error, sources: &[(String, String)]) -> ConfigError {
    let path: Vec<String> = error.path.iter().map(ToString::to_string).collect();

    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let table = match path.split_last() {
                Some((last, rest)) if last == field => rest,
                _ => &path[..],
            };
            let suggestion = suggest_key(field, expected);
            let help = unknown_key_help(table, suggestion.as_deref(), expected);
            let (span, src) = locate(error, sources, table, field);
            ConfigError::UnknownKey {
                location: location(table),
                key: field.clone(),
                suggestion,
                help,
                span,
                src,
            }
        }
        Kind::InvalidType(actual, expected) => {
            let key = path.join(".");
            let (span, src) = match path.split_last() {
                Some((field, table)) => locate(error, sources, table, field),
                None => (None, None),
            };
            ConfigError::InvalidType {
                help: type_help(&key, expected),
                key,
                found: actual.to_string(),
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

fn location(table: &[String]) -> String {
    if table.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{}]", table.join("."))
    }
}

/// The legacy variable that can stand in for `dotted_key`, if any.
pub fn legacy_env_for(dotted_key: &str) -> Option<&'static str> {
    LEGACY_ENV_KEYS
        .iter()
        .find(|(key, _)| *key == dotted_key)
        .map(|(_, env)| *env)
}

fn unknown_key_help(table: &[String], suggestion: Option<&str>, expected: &[&str]) -> String {
    let Some(suggested) = suggestion else {
        return format!("valid keys here: {}", expected.join(", "));
    };
    let mut help = format!("did you mean `{suggested}`?");
    let mut dotted: Vec<&str> = table.iter().map(String::as_str).collect();
    dotted.push(suggested);
    if let Some(env) = legacy_env_for(&dotted.join(".")) {
        help.push_str(&format!(" It can also be left out and set through `{env}`."));
    }
    help
}

fn type_help(key: &str, expected: &str) -> String {
    if key.ends_with("_ms") {
        format!("`{key}` is a whole number of milliseconds, e.g. `{key} = 1000`")
    } else if key.ends_with("_secs") {
        format!("`{key}` is a whole number of seconds, e.g. `{key} = 60`")
    } else if key.ends_with("port") {
        format!("`{key}` is a port number between 1 and 65535")
    } else {
        format!("expected {expected}")
    }
}

/// Picks the valid key `unknown` most likely meant.
///
/// A legacy environment variable name maps to the field it feeds; anything
/// else is matched by Jaro-Winkler similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let from_env = LEGACY_ENV_KEYS
        .iter()
        .find(|(_, env)| env.eq_ignore_ascii_case(unknown))
        .and_then(|(key, _)| key.rsplit('.').next())
        .filter(|field| valid_keys.contains(field));
    if let Some(field) = from_env {
        return Some(field.to_string());
    }

    valid_keys
        .iter()
        .map(|key| (*key, strsim::jaro_winkler(unknown, key)))
        .filter(|(_, score)| *score > SIMILARITY_FLOOR)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Attaches a span when the error's file (or the only known source) contains the key.
fn locate(
    error: &figment::Error,
    sources: &[(String, String)],
    table: &[String],
    key: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    let source = match origin {
        Some(path) => sources.iter().find(|(p, _)| *p == path),
        None if sources.len() == 1 => sources.first(),
        None => None,
    };
    let Some((name, content)) = source else {
        return (None, None);
    };

    match find_key_offset(content, table, key) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), key.len())),
            Some(NamedSource::new(name, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `key = ...` inside the `[table]` block of `content`.
///
/// An empty `table` searches the lines before the first header.
pub fn find_key_offset(content: &str, table: &[String], key: &str) -> Option<usize> {
    let wanted = table.join(".");
    let mut current = String::new();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(header) = trimmed.strip_prefix('[') {
            current = header.split(']').next().unwrap_or_default().trim().to_string();
        } else if current == wanted
            && trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        {
            return Some(offset + line.len() - trimmed.len());
        }
        offset += line.len();
    }
    None
}

/// Prints every error to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    eprintln!(
        "leadrelay: {} configuration problem{} found",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> Vec<String> {
        vec![name.to_string()]
    }

    #[test]
    fn suggests_close_campaign_key() {
        let valid = &["max_initiated", "max_delivered", "batch_interval_ms"];
        assert_eq!(
            suggest_key("max_initated", valid),
            Some("max_initiated".to_string())
        );
    }

    #[test]
    fn legacy_env_name_maps_to_field() {
        let valid = &["access_token", "phone_number_id", "verify_token", "app_secret"];
        assert_eq!(
            suggest_key("WHATSAPP_TOKEN", valid),
            Some("access_token".to_string())
        );
        assert_eq!(
            suggest_key("whatsapp_phone_number_id", valid),
            Some("phone_number_id".to_string())
        );
    }

    #[test]
    fn legacy_env_name_ignored_outside_its_table() {
        let valid = &["csv_path", "delimiter", "status_path"];
        assert_eq!(suggest_key("TRELLO_TOKEN", valid), None);
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["csv_path", "delimiter", "status_path"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn secret_help_names_env_variable() {
        let help = unknown_key_help(&table("trello"), Some("board_id"), &["board_id"]);
        assert!(help.contains("did you mean `board_id`?"));
        assert!(help.contains("TRELLO_BOARD_ID"));

        let help = unknown_key_help(&table("campaign"), Some("run_on_start"), &["run_on_start"]);
        assert!(!help.contains("through"));
    }

    #[test]
    fn duration_keys_get_unit_help() {
        assert!(type_help("campaign.batch_interval_ms", "u64").contains("milliseconds"));
        assert!(type_help("campaign.cycle_interval_secs", "u64").contains("seconds"));
        assert!(type_help("gateway.port", "u16").contains("65535"));
        assert_eq!(type_help("agent.name", "a string"), "expected a string");
    }

    #[test]
    fn find_key_offset_in_section() {
        let content = "[leads]\ncsv_path = \"a.csv\"\n\n[campaign]\nmax_initatd = 5\n";
        let offset = find_key_offset(content, &table("campaign"), "max_initatd").unwrap();
        assert_eq!(&content[offset..offset + 11], "max_initatd");
    }

    #[test]
    fn find_key_offset_ignores_other_sections() {
        let content = "[trello]\ntoken = \"t\"\n\n[whatsapp]\naccess_token = \"w\"\n";
        assert!(find_key_offset(content, &table("whatsapp"), "token").is_none());
        assert_eq!(find_key_offset(content, &table("trello"), "token"), Some(9));
    }

    #[test]
    fn find_key_offset_top_level() {
        let content = "debug = true\n[agent]\nname = \"x\"\n";
        assert_eq!(find_key_offset(content, &[], "debug"), Some(0));
        assert!(find_key_offset(content, &[], "name").is_none());
    }

    #[test]
    fn find_key_offset_missing_section() {
        let content = "[leads]\ncsv_path = \"a.csv\"\n";
        assert!(find_key_offset(content, &table("gateway"), "port").is_none());
    }

    #[test]
    fn location_labels() {
        assert_eq!(location(&[]), "the top level");
        assert_eq!(location(&table("openai")), "[openai]");
    }
}
